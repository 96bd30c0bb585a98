use crate::errors::DomainError;
use crate::service::ServiceKind;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportProtocol {
    Tcp,
    Udp,
    /// Either transport; expands to TCP then UDP at resolution time.
    Unspecified,
}

impl TransportProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportProtocol::Tcp => "TCP",
            TransportProtocol::Udp => "UDP",
            TransportProtocol::Unspecified => "UNSPECIFIED",
        }
    }
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candidate backend endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerSpec {
    pub protocol: TransportProtocol,
    pub host: Arc<str>,
    /// `None` means the standard port of whichever service is being contacted.
    pub port: Option<u16>,
}

impl ServerSpec {
    pub fn new(protocol: TransportProtocol, host: impl Into<Arc<str>>, port: Option<u16>) -> Self {
        Self {
            protocol,
            host: host.into(),
            port,
        }
    }

    pub fn tcp(host: impl Into<Arc<str>>, port: Option<u16>) -> Self {
        Self::new(TransportProtocol::Tcp, host, port)
    }

    pub fn udp(host: impl Into<Arc<str>>, port: Option<u16>) -> Self {
        Self::new(TransportProtocol::Udp, host, port)
    }

    pub fn unspecified(host: impl Into<Arc<str>>, port: Option<u16>) -> Self {
        Self::new(TransportProtocol::Unspecified, host, port)
    }

    pub fn effective_port(&self, service: ServiceKind) -> u16 {
        self.port.unwrap_or_else(|| service.default_port())
    }

    /// Concrete attempts for this entry: itself, or TCP then UDP when unspecified.
    pub fn expand(&self) -> Vec<ServerSpec> {
        match self.protocol {
            TransportProtocol::Unspecified => vec![
                Self::new(TransportProtocol::Tcp, Arc::clone(&self.host), self.port),
                Self::new(TransportProtocol::Udp, Arc::clone(&self.host), self.port),
            ],
            _ => vec![self.clone()],
        }
    }
}

/// Expands every unspecified entry in place, keeping the relative order of entries.
pub fn expand_protocols(specs: &[ServerSpec]) -> Vec<ServerSpec> {
    specs.iter().flat_map(ServerSpec::expand).collect()
}

fn parse_host_port(s: &str) -> Result<(&str, Option<u16>), String> {
    if let Some(rest) = s.strip_prefix('[') {
        let end = rest
            .find(']')
            .ok_or_else(|| format!("Unterminated IPv6 literal in '{}'", s))?;
        let host = &rest[..end];
        let tail = &rest[end + 1..];
        if tail.is_empty() {
            return Ok((host, None));
        }
        let port_str = tail
            .strip_prefix(':')
            .ok_or_else(|| format!("Unexpected characters after IPv6 literal in '{}'", s))?;
        return parse_port(port_str, s).map(|port| (host, Some(port)));
    }

    match s.rsplit_once(':') {
        // Bare IPv6 literal without brackets carries no port.
        Some((host, _)) if host.contains(':') => Ok((s, None)),
        Some((host, port_str)) => parse_port(port_str, s).map(|port| (host, Some(port))),
        None => Ok((s, None)),
    }
}

fn parse_port(port_str: &str, whole: &str) -> Result<u16, String> {
    port_str
        .parse::<u16>()
        .map_err(|e| format!("Invalid port in '{}': {}", whole, e))
}

impl FromStr for ServerSpec {
    type Err = DomainError;

    /// Accepts `kerberos[+tcp|+udp]://host[:port]`, the same with the `kpasswd`
    /// scheme, or a bare `host[:port]` as written in krb5.conf.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (protocol, authority) = match s.split_once("://") {
            Some((scheme, rest)) => {
                let scheme = scheme.to_ascii_lowercase();
                let (base, transport) = match scheme.split_once('+') {
                    Some((base, transport)) => (base.to_string(), Some(transport.to_string())),
                    None => (scheme.clone(), None),
                };
                if base != "kerberos" && base != "kpasswd" {
                    return Err(DomainError::InvalidServerSpec(format!(
                        "Unsupported scheme '{}' in '{}'. Expected kerberos:// or kpasswd://",
                        base, s
                    )));
                }
                let protocol = match transport.as_deref() {
                    None => TransportProtocol::Unspecified,
                    Some("tcp") => TransportProtocol::Tcp,
                    Some("udp") => TransportProtocol::Udp,
                    Some(other) => {
                        return Err(DomainError::InvalidServerSpec(format!(
                            "Unsupported transport '{}' in '{}'. Expected tcp or udp",
                            other, s
                        )))
                    }
                };
                (protocol, rest.trim_end_matches('/'))
            }
            None => (TransportProtocol::Unspecified, s),
        };

        let (host, port) = parse_host_port(authority).map_err(DomainError::InvalidServerSpec)?;
        if host.is_empty() {
            return Err(DomainError::InvalidServerSpec(format!(
                "Missing host in '{}'",
                s
            )));
        }

        Ok(ServerSpec::new(protocol, host, port))
    }
}

impl fmt::Display for ServerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.protocol {
            TransportProtocol::Tcp => f.write_str("kerberos+tcp://")?,
            TransportProtocol::Udp => f.write_str("kerberos+udp://")?,
            TransportProtocol::Unspecified => f.write_str("kerberos://")?,
        }
        if self.host.contains(':') {
            write!(f, "[{}]", self.host)?;
        } else {
            f.write_str(&self.host)?;
        }
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        Ok(())
    }
}
