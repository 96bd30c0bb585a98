//! DNS SRV discovery (RFC 4120 §7.2.3.2)
//!
//! Looks up `_kerberos._tcp.REALM` then `_kerberos._udp.REALM`, or the
//! `_kpasswd` labels for password changes with `_kerberos-adm` as the
//! per-protocol fallback.

use async_trait::async_trait;
use kdc_proxy_application::ports::RealmProvider;
use kdc_proxy_domain::{DomainError, ServerSpec, ServiceKind, TransportProtocol};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvTarget {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

#[async_trait]
pub trait SrvRecordSource: Send + Sync {
    /// SRV records for `name`. An absent name yields an empty list.
    async fn query_srv(&self, name: &str) -> Result<Vec<SrvTarget>, DomainError>;
}

pub struct DnsSrvProvider {
    source: Arc<dyn SrvRecordSource>,
}

impl DnsSrvProvider {
    pub fn new(source: Arc<dyn SrvRecordSource>) -> Self {
        Self { source }
    }

    async fn query(
        &self,
        service: &str,
        protocol: TransportProtocol,
        realm: &str,
    ) -> Result<Vec<ServerSpec>, DomainError> {
        let label = match protocol {
            TransportProtocol::Udp => "udp",
            _ => "tcp",
        };
        let name = format!("_{}._{}.{}", service, label, realm);

        let mut records = self.source.query_srv(&name).await?;
        // Stable sort keeps the server's order among equal priorities.
        records.sort_by_key(|r| r.priority);

        let servers: Vec<ServerSpec> = records
            .into_iter()
            .filter_map(|r| {
                let host = r.target.trim_end_matches('.');
                // A lone "." means the service is decidedly not available.
                (!host.is_empty()).then(|| ServerSpec::new(protocol, host, Some(r.port)))
            })
            .collect();

        debug!(name = %name, servers = servers.len(), "SRV lookup");
        Ok(servers)
    }
}

#[async_trait]
impl RealmProvider for DnsSrvProvider {
    fn name(&self) -> &str {
        "dns"
    }

    async fn lookup(
        &self,
        realm: &str,
        service: ServiceKind,
    ) -> Result<Vec<ServerSpec>, DomainError> {
        let mut servers = Vec::new();
        let mut last_err = None;

        for protocol in [TransportProtocol::Tcp, TransportProtocol::Udp] {
            let mut found = match self.query(service.as_str(), protocol, realm).await {
                Ok(found) => found,
                Err(e) => {
                    last_err = Some(e);
                    Vec::new()
                }
            };
            if found.is_empty() && service == ServiceKind::Kpasswd {
                match self.query("kerberos-adm", protocol, realm).await {
                    Ok(adm) => found = adm,
                    Err(e) => last_err = Some(e),
                }
            }
            servers.extend(found);
        }

        match last_err {
            Some(e) if servers.is_empty() => Err(e),
            _ => Ok(servers),
        }
    }
}
