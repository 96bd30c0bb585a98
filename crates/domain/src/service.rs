use std::fmt;

/// Which Kerberos service a request is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// Ticket issuing (AS and TGS exchanges).
    Kdc,
    /// Password change.
    Kpasswd,
}

impl ServiceKind {
    pub fn default_port(self) -> u16 {
        match self {
            ServiceKind::Kdc => 88,
            ServiceKind::Kpasswd => 464,
        }
    }

    /// Service label used in server URIs and SRV owner names.
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKind::Kdc => "kerberos",
            ServiceKind::Kpasswd => "kpasswd",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
