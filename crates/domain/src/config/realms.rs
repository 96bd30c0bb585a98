use crate::errors::DomainError;
use crate::server_spec::ServerSpec;
use crate::service::ServiceKind;
use serde::{Deserialize, Serialize};

/// Manually configured servers of one realm, as server URIs in preference order.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct RealmServers {
    #[serde(default)]
    pub kerberos: Vec<String>,

    #[serde(default)]
    pub kpasswd: Vec<String>,
}

impl RealmServers {
    pub fn uris(&self, service: ServiceKind) -> &[String] {
        match service {
            ServiceKind::Kdc => &self.kerberos,
            ServiceKind::Kpasswd => &self.kpasswd,
        }
    }

    pub fn parse(&self, service: ServiceKind) -> Result<Vec<ServerSpec>, DomainError> {
        self.uris(service).iter().map(|uri| uri.parse()).collect()
    }
}
