use async_trait::async_trait;
use kdc_proxy_application::ports::RealmProvider;
use kdc_proxy_domain::{DomainError, RealmServers, ServerSpec, ServiceKind};
use std::collections::HashMap;

#[derive(Debug, Default)]
struct RealmEntry {
    kdc: Vec<ServerSpec>,
    kpasswd: Vec<ServerSpec>,
}

/// Realms configured by hand in the proxy's own configuration file.
#[derive(Debug, Default)]
pub struct StaticRealmTable {
    realms: HashMap<String, RealmEntry>,
}

impl StaticRealmTable {
    /// Parses every server URI up front; a bad entry fails startup.
    pub fn from_config(realms: &HashMap<String, RealmServers>) -> Result<Self, DomainError> {
        let realms = realms
            .iter()
            .map(|(realm, servers)| {
                let entry = RealmEntry {
                    kdc: servers.parse(ServiceKind::Kdc)?,
                    kpasswd: servers.parse(ServiceKind::Kpasswd)?,
                };
                Ok((realm.clone(), entry))
            })
            .collect::<Result<HashMap<_, _>, DomainError>>()?;
        Ok(Self { realms })
    }
}

#[async_trait]
impl RealmProvider for StaticRealmTable {
    fn name(&self) -> &str {
        "static"
    }

    async fn lookup(
        &self,
        realm: &str,
        service: ServiceKind,
    ) -> Result<Vec<ServerSpec>, DomainError> {
        Ok(self
            .realms
            .get(realm)
            .map(|entry| match service {
                ServiceKind::Kdc => entry.kdc.clone(),
                ServiceKind::Kpasswd => entry.kpasswd.clone(),
            })
            .unwrap_or_default())
    }
}
