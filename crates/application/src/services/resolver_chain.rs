use crate::ports::RealmProvider;
use kdc_proxy_domain::{expand_protocols, ServerSpec, ServiceKind};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Ordered chain of realm providers. The first provider with a non-empty
/// answer wins; answers are never merged across providers.
pub struct ResolverChain {
    providers: Vec<Arc<dyn RealmProvider>>,
}

impl ResolverChain {
    pub fn new(providers: Vec<Arc<dyn RealmProvider>>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Candidates for `realm`, with every unspecified-protocol entry expanded
    /// to TCP then UDP. Empty when no provider knows the realm.
    pub async fn resolve(&self, realm: &str, service: ServiceKind) -> Vec<ServerSpec> {
        for provider in &self.providers {
            match provider.lookup(realm, service).await {
                Ok(servers) if !servers.is_empty() => {
                    debug!(
                        provider = provider.name(),
                        realm,
                        service = %service,
                        servers = servers.len(),
                        "Realm resolved"
                    );
                    return expand_protocols(&without_repeats(servers));
                }
                Ok(_) => {
                    debug!(provider = provider.name(), realm, service = %service, "No servers from provider");
                }
                Err(e) => {
                    warn!(provider = provider.name(), realm, service = %service, error = %e, "Provider lookup failed, skipping");
                }
            }
        }
        Vec::new()
    }
}

/// Drops exact repeats of (protocol, host, port), keeping the first.
fn without_repeats(servers: Vec<ServerSpec>) -> Vec<ServerSpec> {
    let mut seen = HashSet::with_capacity(servers.len());
    servers
        .into_iter()
        .filter(|spec| seen.insert(spec.clone()))
        .collect()
}
