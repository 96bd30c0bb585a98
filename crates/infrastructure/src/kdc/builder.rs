use super::providers::{
    DnsSrvProvider, MitConfigProvider, SrvRecordSource, StaticRealmTable, UdpSrvClient,
};
use kdc_proxy_application::ports::RealmProvider;
use kdc_proxy_application::services::ResolverChain;
use kdc_proxy_domain::{DomainError, ProxyConfig, RealmServers};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Assembles the provider chain: the static realm table, then each external
/// provider in configured order, then DNS SRV when enabled.
pub struct ResolverChainBuilder {
    realms: HashMap<String, RealmServers>,
    proxy: ProxyConfig,
    srv_source: Option<Arc<dyn SrvRecordSource>>,
}

impl ResolverChainBuilder {
    pub fn new(realms: HashMap<String, RealmServers>, proxy: ProxyConfig) -> Self {
        Self {
            realms,
            proxy,
            srv_source: None,
        }
    }

    /// Replaces the UDP stub resolver used for SRV lookups.
    pub fn with_srv_source(mut self, source: Arc<dyn SrvRecordSource>) -> Self {
        self.srv_source = Some(source);
        self
    }

    fn external_provider(&self, name: &str) -> Option<Arc<dyn RealmProvider>> {
        match name {
            "mit" => {
                let path = MitConfigProvider::config_path(self.proxy.krb5_config.as_deref());
                match MitConfigProvider::load(&path) {
                    Ok(provider) => Some(Arc::new(provider)),
                    Err(e) => {
                        warn!(provider = name, path = %path.display(), error = %e, "Skipping provider");
                        None
                    }
                }
            }
            other => {
                warn!(provider = other, "Unknown realm provider, skipping");
                None
            }
        }
    }

    /// Explicit setting first, then the first external provider that has an
    /// opinion, then on.
    fn dns_enabled(&self, external: &[Arc<dyn RealmProvider>]) -> bool {
        self.proxy
            .use_dns
            .or_else(|| external.iter().find_map(|p| p.dns_preference()))
            .unwrap_or(true)
    }

    /// Fails only when the static realm table holds a malformed server URI.
    pub fn build(self) -> Result<ResolverChain, DomainError> {
        let static_table = StaticRealmTable::from_config(&self.realms)?;

        let external: Vec<Arc<dyn RealmProvider>> = self
            .proxy
            .configs
            .iter()
            .filter_map(|name| self.external_provider(name))
            .collect();

        let use_dns = self.dns_enabled(&external);

        let mut providers: Vec<Arc<dyn RealmProvider>> = Vec::with_capacity(external.len() + 2);
        providers.push(Arc::new(static_table));
        providers.extend(external);

        if use_dns {
            let source: Arc<dyn SrvRecordSource> = match &self.srv_source {
                Some(source) => Arc::clone(source),
                None => Arc::new(UdpSrvClient::from_config(
                    &self.proxy.dns_nameservers,
                    self.proxy.attempt_timeout(),
                )),
            };
            providers.push(Arc::new(DnsSrvProvider::new(source)));
        }

        let chain = ResolverChain::new(providers);
        info!(
            providers = ?chain.provider_names(),
            static_realms = self.realms.len(),
            use_dns,
            "Building resolver chain"
        );
        Ok(chain)
    }
}
