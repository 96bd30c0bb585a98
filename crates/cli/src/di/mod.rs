use kdc_proxy_api::AppState;
use kdc_proxy_application::services::TransportDispatcher;
use kdc_proxy_application::use_cases::HandleProxyRequestUseCase;
use kdc_proxy_domain::Config;
use kdc_proxy_infrastructure::kdc::{NetworkTransport, ResolverChainBuilder};
use std::sync::Arc;
use tracing::info;

pub struct Services {
    pub handle_proxy: Arc<HandleProxyRequestUseCase>,
}

impl Services {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let chain = ResolverChainBuilder::new(config.realms.clone(), config.proxy.clone()).build()?;

        let transport = Arc::new(NetworkTransport::new());
        let dispatcher = TransportDispatcher::new(transport, config.proxy.attempt_timeout());

        info!(
            attempt_timeout_ms = config.proxy.attempt_timeout_ms,
            default_realm = config.proxy.default_realm.as_deref().unwrap_or("-"),
            "Proxy services ready"
        );

        let handle_proxy = HandleProxyRequestUseCase::new(Arc::new(chain), Arc::new(dispatcher))
            .with_default_realm(config.proxy.default_realm.clone());

        Ok(Self {
            handle_proxy: Arc::new(handle_proxy),
        })
    }

    pub fn app_state(&self, config: &Config) -> AppState {
        AppState {
            handle_proxy: Arc::clone(&self.handle_proxy),
            max_request_size: config.server.max_request_size,
        }
    }
}
