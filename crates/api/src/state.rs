use kdc_proxy_application::use_cases::HandleProxyRequestUseCase;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub handle_proxy: Arc<HandleProxyRequestUseCase>,
    /// Request bodies above this size are refused before decoding.
    pub max_request_size: usize,
}
