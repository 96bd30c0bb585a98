mod handle_proxy_request;

pub use handle_proxy_request::{HandleProxyRequestUseCase, ProxyReply};
