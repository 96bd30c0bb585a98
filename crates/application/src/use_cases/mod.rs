pub mod proxy;

pub use proxy::{HandleProxyRequestUseCase, ProxyReply};
