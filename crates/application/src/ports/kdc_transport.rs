use async_trait::async_trait;
use bytes::Bytes;
use kdc_proxy_domain::{DomainError, ServerSpec, ServiceKind};
use std::time::Duration;

#[async_trait]
pub trait KdcTransport: Send + Sync {
    /// One request/reply exchange with a single server.
    ///
    /// `server.protocol` is TCP or UDP. `message` is the bare Kerberos message;
    /// any wire framing is the transport's job. The whole exchange, address
    /// resolution included, must finish within `timeout`.
    async fn exchange(
        &self,
        server: &ServerSpec,
        service: ServiceKind,
        message: &[u8],
        timeout: Duration,
    ) -> Result<Bytes, DomainError>;
}
