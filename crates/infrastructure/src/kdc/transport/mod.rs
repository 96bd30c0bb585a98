pub mod resolver;
pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use bytes::Bytes;
use kdc_proxy_application::ports::KdcTransport;
use kdc_proxy_domain::{DomainError, ServerSpec, ServiceKind, TransportProtocol, MAX_MESSAGE_SIZE};
use std::time::Duration;

/// Real sockets. Every exchange, name lookup included, runs under one deadline
/// and its socket is closed when the exchange ends or is dropped.
pub struct NetworkTransport {
    max_reply_size: usize,
}

impl NetworkTransport {
    pub fn new() -> Self {
        Self {
            max_reply_size: MAX_MESSAGE_SIZE,
        }
    }

    pub fn with_max_reply_size(mut self, max_reply_size: usize) -> Self {
        self.max_reply_size = max_reply_size;
        self
    }

    async fn exchange_inner(
        &self,
        server: &ServerSpec,
        label: &str,
        port: u16,
        message: &[u8],
    ) -> Result<Vec<u8>, DomainError> {
        let addrs = resolver::resolve_all(&server.host, port).await?;
        match server.protocol {
            TransportProtocol::Tcp => {
                tcp::exchange(label, &addrs, message, self.max_reply_size).await
            }
            TransportProtocol::Udp => {
                udp::exchange(label, addrs[0], message, self.max_reply_size).await
            }
            TransportProtocol::Unspecified => Err(DomainError::InvalidServerSpec(format!(
                "{} has no concrete transport",
                server
            ))),
        }
    }
}

impl Default for NetworkTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KdcTransport for NetworkTransport {
    async fn exchange(
        &self,
        server: &ServerSpec,
        service: ServiceKind,
        message: &[u8],
        timeout: Duration,
    ) -> Result<Bytes, DomainError> {
        let port = server.effective_port(service);
        let label = format!("{}/{}:{}", server.protocol, server.host, port);

        tokio::time::timeout(timeout, self.exchange_inner(server, &label, port, message))
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: label.clone(),
            })?
            .map(Bytes::from)
    }
}
