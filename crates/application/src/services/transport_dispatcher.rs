use crate::ports::KdcTransport;
use bytes::Bytes;
use kdc_proxy_domain::{expand_protocols, AttemptFailure, DomainError, ServerSpec, ServiceKind};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Sends a message to candidate servers one at a time, in order, until one
/// replies.
///
/// At most one attempt is ever in flight for a single `send`. A request can
/// carry a one-time password, which must never reach two servers.
pub struct TransportDispatcher {
    transport: Arc<dyn KdcTransport>,
    attempt_timeout: Duration,
}

impl TransportDispatcher {
    pub fn new(transport: Arc<dyn KdcTransport>, attempt_timeout: Duration) -> Self {
        Self {
            transport,
            attempt_timeout,
        }
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    pub async fn send(
        &self,
        candidates: &[ServerSpec],
        service: ServiceKind,
        message: &[u8],
    ) -> Result<Bytes, DomainError> {
        let candidates = expand_protocols(candidates);
        debug!(strategy = "sequential", candidates = candidates.len(), service = %service, "Dispatching");

        let mut attempts = Vec::with_capacity(candidates.len());
        for (index, server) in candidates.iter().enumerate() {
            let start = Instant::now();
            match self
                .transport
                .exchange(server, service, message, self.attempt_timeout)
                .await
            {
                Ok(reply) => {
                    debug!(
                        server = %server,
                        latency_ms = start.elapsed().as_millis() as u64,
                        position = index,
                        reply_len = reply.len(),
                        "Server responded"
                    );
                    return Ok(reply);
                }
                Err(e) => {
                    warn!(server = %server, error = %e, position = index, "Failing over");
                    attempts.push(AttemptFailure {
                        protocol: server.protocol,
                        host: server.host.to_string(),
                        port: server.effective_port(service),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(DomainError::AllServersUnreachable { attempts })
    }
}
