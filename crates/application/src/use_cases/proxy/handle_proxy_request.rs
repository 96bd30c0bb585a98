use crate::services::{ResolverChain, TransportDispatcher};
use bytes::Bytes;
use kdc_proxy_domain::{framing, DomainError, EnvelopeCodec, ServiceKind};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of one proxied request.
#[derive(Debug)]
pub enum ProxyReply {
    /// Encoded envelope to return to the client.
    Success(Bytes),
    /// The request envelope was malformed.
    ClientError(DomainError),
    /// No backend could be found or reached, or the reply could not be wrapped.
    ServerError(DomainError),
}

impl ProxyReply {
    pub fn is_success(&self) -> bool {
        matches!(self, ProxyReply::Success(_))
    }
}

pub struct HandleProxyRequestUseCase {
    resolver: Arc<ResolverChain>,
    dispatcher: Arc<TransportDispatcher>,
    default_realm: Option<String>,
}

impl HandleProxyRequestUseCase {
    pub fn new(resolver: Arc<ResolverChain>, dispatcher: Arc<TransportDispatcher>) -> Self {
        Self {
            resolver,
            dispatcher,
            default_realm: None,
        }
    }

    /// Realm used when the envelope carries no target realm.
    pub fn with_default_realm(mut self, realm: Option<String>) -> Self {
        self.default_realm = realm;
        self
    }

    pub async fn execute(&self, service: ServiceKind, body: &[u8]) -> ProxyReply {
        let start = Instant::now();
        match self.proxy(service, body).await {
            Ok(reply) => {
                info!(
                    service = %service,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Proxied request"
                );
                ProxyReply::Success(reply)
            }
            Err(e) if e.is_client_error() => {
                debug!(service = %service, error = %e, "Rejected malformed request");
                ProxyReply::ClientError(e)
            }
            Err(e) => {
                if let DomainError::AllServersUnreachable { attempts } = &e {
                    for attempt in attempts {
                        warn!(service = %service, attempt = %attempt, "Candidate failed");
                    }
                }
                warn!(service = %service, error = %e, "Request failed");
                ProxyReply::ServerError(e)
            }
        }
    }

    async fn proxy(&self, service: ServiceKind, body: &[u8]) -> Result<Bytes, DomainError> {
        let request = EnvelopeCodec::decode(body)?;

        let realm = request
            .target_realm
            .as_deref()
            .or(self.default_realm.as_deref())
            .ok_or(DomainError::MissingRealm)?;

        let candidates = self.resolver.resolve(realm, service).await;
        if candidates.is_empty() {
            return Err(DomainError::RealmNotConfigured {
                realm: realm.to_string(),
            });
        }

        // Clients may send the TCP wire form; transports add their own framing.
        let framed = framing::unframe(&request.kerberos_message);
        let message = framed.unwrap_or(&request.kerberos_message[..]);

        debug!(
            realm,
            service = %service,
            candidates = candidates.len(),
            framed = framed.is_some(),
            message_len = message.len(),
            "Forwarding request"
        );

        let reply = self.dispatcher.send(&candidates, service, message).await?;

        if framed.is_some() {
            EnvelopeCodec::encode(&framing::frame(&reply)?)
        } else {
            EnvelopeCodec::encode(&reply)
        }
    }
}
