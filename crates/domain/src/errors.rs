use crate::server_spec::TransportProtocol;
use std::fmt;
use thiserror::Error;

/// One failed candidate attempt, kept for operator diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub protocol: TransportProtocol,
    pub host: String,
    pub port: u16,
    pub reason: String,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}:{}: {}",
            self.protocol, self.host, self.port, self.reason
        )
    }
}

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Malformed proxy message: {0}")]
    Decode(String),

    #[error("Failed to encode proxy reply: {0}")]
    Encode(String),

    #[error("No servers configured for realm {realm}")]
    RealmNotConfigured { realm: String },

    #[error("Request carries no target realm")]
    MissingRealm,

    #[error("All {} candidate servers are unreachable", .attempts.len())]
    AllServersUnreachable { attempts: Vec<AttemptFailure> },

    #[error("Transport timeout talking to {server}")]
    TransportTimeout { server: String },

    #[error("Transport connection refused by {server}")]
    TransportConnectionRefused { server: String },

    #[error("Transport I/O error with {server}: {reason}")]
    TransportIo { server: String, reason: String },

    #[error("Reply from {server} too large: {size} bytes (max {max})")]
    ResponseTooLarge {
        server: String,
        size: usize,
        max: usize,
    },

    #[error("Failed to resolve address of {server}: {reason}")]
    AddressResolution { server: String, reason: String },

    #[error("Provider {provider} lookup failed: {reason}")]
    ProviderLookup { provider: String, reason: String },

    #[error("Invalid server specification: {0}")]
    InvalidServerSpec(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    /// Errors caused by the request itself rather than by the proxy or its backends.
    pub fn is_client_error(&self) -> bool {
        matches!(self, DomainError::Decode(_))
    }
}
