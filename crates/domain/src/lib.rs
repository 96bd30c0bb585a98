//! KDC Proxy Domain Layer
pub mod config;
pub mod envelope;
pub mod errors;
pub mod framing;
pub mod proxy_message;
pub mod server_spec;
pub mod service;

pub use config::{
    CliOverrides, Config, ConfigError, LogFormat, LoggingConfig, ProxyConfig, RealmServers,
    ServerConfig,
};
pub use envelope::{EnvelopeCodec, MAX_MESSAGE_SIZE};
pub use errors::{AttemptFailure, DomainError};
pub use proxy_message::ProxyMessage;
pub use server_spec::{expand_protocols, ServerSpec, TransportProtocol};
pub use service::ServiceKind;
