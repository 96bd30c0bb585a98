pub mod errors;
pub mod logging;
pub mod proxy;
pub mod realms;
pub mod root;
pub mod server;

pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use proxy::ProxyConfig;
pub use realms::RealmServers;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
