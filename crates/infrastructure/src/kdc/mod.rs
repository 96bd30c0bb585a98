pub mod builder;
pub mod providers;
pub mod transport;

pub use builder::ResolverChainBuilder;
pub use transport::NetworkTransport;
