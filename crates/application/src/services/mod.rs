pub mod resolver_chain;
pub mod transport_dispatcher;

pub use resolver_chain::ResolverChain;
pub use transport_dispatcher::TransportDispatcher;
