use async_trait::async_trait;
use kdc_proxy_domain::{DomainError, ServerSpec, ServiceKind};

/// A source of backend servers for a realm.
///
/// Providers are built once at startup and shared read-only by every request.
#[async_trait]
pub trait RealmProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Servers for `realm` in preference order. An empty list means this
    /// provider knows nothing about the realm.
    async fn lookup(
        &self,
        realm: &str,
        service: ServiceKind,
    ) -> Result<Vec<ServerSpec>, DomainError>;

    /// Whether this provider's own configuration asks for DNS discovery.
    fn dns_preference(&self) -> Option<bool> {
        None
    }
}
