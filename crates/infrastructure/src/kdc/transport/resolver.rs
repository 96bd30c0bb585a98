use kdc_proxy_domain::DomainError;
use std::net::SocketAddr;

/// Resolves a hostname to all its IP addresses (IPv4 + IPv6), in resolver order.
///
/// Callers bound this with their own attempt deadline.
pub async fn resolve_all(hostname: &str, port: u16) -> Result<Vec<SocketAddr>, DomainError> {
    let target = format!("{}:{}", hostname, port);

    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((hostname, port))
        .await
        .map_err(|e| DomainError::AddressResolution {
            server: target.clone(),
            reason: e.to_string(),
        })?
        .collect();

    if addrs.is_empty() {
        return Err(DomainError::AddressResolution {
            server: target,
            reason: "no addresses found".to_string(),
        });
    }

    Ok(addrs)
}
