use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyConfig {
    /// Budget for one candidate attempt, connect through reply.
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,

    /// DNS SRV fallback. Unset defers to the external providers, then defaults to on.
    #[serde(default)]
    pub use_dns: Option<bool>,

    /// External providers consulted after the static realm table, in order.
    #[serde(default)]
    pub configs: Vec<String>,

    /// Realm used when a request envelope names none.
    #[serde(default)]
    pub default_realm: Option<String>,

    /// krb5.conf location for the `mit` provider.
    #[serde(default)]
    pub krb5_config: Option<String>,

    /// Nameservers for SRV lookups. Empty means read /etc/resolv.conf.
    #[serde(default)]
    pub dns_nameservers: Vec<String>,
}

impl ProxyConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_ms: default_attempt_timeout_ms(),
            use_dns: None,
            configs: Vec::new(),
            default_realm: None,
            krb5_config: None,
            dns_nameservers: Vec::new(),
        }
    }
}

fn default_attempt_timeout_ms() -> u64 {
    5000
}
