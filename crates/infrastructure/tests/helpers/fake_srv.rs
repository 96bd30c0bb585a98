use async_trait::async_trait;
use kdc_proxy_domain::DomainError;
use kdc_proxy_infrastructure::kdc::providers::{SrvRecordSource, SrvTarget};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeSrvSource {
    records: HashMap<String, Vec<SrvTarget>>,
    failing: Vec<String>,
    queries: Mutex<Vec<String>>,
}

impl FakeSrvSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, name: &str, priority: u16, target: &str, port: u16) -> Self {
        self.records
            .entry(name.to_string())
            .or_default()
            .push(SrvTarget {
                priority,
                weight: 0,
                port,
                target: target.to_string(),
            });
        self
    }

    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SrvRecordSource for FakeSrvSource {
    async fn query_srv(&self, name: &str) -> Result<Vec<SrvTarget>, DomainError> {
        self.queries.lock().unwrap().push(name.to_string());
        if self.failing.iter().any(|n| n == name) {
            return Err(DomainError::ProviderLookup {
                provider: "dns".to_string(),
                reason: "SERVFAIL".to_string(),
            });
        }
        Ok(self.records.get(name).cloned().unwrap_or_default())
    }
}
