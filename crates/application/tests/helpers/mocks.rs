use async_trait::async_trait;
use bytes::Bytes;
use kdc_proxy_application::ports::{KdcTransport, RealmProvider};
use kdc_proxy_domain::{DomainError, ServerSpec, ServiceKind, TransportProtocol};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub struct MockRealmProvider {
    name: String,
    entries: HashMap<(String, ServiceKind), Vec<ServerSpec>>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockRealmProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: HashMap::new(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }

    pub fn with_servers(mut self, realm: &str, service: ServiceKind, servers: &[&str]) -> Self {
        let specs = servers.iter().map(|s| s.parse().unwrap()).collect();
        self.entries.insert((realm.to_string(), service), specs);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RealmProvider for MockRealmProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(
        &self,
        realm: &str,
        service: ServiceKind,
    ) -> Result<Vec<ServerSpec>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DomainError::ProviderLookup {
                provider: self.name.clone(),
                reason: "unreadable".to_string(),
            });
        }
        Ok(self
            .entries
            .get(&(realm.to_string(), service))
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Clone)]
pub enum FakeOutcome {
    Reply(Bytes),
    Refused,
    Timeout,
}

/// Transport double that records every attempt and how many overlapped.
pub struct FakeTransport {
    outcomes: HashMap<(String, TransportProtocol), FakeOutcome>,
    latency: Duration,
    attempts: Mutex<Vec<(ServerSpec, Bytes)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            outcomes: HashMap::new(),
            latency: Duration::from_millis(5),
            attempts: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_outcome(mut self, host: &str, protocol: TransportProtocol, outcome: FakeOutcome) -> Self {
        self.outcomes.insert((host.to_string(), protocol), outcome);
        self
    }

    pub fn attempts(&self) -> Vec<ServerSpec> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .map(|(spec, _)| spec.clone())
            .collect()
    }

    pub fn sent_messages(&self) -> Vec<Bytes> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KdcTransport for FakeTransport {
    async fn exchange(
        &self,
        server: &ServerSpec,
        service: ServiceKind,
        message: &[u8],
        timeout: Duration,
    ) -> Result<Bytes, DomainError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.attempts
            .lock()
            .unwrap()
            .push((server.clone(), Bytes::copy_from_slice(message)));

        tokio::time::sleep(self.latency).await;

        let label = format!("{}:{}", server.host, server.effective_port(service));
        let outcome = self
            .outcomes
            .get(&(server.host.to_string(), server.protocol))
            .cloned()
            .unwrap_or(FakeOutcome::Refused);
        let result = match outcome {
            FakeOutcome::Reply(bytes) => Ok(bytes),
            FakeOutcome::Refused => Err(DomainError::TransportConnectionRefused { server: label }),
            FakeOutcome::Timeout => {
                tokio::time::sleep(timeout).await;
                Err(DomainError::TransportTimeout { server: label })
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
