//! Deterministic **in‑process stand‑ins** for `StorageClient` and `ClientFactory`.
//!
//! * A `FakeStorageClient` answers `list_buckets` from a script of outcomes,
//!   sleeping the scripted latency first (use paused tokio time for exact
//!   durations). Once the script runs out the last outcome repeats.
//! * A `FakeClientFactory` hands out pre-registered fakes by host and
//!   remembers every `build` call for assertions.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use objprobe_core::{ClientError, ClientFactory, StorageClient};

#[derive(Debug, Clone)]
pub struct Outcome {
    pub latency: Duration,
    pub result: Result<Vec<String>, String>,
}

impl Outcome {
    pub fn ok(latency_ms: u64) -> Self {
        Self {
            latency: Duration::from_millis(latency_ms),
            result: Ok(vec!["bucket-a".into(), "bucket-b".into()]),
        }
    }

    pub fn err(latency_ms: u64, message: &str) -> Self {
        Self {
            latency: Duration::from_millis(latency_ms),
            result: Err(message.into()),
        }
    }

    /// Never answers; for timeout tests.
    pub fn hang() -> Self {
        Self {
            latency: Duration::from_secs(24 * 60 * 60),
            result: Ok(Vec::new()),
        }
    }
}

pub struct FakeStorageClient {
    script: Mutex<VecDeque<Outcome>>,
    last: Mutex<Outcome>,
    calls: AtomicUsize,
}

impl FakeStorageClient {
    pub fn new(outcomes: impl IntoIterator<Item = Outcome>) -> Arc<Self> {
        let script: VecDeque<Outcome> = outcomes.into_iter().collect();
        let last = script.back().cloned().unwrap_or_else(|| Outcome::ok(0));
        Arc::new(Self {
            script: Mutex::new(script),
            last: Mutex::new(last),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageClient for FakeStorageClient {
    async fn list_buckets(&self) -> Result<Vec<String>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = {
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(outcome) => outcome,
                None => self.last.lock().unwrap().clone(),
            }
        };
        tokio::time::sleep(outcome.latency).await;
        outcome.result.map_err(ClientError::Request)
    }
}

/// One recorded `ClientFactory::build` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Built {
    pub host: String,
    pub access_key: String,
    pub secret_key: String,
    pub secure: bool,
}

pub struct FakeClientFactory {
    default: Arc<FakeStorageClient>,
    by_host: HashMap<String, Arc<FakeStorageClient>>,
    pub builds: Mutex<Vec<Built>>,
}

impl FakeClientFactory {
    pub fn new(default: Arc<FakeStorageClient>) -> Self {
        Self {
            default,
            by_host: HashMap::new(),
            builds: Mutex::new(Vec::new()),
        }
    }

    pub fn with_host(mut self, host: &str, client: Arc<FakeStorageClient>) -> Self {
        self.by_host.insert(host.into(), client);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn builds(&self) -> Vec<Built> {
        self.builds.lock().unwrap().clone()
    }
}

impl ClientFactory for FakeClientFactory {
    fn build(
        &self,
        host: &str,
        access_key: &str,
        secret_key: &str,
        secure: bool,
    ) -> Result<Arc<dyn StorageClient>, ClientError> {
        if host.is_empty() {
            return Err(ClientError::InvalidEndpoint(host.into()));
        }
        self.builds.lock().unwrap().push(Built {
            host: host.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            secure,
        });
        let client = self
            .by_host
            .get(host)
            .cloned()
            .unwrap_or_else(|| self.default.clone());
        Ok(client)
    }
}
