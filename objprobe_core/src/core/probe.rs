use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::client::StorageClient;
use crate::core::session::ActiveSession;

/// Delays and bounds applied around probe attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTiming {
    /// Wait before a one-shot check starts.
    pub startup_grace: Duration,
    /// Keep a failed one-shot result on screen this long before returning.
    pub failure_hold: Duration,
    /// Upper bound for a single `list_buckets` round-trip.
    pub attempt_timeout: Duration,
}

impl Default for ProbeTiming {
    fn default() -> Self {
        Self {
            startup_grace: Duration::from_secs(1),
            failure_hold: Duration::from_secs(5),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl ProbeTiming {
    /// No grace and no hold; only the attempt timeout remains.
    pub fn immediate(attempt_timeout: Duration) -> Self {
        Self {
            startup_grace: Duration::ZERO,
            failure_hold: Duration::ZERO,
            attempt_timeout,
        }
    }
}

/// Outcome of one probe attempt. Failures are data, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub success: bool,
    pub duration: Duration,
    pub message: Option<String>,
}

impl ProbeResult {
    pub fn succeeded(duration: Duration) -> Self {
        Self {
            success: true,
            duration,
            message: None,
        }
    }

    pub fn failed(duration: Duration, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "unknown error".into();
        }
        Self {
            success: false,
            duration,
            message: Some(message),
        }
    }

    pub fn duration_ms(&self) -> u128 {
        self.duration.as_millis()
    }
}

/// Progress of an interval probe, in the order it happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeEvent {
    Started { attempt: u64 },
    Finished { attempt: u64, result: ProbeResult },
    Idle { next_in: Duration },
}

#[derive(Debug, Clone, Default)]
pub struct HealthProbe {
    timing: ProbeTiming,
}

impl HealthProbe {
    pub fn new(timing: ProbeTiming) -> Self {
        Self { timing }
    }

    pub fn timing(&self) -> ProbeTiming {
        self.timing
    }

    /// One check, with the startup grace before it and the failure hold after a failure.
    pub async fn check_once(&self, client: &dyn StorageClient) -> ProbeResult {
        time::sleep(self.timing.startup_grace).await;
        let result = self.attempt(client).await;
        if !result.success {
            time::sleep(self.timing.failure_hold).await;
        }
        result
    }

    /// A single timed `list_buckets` call bounded by the attempt timeout.
    pub async fn attempt(&self, client: &dyn StorageClient) -> ProbeResult {
        let started = Instant::now();
        let outcome = time::timeout(self.timing.attempt_timeout, client.list_buckets()).await;
        let elapsed = started.elapsed();
        match outcome {
            Ok(Ok(buckets)) => {
                debug!("Probe ok in {:?}, {} bucket(s)", elapsed, buckets.len());
                ProbeResult::succeeded(elapsed)
            }
            Ok(Err(e)) => {
                warn!("Probe failed after {:?}: {}", elapsed, e);
                ProbeResult::failed(elapsed, e.to_string())
            }
            Err(_) => {
                warn!("Probe timed out after {:?}", elapsed);
                ProbeResult::failed(
                    elapsed,
                    format!(
                        "no answer within {} s",
                        self.timing.attempt_timeout.as_secs_f64()
                    ),
                )
            }
        }
    }

    /// Probe the live session every `interval` until `cancel` fires or the
    /// receiving end of `reports` goes away.
    ///
    /// The session is re-read before every attempt, so switching connection
    /// while this runs takes effect on the next attempt. A failed attempt is
    /// reported and the loop carries on. Returns how many attempts were started.
    pub async fn check_interval(
        self,
        sessions: watch::Receiver<Option<Arc<ActiveSession>>>,
        interval: Duration,
        cancel: CancellationToken,
        reports: mpsc::Sender<ProbeEvent>,
    ) -> u64 {
        info!("Interval probe started, every {:?}", interval);
        let mut attempt: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                break;
            }
            attempt += 1;
            if reports.send(ProbeEvent::Started { attempt }).await.is_err() {
                break;
            }

            let session = sessions.borrow().clone();
            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.attempt_session(session) => result,
            };

            if reports
                .send(ProbeEvent::Finished { attempt, result })
                .await
                .is_err()
            {
                break;
            }
            if reports
                .send(ProbeEvent::Idle { next_in: interval })
                .await
                .is_err()
            {
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = time::sleep(interval) => {}
            }
        }

        info!("Interval probe stopped after {} attempt(s)", attempt);
        attempt
    }

    async fn attempt_session(&self, session: Option<Arc<ActiveSession>>) -> ProbeResult {
        match session {
            Some(session) => self.attempt(session.client().as_ref()).await,
            None => ProbeResult::failed(Duration::ZERO, "no active connection"),
        }
    }
}
