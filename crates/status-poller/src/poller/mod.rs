// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Single-flight periodic polling task.
//!
//! A [`PollingTask`] runs one [`Probe`] on a fixed cadence in a background
//! task. Each cycle retries a failed attempt a bounded number of times, and the
//! latest result plus the in-flight flag are published through a `watch`
//! channel so the UI can read them without blocking.
//!
//! At most one cycle is ever outstanding. Timer ticks and manual refreshes
//! that arrive while a cycle is running are skipped, not queued.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::ProbeError;
use crate::state::{format_latency, ConnectionState, StatusView};

/// One reachability attempt against a remote service.
pub trait Probe: Send + Sync {
    /// Perform a single attempt. Retrying is the poller's job.
    fn probe(&self) -> impl Future<Output = Result<(), ProbeError>> + Send;
}

/// Configuration for a polling task.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Name used in log messages.
    pub name: String,
    /// Time between scheduled cycles.
    pub interval: Duration,
    /// Extra attempts after a failed one, within the same cycle.
    pub retries: u32,
    /// Delay before each retry.
    pub retry_delay: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            name: "status".to_string(),
            interval: Duration::from_secs(5),
            retries: 1,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Outcome of one completed cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub succeeded: bool,
    /// Duration of the final attempt of the cycle.
    pub latency: Duration,
    /// Attempts made, including retries.
    pub attempts: u32,
    pub finished_at: DateTime<Utc>,
    /// Error of the final attempt, if it failed.
    pub error: Option<ProbeError>,
}

/// Observable state of a polling task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollSnapshot {
    /// A cycle is currently running.
    pub in_flight: bool,
    /// Most recent completed cycle.
    pub last: Option<ProbeResult>,
    /// Number of completed cycles.
    pub cycles: u64,
}

impl PollSnapshot {
    /// Whether the indicator should treat the probe as pending.
    ///
    /// Nothing completed yet counts as pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.in_flight || self.last.is_none()
    }

    #[must_use]
    pub fn last_succeeded(&self) -> bool {
        self.last.as_ref().is_some_and(|r| r.succeeded)
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        ConnectionState::derive(self.is_pending(), self.last_succeeded())
    }

    #[must_use]
    pub fn view(&self) -> StatusView {
        StatusView {
            state: self.state(),
            latency: self.last.as_ref().map(|r| r.latency),
        }
    }
}

/// Handle to a running polling task.
///
/// The task stops when [`PollingTask::shutdown`] is called or the handle is
/// dropped. A cycle that resolves after that point is discarded.
pub struct PollingTask {
    name: String,
    trigger_tx: mpsc::Sender<()>,
    state_rx: watch::Receiver<PollSnapshot>,
    cancel_token: CancellationToken,
}

impl std::fmt::Debug for PollingTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingTask")
            .field("name", &self.name)
            .field("cancel_token", &self.cancel_token)
            .finish_non_exhaustive()
    }
}

impl PollingTask {
    /// Spawn the polling loop on the current tokio runtime.
    ///
    /// The first cycle starts immediately.
    #[must_use]
    pub fn spawn<P>(probe: P, config: PollerConfig) -> Self
    where
        P: Probe + 'static,
    {
        let (trigger_tx, trigger_rx) = mpsc::channel(1);
        let (state_tx, state_rx) = watch::channel(PollSnapshot::default());
        let cancel_token = CancellationToken::new();

        let name = config.name.clone();
        let task_cancel = cancel_token.clone();

        tokio::spawn(async move {
            poll_loop(probe, config, trigger_rx, state_tx, task_cancel).await;
        });

        Self {
            name,
            trigger_tx,
            state_rx,
            cancel_token,
        }
    }

    /// Request a cycle outside the regular cadence.
    ///
    /// Returns `false` when the request was skipped because a cycle is
    /// already running or one is already queued.
    pub fn refresh(&self) -> bool {
        if self.state_rx.borrow().in_flight {
            debug!("[{}] refresh skipped, cycle in flight", self.name);
            return false;
        }
        self.trigger_tx.try_send(()).is_ok()
    }

    /// Current state of the task.
    #[must_use]
    pub fn snapshot(&self) -> PollSnapshot {
        self.state_rx.borrow().clone()
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PollSnapshot> {
        self.state_rx.clone()
    }

    /// Stop polling. Any in-flight cycle is abandoned.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

impl Drop for PollingTask {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn poll_loop<P: Probe>(
    probe: P,
    config: PollerConfig,
    mut trigger_rx: mpsc::Receiver<()>,
    state_tx: watch::Sender<PollSnapshot>,
    cancel_token: CancellationToken,
) {
    // tokio panics on a zero period
    let mut interval = tokio::time::interval(config.interval.max(Duration::from_millis(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut reachable: Option<bool> = None;

    loop {
        tokio::select! {
            () = cancel_token.cancelled() => {
                debug!("[{}] polling cancelled", config.name);
                return;
            }
            _ = interval.tick() => {}
            Some(()) = trigger_rx.recv() => {
                debug!("[{}] refresh requested", config.name);
            }
        }

        state_tx.send_modify(|snapshot| snapshot.in_flight = true);

        let result = tokio::select! {
            () = cancel_token.cancelled() => {
                debug!("[{}] abandoning in-flight probe", config.name);
                return;
            }
            result = run_cycle(&probe, &config) => result,
        };

        if cancel_token.is_cancelled() {
            return;
        }

        if reachable != Some(result.succeeded) {
            if result.succeeded {
                info!(
                    "[{}] remote reachable at {} ({})",
                    config.name,
                    result.finished_at.format("%H:%M:%S"),
                    format_latency(result.latency)
                );
            } else if let Some(ref error) = result.error {
                warn!(
                    "[{}] remote unreachable at {}: {}",
                    config.name,
                    result.finished_at.format("%H:%M:%S"),
                    error
                );
            }
            reachable = Some(result.succeeded);
        }

        // Triggers that raced with the finished cycle are dropped while still
        // marked in flight, so an accepted refresh always gets its own cycle
        while trigger_rx.try_recv().is_ok() {}

        state_tx.send_modify(|snapshot| {
            snapshot.in_flight = false;
            snapshot.last = Some(result);
            snapshot.cycles += 1;
        });
    }
}

async fn run_cycle<P: Probe>(probe: &P, config: &PollerConfig) -> ProbeResult {
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);

        let started = Instant::now();
        let outcome = probe.probe().await;
        let latency = started.elapsed();

        match outcome {
            Ok(()) => {
                return ProbeResult {
                    succeeded: true,
                    latency,
                    attempts,
                    finished_at: Utc::now(),
                    error: None,
                };
            }
            Err(e) if attempts <= config.retries => {
                debug!(
                    "[{}] attempt {} failed: {}, retrying in {:?}",
                    config.name, attempts, e, config.retry_delay
                );
                sleep(config.retry_delay).await;
            }
            Err(e) => {
                debug!("[{}] attempt {} failed: {}", config.name, attempts, e);
                return ProbeResult {
                    succeeded: false,
                    latency,
                    attempts,
                    finished_at: Utc::now(),
                    error: Some(e),
                };
            }
        }
    }
}
