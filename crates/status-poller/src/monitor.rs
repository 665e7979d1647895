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

//! Connection status monitor.
//!
//! Ties the configuration store to a [`PollingTask`]: the remote address is
//! read once at mount, probes target that address for the monitor's whole
//! lifetime, and edits are written straight back to the store so they apply
//! on the next mount.

use std::sync::Arc;

use log::{debug, info};

use crate::poller::{PollSnapshot, PollerConfig, PollingTask, Probe};
use crate::state::StatusView;
use crate::store::{remote_address_or_default, ConfigStore, REMOTE_ADDRESS_KEY};

/// A mounted connection status monitor.
pub struct StatusMonitor {
    store: Arc<dyn ConfigStore>,
    /// Address shown in the settings field.
    remote_address: String,
    /// Address the running poller was built for.
    probe_target: String,
    poller: PollingTask,
}

impl std::fmt::Debug for StatusMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusMonitor")
            .field("remote_address", &self.remote_address)
            .field("probe_target", &self.probe_target)
            .field("poller", &self.poller)
            .finish_non_exhaustive()
    }
}

impl StatusMonitor {
    /// Read the configured address and start polling it.
    ///
    /// `make_probe` builds the probe for the address read from the store
    /// (or the default when nothing is stored). Must be called from within a
    /// tokio runtime.
    pub fn mount<P, F>(store: Arc<dyn ConfigStore>, config: PollerConfig, make_probe: F) -> Self
    where
        P: Probe + 'static,
        F: FnOnce(&str) -> P,
    {
        let remote_address = remote_address_or_default(store.as_ref());
        info!("Monitoring agent service at {}", remote_address);

        let poller = PollingTask::spawn(make_probe(&remote_address), config);

        Self {
            store,
            probe_target: remote_address.clone(),
            remote_address,
            poller,
        }
    }

    /// Address currently shown in the settings field.
    #[must_use]
    pub fn remote_address(&self) -> &str {
        &self.remote_address
    }

    /// Address the running poller probes.
    #[must_use]
    pub fn probe_target(&self) -> &str {
        &self.probe_target
    }

    /// Update the address from the settings field and persist it immediately.
    ///
    /// The value is stored exactly as given. The running poller keeps probing
    /// the address it was mounted with.
    pub fn set_remote_address(&mut self, address: impl Into<String>) {
        self.remote_address = address.into();
        self.store.set(REMOTE_ADDRESS_KEY, &self.remote_address);
    }

    /// Whether the stored address differs from the one being probed.
    #[must_use]
    pub fn needs_remount(&self) -> bool {
        self.remote_address != self.probe_target
    }

    /// Run an extra cycle after the host window regains focus.
    pub fn focus_regained(&self) -> bool {
        let started = self.poller.refresh();
        debug!("Focus regained, refresh started: {}", started);
        started
    }

    #[must_use]
    pub fn view(&self) -> StatusView {
        self.poller.snapshot().view()
    }

    #[must_use]
    pub fn snapshot(&self) -> PollSnapshot {
        self.poller.snapshot()
    }

    /// Stop polling. Results that arrive afterwards are discarded.
    pub fn unmount(self) {
        info!("Stopping agent service monitor for {}", self.probe_target);
        self.poller.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use crate::state::ConnectionState;
    use crate::store::{MemoryStore, DEFAULT_REMOTE_ADDRESS};
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Clone)]
    struct CountingProbe {
        reachable: bool,
        calls: Arc<AtomicUsize>,
    }

    impl CountingProbe {
        fn new(reachable: bool) -> Self {
            Self {
                reachable,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl Probe for CountingProbe {
        fn probe(&self) -> impl Future<Output = Result<(), ProbeError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reachable = self.reachable;
            async move {
                tokio::time::sleep(Duration::from_millis(15)).await;
                if reachable {
                    Ok(())
                } else {
                    Err(ProbeError::Transport("connection refused".to_string()))
                }
            }
        }
    }

    fn mount_with(store: Arc<dyn ConfigStore>, probe: &CountingProbe) -> StatusMonitor {
        let probe = probe.clone();
        StatusMonitor::mount(store, PollerConfig::default(), move |_| probe)
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_store_uses_default_address() {
        let store: Arc<dyn ConfigStore> = Arc::new(MemoryStore::new());
        let mut seen = String::new();
        let monitor = StatusMonitor::mount(store, PollerConfig::default(), |address| {
            seen = address.to_string();
            CountingProbe::new(true)
        });

        assert_eq!(monitor.remote_address(), DEFAULT_REMOTE_ADDRESS);
        assert_eq!(seen, "http://localhost:3000");
        assert!(!monitor.needs_remount());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stored_address_is_probed() {
        let store: Arc<dyn ConfigStore> = Arc::new(MemoryStore::with_entries([(
            REMOTE_ADDRESS_KEY,
            "http://example.com:9999",
        )]));
        let monitor = mount_with(store, &CountingProbe::new(true));

        assert_eq!(monitor.remote_address(), "http://example.com:9999");
        assert_eq!(monitor.probe_target(), "http://example.com:9999");
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_write_through_without_retargeting() {
        let store: Arc<dyn ConfigStore> = Arc::new(MemoryStore::new());
        let mut monitor = mount_with(Arc::clone(&store), &CountingProbe::new(true));

        for typed in ["h", "ht", "http://10.0.0.7:3000 ", ""] {
            monitor.set_remote_address(typed);
            assert_eq!(monitor.remote_address(), typed);
            assert_eq!(store.get(REMOTE_ADDRESS_KEY).as_deref(), Some(typed));
        }

        assert_eq!(monitor.probe_target(), DEFAULT_REMOTE_ADDRESS);
        assert!(monitor.needs_remount());
    }

    #[tokio::test(start_paused = true)]
    async fn test_view_follows_probe_outcome() {
        let store: Arc<dyn ConfigStore> = Arc::new(MemoryStore::new());
        let monitor = mount_with(Arc::clone(&store), &CountingProbe::new(true));

        assert_eq!(monitor.view().state, ConnectionState::Connecting);

        let mut rx = monitor.poller.subscribe();
        rx.wait_for(|s| s.cycles == 1).await.unwrap();

        let view = monitor.view();
        assert_eq!(view.state, ConnectionState::Connected);
        let text = view.latency_text().unwrap();
        assert!(text.ends_with(" ms"));
        assert_eq!(text.split('.').nth(1).map(|d| d.trim_end_matches(" ms").len()), Some(2));

        let down = mount_with(store, &CountingProbe::new(false));
        let mut rx = down.poller.subscribe();
        rx.wait_for(|s| s.cycles == 1).await.unwrap();
        assert_eq!(down.view().state, ConnectionState::Disconnected);
        assert_eq!(down.view().latency_text(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_regained_probes_immediately() {
        let probe = CountingProbe::new(true);
        let monitor = mount_with(Arc::new(MemoryStore::new()), &probe);

        let mut rx = monitor.poller.subscribe();
        rx.wait_for(|s| s.cycles == 1).await.unwrap();
        let after_first = tokio::time::Instant::now();

        assert!(monitor.focus_regained());
        rx.wait_for(|s| s.cycles == 2).await.unwrap();

        assert!(after_first.elapsed() < Duration::from_secs(5));
        assert_eq!(probe.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_stops_polling() {
        let probe = CountingProbe::new(true);
        let monitor = mount_with(Arc::new(MemoryStore::new()), &probe);

        let mut rx = monitor.poller.subscribe();
        rx.wait_for(|s| s.cycles == 1).await.unwrap();
        monitor.unmount();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }
}
