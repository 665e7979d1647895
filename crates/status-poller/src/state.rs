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

//! Connection indicator state derivation.

use std::fmt;
use std::time::Duration;

/// Three-state connectivity indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// A probe is outstanding (or none has completed yet).
    Connecting,
    /// The latest probe succeeded.
    Connected,
    /// The latest probe failed after its retry.
    Disconnected,
}

impl ConnectionState {
    /// Derive the indicator from the probe lifecycle.
    ///
    /// A pending probe always wins over the last known outcome, so a stale
    /// success is never shown while a new probe is in flight.
    #[must_use]
    pub fn derive(pending: bool, last_succeeded: bool) -> Self {
        if pending {
            ConnectionState::Connecting
        } else if last_succeeded {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Status label shown next to the indicator dot.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "Connecting...",
            ConnectionState::Connected => "Connected",
            ConnectionState::Disconnected => "Disconnected",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Format a latency in milliseconds with two decimals, e.g. `"12.35 ms"`.
#[must_use]
pub fn format_latency(latency: Duration) -> String {
    format!("{:.2} ms", latency.as_secs_f64() * 1000.0)
}

/// Everything the widget needs to render one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusView {
    pub state: ConnectionState,
    /// Duration of the most recent completed probe attempt.
    pub latency: Option<Duration>,
}

impl StatusView {
    /// Latency readout, only available while connected.
    #[must_use]
    pub fn latency_text(&self) -> Option<String> {
        match self.state {
            ConnectionState::Connected => self.latency.map(format_latency),
            ConnectionState::Connecting | ConnectionState::Disconnected => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_always_connecting() {
        assert_eq!(ConnectionState::derive(true, true), ConnectionState::Connecting);
        assert_eq!(ConnectionState::derive(true, false), ConnectionState::Connecting);
    }

    #[test]
    fn test_settled_states() {
        assert_eq!(ConnectionState::derive(false, true), ConnectionState::Connected);
        assert_eq!(ConnectionState::derive(false, false), ConnectionState::Disconnected);
    }

    #[test]
    fn test_labels() {
        assert_eq!(ConnectionState::Connecting.label(), "Connecting...");
        assert_eq!(ConnectionState::Connected.to_string(), "Connected");
        assert_eq!(ConnectionState::Disconnected.label(), "Disconnected");
    }

    #[test]
    fn test_latency_two_decimals() {
        assert_eq!(format_latency(Duration::from_micros(12_346)), "12.35 ms");
        assert_eq!(format_latency(Duration::from_millis(7)), "7.00 ms");
        assert_eq!(format_latency(Duration::ZERO), "0.00 ms");
    }

    #[test]
    fn test_latency_hidden_unless_connected() {
        let latency = Some(Duration::from_millis(40));
        let connected = StatusView { state: ConnectionState::Connected, latency };
        assert_eq!(connected.latency_text().as_deref(), Some("40.00 ms"));

        let connecting = StatusView { state: ConnectionState::Connecting, latency };
        assert_eq!(connecting.latency_text(), None);

        let disconnected = StatusView { state: ConnectionState::Disconnected, latency };
        assert_eq!(disconnected.latency_text(), None);
    }
}
