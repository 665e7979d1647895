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

//! Connectivity polling for agent service status indicators.
//!
//! This library holds the UI-independent half of a connection status widget:
//!
//! - **Store layer**: an injected [`ConfigStore`] holding the remote address
//! - **Initializer**: [`apply_remote_param`] seeds the store from a launch URL
//! - **Polling layer**: [`PollingTask`], a cancellable single-flight periodic
//!   task with a bounded retry
//! - **State layer**: [`ConnectionState`] derived purely from the latest poll
//! - **Monitor**: [`StatusMonitor`] wiring the above together for one widget
//!
//! # Quick Start
//!
//! ```no_run
//! use std::future::Future;
//! use std::sync::Arc;
//! use status_poller::{
//!     apply_remote_param, ConfigStore, MemoryStore, PollerConfig, Probe, ProbeError,
//!     StatusMonitor,
//! };
//!
//! struct AlwaysUp;
//!
//! impl Probe for AlwaysUp {
//!     fn probe(&self) -> impl Future<Output = Result<(), ProbeError>> + Send {
//!         async { Ok(()) }
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let store: Arc<dyn ConfigStore> = Arc::new(MemoryStore::new());
//!     apply_remote_param("?remote=http://example.com:9999", store.as_ref());
//!
//!     let monitor = StatusMonitor::mount(store, PollerConfig::default(), |_address| AlwaysUp);
//!     println!("{}", monitor.view().state);
//! }
//! ```

pub mod error;
pub mod monitor;
pub mod poller;
pub mod remote;
pub mod state;
pub mod store;

pub use error::ProbeError;
pub use monitor::StatusMonitor;
pub use poller::{PollSnapshot, PollerConfig, PollingTask, Probe, ProbeResult};
pub use remote::{apply_remote_param, query_param};
pub use state::{format_latency, ConnectionState, StatusView};
pub use store::{
    remote_address_or_default, ConfigStore, MemoryStore, DEFAULT_REMOTE_ADDRESS,
    REMOTE_ADDRESS_KEY,
};
