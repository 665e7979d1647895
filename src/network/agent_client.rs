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

//! HTTP client for the agent-management service.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use status_poller::{Probe, ProbeError};

/// Path of the agent listing endpoint, relative to the remote address
const AGENTS_PATH: &str = "agents";

/// One agent as reported by the service.
///
/// Only the fields the desktop cares about are typed; everything else is kept
/// verbatim.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Client for a single agent service address
#[derive(Debug, Clone)]
pub struct AgentClient {
    http: reqwest::Client,
    agents_url: String,
}

/// Build the shared HTTP client used for every agent service request.
///
/// Fails only when the TLS backend cannot be initialised.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

impl AgentClient {
    /// Create a client for `remote_address` on top of a shared HTTP client.
    ///
    /// The address is not validated; a malformed one simply makes every
    /// request fail.
    pub fn new(http: reqwest::Client, remote_address: &str) -> Self {
        Self {
            http,
            agents_url: agents_url(remote_address),
        }
    }

    /// Fetch the list of agents from the service
    pub async fn get_agents(&self) -> Result<Vec<AgentRecord>, ProbeError> {
        let response = self
            .http
            .get(&self.agents_url)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status.as_u16()));
        }

        response
            .json::<Vec<AgentRecord>>()
            .await
            .map_err(|e| ProbeError::InvalidResponse(e.to_string()))
    }
}

impl Probe for AgentClient {
    fn probe(&self) -> impl Future<Output = Result<(), ProbeError>> + Send {
        async move { self.get_agents().await.map(|_| ()) }
    }
}

fn agents_url(remote_address: &str) -> String {
    format!("{}/{}", remote_address.trim_end_matches('/'), AGENTS_PATH)
}

fn classify(error: reqwest::Error) -> ProbeError {
    if error.is_timeout() {
        ProbeError::Timeout
    } else {
        ProbeError::Transport(error.to_string())
    }
}
