//! Network access to the remote agent service.
//!
//! This module holds the HTTP client used both for fetching agent records and
//! as the connectivity probe behind the status indicator.

pub mod agent_client;

pub use agent_client::{http_client, AgentClient, AgentRecord};
