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

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod app;
mod config;
mod network;
mod ui;

use clap::Parser;
use eframe::egui;
use log::{info, warn};
use status_poller::{apply_remote_param, ConfigStore, MemoryStore};
use std::path::PathBuf;
use std::sync::Arc;

use app::AgentStatusApp;
use config::{AppConfig, ConfyStore};

/// Connectivity indicator for a remote agent-management service
#[derive(Parser, Debug)]
#[command(name = "agent-status-desktop", version, about)]
struct Cli {
    /// Launch location; its `remote` query parameter seeds the remote address
    /// (e.g. "app://local/?remote=http://example.com:9999")
    location: Option<String>,

    /// Configuration file to use instead of the platform default
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Keep settings in memory only
    #[arg(long)]
    ephemeral: bool,
}

/// Open the shared settings store, falling back to memory if the file is unusable
fn open_store(cli: &Cli) -> (Arc<dyn ConfigStore>, AppConfig, Option<PathBuf>) {
    if cli.ephemeral {
        info!("Using in-memory settings");
        return (Arc::new(MemoryStore::new()), AppConfig::default(), None);
    }

    let loaded = match cli.config {
        Some(ref path) => ConfyStore::load_path(path),
        None => ConfyStore::load(),
    };

    match loaded {
        Ok(store) => {
            let app_config = store.app_config();
            let path = store.config_path().ok();
            if let Some(ref path) = path {
                info!("Loaded configuration from {}", path.display());
            }
            (Arc::new(store), app_config, path)
        }
        Err(e) => {
            warn!("Failed to load configuration ({}), settings will not persist", e);
            (Arc::new(MemoryStore::new()), AppConfig::default(), None)
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    info!("Starting Agent Status Desktop...");

    let (store, app_config, config_path) = open_store(&cli);

    if let Some(ref location) = cli.location {
        apply_remote_param(location, store.as_ref());
    }

    let http = network::http_client(app_config.request_timeout())?;

    // Polling runs on this runtime; the guard lets the app spawn onto it
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 420.0])
            .with_title("Agent Status"),
        ..Default::default()
    };

    eframe::run_native(
        "Agent Status",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(AgentStatusApp::new(store, &app_config, http, config_path)))
        }),
    )?;

    info!("Shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use status_poller::REMOTE_ADDRESS_KEY;

    #[test]
    fn test_cli_parses_location_and_flags() {
        let cli = Cli::parse_from([
            "agent-status-desktop",
            "--ephemeral",
            "?remote=http://example.com:9999",
        ]);
        assert!(cli.ephemeral);
        assert_eq!(cli.location.as_deref(), Some("?remote=http://example.com:9999"));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_ephemeral_store_seeded_from_location() {
        let cli = Cli::parse_from(["agent-status-desktop", "--ephemeral"]);
        let (store, app_config, path) = open_store(&cli);

        assert!(path.is_none());
        assert_eq!(app_config, AppConfig::default());
        assert_eq!(store.get(REMOTE_ADDRESS_KEY), None);

        apply_remote_param("?remote=http://example.com:9999", store.as_ref());
        assert_eq!(
            store.get(REMOTE_ADDRESS_KEY).as_deref(),
            Some("http://example.com:9999")
        );
    }

    #[test]
    fn test_http_client_from_default_timeout() {
        assert!(network::http_client(AppConfig::default().request_timeout()).is_ok());
    }

    #[test]
    fn test_explicit_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let cli = Cli::parse_from([
            "agent-status-desktop",
            "--config",
            path.to_str().unwrap(),
        ]);

        let (_, _, config_path) = open_store(&cli);
        assert_eq!(config_path, Some(path));
    }
}
