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

//! Main application window.

use eframe::egui;
use log::debug;
use status_poller::{ConfigStore, StatusMonitor};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::network::AgentClient;
use crate::ui::StatusWidget;

const REPAINT_INTERVAL: Duration = Duration::from_millis(250);

/// True when the window went from unfocused to focused between two frames
fn focus_regained(was_focused: bool, is_focused: bool) -> bool {
    !was_focused && is_focused
}

pub struct AgentStatusApp {
    monitor: StatusMonitor,
    status_widget: StatusWidget,
    window_focused: bool,
    config_path: Option<PathBuf>,
}

impl AgentStatusApp {
    /// Mount the status monitor. Must be called inside the tokio runtime.
    pub fn new(
        store: Arc<dyn ConfigStore>,
        config: &AppConfig,
        http: reqwest::Client,
        config_path: Option<PathBuf>,
    ) -> Self {
        let monitor = StatusMonitor::mount(store, config.poller_config(), |address| {
            AgentClient::new(http, address)
        });

        Self {
            monitor,
            status_widget: StatusWidget::new(),
            // The mount already probes, so the first focused frame is not a regain
            window_focused: true,
            config_path,
        }
    }

    fn track_focus(&mut self, ctx: &egui::Context) {
        let focused = ctx.input(|i| i.focused);
        if focus_regained(self.window_focused, focused) {
            debug!("Window focus regained");
            self.monitor.focus_regained();
        }
        self.window_focused = focused;
    }

    fn draw_overview(&self, ui: &mut egui::Ui) {
        ui.heading("Agent Service");
        ui.add_space(8.0);

        egui::Grid::new("overview_grid")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                ui.label(egui::RichText::new("Monitoring").color(egui::Color32::from_rgb(150, 150, 150)));
                ui.label(egui::RichText::new(self.monitor.probe_target()).monospace());
                ui.end_row();

                if let Some(ref path) = self.config_path {
                    ui.label(egui::RichText::new("Config").color(egui::Color32::from_rgb(150, 150, 150)));
                    ui.label(egui::RichText::new(path.display().to_string()).monospace().size(10.0));
                    ui.end_row();
                }
            });
    }
}

impl eframe::App for AgentStatusApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll results arrive off the UI thread
        ctx.request_repaint_after(REPAINT_INTERVAL);

        self.track_focus(ctx);

        egui::SidePanel::left("sidebar")
            .resizable(false)
            .exact_width(220.0)
            .show(ctx, |ui| {
                ui.label(egui::RichText::new("◈ AGENTS")
                    .color(egui::Color32::from_rgb(100, 180, 220))
                    .size(12.0)
                    .strong());

                ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
                    ui.add_space(6.0);
                    self.status_widget.render(ui, &mut self.monitor);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_overview(ui);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_edges() {
        assert!(focus_regained(false, true));
        assert!(!focus_regained(true, true));
        assert!(!focus_regained(true, false));
        assert!(!focus_regained(false, false));
    }
}
