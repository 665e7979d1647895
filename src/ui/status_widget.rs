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

use status_poller::{ConnectionState, StatusMonitor, StatusView};

const INDICATOR_RADIUS: f32 = 5.0;

/// Indicator colour for a connection state
pub fn indicator_color(state: ConnectionState) -> egui::Color32 {
    match state {
        ConnectionState::Connecting => egui::Color32::from_rgb(150, 150, 150),
        ConnectionState::Connected => egui::Color32::from_rgb(22, 163, 74),
        ConnectionState::Disconnected => egui::Color32::from_rgb(220, 38, 38),
    }
}

/// Connection indicator with a settings dialog for the remote address
pub struct StatusWidget {
    pub settings_open: bool,
}

impl std::fmt::Debug for StatusWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusWidget")
            .field("settings_open", &self.settings_open)
            .finish()
    }
}

impl StatusWidget {
    pub fn new() -> Self {
        Self {
            settings_open: false,
        }
    }

    /// Render the indicator row and, if open, the settings dialog
    pub fn render(&mut self, ui: &mut egui::Ui, monitor: &mut StatusMonitor) {
        let view = monitor.view();

        let row = ui.horizontal(|ui| {
            self.render_indicator(ui, &view);

            if ui.button(egui::RichText::new("⚙").size(14.0))
                .on_hover_text("Set remote address")
                .clicked() {
                self.settings_open = true;
            }
        });

        // Latency tooltip only while connected
        if let Some(latency) = view.latency_text() {
            row.response.on_hover_ui(|ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("⏱").size(12.0));
                    ui.label(egui::RichText::new(latency).monospace());
                });
            });
        }

        if self.settings_open {
            self.render_settings(ui.ctx(), monitor);
        }
    }

    fn render_indicator(&self, ui: &mut egui::Ui, view: &StatusView) {
        let color = indicator_color(view.state);

        let (rect, _) = ui.allocate_exact_size(
            egui::vec2(INDICATOR_RADIUS * 2.0, INDICATOR_RADIUS * 2.0),
            egui::Sense::hover(),
        );
        ui.painter().circle_filled(rect.center(), INDICATOR_RADIUS, color);

        ui.label(egui::RichText::new(view.state.label())
            .color(color)
            .size(11.0));
    }

    fn render_settings(&mut self, ctx: &egui::Context, monitor: &mut StatusMonitor) {
        let modal = egui::Modal::new(egui::Id::new("remote_address_settings")).show(ctx, |ui| {
            ui.set_width(360.0);

            ui.label(egui::RichText::new("Set Remote Address")
                .size(16.0)
                .strong());
            ui.add_space(4.0);
            ui.label(egui::RichText::new("Enter the remote address below.")
                .color(egui::Color32::from_rgb(180, 180, 180))
                .size(11.0));

            if monitor.needs_remount() {
                ui.label(egui::RichText::new("Applies the next time the app starts.")
                    .color(egui::Color32::from_rgb(255, 200, 100))
                    .size(10.0));
            }

            ui.add_space(8.0);

            let mut address = monitor.remote_address().to_string();
            let response = ui.add(egui::TextEdit::singleline(&mut address)
                .hint_text("Enter remote address")
                .desired_width(f32::INFINITY));
            if response.changed() {
                monitor.set_remote_address(address);
            }

            ui.add_space(8.0);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.button("Close").clicked()
            })
            .inner
        });

        if modal.inner || modal.should_close() {
            self.settings_open = false;
        }
    }
}

impl Default for StatusWidget {
    fn default() -> Self {
        Self::new()
    }
}
