// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Top-level egui application shell for filling in a dynamic form.
//! Handles layout, the picker window, and wiring to background commands.

pub mod components;

use eframe::egui;

use crate::logic::resolver::WidgetRegistry;
use crate::mvu::{self, AppModel, Command, Msg};
use crate::ui::components::widgets::{SharedWidget, default_registry};
use crate::ui::components::{dynamic_form, image_picker};

/// Stateful egui application rendering one form at a time.
pub struct DynformApp {
    model: AppModel,
    registry: WidgetRegistry<SharedWidget>,
    inbox: Vec<Msg>,
    cmd_tx: crossbeam_channel::Sender<Command>,
    msg_rx: crossbeam_channel::Receiver<Msg>,
}

impl DynformApp {
    pub fn new(model: AppModel) -> Self {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded::<Command>();
        let (msg_tx, msg_rx) = crossbeam_channel::unbounded::<Msg>();

        let threads = std::thread::available_parallelism()
            .map(|n| n.get().max(2))
            .unwrap_or(2);
        for _ in 0..threads {
            let cmd_rx = cmd_rx.clone();
            let msg_tx = msg_tx.clone();
            std::thread::spawn(move || {
                for cmd in cmd_rx.iter() {
                    let msg = mvu::run_command(cmd);
                    let _ = msg_tx.send(msg);
                }
            });
        }

        Self {
            model,
            registry: default_registry(),
            inbox: Vec::new(),
            cmd_tx,
            msg_rx,
        }
    }
}

impl Default for DynformApp {
    fn default() -> Self {
        Self::new(AppModel::default())
    }
}

impl eframe::App for DynformApp {
    /// Drain worker results, apply queued messages, then render the frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.style_mut(|style| {
            style.spacing.item_spacing = egui::vec2(6.0, 6.0);
        });

        while let Ok(msg) = self.msg_rx.try_recv() {
            self.model.pending_commands = self.model.pending_commands.saturating_sub(1);
            self.inbox.push(msg);
        }

        // FIFO so edits from one frame apply in the order they were made.
        for msg in std::mem::take(&mut self.inbox) {
            let mut commands = Vec::new();
            mvu::update(&mut self.model, msg, &mut commands);
            for cmd in commands {
                if self.cmd_tx.send(cmd).is_ok() {
                    self.model.pending_commands += 1;
                }
            }
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.heading("Dynamic Form");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_space(2.0);
                    egui::widgets::global_theme_preference_switch(ui);
                    ui.separator();
                    self.render_import_button(ui);
                });
            });
            ui.add_space(4.0);
        });

        self.render_error_modal(ctx);

        egui::TopBottomPanel::bottom("status_panel")
            .resizable(false)
            .show(ctx, |ui| {
                self.render_status(ui);
            });

        let picker_msgs = image_picker::view(ctx, &self.model.picker, &self.model.gallery);
        self.inbox.extend(picker_msgs.into_iter().map(Msg::Picker));

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);
            egui::ScrollArea::vertical().show(ui, |ui| {
                // Leave the form inert while the picker is up.
                ui.add_enabled_ui(!self.model.picker.is_open(), |ui| {
                    let form_msgs = dynamic_form::view(
                        ui,
                        &self.model.form,
                        &self.registry,
                        self.model.picker.store(),
                    );
                    self.inbox.extend(form_msgs.into_iter().map(Msg::Form));
                });
                ui.add_space(8.0);
            });
        });

        if !self.inbox.is_empty() {
            ctx.request_repaint();
        }
        if self.model.pending_commands > 0 {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

impl DynformApp {
    fn render_import_button(&mut self, ui: &mut egui::Ui) {
        let button = egui::Button::new(format!(
            "{} Open form…",
            egui_phosphor::regular::FOLDER_OPEN
        ));
        if ui
            .add(button)
            .on_hover_text("Load a form definition from a JSON file")
            .clicked()
        {
            self.inbox.push(Msg::ImportFormRequested);
        }
    }

    /// Render a simple modal window for error messages.
    fn render_error_modal(&mut self, ctx: &egui::Context) {
        if let Some(message) = self.model.error.clone() {
            egui::Window::new("Validation error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .order(egui::Order::Foreground)
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        self.inbox.push(Msg::DismissError);
                    }
                });
        }
    }

    /// Render latest status message when present.
    fn render_status(&self, ui: &mut egui::Ui) {
        if let Some(text) = &self.model.status {
            let display = if self.model.pending_commands > 0 {
                format!("{}  ({} working…)", text, self.model.pending_commands)
            } else {
                text.to_string()
            };
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(display).color(egui::Color32::from_gray(68)));
                if self.model.pending_commands > 0 {
                    ui.add(egui::Spinner::new().size(14.0))
                        .on_hover_text(format!(
                            "{} task(s) running in background",
                            self.model.pending_commands
                        ));
                }
            });
        }
    }
}
