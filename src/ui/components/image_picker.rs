// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Window view and messages for the shared image picker.

use std::path::PathBuf;

use eframe::egui;

use crate::logic::image_picker::{ImagePicker, Multiplicity, PickerEvent, PickerTab, UploadFile};
use crate::models::image::{Gallery, ImageData};

use super::widgets::image_preview;

const TILE: f32 = 96.0;

#[derive(Clone, Debug)]
pub enum PickerMsg {
    SetTab(PickerTab),
    ToggleGallery(ImageData),
    ToggleUpload(String),
    UrlInputChanged(String),
    SubmitUrl,
    RemoveUpload(String),
    ClearSelection,
    /// Open the native file dialog for uploads.
    BrowseFiles,
    /// Files dropped onto the window; read off the UI thread.
    FilesDropped(Vec<PathBuf>),
    FilesRead(Vec<UploadFile>),
    Confirm,
    Cancel,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PickerCommand {
    PickImages,
    ReadFiles(Vec<PathBuf>),
}

pub fn update(
    picker: &mut ImagePicker,
    msg: PickerMsg,
    cmds: &mut Vec<PickerCommand>,
) -> Option<PickerEvent> {
    match msg {
        PickerMsg::SetTab(tab) => {
            picker.set_tab(tab);
            None
        }
        PickerMsg::ToggleGallery(image) => picker.toggle_gallery(image),
        PickerMsg::ToggleUpload(url) => picker.toggle_upload(&url),
        PickerMsg::UrlInputChanged(text) => {
            picker.set_url_input(text);
            None
        }
        PickerMsg::SubmitUrl => picker.submit_url(),
        PickerMsg::RemoveUpload(url) => picker.remove_upload(&url),
        PickerMsg::ClearSelection => {
            picker.clear_selection();
            None
        }
        PickerMsg::BrowseFiles => {
            if picker.is_open() {
                cmds.push(PickerCommand::PickImages);
            }
            None
        }
        PickerMsg::FilesDropped(paths) => {
            if picker.is_open() && !paths.is_empty() {
                cmds.push(PickerCommand::ReadFiles(paths));
            }
            None
        }
        PickerMsg::FilesRead(files) => picker.upload_many(files),
        PickerMsg::Confirm => picker.confirm(),
        PickerMsg::Cancel => {
            picker.cancel();
            None
        }
    }
}

/// Render the dialog when open; returns messages from this frame.
pub fn view(ctx: &egui::Context, picker: &ImagePicker, gallery: &dyn Gallery) -> Vec<PickerMsg> {
    let mut msgs = Vec::new();
    if !picker.is_open() {
        return msgs;
    }

    let dropped: Vec<PathBuf> = ctx.input(|i| {
        i.raw
            .dropped_files
            .iter()
            .filter_map(|f| f.path.clone())
            .collect()
    });
    if !dropped.is_empty() {
        msgs.push(PickerMsg::FilesDropped(dropped));
    }

    let title = match picker.mode() {
        Some(Multiplicity::Multiple) => "Select images",
        _ => "Select an image",
    };
    egui::Window::new(title)
        .collapsible(false)
        .resizable(true)
        .default_size([620.0, 480.0])
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            render_tabs(ui, picker, &mut msgs);
            ui.separator();
            match picker.tab() {
                PickerTab::Gallery => render_gallery(ui, picker, gallery, &mut msgs),
                PickerTab::Url => render_url(ui, picker, &mut msgs),
            }
            ui.separator();
            render_footer(ui, picker, &mut msgs);
        });

    msgs
}

fn render_tabs(ui: &mut egui::Ui, picker: &ImagePicker, msgs: &mut Vec<PickerMsg>) {
    ui.horizontal(|ui| {
        let tabs = [
            (PickerTab::Gallery, egui_phosphor::regular::IMAGES, "Gallery"),
            (PickerTab::Url, egui_phosphor::regular::LINK, "From URL"),
        ];
        for (tab, icon, text) in tabs {
            let button = egui::Button::new(format!("{icon} {text}")).selected(picker.tab() == tab);
            if ui.add(button).clicked() && picker.tab() != tab {
                msgs.push(PickerMsg::SetTab(tab));
            }
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .button(format!("{} Upload…", egui_phosphor::regular::UPLOAD_SIMPLE))
                .on_hover_text("Or drop image files onto this window")
                .clicked()
            {
                msgs.push(PickerMsg::BrowseFiles);
            }
        });
    });
}

fn tile(ui: &mut egui::Ui, picker: &ImagePicker, image: &ImageData) -> bool {
    let selected = picker.is_selected(&image.url);
    let frame = egui::Frame::default()
        .inner_margin(3.0)
        .stroke(if selected {
            egui::Stroke::new(2.0, ui.visuals().selection.stroke.color)
        } else {
            egui::Stroke::NONE
        });
    let response = frame
        .show(ui, |ui| image_preview(ui, picker.store(), image, TILE))
        .inner;
    ui.interact(response.rect, response.id.with("tile"), egui::Sense::click())
        .clicked()
}

fn render_gallery(
    ui: &mut egui::Ui,
    picker: &ImagePicker,
    gallery: &dyn Gallery,
    msgs: &mut Vec<PickerMsg>,
) {
    egui::ScrollArea::vertical()
        .max_height(340.0)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let uploads: Vec<ImageData> = picker.uploads().cloned().collect();
            if !uploads.is_empty() {
                ui.label(egui::RichText::new("Uploaded").strong());
                ui.horizontal_wrapped(|ui| {
                    for image in &uploads {
                        ui.vertical(|ui| {
                            if tile(ui, picker, image) {
                                msgs.push(PickerMsg::ToggleUpload(image.url.clone()));
                            }
                            if ui
                                .small_button(egui_phosphor::regular::TRASH)
                                .on_hover_text("Discard upload")
                                .clicked()
                            {
                                msgs.push(PickerMsg::RemoveUpload(image.url.clone()));
                            }
                        });
                    }
                });
                ui.add_space(6.0);
            }

            let images = gallery.images();
            if images.is_empty() {
                ui.label("The gallery is empty.");
                return;
            }
            ui.label(egui::RichText::new("Gallery").strong());
            ui.horizontal_wrapped(|ui| {
                for image in images {
                    if tile(ui, picker, &image) {
                        msgs.push(PickerMsg::ToggleGallery(image));
                    }
                }
            });
        });
}

fn render_url(ui: &mut egui::Ui, picker: &ImagePicker, msgs: &mut Vec<PickerMsg>) {
    ui.label("Paste a link to an image (http or https).");
    ui.horizontal(|ui| {
        let mut text = picker.url_input().to_string();
        let response = ui.add(
            egui::TextEdit::singleline(&mut text)
                .hint_text("https://example.com/picture.jpg")
                .desired_width(400.0),
        );
        if response.changed() {
            msgs.push(PickerMsg::UrlInputChanged(text));
        }
        let entered = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button(format!("{} Add", egui_phosphor::regular::PLUS)).clicked() || entered {
            msgs.push(PickerMsg::SubmitUrl);
        }
    });

    let picked = picker.tentative();
    if !picked.is_empty() {
        ui.add_space(6.0);
        ui.horizontal_wrapped(|ui| {
            for image in picked {
                image_preview(ui, picker.store(), image, TILE * 0.75);
            }
        });
    }
}

fn render_footer(ui: &mut egui::Ui, picker: &ImagePicker, msgs: &mut Vec<PickerMsg>) {
    ui.horizontal(|ui| {
        let count = picker.tentative().len();
        let summary = match picker.capacity() {
            Some(capacity) => format!("{count} of {capacity} selected"),
            None => format!("{count} selected"),
        };
        ui.label(summary);
        if count > 0 && ui.small_button("Clear").clicked() {
            msgs.push(PickerMsg::ClearSelection);
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .add_enabled(
                    count > 0,
                    egui::Button::new(format!("{} Confirm", egui_phosphor::regular::CHECK)),
                )
                .clicked()
            {
                msgs.push(PickerMsg::Confirm);
            }
            if ui.button("Cancel").clicked() {
                msgs.push(PickerMsg::Cancel);
            }
        });
    });
}
