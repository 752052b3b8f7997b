// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Dynamic form component: session-backed model, messages, update and view.
//!
//! The view resolves the session's fields into a tree and renders it; every
//! user interaction comes back as a [`FormMsg`]. Side effects that need the
//! image picker or a native file dialog are emitted as [`FormCommand`]s for
//! the root update to route.

use eframe::egui;
use serde_json::Value;
use tracing::{info, warn};

use crate::logic::image_field::{remove_image, selected_images};
use crate::logic::image_picker::UploadFile;
use crate::logic::object_url::{ObjectUrlStore, collect_object_urls};
use crate::logic::resolver::{
    GroupAction, ResolvedArray, ResolvedField, ResolvedGroup, ResolvedLeaf, WidgetRegistry,
    resolve_form,
};
use crate::logic::schema::SchemaCache;
use crate::logic::session::FormSession;
use crate::logic::uploads;
use crate::models::field::{FieldConfig, FieldKind};
use crate::models::form_file::FormDefinition;

use super::widgets::{LeafInput, SharedWidget, WidgetAction};

/// Built-in group action that restores the group to its initial values.
pub const RESET_ACTION: &str = "reset";

pub struct FormModel {
    title: String,
    session: FormSession,
    last_submitted: Option<Value>,
}

impl Default for FormModel {
    fn default() -> Self {
        Self::new("Dynamic form", FormSession::new(Vec::<FieldConfig>::new(), None))
    }
}

impl FormModel {
    pub fn new(title: impl Into<String>, session: FormSession) -> Self {
        Self {
            title: title.into(),
            session,
            last_submitted: None,
        }
    }

    pub fn from_definition(definition: FormDefinition, cache: &mut SchemaCache) -> Self {
        let session = FormSession::with_cache(
            definition.fields.into(),
            definition.initial_values.as_ref(),
            cache,
        );
        Self::new(definition.title, session)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    /// Cleaned value of the last successful submit.
    pub fn last_submitted(&self) -> Option<&Value> {
        self.last_submitted.as_ref()
    }
}

#[derive(Clone, Debug)]
pub enum FormMsg {
    SetValue { path: String, value: Value },
    AppendItem(String),
    RemoveItem { array: String, index: usize },
    MoveItemUp { array: String, index: usize },
    MoveItemDown { array: String, index: usize },
    GroupAction { path: String, id: String, label: String },
    OpenImagePicker(String),
    RemoveImage { path: String, url: String },
    PickFiles { path: String, images_only: bool },
    FilesAttached { path: String, files: Vec<UploadFile> },
    Submit,
    Reset,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormCommand {
    OpenImagePicker { path: String },
    PickFiles { path: String, images_only: bool },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormEvent {
    pub message: String,
    pub is_error: bool,
}

impl FormEvent {
    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

/// Apply a message. `store` holds the bytes behind uploaded images.
pub fn update(
    model: &mut FormModel,
    msg: FormMsg,
    store: &ObjectUrlStore,
    cmds: &mut Vec<FormCommand>,
) -> Option<FormEvent> {
    let session = &mut model.session;
    match msg {
        FormMsg::SetValue { path, value } => {
            if !session.set_value(&path, value) {
                warn!(%path, "value for unknown path dropped");
            }
            None
        }
        FormMsg::AppendItem(path) => {
            if let Some(mut array) = session.array(&path) {
                array.append();
            }
            None
        }
        FormMsg::RemoveItem { array, index } => {
            let before = collect_object_urls(session.values());
            let removed = session
                .array(&array)
                .is_some_and(|mut controller| controller.remove(index));
            if removed {
                store.release_dropped(&before, session.values());
            }
            None
        }
        FormMsg::MoveItemUp { array, index } => {
            if let Some(mut controller) = session.array(&array) {
                controller.move_up(index);
            }
            None
        }
        FormMsg::MoveItemDown { array, index } => {
            if let Some(mut controller) = session.array(&array) {
                controller.move_down(index);
            }
            None
        }
        FormMsg::GroupAction { path, id, label } => {
            if id == RESET_ACTION {
                let before = collect_object_urls(session.values());
                if session.reset_path(&path) {
                    store.release_dropped(&before, session.values());
                }
                None
            } else {
                info!(%path, %id, "group action triggered");
                Some(FormEvent::info(format!("{label} requested for {path}")))
            }
        }
        FormMsg::OpenImagePicker(path) => {
            cmds.push(FormCommand::OpenImagePicker { path });
            None
        }
        FormMsg::PickFiles { path, images_only } => {
            cmds.push(FormCommand::PickFiles { path, images_only });
            None
        }
        FormMsg::RemoveImage { path, url } => {
            let Some(field) = session.field_at(&path) else {
                return None;
            };
            let uploader = field.kind == FieldKind::ImageUploader;
            let multiple = field.multiple || uploader;
            let current = session.get_value(&path).cloned().unwrap_or(Value::Null);
            let existing = selected_images(&current, multiple);
            let mut next = remove_image(multiple, &existing, &url);
            if uploader && next.is_null() {
                next = Value::Array(Vec::new());
            }
            let before = collect_object_urls(session.values());
            session.set_value(&path, next);
            store.release_dropped(&before, session.values());
            None
        }
        FormMsg::FilesAttached { path, files } => {
            let Some(field) = session.field_at(&path) else {
                return Some(FormEvent::error(format!("No field at {path}")));
            };
            let kind = field.kind.clone();
            let current = session.get_value(&path).cloned().unwrap_or(Value::Null);
            let total = files.len();
            let attached = uploads::attach(&kind, &current, files, store);
            if attached.added > 0 {
                session.set_value(&path, attached.value);
            }
            attach_event(attached.added, total, &attached.skipped)
        }
        FormMsg::Submit => {
            let title = model.title.clone();
            match session.submit(|value| {
                info!(form = %title, value = %value, "submission accepted");
            }) {
                Ok(value) => {
                    model.last_submitted = Some(value);
                    Some(FormEvent::info("Form submitted"))
                }
                Err(errors) => Some(FormEvent::error(format!(
                    "Please fix {} field(s) before submitting:\n\n{errors}",
                    errors.len()
                ))),
            }
        }
        FormMsg::Reset => {
            let before = collect_object_urls(session.values());
            session.reset();
            store.release_dropped(&before, session.values());
            Some(FormEvent::info("Form reset"))
        }
    }
}

fn attach_event(added: usize, total: usize, skipped: &[String]) -> Option<FormEvent> {
    match (added, skipped.is_empty()) {
        (0, true) => None,
        (_, true) => Some(FormEvent::info(format!("Attached {added} file(s)"))),
        (0, false) => Some(FormEvent::error(skipped.join("\n"))),
        (_, false) => Some(FormEvent::info(format!(
            "Attached {added} of {total} file(s); skipped: {}",
            skipped.join("; ")
        ))),
    }
}

/// Message for a trailing group/item button.
pub fn action_msg(action: &GroupAction) -> FormMsg {
    match action.clone() {
        GroupAction::Remove { array, index } => FormMsg::RemoveItem { array, index },
        GroupAction::MoveUp { array, index } => FormMsg::MoveItemUp { array, index },
        GroupAction::MoveDown { array, index } => FormMsg::MoveItemDown { array, index },
        GroupAction::Custom { path, id, label } => FormMsg::GroupAction { path, id, label },
    }
}

fn widget_msg(path: &str, action: WidgetAction) -> FormMsg {
    let path = path.to_string();
    match action {
        WidgetAction::Change(value) => FormMsg::SetValue { path, value },
        WidgetAction::OpenImagePicker => FormMsg::OpenImagePicker(path),
        WidgetAction::PickFiles { images_only } => FormMsg::PickFiles { path, images_only },
        WidgetAction::RemoveImage(url) => FormMsg::RemoveImage { path, url },
    }
}

struct ViewCtx<'a> {
    session: &'a FormSession,
    store: &'a ObjectUrlStore,
}

/// Render the form and collect the messages produced this frame.
pub fn view(
    ui: &mut egui::Ui,
    model: &FormModel,
    registry: &WidgetRegistry<SharedWidget>,
    store: &ObjectUrlStore,
) -> Vec<FormMsg> {
    let mut msgs = Vec::new();
    let session = &model.session;
    let ctx = ViewCtx { session, store };

    ui.heading(&model.title);
    ui.add_space(8.0);
    for node in resolve_form(session, registry) {
        render_node(ui, &node, &ctx, &mut msgs);
        ui.add_space(10.0);
    }

    ui.separator();
    ui.horizontal(|ui| {
        let submit = egui::Button::new(format!(
            "{} Submit",
            egui_phosphor::regular::PAPER_PLANE_TILT
        ));
        if ui
            .add_enabled(session.can_submit(), submit)
            .on_disabled_hover_text("Change something to enable submitting")
            .clicked()
        {
            msgs.push(FormMsg::Submit);
        }
        let reset = egui::Button::new(format!(
            "{} Reset",
            egui_phosphor::regular::ARROW_COUNTER_CLOCKWISE
        ));
        if ui.add_enabled(session.is_dirty(), reset).clicked() {
            msgs.push(FormMsg::Reset);
        }
        let errors = session.errors();
        if !errors.is_empty() {
            ui.colored_label(
                ui.visuals().error_fg_color,
                format!("{} field(s) need attention", errors.len()),
            );
        }
    });

    if let Some(value) = &model.last_submitted {
        ui.add_space(8.0);
        egui::CollapsingHeader::new("Last submission")
            .default_open(false)
            .show(ui, |ui| {
                let pretty = serde_json::to_string_pretty(value).unwrap_or_default();
                ui.monospace(pretty);
            });
    }

    msgs
}

fn render_node(
    ui: &mut egui::Ui,
    node: &ResolvedField<'_, SharedWidget>,
    ctx: &ViewCtx<'_>,
    msgs: &mut Vec<FormMsg>,
) {
    match node {
        ResolvedField::Leaf(leaf) => render_leaf(ui, leaf, ctx, msgs),
        ResolvedField::Group(group) => render_group(ui, group, ctx, msgs),
        ResolvedField::Array(array) => render_array(ui, array, ctx, msgs),
        ResolvedField::Spacer { span } => ui.add_space(8.0 * f32::from(*span)),
    }
}

fn render_error(ui: &mut egui::Ui, error: Option<&str>) {
    if let Some(message) = error {
        ui.colored_label(ui.visuals().error_fg_color, message);
    }
}

fn render_leaf(
    ui: &mut egui::Ui,
    leaf: &ResolvedLeaf<'_, SharedWidget>,
    ctx: &ViewCtx<'_>,
    msgs: &mut Vec<FormMsg>,
) {
    let config = leaf.config;
    ui.label(egui::RichText::new(config.display_label()).strong());
    if let Some(description) = &config.description {
        ui.label(
            egui::RichText::new(description)
                .small()
                .color(ui.visuals().weak_text_color()),
        );
    }
    let input = LeafInput {
        path: &leaf.path,
        config,
        value: &leaf.value,
        has_error: leaf.error.is_some(),
        store: ctx.store,
    };
    let action = ui
        .add_enabled_ui(!config.is_locked(), |ui| {
            if input.has_error {
                let stroke = egui::Stroke::new(1.0, ui.visuals().error_fg_color);
                let widgets = &mut ui.visuals_mut().widgets;
                widgets.inactive.bg_stroke = stroke;
                widgets.hovered.bg_stroke = stroke;
            }
            leaf.widget.show(ui, &input)
        })
        .inner;
    if let Some(action) = action {
        msgs.push(widget_msg(&leaf.path, action));
    }
    render_error(ui, leaf.error.as_deref());
}

fn action_button(ui: &mut egui::Ui, action: &GroupAction) -> egui::Response {
    use egui_phosphor::regular as icons;
    match action {
        GroupAction::Remove { .. } => ui.small_button(icons::TRASH).on_hover_text("Remove"),
        GroupAction::MoveUp { .. } => ui.small_button(icons::ARROW_UP).on_hover_text("Move up"),
        GroupAction::MoveDown { .. } => {
            ui.small_button(icons::ARROW_DOWN).on_hover_text("Move down")
        }
        GroupAction::Custom { label, .. } => ui.small_button(label.as_str()),
    }
}

fn render_group(
    ui: &mut egui::Ui,
    group: &ResolvedGroup<'_, SharedWidget>,
    ctx: &ViewCtx<'_>,
    msgs: &mut Vec<FormMsg>,
) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            if let Some(title) = &group.title {
                ui.label(egui::RichText::new(title).strong());
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                for action in group.actions.iter().rev() {
                    if action_button(ui, action).clicked() {
                        msgs.push(action_msg(action));
                    }
                }
            });
        });
        render_error(ui, group.error.as_deref());
        for child in &group.children {
            ui.add_space(4.0);
            render_node(ui, child, ctx, msgs);
        }
    });
}

fn render_array(
    ui: &mut egui::Ui,
    array: &ResolvedArray<'_, SharedWidget>,
    ctx: &ViewCtx<'_>,
    msgs: &mut Vec<FormMsg>,
) {
    let label = array
        .label
        .clone()
        .unwrap_or_else(|| array.config.display_label().to_string());
    let key_name = array.config.array.as_ref().map(|a| a.key_name.as_str());

    egui::CollapsingHeader::new(format!("{label} ({})", array.items.len()))
        .id_salt(&array.path)
        .default_open(true)
        .show(ui, |ui| {
            render_error(ui, array.error.as_deref());
            if array.items.is_empty() {
                ui.label(
                    egui::RichText::new("No items yet")
                        .small()
                        .color(ui.visuals().weak_text_color()),
                );
            }
            for item in &array.items {
                // Item identity keeps widget state attached across reorders.
                let key = key_name
                    .and_then(|k| ctx.session.get_value(&item.path)?.get(k)?.as_str())
                    .unwrap_or(&item.path);
                ui.push_id(key, |ui| render_group(ui, item, ctx, msgs));
                ui.add_space(4.0);
            }
            if array.can_add
                && ui
                    .button(format!("{} Add item", egui_phosphor::regular::PLUS))
                    .clicked()
            {
                msgs.push(FormMsg::AppendItem(array.path.clone()));
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::rules;
    use crate::models::field::{ArrayAction, ArrayConfig, ActionHint, CustomUi};
    use crate::models::image::{ImageData, ImageSource};
    use serde_json::json;

    fn model() -> FormModel {
        let fields = vec![
            FieldConfig::new("name", FieldKind::Text)
                .validation(rules::min_length(2, "Name must be at least 2 characters")),
            FieldConfig::new("gallery", FieldKind::ImagePicker).multiple(true),
            FieldConfig::new("cover", FieldKind::ImagePicker),
            FieldConfig::new("docs", FieldKind::FileUploader),
            FieldConfig::new("profile", FieldKind::Group)
                .custom_ui(CustomUi {
                    actions: vec![ActionHint {
                        id: RESET_ACTION.into(),
                        label: "Reset section".into(),
                    }],
                    ..CustomUi::default()
                })
                .child(FieldConfig::new("bio", FieldKind::Text)),
            FieldConfig::new("links", FieldKind::Array)
                .array_config(
                    ArrayConfig::new("uuid")
                        .action(ArrayAction::Remove)
                        .action(ArrayAction::MoveUp),
                )
                .child(FieldConfig::new("url", FieldKind::Url)),
        ];
        FormModel::new("Test", FormSession::new(fields, Some(&json!({"profile": {"bio": "hi"}}))))
    }

    fn send(model: &mut FormModel, store: &ObjectUrlStore, msg: FormMsg) -> (Option<FormEvent>, Vec<FormCommand>) {
        let mut cmds = Vec::new();
        let event = update(model, msg, store, &mut cmds);
        (event, cmds)
    }

    fn set(path: &str, value: Value) -> FormMsg {
        FormMsg::SetValue {
            path: path.into(),
            value,
        }
    }

    #[test]
    fn invalid_submit_reports_errors() {
        let store = ObjectUrlStore::new();
        let mut model = model();
        send(&mut model, &store, set("name", json!("A")));
        assert!(model.session().can_submit());

        let (event, _) = send(&mut model, &store, FormMsg::Submit);
        let event = event.unwrap();
        assert!(event.is_error);
        assert!(event.message.contains("Name must be at least 2 characters"));
        assert!(model.last_submitted().is_none());
        assert_eq!(model.session().error("name"), Some("Name must be at least 2 characters"));
    }

    #[test]
    fn valid_submit_keeps_cleaned_value() {
        let store = ObjectUrlStore::new();
        let mut model = model();
        send(&mut model, &store, set("name", json!("Ada")));
        let (event, _) = send(&mut model, &store, FormMsg::Submit);
        assert_eq!(event, Some(FormEvent::info("Form submitted")));
        assert_eq!(model.last_submitted().unwrap()["name"], json!("Ada"));
    }

    #[test]
    fn array_messages_drive_the_controller() {
        let store = ObjectUrlStore::new();
        let mut model = model();
        send(&mut model, &store, FormMsg::AppendItem("links".into()));
        send(&mut model, &store, FormMsg::AppendItem("links".into()));
        send(&mut model, &store, set("links.1.url", json!("https://b.test")));
        send(
            &mut model,
            &store,
            FormMsg::MoveItemUp {
                array: "links".into(),
                index: 1,
            },
        );
        assert_eq!(model.session().get_value("links.0.url"), Some(&json!("https://b.test")));

        send(
            &mut model,
            &store,
            FormMsg::RemoveItem {
                array: "links".into(),
                index: 0,
            },
        );
        assert_eq!(model.session().get_value("links.0.url"), Some(&json!("")));
        assert!(model.session().get_value("links.1").is_none());
    }

    #[test]
    fn image_and_file_actions_become_commands() {
        let store = ObjectUrlStore::new();
        let mut model = model();
        let (_, cmds) = send(&mut model, &store, FormMsg::OpenImagePicker("gallery".into()));
        assert_eq!(
            cmds,
            vec![FormCommand::OpenImagePicker {
                path: "gallery".into()
            }]
        );
        let (_, cmds) = send(
            &mut model,
            &store,
            FormMsg::PickFiles {
                path: "docs".into(),
                images_only: false,
            },
        );
        assert_eq!(
            cmds,
            vec![FormCommand::PickFiles {
                path: "docs".into(),
                images_only: false
            }]
        );
    }

    #[test]
    fn removing_an_uploaded_image_revokes_its_url() {
        let store = ObjectUrlStore::new();
        let mut model = model();
        let url = store.create(vec![1], "image/png").retain();
        let images = json!([
            ImageData::from_url(url.clone(), ImageSource::Upload).to_value(),
            ImageData::from_url("https://img.test/1.jpg", ImageSource::Gallery).to_value(),
        ]);
        send(&mut model, &store, set("gallery", images));

        send(
            &mut model,
            &store,
            FormMsg::RemoveImage {
                path: "gallery".into(),
                url: url.clone(),
            },
        );
        assert!(!store.contains(&url));
        let left = selected_images(model.session().get_value("gallery").unwrap(), true);
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].url, "https://img.test/1.jpg");
    }

    #[test]
    fn removing_an_image_keeps_a_url_still_used_elsewhere() {
        let store = ObjectUrlStore::new();
        let mut model = model();
        let url = store.create(vec![1], "image/png").retain();
        let image = ImageData::from_url(url.clone(), ImageSource::Upload).to_value();
        send(&mut model, &store, set("gallery", json!([image.clone()])));
        send(&mut model, &store, set("cover", image));

        send(
            &mut model,
            &store,
            FormMsg::RemoveImage {
                path: "gallery".into(),
                url: url.clone(),
            },
        );
        assert_eq!(model.session().get_value("gallery"), Some(&Value::Null));
        assert!(store.contains(&url));

        send(
            &mut model,
            &store,
            FormMsg::RemoveImage {
                path: "cover".into(),
                url: url.clone(),
            },
        );
        assert!(!store.contains(&url));
    }

    #[test]
    fn reset_releases_uploads_added_since_start() {
        let store = ObjectUrlStore::new();
        let mut model = model();
        let url = store.create(vec![1], "image/png").retain();
        send(
            &mut model,
            &store,
            set("gallery", json!([{ "url": url.clone() }])),
        );
        let (event, _) = send(&mut model, &store, FormMsg::Reset);
        assert_eq!(event, Some(FormEvent::info("Form reset")));
        assert!(!store.contains(&url));
        assert!(!model.session().is_dirty());
    }

    #[test]
    fn attaching_files_appends_records() {
        let store = ObjectUrlStore::new();
        let mut model = model();
        let (event, _) = send(
            &mut model,
            &store,
            FormMsg::FilesAttached {
                path: "docs".into(),
                files: vec![UploadFile {
                    name: "a.txt".into(),
                    mime: None,
                    bytes: b"hello".to_vec(),
                }],
            },
        );
        assert_eq!(event, Some(FormEvent::info("Attached 1 file(s)")));
        assert_eq!(model.session().get_value("docs.0.name"), Some(&json!("a.txt")));
    }

    #[test]
    fn reset_action_restores_the_group_only() {
        let store = ObjectUrlStore::new();
        let mut model = model();
        send(&mut model, &store, set("name", json!("Ada")));
        send(&mut model, &store, set("profile.bio", json!("changed")));
        let (event, _) = send(
            &mut model,
            &store,
            FormMsg::GroupAction {
                path: "profile".into(),
                id: RESET_ACTION.into(),
                label: "Reset section".into(),
            },
        );
        assert!(event.is_none());
        assert_eq!(model.session().get_value("profile.bio"), Some(&json!("hi")));
        assert_eq!(model.session().get_value("name"), Some(&json!("Ada")));

        let (event, _) = send(
            &mut model,
            &store,
            FormMsg::GroupAction {
                path: "profile".into(),
                id: "share".into(),
                label: "Share".into(),
            },
        );
        assert_eq!(event.unwrap().message, "Share requested for profile");
    }

    #[test]
    fn group_actions_map_to_messages() {
        let msg = action_msg(&GroupAction::Remove {
            array: "links".into(),
            index: 2,
        });
        assert!(matches!(msg, FormMsg::RemoveItem { ref array, index: 2 } if array == "links"));
        let msg = widget_msg("avatar", WidgetAction::OpenImagePicker);
        assert!(matches!(msg, FormMsg::OpenImagePicker(ref p) if p == "avatar"));
    }
}
