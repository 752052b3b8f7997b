// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Leaf widgets for every built-in field kind, plus the default registry.
//!
//! A widget reads the field's current value from [`LeafInput`] and reports
//! what the user did as a [`WidgetAction`]. Widgets never touch the session;
//! the form view turns actions into messages.

use std::sync::Arc;

use eframe::egui;
use serde_json::{Value, json};

use crate::logic::image_field::{can_add, images_missing, selected_images};
use crate::logic::object_url::{ObjectUrlStore, is_object_url};
use crate::logic::resolver::WidgetRegistry;
use crate::logic::rules::as_number;
use crate::logic::uploads::format_bytes;
use crate::models::field::{FieldConfig, FieldKind};
use crate::models::image::ImageData;

use super::datetime_picker;
use super::toggle::Toggle;

/// Everything a widget may look at.
pub struct LeafInput<'a> {
    pub path: &'a str,
    pub config: &'a FieldConfig,
    pub value: &'a Value,
    pub has_error: bool,
    pub store: &'a ObjectUrlStore,
}

#[derive(Clone, Debug, PartialEq)]
pub enum WidgetAction {
    Change(Value),
    OpenImagePicker,
    PickFiles { images_only: bool },
    RemoveImage(String),
}

pub trait FieldWidget {
    fn show(&self, ui: &mut egui::Ui, input: &LeafInput<'_>) -> Option<WidgetAction>;
}

impl<F> FieldWidget for F
where
    F: Fn(&mut egui::Ui, &LeafInput<'_>) -> Option<WidgetAction>,
{
    fn show(&self, ui: &mut egui::Ui, input: &LeafInput<'_>) -> Option<WidgetAction> {
        self(ui, input)
    }
}

pub type SharedWidget = Arc<dyn FieldWidget>;

/// Registry covering every built-in leaf kind.
pub fn default_registry() -> WidgetRegistry<SharedWidget> {
    let single: SharedWidget = Arc::new(TextInput(TextMode::SingleLine));
    let number: SharedWidget = Arc::new(NumberInput);
    let multiline: SharedWidget = Arc::new(TextInput(TextMode::MultiLine));

    WidgetRegistry::new()
        .with(FieldKind::Text, single.clone())
        .with(FieldKind::Email, single.clone())
        .with(FieldKind::Url, single.clone())
        .with(FieldKind::Tel, single)
        .with(FieldKind::Password, Arc::new(TextInput(TextMode::Masked)))
        .with(FieldKind::Textarea, multiline.clone())
        .with(FieldKind::RichText, multiline)
        .with(FieldKind::Number, number.clone())
        .with(FieldKind::Currency, number.clone())
        .with(FieldKind::Percentage, number)
        .with(FieldKind::Switch, Arc::new(SwitchInput))
        .with(FieldKind::Checkbox, Arc::new(CheckboxInput))
        .with(FieldKind::SelectSingle, Arc::new(SelectInput))
        .with(FieldKind::SelectMulti, Arc::new(MultiSelectInput))
        .with(FieldKind::RadioGroup, Arc::new(RadioInput))
        .with(FieldKind::Date, Arc::new(DateInput))
        .with(FieldKind::DateTime, Arc::new(DateTimeInput))
        .with(FieldKind::Time, Arc::new(TimeInput))
        .with(FieldKind::Color, Arc::new(ColorInput))
        .with(FieldKind::Slider, Arc::new(SliderInput))
        .with(FieldKind::Range, Arc::new(RangeInput))
        .with(FieldKind::ImagePicker, Arc::new(ImagePickerInput))
        .with(FieldKind::FileUploader, Arc::new(UploaderInput { images_only: false }))
        .with(FieldKind::ImageUploader, Arc::new(UploaderInput { images_only: true }))
}

/// Whole numbers are stored as integers so integer rules accept them.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

/// `#rrggbb` (or `#rgb`) to RGB.
pub fn parse_hex_color(raw: &str) -> Option<[u8; 3]> {
    let hex = raw.trim().strip_prefix('#')?;
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

pub fn hex_color(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// `{from, to}` clamped into `lo..=hi`, defaulting to the full span.
/// The ends may come in either order.
pub fn range_bounds(value: &Value, lo: f64, hi: f64) -> (f64, f64) {
    let (lo, hi) = (lo.min(hi), lo.max(hi));
    let from = value.get("from").and_then(as_number).unwrap_or(lo).clamp(lo, hi);
    let to = value.get("to").and_then(as_number).unwrap_or(hi).clamp(lo, hi);
    (from, to)
}

pub fn range_value(from: f64, to: f64) -> Value {
    json!({ "from": number_value(from), "to": number_value(to) })
}

/// Add `choice` to a multi-select value, or remove it if present.
pub fn toggle_choice(selected: &Value, choice: &str) -> Value {
    let mut items: Vec<Value> = selected.as_array().cloned().unwrap_or_default();
    match items.iter().position(|v| v.as_str() == Some(choice)) {
        Some(index) => {
            items.remove(index);
        }
        None => items.push(Value::String(choice.to_string())),
    }
    Value::Array(items)
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn muted(ui: &egui::Ui, text: impl Into<String>) -> egui::RichText {
    egui::RichText::new(text.into())
        .small()
        .color(ui.visuals().weak_text_color())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TextMode {
    SingleLine,
    Masked,
    MultiLine,
}

struct TextInput(TextMode);

impl FieldWidget for TextInput {
    fn show(&self, ui: &mut egui::Ui, input: &LeafInput<'_>) -> Option<WidgetAction> {
        let mut text = text_of(input.value);
        let hint = input.config.placeholder.clone().unwrap_or_default();
        let response = match self.0 {
            TextMode::SingleLine | TextMode::Masked => ui.add(
                egui::TextEdit::singleline(&mut text)
                    .hint_text(hint)
                    .password(self.0 == TextMode::Masked)
                    .desired_width(f32::INFINITY),
            ),
            TextMode::MultiLine => {
                let ui_hints = &input.config.custom_ui;
                let row_height = ui.text_style_height(&egui::TextStyle::Body);
                let rows = ui_hints
                    .min_height
                    .map_or(3, |h| (h / row_height).ceil().max(1.0) as usize);
                let mut edit = egui::TextEdit::multiline(&mut text)
                    .hint_text(hint)
                    .desired_rows(rows)
                    .desired_width(f32::INFINITY);
                if input.config.kind == FieldKind::RichText {
                    edit = edit.code_editor();
                }
                match ui_hints.max_height {
                    Some(max) => {
                        egui::ScrollArea::vertical()
                            .id_salt(input.path)
                            .max_height(max)
                            .show(ui, |ui| ui.add(edit))
                            .inner
                    }
                    None => ui.add(edit),
                }
            }
        };
        response
            .changed()
            .then(|| WidgetAction::Change(Value::String(text)))
    }
}

struct NumberInput;

impl FieldWidget for NumberInput {
    fn show(&self, ui: &mut egui::Ui, input: &LeafInput<'_>) -> Option<WidgetAction> {
        let hints = &input.config.custom_ui;
        let current = as_number(input.value);
        let mut n = current.unwrap_or_else(|| hints.min_or(0.0));
        let mut out = None;
        ui.horizontal(|ui| {
            let mut drag = egui::DragValue::new(&mut n).speed(hints.step.unwrap_or(1.0));
            if hints.min.is_some() || hints.max.is_some() {
                let (lo, hi) = (hints.min_or(f64::MIN), hints.max_or(f64::MAX));
                drag = drag.range(lo.min(hi)..=lo.max(hi));
            }
            if let Some(prefix) = &hints.prefix {
                drag = drag.prefix(prefix.as_str());
            }
            let suffix = match (&hints.suffix, &input.config.kind) {
                (Some(suffix), _) => Some(suffix.clone()),
                (None, FieldKind::Percentage) => Some("%".to_string()),
                _ => None,
            };
            if let Some(suffix) = suffix {
                drag = drag.suffix(suffix);
            }
            if ui.add(drag).changed() {
                out = Some(WidgetAction::Change(number_value(n)));
            }
            if let Some(unit) = &hints.unit {
                ui.label(muted(ui, unit));
            }
            if current.is_some()
                && ui
                    .small_button(egui_phosphor::regular::X)
                    .on_hover_text("Clear")
                    .clicked()
            {
                out = Some(WidgetAction::Change(Value::Null));
            }
        });
        out
    }
}

struct SwitchInput;

impl FieldWidget for SwitchInput {
    fn show(&self, ui: &mut egui::Ui, input: &LeafInput<'_>) -> Option<WidgetAction> {
        let mut on = input.value.as_bool().unwrap_or(false);
        ui.add(Toggle::new(&mut on))
            .changed()
            .then_some(WidgetAction::Change(Value::Bool(on)))
    }
}

struct CheckboxInput;

impl FieldWidget for CheckboxInput {
    fn show(&self, ui: &mut egui::Ui, input: &LeafInput<'_>) -> Option<WidgetAction> {
        let mut on = input.value.as_bool().unwrap_or(false);
        let text = input.config.placeholder.clone().unwrap_or_default();
        ui.checkbox(&mut on, text)
            .changed()
            .then_some(WidgetAction::Change(Value::Bool(on)))
    }
}

struct SelectInput;

impl FieldWidget for SelectInput {
    fn show(&self, ui: &mut egui::Ui, input: &LeafInput<'_>) -> Option<WidgetAction> {
        let current = input.value.as_str().unwrap_or_default();
        let selected_text = input
            .config
            .options
            .iter()
            .find(|o| o.value == current)
            .map(|o| o.label.clone())
            .or_else(|| input.config.placeholder.clone())
            .unwrap_or_else(|| "Select…".to_string());
        let mut out = None;
        egui::ComboBox::from_id_salt(input.path)
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                for option in &input.config.options {
                    if ui
                        .add(egui::Button::new(option.label.as_str()).selected(option.value == current))
                        .clicked()
                        && option.value != current
                    {
                        out = Some(WidgetAction::Change(Value::String(option.value.clone())));
                    }
                }
            });
        out
    }
}

struct MultiSelectInput;

impl FieldWidget for MultiSelectInput {
    fn show(&self, ui: &mut egui::Ui, input: &LeafInput<'_>) -> Option<WidgetAction> {
        let mut out = None;
        ui.horizontal_wrapped(|ui| {
            for option in &input.config.options {
                let on = input
                    .value
                    .as_array()
                    .is_some_and(|items| items.iter().any(|v| v.as_str() == Some(&option.value)));
                if ui
                    .add(egui::Button::new(option.label.as_str()).selected(on))
                    .clicked()
                {
                    out = Some(WidgetAction::Change(toggle_choice(input.value, &option.value)));
                }
            }
        });
        out
    }
}

struct RadioInput;

impl FieldWidget for RadioInput {
    fn show(&self, ui: &mut egui::Ui, input: &LeafInput<'_>) -> Option<WidgetAction> {
        let current = input.value.as_str();
        let mut out = None;
        ui.horizontal_wrapped(|ui| {
            for option in &input.config.options {
                let checked = current == Some(option.value.as_str());
                if ui.radio(checked, option.label.as_str()).clicked() && !checked {
                    out = Some(WidgetAction::Change(Value::String(option.value.clone())));
                }
            }
        });
        out
    }
}

struct DateInput;

impl FieldWidget for DateInput {
    fn show(&self, ui: &mut egui::Ui, input: &LeafInput<'_>) -> Option<WidgetAction> {
        datetime_picker::date_view(ui, input.path, input.value).map(WidgetAction::Change)
    }
}

struct DateTimeInput;

impl FieldWidget for DateTimeInput {
    fn show(&self, ui: &mut egui::Ui, input: &LeafInput<'_>) -> Option<WidgetAction> {
        datetime_picker::datetime_view(ui, input.path, input.value).map(WidgetAction::Change)
    }
}

struct TimeInput;

impl FieldWidget for TimeInput {
    fn show(&self, ui: &mut egui::Ui, input: &LeafInput<'_>) -> Option<WidgetAction> {
        datetime_picker::time_view(ui, input.value).map(WidgetAction::Change)
    }
}

struct ColorInput;

impl FieldWidget for ColorInput {
    fn show(&self, ui: &mut egui::Ui, input: &LeafInput<'_>) -> Option<WidgetAction> {
        let current = input.value.as_str().and_then(parse_hex_color);
        let mut rgb = current.unwrap_or([0, 0, 0]);
        let mut out = None;
        ui.horizontal(|ui| {
            if ui.color_edit_button_srgb(&mut rgb).changed() {
                out = Some(WidgetAction::Change(Value::String(hex_color(rgb))));
            }
            match current {
                Some(rgb) => ui.monospace(hex_color(rgb)),
                None => ui.label(muted(ui, "not set")),
            };
        });
        out
    }
}

struct SliderInput;

impl FieldWidget for SliderInput {
    fn show(&self, ui: &mut egui::Ui, input: &LeafInput<'_>) -> Option<WidgetAction> {
        let hints = &input.config.custom_ui;
        let (lo, hi) = hints.span();
        let mut n = as_number(input.value).unwrap_or(lo);
        let mut slider = egui::Slider::new(&mut n, lo..=hi);
        if let Some(step) = hints.step {
            slider = slider.step_by(step);
        }
        if let Some(unit) = &hints.unit {
            slider = slider.suffix(format!(" {unit}"));
        }
        ui.add(slider)
            .changed()
            .then(|| WidgetAction::Change(number_value(n)))
    }
}

struct RangeInput;

impl FieldWidget for RangeInput {
    fn show(&self, ui: &mut egui::Ui, input: &LeafInput<'_>) -> Option<WidgetAction> {
        let hints = &input.config.custom_ui;
        let (lo, hi) = hints.span();
        let (mut from, mut to) = range_bounds(input.value, lo, hi);
        let speed = hints.step.unwrap_or(1.0);
        let mut changed = false;
        ui.horizontal(|ui| {
            if let Some(prefix) = &hints.prefix {
                ui.label(prefix);
            }
            ui.label("from");
            if ui
                .add(egui::DragValue::new(&mut from).range(lo..=hi).speed(speed))
                .changed()
            {
                to = to.max(from);
                changed = true;
            }
            ui.label("to");
            if ui
                .add(egui::DragValue::new(&mut to).range(lo..=hi).speed(speed))
                .changed()
            {
                from = from.min(to);
                changed = true;
            }
            if let Some(unit) = &hints.unit {
                ui.label(muted(ui, unit));
            }
        });
        changed.then(|| WidgetAction::Change(range_value(from, to)))
    }
}

/// Square preview of an image, reading uploaded bytes from the object URL store.
pub fn image_preview(
    ui: &mut egui::Ui,
    store: &ObjectUrlStore,
    image: &ImageData,
    edge: f32,
) -> egui::Response {
    let size = egui::vec2(edge, edge);
    let picture = if is_object_url(&image.url) {
        match store.bytes(&image.url) {
            Some(bytes) => {
                egui::Image::from_bytes(image.url.clone(), egui::load::Bytes::Shared(bytes))
            }
            None => {
                return ui
                    .add_sized(size, egui::Label::new(egui_phosphor::regular::IMAGE_BROKEN))
                    .on_hover_text("Image is no longer available");
            }
        }
    } else {
        egui::Image::new(image.preview_uri().to_string())
    };
    ui.add(picture.fit_to_exact_size(size))
        .on_hover_text(image.caption())
}

struct ImagePickerInput;

impl FieldWidget for ImagePickerInput {
    fn show(&self, ui: &mut egui::Ui, input: &LeafInput<'_>) -> Option<WidgetAction> {
        let field = input.config;
        let images = selected_images(input.value, field.multiple);
        let mut out = None;
        ui.horizontal_wrapped(|ui| {
            for image in &images {
                ui.vertical(|ui| {
                    image_preview(ui, input.store, image, 72.0);
                    if ui
                        .small_button(format!("{} Remove", egui_phosphor::regular::TRASH))
                        .clicked()
                    {
                        out = Some(WidgetAction::RemoveImage(image.url.clone()));
                    }
                });
            }
            let label = match (field.multiple, images.is_empty()) {
                (true, _) => format!("{} Add images", egui_phosphor::regular::IMAGES),
                (false, true) => format!("{} Choose image", egui_phosphor::regular::IMAGE),
                (false, false) => format!("{} Replace", egui_phosphor::regular::IMAGE),
            };
            let hover = match field.max_images {
                Some(max) if field.multiple => format!("Up to {max} images"),
                _ => "Open the image picker".to_string(),
            };
            if ui
                .add_enabled(can_add(field, images.len()), egui::Button::new(label))
                .on_hover_text(hover)
                .on_disabled_hover_text("Image limit reached")
                .clicked()
            {
                out = Some(WidgetAction::OpenImagePicker);
            }
        });
        if let (true, Some(max)) = (field.multiple, field.max_images) {
            ui.label(muted(ui, format!("{} / {max} selected", images.len())));
        }
        if let Some(missing) = images_missing(field, images.len()) {
            ui.label(muted(ui, format!("Select at least {missing} more")));
        }
        out
    }
}

struct UploaderInput {
    images_only: bool,
}

impl FieldWidget for UploaderInput {
    fn show(&self, ui: &mut egui::Ui, input: &LeafInput<'_>) -> Option<WidgetAction> {
        let items = input.value.as_array().cloned().unwrap_or_default();
        let mut out = None;
        if self.images_only {
            ui.horizontal_wrapped(|ui| {
                for image in items.iter().filter_map(ImageData::from_value) {
                    ui.vertical(|ui| {
                        image_preview(ui, input.store, &image, 64.0);
                        if ui.small_button(egui_phosphor::regular::TRASH).clicked() {
                            out = Some(WidgetAction::RemoveImage(image.url.clone()));
                        }
                    });
                }
            });
        } else {
            for (index, item) in items.iter().enumerate() {
                ui.horizontal(|ui| {
                    ui.label(egui_phosphor::regular::FILE);
                    ui.label(item["name"].as_str().unwrap_or("file"));
                    if let Some(size) = item["size"].as_u64() {
                        ui.label(muted(ui, format_bytes(size)));
                    }
                    if ui.small_button(egui_phosphor::regular::TRASH).clicked() {
                        let mut remaining = items.clone();
                        remaining.remove(index);
                        out = Some(WidgetAction::Change(Value::Array(remaining)));
                    }
                });
            }
        }
        let label = if self.images_only {
            format!("{} Upload images…", egui_phosphor::regular::UPLOAD_SIMPLE)
        } else {
            format!("{} Attach files…", egui_phosphor::regular::PAPERCLIP)
        };
        if ui.button(label).clicked() {
            out = Some(WidgetAction::PickFiles {
                images_only: self.images_only,
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::field::KNOWN_KINDS;

    #[test]
    fn default_registry_covers_every_leaf_kind() {
        let registry = default_registry();
        for kind in KNOWN_KINDS.iter() {
            let leaf = !kind.is_composite() && *kind != FieldKind::Spacer;
            assert_eq!(registry.contains(kind), leaf, "{kind}");
        }
        assert!(!registry.contains(&FieldKind::Unknown("signature".into())));
    }

    fn inert(_: &mut egui::Ui, _: &LeafInput<'_>) -> Option<WidgetAction> {
        None
    }

    #[test]
    fn functions_are_widgets() {
        let widget: SharedWidget = Arc::new(inert);
        let registry = WidgetRegistry::new().with(FieldKind::Text, widget);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn whole_numbers_become_integers() {
        assert_eq!(number_value(5.0), json!(5));
        assert_eq!(number_value(-2.0), json!(-2));
        assert_eq!(number_value(2.5), json!(2.5));
    }

    #[test]
    fn hex_colors_parse_and_format() {
        assert_eq!(parse_hex_color("#3b82f6"), Some([0x3b, 0x82, 0xf6]));
        assert_eq!(parse_hex_color("#fff"), Some([255, 255, 255]));
        assert_eq!(parse_hex_color("3b82f6"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
        assert_eq!(hex_color([0x3b, 0x82, 0xf6]), "#3b82f6");
    }

    #[test]
    fn range_bounds_default_and_clamp() {
        assert_eq!(range_bounds(&Value::Null, 0.0, 100.0), (0.0, 100.0));
        assert_eq!(
            range_bounds(&json!({"from": -5, "to": 40}), 0.0, 100.0),
            (0.0, 40.0)
        );
        assert_eq!(range_value(10.0, 20.5), json!({"from": 10, "to": 20.5}));
    }

    #[test]
    fn range_bounds_accept_reversed_ends() {
        assert_eq!(
            range_bounds(&json!({"from": 150, "to": 200}), 150.0, 100.0),
            (150.0, 150.0)
        );
        assert_eq!(range_bounds(&Value::Null, 150.0, 100.0), (100.0, 150.0));
    }

    #[test]
    fn toggling_choices_adds_and_removes() {
        let once = toggle_choice(&json!([]), "rust");
        assert_eq!(once, json!(["rust"]));
        let twice = toggle_choice(&json!(["rust", "egui"]), "rust");
        assert_eq!(twice, json!(["egui"]));
        assert_eq!(toggle_choice(&Value::Null, "egui"), json!(["egui"]));
    }
}
