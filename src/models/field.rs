// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Declarative field configuration a dynamic form is built from.
//! Pure data: no rendering, no session state.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::logic::image_field::ImageMergePolicy;
use crate::logic::path;
use crate::logic::validator::{ArrayValidator, Rule, SharedRule};

/// Closed vocabulary of field types the engine knows how to resolve.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Textarea,
    Url,
    Tel,
    Number,
    Currency,
    Percentage,
    SelectSingle,
    SelectMulti,
    Array,
    Group,
    Switch,
    RadioGroup,
    Date,
    DateTime,
    Time,
    ImageUploader,
    ImagePicker,
    FileUploader,
    Checkbox,
    RichText,
    Color,
    Slider,
    Range,
    Spacer,
    /// Type token we do not recognise; resolves to nothing.
    Unknown(String),
}

/// Every recognised kind, in vocabulary order.
pub const KNOWN_KINDS: [FieldKind; 27] = [
    FieldKind::Text,
    FieldKind::Email,
    FieldKind::Password,
    FieldKind::Textarea,
    FieldKind::Url,
    FieldKind::Tel,
    FieldKind::Number,
    FieldKind::Currency,
    FieldKind::Percentage,
    FieldKind::SelectSingle,
    FieldKind::SelectMulti,
    FieldKind::Array,
    FieldKind::Group,
    FieldKind::Switch,
    FieldKind::RadioGroup,
    FieldKind::Date,
    FieldKind::DateTime,
    FieldKind::Time,
    FieldKind::ImageUploader,
    FieldKind::ImagePicker,
    FieldKind::FileUploader,
    FieldKind::Checkbox,
    FieldKind::RichText,
    FieldKind::Color,
    FieldKind::Slider,
    FieldKind::Range,
    FieldKind::Spacer,
];

impl FieldKind {
    /// Map a type token (e.g. `"select-single"`) to its kind.
    ///
    /// Unknown tokens are kept as [`FieldKind::Unknown`] so a form with a
    /// newer widget type still loads; the resolver skips such fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use dynform::models::field::FieldKind;
    ///
    /// assert_eq!(FieldKind::from_token("radio-group"), FieldKind::RadioGroup);
    /// assert_eq!(FieldKind::from_token("stars"), FieldKind::Unknown("stars".into()));
    /// ```
    pub fn from_token(raw: &str) -> Self {
        match raw {
            "text" => Self::Text,
            "email" => Self::Email,
            "password" => Self::Password,
            "textarea" => Self::Textarea,
            "url" => Self::Url,
            "tel" => Self::Tel,
            "number" => Self::Number,
            "currency" => Self::Currency,
            "percentage" => Self::Percentage,
            "select-single" => Self::SelectSingle,
            "select-multi" => Self::SelectMulti,
            "array" => Self::Array,
            "group" => Self::Group,
            "switch" => Self::Switch,
            "radio-group" => Self::RadioGroup,
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            "time" => Self::Time,
            "image-uploader" => Self::ImageUploader,
            "imagepicker" => Self::ImagePicker,
            "file-uploader" => Self::FileUploader,
            "checkbox" => Self::Checkbox,
            "richtext" => Self::RichText,
            "color" => Self::Color,
            "slider" => Self::Slider,
            "range" => Self::Range,
            "spacer" => Self::Spacer,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Token form used in form definition files.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Textarea => "textarea",
            Self::Url => "url",
            Self::Tel => "tel",
            Self::Number => "number",
            Self::Currency => "currency",
            Self::Percentage => "percentage",
            Self::SelectSingle => "select-single",
            Self::SelectMulti => "select-multi",
            Self::Array => "array",
            Self::Group => "group",
            Self::Switch => "switch",
            Self::RadioGroup => "radio-group",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Time => "time",
            Self::ImageUploader => "image-uploader",
            Self::ImagePicker => "imagepicker",
            Self::FileUploader => "file-uploader",
            Self::Checkbox => "checkbox",
            Self::RichText => "richtext",
            Self::Color => "color",
            Self::Slider => "slider",
            Self::Range => "range",
            Self::Spacer => "spacer",
            Self::Unknown(raw) => raw.as_str(),
        }
    }

    /// Group and array fields own child fields; everything else is a leaf.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Group | Self::Array)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations an array field exposes on its items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArrayAction {
    /// Accepted for completeness. Appending is always available on
    /// unlocked arrays, so this one gates nothing.
    Add,
    Remove,
    MoveUp,
    MoveDown,
}

impl ArrayAction {
    /// Accepts both the camelCase and kebab/snake spellings.
    pub fn from_token(raw: &str) -> Option<Self> {
        match raw {
            "add" => Some(Self::Add),
            "remove" => Some(Self::Remove),
            "moveUp" | "move-up" | "move_up" => Some(Self::MoveUp),
            "moveDown" | "move-down" | "move_down" => Some(Self::MoveDown),
            _ => None,
        }
    }
}

/// Label shown above each array item.
#[derive(Clone)]
pub enum ItemLabel {
    /// Literal prefix; rendered as `"{text} #{index + 1}"`.
    Text(String),
    /// Computed from the item value and its zero-based index.
    Dynamic(Arc<dyn Fn(&Value, usize) -> String + Send + Sync>),
}

impl ItemLabel {
    /// Evaluate the label for one item. Called on every render, never cached.
    pub fn render(&self, item: &Value, index: usize) -> String {
        match self {
            Self::Text(text) => format!("{text} #{}", index + 1),
            Self::Dynamic(f) => f(item, index),
        }
    }
}

impl Default for ItemLabel {
    fn default() -> Self {
        Self::Text("Item".to_string())
    }
}

impl fmt::Debug for ItemLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Post-processing hook adding list-level constraints (item counts etc.).
pub type ArrayRefiner = Arc<dyn Fn(ArrayValidator) -> ArrayValidator + Send + Sync>;

/// Array-specific behaviour.
#[derive(Clone)]
pub struct ArrayConfig {
    pub actions: BTreeSet<ArrayAction>,
    /// Value inserted by `append`; `{}` when unset.
    pub item_default: Option<Value>,
    pub item_label: ItemLabel,
    /// Item key holding the generated identity (list diffing only).
    pub key_name: String,
    pub refiner: Option<ArrayRefiner>,
}

impl ArrayConfig {
    pub fn new(key_name: impl Into<String>) -> Self {
        Self {
            actions: BTreeSet::new(),
            item_default: None,
            item_label: ItemLabel::default(),
            key_name: key_name.into(),
            refiner: None,
        }
    }

    pub fn action(mut self, action: ArrayAction) -> Self {
        self.actions.insert(action);
        self
    }

    pub fn item_default(mut self, value: Value) -> Self {
        self.item_default = Some(value);
        self
    }

    pub fn item_label(mut self, label: ItemLabel) -> Self {
        self.item_label = label;
        self
    }

    pub fn refine<F>(mut self, refiner: F) -> Self
    where
        F: Fn(ArrayValidator) -> ArrayValidator + Send + Sync + 'static,
    {
        self.refiner = Some(Arc::new(refiner));
        self
    }

    pub fn allows(&self, action: ArrayAction) -> bool {
        self.actions.contains(&action)
    }
}

impl fmt::Debug for ArrayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayConfig")
            .field("actions", &self.actions)
            .field("item_default", &self.item_default)
            .field("item_label", &self.item_label)
            .field("key_name", &self.key_name)
            .field("refiner", &self.refiner.is_some())
            .finish()
    }
}

/// Caller-defined button rendered in a group's trailing action region.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ActionHint {
    pub id: String,
    pub label: String,
}

/// Widget-specific presentation hints.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CustomUi {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub min_height: Option<f32>,
    pub max_height: Option<f32>,
    /// Grid columns a spacer occupies.
    pub span: Option<u8>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub unit: Option<String>,
    pub actions: Vec<ActionHint>,
    /// Anything else the widget may want to read.
    pub extra: Map<String, Value>,
}

impl CustomUi {
    pub fn range(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Self::default()
        }
    }

    pub fn min_or(&self, fallback: f64) -> f64 {
        self.min.unwrap_or(fallback)
    }

    pub fn max_or(&self, fallback: f64) -> f64 {
        self.max.unwrap_or(fallback)
    }

    /// Slider and range span as authored, defaulting to `0..=100`.
    pub fn declared_span(&self) -> (f64, f64) {
        (self.min_or(0.0), self.max_or(100.0))
    }

    /// [`CustomUi::declared_span`] with its ends ordered.
    pub fn span(&self) -> (f64, f64) {
        let (lo, hi) = self.declared_span();
        (lo.min(hi), lo.max(hi))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// One entry of a form's declarative configuration.
///
/// A field without [`FieldConfig::validation`] accepts **any** value,
/// including a missing one. Validation is opt-in per field and is never
/// inferred from `kind`: an `Email` field with no rule accepts `"bad"`.
#[derive(Clone)]
pub struct FieldConfig {
    pub name: String,
    pub kind: FieldKind,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub description: Option<String>,
    /// Applied once when a session is created, never afterwards.
    pub default_value: Option<Value>,
    pub validation: Option<SharedRule>,
    /// Children of group and array fields, relative-named.
    pub fields: Vec<FieldConfig>,
    pub array: Option<ArrayConfig>,
    pub custom_ui: CustomUi,
    pub options: Vec<SelectOption>,
    pub disabled: bool,
    pub read_only: bool,
    pub multiple: bool,
    pub max_images: Option<usize>,
    /// Shown as a hint on multiple pickers; enforce it with a rule.
    pub min_images: Option<usize>,
    pub on_image_select: Option<ImageMergePolicy>,
}

impl FieldConfig {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            label: None,
            placeholder: None,
            description: None,
            default_value: None,
            validation: None,
            fields: Vec::new(),
            array: None,
            custom_ui: CustomUi::default(),
            options: Vec::new(),
            disabled: false,
            read_only: false,
            multiple: false,
            max_images: None,
            min_images: None,
            on_image_select: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn rule(mut self, rule: impl Rule + 'static) -> Self {
        self.validation = Some(Arc::new(rule));
        self
    }

    pub fn validation(mut self, rule: SharedRule) -> Self {
        self.validation = Some(rule);
        self
    }

    pub fn child(mut self, field: FieldConfig) -> Self {
        self.fields.push(field);
        self
    }

    pub fn children(mut self, fields: Vec<FieldConfig>) -> Self {
        self.fields = fields;
        self
    }

    pub fn array_config(mut self, config: ArrayConfig) -> Self {
        self.array = Some(config);
        self
    }

    pub fn custom_ui(mut self, custom_ui: CustomUi) -> Self {
        self.custom_ui = custom_ui;
        self
    }

    pub fn options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    pub fn max_images(mut self, max: usize) -> Self {
        self.max_images = Some(max);
        self
    }

    pub fn min_images(mut self, min: usize) -> Self {
        self.min_images = Some(min);
        self
    }

    pub fn on_image_select(mut self, policy: ImageMergePolicy) -> Self {
        self.on_image_select = Some(policy);
        self
    }

    /// Label if present, otherwise the field name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Whether edits should be blocked.
    pub fn is_locked(&self) -> bool {
        self.disabled || self.read_only
    }

    pub fn find_child(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Value a field starts with when neither initial values nor a default supply one.
    pub fn empty_value(&self) -> Value {
        match self.kind {
            FieldKind::Text
            | FieldKind::Email
            | FieldKind::Password
            | FieldKind::Textarea
            | FieldKind::Url
            | FieldKind::Tel
            | FieldKind::SelectSingle
            | FieldKind::RadioGroup
            | FieldKind::RichText
            | FieldKind::Color => Value::String(String::new()),
            FieldKind::Switch | FieldKind::Checkbox => Value::Bool(false),
            FieldKind::SelectMulti
            | FieldKind::Array
            | FieldKind::FileUploader
            | FieldKind::ImageUploader => Value::Array(Vec::new()),
            FieldKind::ImagePicker if self.multiple => Value::Array(Vec::new()),
            FieldKind::Slider => json!(self.custom_ui.span().0),
            FieldKind::Range => {
                let (from, to) = self.custom_ui.span();
                json!({ "from": from, "to": to })
            }
            _ => Value::Null,
        }
    }
}

impl fmt::Debug for FieldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConfig")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("validation", &self.validation.is_some())
            .field("fields", &self.fields)
            .field("array", &self.array)
            .finish_non_exhaustive()
    }
}

/// Find the config bound to a value path such as `links.0.url`.
///
/// Positional segments inside array fields are skipped, so every item of
/// an array maps back to the same child configs.
pub fn find_field<'a>(fields: &'a [FieldConfig], value_path: &str) -> Option<&'a FieldConfig> {
    let mut siblings = fields;
    let mut current: Option<&FieldConfig> = None;
    for segment in path::segments(value_path) {
        if let Some(field) = current
            && field.kind == FieldKind::Array
            && path::is_index(segment)
        {
            continue;
        }
        let next = siblings.iter().find(|f| f.name == segment)?;
        siblings = &next.fields;
        current = Some(next);
    }
    current
}

/// Authoring-time problems in a field list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("duplicate field name '{path}'")]
    DuplicateName { path: String },
    #[error("{kind} field '{path}' must declare child fields")]
    MissingChildren { path: String, kind: String },
    #[error("{kind} field '{path}' must not declare child fields")]
    UnexpectedChildren { path: String, kind: String },
    #[error("array field '{path}' needs an array config with a key name")]
    MissingArrayConfig { path: String },
    #[error("field '{path}' has unknown type '{token}'")]
    UnknownType { path: String, token: String },
    #[error("field '{path}' has a minimum above its maximum")]
    InvertedBounds { path: String },
}

/// How [`check_fields`] treats unrecognised type tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strictness {
    /// Unknown kinds are allowed and resolve to nothing.
    Lenient,
    /// Unknown kinds are rejected.
    Strict,
}

/// Verify the structural invariants of a field list, failing on the first problem.
pub fn check_fields(fields: &[FieldConfig], strictness: Strictness) -> Result<(), ConfigError> {
    check_level(fields, None, strictness)
}

fn check_level(
    fields: &[FieldConfig],
    parent: Option<&str>,
    strictness: Strictness,
) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for field in fields {
        let field_path = path::join(parent, &field.name);
        if field.kind != FieldKind::Spacer && !seen.insert(field.name.as_str()) {
            return Err(ConfigError::DuplicateName { path: field_path });
        }

        if let FieldKind::Unknown(token) = &field.kind
            && strictness == Strictness::Strict
        {
            return Err(ConfigError::UnknownType {
                path: field_path,
                token: token.clone(),
            });
        }

        let bounds = match field.kind {
            FieldKind::Slider | FieldKind::Range => Some(field.custom_ui.declared_span()),
            _ => field.custom_ui.min.zip(field.custom_ui.max),
        };
        if bounds.is_some_and(|(min, max)| min > max) {
            return Err(ConfigError::InvertedBounds { path: field_path });
        }

        if field.kind.is_composite() {
            if field.fields.is_empty() {
                return Err(ConfigError::MissingChildren {
                    path: field_path,
                    kind: field.kind.to_string(),
                });
            }
            if field.kind == FieldKind::Array
                && field
                    .array
                    .as_ref()
                    .is_none_or(|a| a.key_name.trim().is_empty())
            {
                return Err(ConfigError::MissingArrayConfig { path: field_path });
            }
            check_level(&field.fields, Some(&field_path), strictness)?;
        } else if !field.fields.is_empty() {
            return Err(ConfigError::UnexpectedChildren {
                path: field_path,
                kind: field.kind.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links_field() -> FieldConfig {
        FieldConfig::new("links", FieldKind::Array)
            .array_config(ArrayConfig::new("uuid").action(ArrayAction::Remove))
            .child(FieldConfig::new("url", FieldKind::Url))
            .child(FieldConfig::new("desc", FieldKind::Textarea))
    }

    #[test]
    fn tokens_round_trip_for_every_known_kind() {
        for kind in KNOWN_KINDS.iter() {
            assert_eq!(&FieldKind::from_token(kind.as_str()), kind);
        }
        assert!(!FieldKind::from_token("hologram").is_known());
    }

    #[test]
    fn find_field_skips_array_indices() {
        let fields = vec![
            FieldConfig::new("profile", FieldKind::Group)
                .child(FieldConfig::new("bio", FieldKind::Text)),
            links_field(),
        ];

        assert_eq!(find_field(&fields, "profile.bio").unwrap().name, "bio");
        assert_eq!(find_field(&fields, "links.3.desc").unwrap().name, "desc");
        assert_eq!(
            find_field(&fields, "links").unwrap().kind,
            FieldKind::Array
        );
        assert!(find_field(&fields, "profile.0.bio").is_none());
        assert!(find_field(&fields, "missing").is_none());
    }

    #[test]
    fn check_rejects_duplicate_sibling_names() {
        let fields = vec![
            FieldConfig::new("email", FieldKind::Email),
            FieldConfig::new("email", FieldKind::Text),
        ];
        assert_eq!(
            check_fields(&fields, Strictness::Lenient),
            Err(ConfigError::DuplicateName {
                path: "email".into()
            })
        );
    }

    #[test]
    fn check_allows_same_name_in_different_groups() {
        let fields = vec![
            FieldConfig::new("bio", FieldKind::Text),
            FieldConfig::new("profile", FieldKind::Group)
                .child(FieldConfig::new("bio", FieldKind::Text)),
        ];
        assert!(check_fields(&fields, Strictness::Strict).is_ok());
    }

    #[test]
    fn check_requires_children_on_composites() {
        let fields = vec![FieldConfig::new("profile", FieldKind::Group)];
        assert!(matches!(
            check_fields(&fields, Strictness::Lenient),
            Err(ConfigError::MissingChildren { .. })
        ));

        let leaf_with_children = vec![
            FieldConfig::new("name", FieldKind::Text)
                .child(FieldConfig::new("first", FieldKind::Text)),
        ];
        assert!(matches!(
            check_fields(&leaf_with_children, Strictness::Lenient),
            Err(ConfigError::UnexpectedChildren { .. })
        ));
    }

    #[test]
    fn check_rejects_minimum_above_maximum() {
        let mut range = FieldConfig::new("budget", FieldKind::Range);
        range.custom_ui.min = Some(150.0);
        assert_eq!(
            check_fields(&[range.clone()], Strictness::Lenient),
            Err(ConfigError::InvertedBounds {
                path: "budget".into()
            })
        );
        assert_eq!(range.custom_ui.span(), (100.0, 150.0));

        let mut number = FieldConfig::new("age", FieldKind::Number);
        number.custom_ui.min = Some(150.0);
        assert!(check_fields(&[number.clone()], Strictness::Lenient).is_ok());
        number.custom_ui.max = Some(18.0);
        assert!(matches!(
            check_fields(&[number], Strictness::Lenient),
            Err(ConfigError::InvertedBounds { .. })
        ));
    }

    #[test]
    fn check_requires_array_key_name() {
        let fields = vec![
            FieldConfig::new("links", FieldKind::Array)
                .child(FieldConfig::new("url", FieldKind::Url)),
        ];
        assert_eq!(
            check_fields(&fields, Strictness::Lenient),
            Err(ConfigError::MissingArrayConfig {
                path: "links".into()
            })
        );
        assert!(check_fields(&[links_field()], Strictness::Lenient).is_ok());
    }

    #[test]
    fn unknown_kinds_fail_only_in_strict_mode() {
        let fields = vec![FieldConfig::new("stars", FieldKind::from_token("rating"))];
        assert!(check_fields(&fields, Strictness::Lenient).is_ok());
        assert_eq!(
            check_fields(&fields, Strictness::Strict),
            Err(ConfigError::UnknownType {
                path: "stars".into(),
                token: "rating".into()
            })
        );
    }

    #[test]
    fn item_label_text_and_dynamic() {
        let text = ItemLabel::Text("Link".into());
        assert_eq!(text.render(&Value::Null, 0), "Link #1");

        let dynamic = ItemLabel::Dynamic(Arc::new(|item: &Value, idx: usize| {
            format!("{} ({idx})", item["url"].as_str().unwrap_or("?"))
        }));
        assert_eq!(
            dynamic.render(&json!({"url": "https://a.dev"}), 2),
            "https://a.dev (2)"
        );
    }

    #[test]
    fn empty_values_follow_kind() {
        assert_eq!(FieldConfig::new("a", FieldKind::Text).empty_value(), json!(""));
        assert_eq!(
            FieldConfig::new("a", FieldKind::Switch).empty_value(),
            json!(false)
        );
        assert_eq!(
            FieldConfig::new("a", FieldKind::ImagePicker).empty_value(),
            Value::Null
        );
        assert_eq!(
            FieldConfig::new("a", FieldKind::ImagePicker)
                .multiple(true)
                .empty_value(),
            json!([])
        );
        assert_eq!(
            FieldConfig::new("a", FieldKind::Range)
                .custom_ui(CustomUi::range(10.0, 20.0))
                .empty_value(),
            json!({"from": 10.0, "to": 20.0})
        );
    }
}
