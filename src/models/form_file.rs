// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! JSON form definitions.
//! Parsing is kept pure so definitions can come from disk, a dialog or the embedded demo.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::logic::image_field::ImageMergePolicy;
use crate::logic::rules::{self, RuleSet};
use crate::logic::validator::SharedRule;

use super::field::{
    ActionHint, ArrayAction, ArrayConfig, CustomUi, FieldConfig, FieldKind, ItemLabel,
    SelectOption, Strictness, check_fields,
};

/// A parsed, checked form ready for a session.
#[derive(Clone, Debug)]
pub struct FormDefinition {
    pub title: String,
    pub fields: Vec<FieldConfig>,
    pub initial_values: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct FormFileRaw {
    #[serde(default)]
    title: Option<String>,
    fields: Vec<FieldRaw>,
    #[serde(default, alias = "initialValues")]
    initial_values: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct FieldRaw {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    placeholder: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "defaultValue")]
    default_value: Option<Value>,
    #[serde(default)]
    rules: Vec<RuleRaw>,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    fields: Vec<FieldRaw>,
    #[serde(default)]
    array: Option<ArrayRaw>,
    #[serde(default, alias = "customUI")]
    custom_ui: Option<CustomUiRaw>,
    #[serde(default)]
    options: Vec<SelectOption>,
    #[serde(default)]
    disabled: bool,
    #[serde(default, alias = "readOnly")]
    read_only: bool,
    #[serde(default)]
    multiple: bool,
    #[serde(default, alias = "maxImages")]
    max_images: Option<usize>,
    #[serde(default, alias = "minImages")]
    min_images: Option<usize>,
    /// `"replace"` or `"merge"`.
    #[serde(default)]
    merge: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArrayRaw {
    #[serde(alias = "keyName")]
    key_name: String,
    #[serde(default)]
    actions: Vec<String>,
    #[serde(default, alias = "itemDefaultValue")]
    item_default: Option<Value>,
    #[serde(default, alias = "itemLabel")]
    item_label: Option<String>,
    #[serde(default)]
    rules: Vec<RuleRaw>,
}

#[derive(Debug, Default, Deserialize)]
struct CustomUiRaw {
    min: Option<f64>,
    max: Option<f64>,
    step: Option<f64>,
    #[serde(alias = "minHeight")]
    min_height: Option<f32>,
    #[serde(alias = "maxHeight")]
    max_height: Option<f32>,
    span: Option<u8>,
    prefix: Option<String>,
    suffix: Option<String>,
    unit: Option<String>,
    #[serde(default)]
    actions: Vec<ActionHint>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Declarative rule entries; `message` overrides the default wording.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RuleRaw {
    Required { message: Option<String> },
    Accepted { message: Option<String> },
    MinLength { value: usize, message: Option<String> },
    MaxLength { value: usize, message: Option<String> },
    Email { message: Option<String> },
    Url { message: Option<String> },
    Number { message: Option<String> },
    Integer { message: Option<String> },
    Min { value: f64, message: Option<String> },
    Max { value: f64, message: Option<String> },
    MinItems { value: usize, message: Option<String> },
    MaxItems { value: usize, message: Option<String> },
    OneOf { values: Vec<Value>, message: Option<String> },
    Date { message: Option<String> },
    #[serde(alias = "datetime")]
    DateTime { message: Option<String> },
    Time { message: Option<String> },
    OrderedRange { message: Option<String> },
}

impl RuleRaw {
    fn into_rule(self) -> SharedRule {
        fn msg(message: Option<String>, fallback: String) -> String {
            message.unwrap_or(fallback)
        }
        match self {
            Self::Required { message } => rules::required(msg(message, "This field is required".into())),
            Self::Accepted { message } => rules::accepted(msg(message, "This must be accepted".into())),
            Self::MinLength { value, message } => rules::min_length(
                value,
                msg(message, format!("Must be at least {value} characters")),
            ),
            Self::MaxLength { value, message } => rules::max_length(
                value,
                msg(message, format!("Must be at most {value} characters")),
            ),
            Self::Email { message } => rules::email(msg(message, "Invalid email address".into())),
            Self::Url { message } => rules::url(msg(message, "Invalid URL".into())),
            Self::Number { message } => rules::number(msg(message, "Must be a number".into())),
            Self::Integer { message } => rules::integer(msg(message, "Must be a whole number".into())),
            Self::Min { value, message } => {
                rules::min(value, msg(message, format!("Must be at least {value}")))
            }
            Self::Max { value, message } => {
                rules::max(value, msg(message, format!("Must be at most {value}")))
            }
            Self::MinItems { value, message } => {
                rules::min_items(value, msg(message, format!("Select at least {value}")))
            }
            Self::MaxItems { value, message } => {
                rules::max_items(value, msg(message, format!("Select at most {value}")))
            }
            Self::OneOf { values, message } => {
                rules::one_of(values, msg(message, "Choose one of the options".into()))
            }
            Self::Date { message } => rules::date(msg(message, "Invalid date".into())),
            Self::DateTime { message } => rules::datetime(msg(message, "Invalid date and time".into())),
            Self::Time { message } => rules::time(msg(message, "Invalid time".into())),
            Self::OrderedRange { message } => {
                rules::ordered_range(msg(message, "Start must not exceed end".into()))
            }
        }
    }
}

fn rule_set(raw: Vec<RuleRaw>) -> Option<RuleSet> {
    if raw.is_empty() {
        return None;
    }
    Some(RuleSet::new(raw.into_iter().map(RuleRaw::into_rule).collect()))
}

fn item_label(raw: Option<String>) -> ItemLabel {
    match raw {
        Some(template) if template.contains("{index}") => {
            ItemLabel::Dynamic(Arc::new(move |_item: &Value, index: usize| {
                template.replace("{index}", &(index + 1).to_string())
            }))
        }
        Some(text) => ItemLabel::Text(text),
        None => ItemLabel::default(),
    }
}

fn convert_array(raw: ArrayRaw, path: &str) -> Result<ArrayConfig> {
    let mut config = ArrayConfig::new(raw.key_name);
    for token in &raw.actions {
        let action = ArrayAction::from_token(token)
            .with_context(|| format!("Unknown array action '{token}' on '{path}'"))?;
        config = config.action(action);
    }
    config.item_default = raw.item_default;
    config.item_label = item_label(raw.item_label);
    if let Some(set) = rule_set(raw.rules) {
        let rule = set.into_shared();
        config = config.refine(move |array| array.refine(rule.clone()));
    }
    Ok(config)
}

fn convert_custom_ui(raw: CustomUiRaw) -> CustomUi {
    CustomUi {
        min: raw.min,
        max: raw.max,
        step: raw.step,
        min_height: raw.min_height,
        max_height: raw.max_height,
        span: raw.span,
        prefix: raw.prefix,
        suffix: raw.suffix,
        unit: raw.unit,
        actions: raw.actions,
        extra: raw.extra,
    }
}

fn convert_field(raw: FieldRaw, parent: Option<&str>) -> Result<FieldConfig> {
    let path = crate::logic::path::join(parent, &raw.name);
    let kind = FieldKind::from_token(&raw.kind);

    let mut field = FieldConfig::new(raw.name, kind);
    field.label = raw.label;
    field.placeholder = raw.placeholder;
    field.description = raw.description;
    field.default_value = raw.default_value;
    field.options = raw.options;
    field.disabled = raw.disabled;
    field.read_only = raw.read_only;
    field.multiple = raw.multiple;
    field.max_images = raw.max_images;
    field.min_images = raw.min_images;
    field.custom_ui = raw.custom_ui.map(convert_custom_ui).unwrap_or_default();

    field.validation = rule_set(raw.rules).map(|set| {
        let rule = set.into_shared();
        if raw.optional { rules::optional(rule) } else { rule }
    });

    field.on_image_select = match raw.merge.as_deref() {
        None => None,
        Some("replace") => Some(ImageMergePolicy::Replace),
        Some("merge") => Some(ImageMergePolicy::MergeByUrl),
        Some(other) => anyhow::bail!("Unknown merge policy '{other}' on '{path}'"),
    };

    if let Some(array) = raw.array {
        field.array = Some(convert_array(array, &path)?);
    }
    field.fields = raw
        .fields
        .into_iter()
        .map(|child| convert_field(child, Some(&path)))
        .collect::<Result<_>>()?;
    Ok(field)
}

/// Parse and check a JSON form definition.
///
/// # Errors
///
/// Fails on malformed JSON, unknown rule kinds, unknown array actions and
/// structural problems reported by [`check_fields`].
pub fn parse_form_definition(json: &str) -> Result<FormDefinition> {
    let raw: FormFileRaw = serde_json::from_str(json).context("Invalid form definition JSON")?;
    let fields = raw
        .fields
        .into_iter()
        .map(|field| convert_field(field, None))
        .collect::<Result<Vec<_>>>()?;
    check_fields(&fields, Strictness::Lenient).context("Invalid form definition")?;
    Ok(FormDefinition {
        title: raw.title.unwrap_or_else(|| "Dynamic form".to_string()),
        fields,
        initial_values: raw.initial_values,
    })
}

pub fn load_form_definition(path: &Path) -> Result<FormDefinition> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read form definition {}", path.display()))?;
    parse_form_definition(&json)
        .with_context(|| format!("Failed to load form definition {}", path.display()))
}
