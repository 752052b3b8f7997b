// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Validation capability and the structural validators composed from field configs.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::path;

/// Message used when a rule fails without saying why.
pub const FALLBACK_MESSAGE: &str = "Invalid value";

/// A single validation capability: accept a value or explain why not.
pub trait Rule: Send + Sync {
    fn check(&self, value: &Value) -> Result<(), String>;
}

impl<F> Rule for F
where
    F: Fn(&Value) -> Result<(), String> + Send + Sync,
{
    fn check(&self, value: &Value) -> Result<(), String> {
        self(value)
    }
}

pub type SharedRule = Arc<dyn Rule>;

/// Validation messages keyed by value path, in discovery order.
///
/// Only the first message recorded for a path is kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, String)>,
}

impl FieldErrors {
    /// Record `message` for `path` unless that path already has one.
    pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) -> bool {
        let path = path.into();
        if self.entries.iter().any(|(p, _)| *p == path) {
            return false;
        }
        let mut message = message.into();
        if message.trim().is_empty() {
            message = FALLBACK_MESSAGE.to_string();
        }
        self.entries.push((path, message));
        true
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, m)| m.as_str())
    }

    pub fn remove(&mut self, path: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(p, _)| p != path);
        before != self.entries.len()
    }

    /// Drop every message at or below `prefix`.
    pub fn remove_within(&mut self, prefix: &str) {
        self.entries.retain(|(p, _)| !path::is_within(p, prefix));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, m)| (p.as_str(), m.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (path, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            if path.is_empty() {
                f.write_str(message)?;
            } else {
                write!(f, "{path}: {message}")?;
            }
        }
        Ok(())
    }
}

/// Validator for one slot of an object shape.
#[derive(Clone)]
pub enum SchemaNode {
    /// Accepts anything, including a missing value.
    Any,
    Rule(SharedRule),
    Object(ObjectValidator),
    Array(ArrayValidator),
}

impl SchemaNode {
    /// Returns the cleaned value, or `None` when an absent slot should stay absent.
    fn check_at(&self, value: Option<&Value>, at: &str, errors: &mut FieldErrors) -> Option<Value> {
        match self {
            Self::Any => value.cloned(),
            Self::Rule(rule) => {
                let value = value.cloned().unwrap_or(Value::Null);
                if let Err(message) = rule.check(&value) {
                    errors.insert(at, message);
                }
                Some(value)
            }
            Self::Object(object) => Some(object.check_at(value.unwrap_or(&Value::Null), at, errors)),
            Self::Array(array) => Some(array.check_at(value.unwrap_or(&Value::Null), at, errors)),
        }
    }
}

impl fmt::Debug for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::Rule(_) => f.write_str("Rule(..)"),
            Self::Object(object) => object.fmt(f),
            Self::Array(array) => array.fmt(f),
        }
    }
}

/// Object shape: declared keys in order, each with its own validator.
///
/// Undeclared keys are stripped from the validated output.
#[derive(Clone, Default)]
pub struct ObjectValidator {
    entries: Vec<(String, SchemaNode)>,
    refinements: Vec<SharedRule>,
}

impl ObjectValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.entries.push((name.into(), node));
        self
    }

    /// Whole-object rule, run after the declared keys are checked.
    pub fn refine(mut self, rule: SharedRule) -> Self {
        self.refinements.push(rule);
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn node(&self, name: &str) -> Option<&SchemaNode> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, n)| n)
    }

    pub fn validate(&self, value: &Value) -> Result<Value, FieldErrors> {
        let mut errors = FieldErrors::default();
        let cleaned = self.check_at(value, "", &mut errors);
        if errors.is_empty() {
            Ok(cleaned)
        } else {
            Err(errors)
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        self.validate(value).is_ok()
    }

    fn check_at(&self, value: &Value, at: &str, errors: &mut FieldErrors) -> Value {
        let Some(input) = value.as_object() else {
            errors.insert(at, "Expected an object");
            return Value::Null;
        };
        let mut output = Map::new();
        for (name, node) in &self.entries {
            let child_path = path::join(Some(at), name);
            if let Some(cleaned) = node.check_at(input.get(name), &child_path, errors) {
                output.insert(name.clone(), cleaned);
            }
        }
        let output = Value::Object(output);
        for rule in &self.refinements {
            if let Err(message) = rule.check(&output) {
                errors.insert(at, message);
            }
        }
        output
    }
}

impl fmt::Debug for ObjectValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, node) in &self.entries {
            map.entry(name, node);
        }
        map.finish()
    }
}

/// List of objects sharing one item shape, plus list-level checks.
#[derive(Clone)]
pub struct ArrayValidator {
    item: ObjectValidator,
    checks: Vec<SharedRule>,
}

impl ArrayValidator {
    pub fn new(item: ObjectValidator) -> Self {
        Self {
            item,
            checks: Vec::new(),
        }
    }

    pub fn item(&self) -> &ObjectValidator {
        &self.item
    }

    pub fn min_items(self, min: usize, message: impl Into<String>) -> Self {
        let message = message.into();
        self.refine(Arc::new(move |value: &Value| {
            let len = value.as_array().map_or(0, Vec::len);
            if len < min { Err(message.clone()) } else { Ok(()) }
        }))
    }

    pub fn max_items(self, max: usize, message: impl Into<String>) -> Self {
        let message = message.into();
        self.refine(Arc::new(move |value: &Value| {
            let len = value.as_array().map_or(0, Vec::len);
            if len > max { Err(message.clone()) } else { Ok(()) }
        }))
    }

    pub fn refine(mut self, rule: SharedRule) -> Self {
        self.checks.push(rule);
        self
    }

    pub fn validate(&self, value: &Value) -> Result<Value, FieldErrors> {
        let mut errors = FieldErrors::default();
        let cleaned = self.check_at(value, "", &mut errors);
        if errors.is_empty() {
            Ok(cleaned)
        } else {
            Err(errors)
        }
    }

    fn check_at(&self, value: &Value, at: &str, errors: &mut FieldErrors) -> Value {
        let Some(items) = value.as_array() else {
            errors.insert(at, "Expected a list");
            return Value::Null;
        };
        let cleaned = Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    self.item
                        .check_at(item, &path::join(Some(at), &i.to_string()), errors)
                })
                .collect(),
        );
        for rule in &self.checks {
            if let Err(message) = rule.check(&cleaned) {
                errors.insert(at, message);
            }
        }
        cleaned
    }
}

impl fmt::Debug for ArrayValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayValidator")
            .field("item", &self.item)
            .field("checks", &self.checks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn non_empty() -> SharedRule {
        Arc::new(|v: &Value| match v.as_str() {
            Some(s) if !s.is_empty() => Ok(()),
            _ => Err("Required".to_string()),
        })
    }

    #[test]
    fn strips_undeclared_keys() {
        let validator = ObjectValidator::new().field("name", SchemaNode::Any);
        let out = validator
            .validate(&json!({"name": "Ada", "extra": true}))
            .unwrap();
        assert_eq!(out, json!({"name": "Ada"}));
    }

    #[test]
    fn any_accepts_missing_and_keeps_it_missing() {
        let validator = ObjectValidator::new().field("note", SchemaNode::Any);
        assert_eq!(validator.validate(&json!({})).unwrap(), json!({}));
    }

    #[test]
    fn rule_sees_missing_as_null() {
        let validator = ObjectValidator::new().field("name", SchemaNode::Rule(non_empty()));
        let errors = validator.validate(&json!({})).unwrap_err();
        assert_eq!(errors.get("name"), Some("Required"));
    }

    #[test]
    fn nested_errors_use_dotted_paths() {
        let item = ObjectValidator::new().field("url", SchemaNode::Rule(non_empty()));
        let validator = ObjectValidator::new()
            .field("links", SchemaNode::Array(ArrayValidator::new(item)))
            .field(
                "profile",
                SchemaNode::Object(ObjectValidator::new().field("bio", SchemaNode::Rule(non_empty()))),
            );
        let errors = validator
            .validate(&json!({"links": [{"url": "a"}, {"url": ""}], "profile": {"bio": ""}}))
            .unwrap_err();
        let paths: Vec<_> = errors.iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["links.1.url", "profile.bio"]);
    }

    #[test]
    fn array_checks_report_at_array_path() {
        let validator = ObjectValidator::new().field(
            "links",
            SchemaNode::Array(
                ArrayValidator::new(ObjectValidator::new()).min_items(1, "At least one link"),
            ),
        );
        let errors = validator.validate(&json!({"links": []})).unwrap_err();
        assert_eq!(errors.get("links"), Some("At least one link"));
        assert!(validator.accepts(&json!({"links": [{}]})));
    }

    #[test]
    fn first_message_per_path_wins() {
        let mut errors = FieldErrors::default();
        assert!(errors.insert("a", "first"));
        assert!(!errors.insert("a", "second"));
        errors.insert("b", "");
        assert_eq!(errors.get("a"), Some("first"));
        assert_eq!(errors.get("b"), Some(FALLBACK_MESSAGE));
    }

    #[test]
    fn remove_within_clears_subtree_only() {
        let mut errors = FieldErrors::default();
        errors.insert("links.0.url", "bad");
        errors.insert("links", "too few");
        errors.insert("name", "required");
        errors.remove_within("links");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.to_string(), "name: required");
    }

    #[test]
    fn object_refinement_runs_on_cleaned_value() {
        let validator = ObjectValidator::new()
            .field("from", SchemaNode::Any)
            .field("to", SchemaNode::Any)
            .refine(Arc::new(|v: &Value| {
                if v["from"].as_f64() <= v["to"].as_f64() {
                    Ok(())
                } else {
                    Err("from must not exceed to".to_string())
                }
            }));
        assert!(validator.accepts(&json!({"from": 1, "to": 2})));
        let errors = validator.validate(&json!({"from": 3, "to": 2})).unwrap_err();
        assert_eq!(errors.get(""), Some("from must not exceed to"));
    }
}
