// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Live state of one rendered form.
//!
//! A session owns the value tree, the immutable snapshot it started from and
//! the error set of the last submission. Dirty tracking is a structural
//! comparison against the snapshot, so editing a value back to its initial
//! state makes the form clean again.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::models::field::{FieldConfig, FieldKind, find_field};

use super::array::{ArrayController, fresh_key};
use super::path;
use super::schema::{SchemaCache, derive_validator};
use super::validator::{FieldErrors, ObjectValidator};

pub struct FormSession {
    fields: Arc<[FieldConfig]>,
    validator: Arc<ObjectValidator>,
    values: Value,
    snapshot: Value,
    errors: FieldErrors,
}

impl FormSession {
    /// Start a session. `initial` is deep-copied; caller data is never aliased.
    pub fn new(fields: impl Into<Arc<[FieldConfig]>>, initial: Option<&Value>) -> Self {
        let fields = fields.into();
        let validator = Arc::new(derive_validator(&fields));
        Self::build(fields, validator, initial)
    }

    /// Like [`FormSession::new`], reusing validators derived for the same field list.
    pub fn with_cache(
        fields: Arc<[FieldConfig]>,
        initial: Option<&Value>,
        cache: &mut SchemaCache,
    ) -> Self {
        let validator = cache.derive(&fields);
        Self::build(fields, validator, initial)
    }

    fn build(fields: Arc<[FieldConfig]>, validator: Arc<ObjectValidator>, initial: Option<&Value>) -> Self {
        let values = initial_object(&fields, initial);
        debug!(fields = fields.len(), "form session created");
        Self {
            fields,
            validator,
            snapshot: values.clone(),
            values,
            errors: FieldErrors::default(),
        }
    }

    pub fn fields(&self) -> &[FieldConfig] {
        &self.fields
    }

    pub fn shared_fields(&self) -> Arc<[FieldConfig]> {
        self.fields.clone()
    }

    pub fn validator(&self) -> &ObjectValidator {
        &self.validator
    }

    pub fn field_at(&self, value_path: &str) -> Option<&FieldConfig> {
        find_field(&self.fields, value_path)
    }

    pub fn values(&self) -> &Value {
        &self.values
    }

    pub fn snapshot(&self) -> &Value {
        &self.snapshot
    }

    pub fn get_value(&self, value_path: &str) -> Option<&Value> {
        path::get(&self.values, value_path)
    }

    /// Write one slot and clear its recorded error. Unaddressable paths are ignored.
    pub fn set_value(&mut self, value_path: &str, value: Value) -> bool {
        if !path::set(&mut self.values, value_path, value) {
            debug!(path = value_path, "set_value ignored: path not addressable");
            return false;
        }
        self.errors.remove(value_path);
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.values != self.snapshot
    }

    /// Submit is offered only for edited forms.
    pub fn can_submit(&self) -> bool {
        self.is_dirty()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, value_path: &str) -> Option<&str> {
        self.errors.get(value_path)
    }

    pub(crate) fn clear_errors_within(&mut self, value_path: &str) {
        self.errors.remove_within(value_path);
    }

    /// Validate the current values.
    ///
    /// On success `handler` runs exactly once with the cleaned value, which is
    /// also returned. On failure the errors replace the recorded set and
    /// `handler` is not called.
    pub fn submit<F>(&mut self, handler: F) -> Result<Value, FieldErrors>
    where
        F: FnOnce(&Value),
    {
        match self.validator.validate(&self.values) {
            Ok(value) => {
                self.errors.clear();
                info!("form submitted");
                handler(&value);
                Ok(value)
            }
            Err(errors) => {
                debug!(count = errors.len(), "form submission rejected");
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    /// Back to the initial snapshot with no errors.
    pub fn reset(&mut self) {
        self.values = self.snapshot.clone();
        self.errors.clear();
        debug!("form session reset");
    }

    /// Restore one slot (and everything below it) to its initial value.
    pub fn reset_path(&mut self, value_path: &str) -> bool {
        let Some(initial) = path::get(&self.snapshot, value_path).cloned() else {
            return false;
        };
        if !path::set(&mut self.values, value_path, initial) {
            return false;
        }
        self.errors.remove_within(value_path);
        debug!(path = value_path, "form slot reset");
        true
    }

    /// Controller for the array field bound at `value_path`.
    pub fn array(&mut self, value_path: &str) -> Option<ArrayController<'_>> {
        ArrayController::bind(self, value_path)
    }
}

impl std::fmt::Debug for FormSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormSession")
            .field("values", &self.values)
            .field("dirty", &self.is_dirty())
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

/// Initial object for a field list: provided value, then default, then the kind's empty value.
pub(crate) fn initial_object(fields: &[FieldConfig], provided: Option<&Value>) -> Value {
    let provided = provided.and_then(Value::as_object);
    let mut map = Map::new();
    for field in fields.iter().filter(|f| f.kind != FieldKind::Spacer) {
        let value = initial_value(field, provided.and_then(|p| p.get(&field.name)));
        map.insert(field.name.clone(), value);
    }
    Value::Object(map)
}

fn initial_value(field: &FieldConfig, provided: Option<&Value>) -> Value {
    let source = provided.or(field.default_value.as_ref());
    match field.kind {
        FieldKind::Group => initial_object(&field.fields, source),
        FieldKind::Array => {
            let Some(items) = source.and_then(Value::as_array) else {
                return Value::Array(Vec::new());
            };
            let key_name = field.array.as_ref().map(|a| a.key_name.as_str());
            let mut seeded: Vec<Value> = Vec::with_capacity(items.len());
            for item in items {
                let next = initial_item(field, Some(item), key_name, &seeded);
                seeded.push(next);
            }
            Value::Array(seeded)
        }
        _ => source.cloned().unwrap_or_else(|| field.empty_value()),
    }
}

/// One array item: child slots filled in, extra keys kept, identity key assigned.
pub(crate) fn initial_item(
    array_field: &FieldConfig,
    source: Option<&Value>,
    key_name: Option<&str>,
    siblings: &[Value],
) -> Value {
    let mut item = initial_object(&array_field.fields, source);
    if let (Value::Object(filled), Some(Value::Object(original))) = (&mut item, source) {
        for (key, value) in original {
            filled.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
    if let (Value::Object(map), Some(key_name)) = (&mut item, key_name)
        && !map.get(key_name).is_some_and(|k| k.as_str().is_some_and(|k| !k.is_empty()))
    {
        map.insert(key_name.to_string(), Value::String(fresh_key(siblings, key_name)));
    }
    item
}
