// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Derive a structural validator from a field list.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tracing::trace;

use crate::models::field::{FieldConfig, FieldKind};

use super::validator::{ArrayValidator, ObjectValidator, SchemaNode};

/// Build the object validator describing `fields`.
///
/// Keys appear in declaration order. Spacers contribute nothing. A field
/// with an explicit rule uses it verbatim; one without accepts anything.
/// Groups validate their children first and then run their own rule on the
/// group object. Arrays validate each item against the children and then
/// apply the array refiner, if any.
pub fn derive_validator(fields: &[FieldConfig]) -> ObjectValidator {
    fields
        .iter()
        .filter(|field| field.kind != FieldKind::Spacer)
        .fold(ObjectValidator::new(), |shape, field| {
            shape.field(field.name.clone(), node_for(field))
        })
}

fn node_for(field: &FieldConfig) -> SchemaNode {
    match field.kind {
        FieldKind::Group => {
            let mut object = derive_validator(&field.fields);
            if let Some(rule) = &field.validation {
                object = object.refine(rule.clone());
            }
            SchemaNode::Object(object)
        }
        FieldKind::Array => {
            let mut array = ArrayValidator::new(derive_validator(&field.fields));
            if let Some(refiner) = field.array.as_ref().and_then(|a| a.refiner.as_ref()) {
                array = refiner(array);
            }
            if let Some(rule) = &field.validation {
                array = array.refine(rule.clone());
            }
            SchemaNode::Array(array)
        }
        _ => match &field.validation {
            Some(rule) => SchemaNode::Rule(rule.clone()),
            None => SchemaNode::Any,
        },
    }
}

/// Memoised derivation keyed by the identity of a shared field list.
///
/// Two `Arc`s pointing at the same allocation share one validator. Entries
/// whose field list has been dropped are pruned on the next derivation.
#[derive(Default)]
pub struct SchemaCache {
    entries: HashMap<usize, (Weak<[FieldConfig]>, Arc<ObjectValidator>)>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn derive(&mut self, fields: &Arc<[FieldConfig]>) -> Arc<ObjectValidator> {
        self.entries.retain(|_, (weak, _)| weak.strong_count() > 0);

        let key = Arc::as_ptr(fields) as *const FieldConfig as usize;
        if let Some((weak, validator)) = self.entries.get(&key)
            && weak.upgrade().is_some_and(|live| Arc::ptr_eq(&live, fields))
        {
            trace!(fields = fields.len(), "schema cache hit");
            return validator.clone();
        }

        let validator = Arc::new(derive_validator(fields));
        self.entries
            .insert(key, (Arc::downgrade(fields), validator.clone()));
        trace!(fields = fields.len(), "schema derived");
        validator
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
