// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Repetition controller for array fields.
//!
//! Items carry a generated identity under the array's `key_name`. Keys exist
//! for stable list rendering only; they are stripped from validated output.

use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::field::{ArrayAction, ArrayConfig, FieldConfig, FieldKind};

use super::session::{FormSession, initial_item};

/// Key not used by any item in `items`.
pub(crate) fn fresh_key(items: &[Value], key_name: &str) -> String {
    fresh_key_with(items, key_name, || Uuid::new_v4().to_string())
}

fn fresh_key_with(items: &[Value], key_name: &str, mut generate: impl FnMut() -> String) -> String {
    loop {
        let key = generate();
        let taken = items
            .iter()
            .any(|item| item.get(key_name).and_then(Value::as_str) == Some(key.as_str()));
        if !taken {
            return key;
        }
        debug!(key_name, "identity key collision; regenerating");
    }
}

/// Edits one array field of a session.
pub struct ArrayController<'a> {
    session: &'a mut FormSession,
    path: String,
    field: FieldConfig,
    config: ArrayConfig,
}

impl<'a> ArrayController<'a> {
    pub(crate) fn bind(session: &'a mut FormSession, path: &str) -> Option<Self> {
        let field = session.field_at(path)?.clone();
        if field.kind != FieldKind::Array {
            return None;
        }
        let config = field.array.clone()?;
        session.get_value(path)?;
        Some(Self {
            session,
            path: path.to_string(),
            field,
            config,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn items(&self) -> &[Value] {
        self.session
            .get_value(&self.path)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn item_path(&self, index: usize) -> String {
        format!("{}.{index}", self.path)
    }

    pub fn item_key(&self, index: usize) -> Option<&str> {
        self.items()
            .get(index)?
            .get(&self.config.key_name)?
            .as_str()
    }

    /// Evaluated fresh on each call so it tracks the item's current value.
    pub fn item_label(&self, index: usize) -> Option<String> {
        let item = self.items().get(index)?;
        Some(self.config.item_label.render(item, index))
    }

    /// Append a new item built from the item default. Returns its index.
    pub fn append(&mut self) -> usize {
        let mut items = self.items().to_vec();
        let item = initial_item(
            &self.field,
            self.config.item_default.as_ref(),
            Some(self.config.key_name.as_str()),
            &items,
        );
        if !item.is_object() {
            warn!(path = %self.path, "array item default is not an object; item has no key");
        }
        items.push(item);
        let index = items.len() - 1;
        self.session.set_value(&self.path, Value::Array(items));
        debug!(path = %self.path, index, "array item appended");
        index
    }

    /// Remove the item at `index`. Requires the `remove` action; out of range is a no-op.
    pub fn remove(&mut self, index: usize) -> bool {
        if !self.permits(ArrayAction::Remove) {
            return false;
        }
        let mut items = self.items().to_vec();
        if index >= items.len() {
            return false;
        }
        items.remove(index);
        self.commit(items);
        debug!(path = %self.path, index, "array item removed");
        true
    }

    pub fn move_up(&mut self, index: usize) -> bool {
        if !self.permits(ArrayAction::MoveUp) || index == 0 {
            return false;
        }
        self.swap(index - 1, index)
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        if !self.permits(ArrayAction::MoveDown) {
            return false;
        }
        self.swap(index, index + 1)
    }

    fn swap(&mut self, a: usize, b: usize) -> bool {
        let mut items = self.items().to_vec();
        if b >= items.len() {
            return false;
        }
        items.swap(a, b);
        self.commit(items);
        debug!(path = %self.path, a, b, "array items swapped");
        true
    }

    fn permits(&self, action: ArrayAction) -> bool {
        let allowed = self.config.allows(action);
        if !allowed {
            warn!(path = %self.path, ?action, "array action not enabled");
        }
        allowed
    }

    /// Item positions shift, so errors recorded below the array are stale.
    fn commit(&mut self, items: Vec<Value>) {
        self.session.set_value(&self.path, Value::Array(items));
        self.session.clear_errors_within(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::rules;
    use crate::models::field::ItemLabel;
    use serde_json::json;
    use std::sync::Arc;

    fn links(actions: &[ArrayAction]) -> Vec<FieldConfig> {
        let mut config = ArrayConfig::new("uuid")
            .item_default(json!({"url": "https://", "desc": ""}))
            .item_label(ItemLabel::Text("Link".into()));
        for action in actions {
            config = config.action(*action);
        }
        vec![
            FieldConfig::new("links", FieldKind::Array)
                .array_config(config)
                .child(FieldConfig::new("url", FieldKind::Url).validation(rules::url("Invalid URL")))
                .child(FieldConfig::new("desc", FieldKind::Textarea)),
        ]
    }

    #[test]
    fn append_then_remove_restores_clean_state() {
        let mut session = FormSession::new(links(&[ArrayAction::Remove]), None);
        {
            let mut links = session.array("links").unwrap();
            assert_eq!(links.append(), 0);
            assert_eq!(links.len(), 1);
            assert!(links.item_key(0).is_some());
        }
        assert!(session.is_dirty());
        assert_eq!(session.get_value("links.0.url"), Some(&json!("https://")));

        assert!(session.array("links").unwrap().remove(0));
        assert_eq!(session.get_value("links"), Some(&json!([])));
        assert!(!session.is_dirty());
    }

    #[test]
    fn keys_are_unique_and_never_reused() {
        let mut session = FormSession::new(links(&[ArrayAction::Remove]), None);
        let mut links = session.array("links").unwrap();
        links.append();
        links.append();
        let first = links.item_key(0).unwrap().to_string();
        let second = links.item_key(1).unwrap().to_string();
        assert_ne!(first, second);

        links.remove(0);
        assert_eq!(links.item_key(0), Some(second.as_str()));
        links.append();
        let third = links.item_key(1).unwrap().to_string();
        assert_ne!(third, first);
        assert_ne!(third, second);
    }

    #[test]
    fn collision_regenerates_key() {
        let items = vec![json!({"uuid": "dup"})];
        let mut candidates = vec!["fresh".to_string(), "dup".to_string()];
        let key = fresh_key_with(&items, "uuid", || candidates.pop().unwrap());
        assert_eq!(key, "fresh");
    }

    #[test]
    fn remove_requires_action() {
        let mut session = FormSession::new(links(&[]), None);
        let mut links = session.array("links").unwrap();
        links.append();
        assert!(!links.remove(0));
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn out_of_range_operations_are_noops() {
        let mut session = FormSession::new(
            links(&[ArrayAction::Remove, ArrayAction::MoveUp, ArrayAction::MoveDown]),
            None,
        );
        let mut links = session.array("links").unwrap();
        links.append();
        assert!(!links.remove(5));
        assert!(!links.move_up(0));
        assert!(!links.move_down(0));
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn moves_swap_neighbours_and_keep_keys() {
        let mut session = FormSession::new(
            links(&[ArrayAction::MoveUp, ArrayAction::MoveDown]),
            Some(&json!({"links": [{"uuid": "a", "url": "1"}, {"uuid": "b", "url": "2"}, {"uuid": "c", "url": "3"}]})),
        );
        let mut links = session.array("links").unwrap();
        assert!(links.move_up(2));
        assert!(links.move_down(0));
        let keys: Vec<_> = (0..3).map(|i| links.item_key(i).unwrap().to_string()).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn labels_follow_index_and_value() {
        let mut fields = links(&[]);
        if let Some(array) = fields[0].array.as_mut() {
            array.item_label = ItemLabel::Dynamic(Arc::new(|item: &Value, idx: usize| {
                format!("{}: {}", idx + 1, item["url"].as_str().unwrap_or_default())
            }));
        }
        let mut session = FormSession::new(fields, None);
        session.array("links").unwrap().append();
        session.set_value("links.0.url", json!("https://ada.dev"));
        assert_eq!(
            session.array("links").unwrap().item_label(0).as_deref(),
            Some("1: https://ada.dev")
        );

        let mut plain = FormSession::new(links(&[]), None);
        let mut controller = plain.array("links").unwrap();
        controller.append();
        controller.append();
        assert_eq!(controller.item_label(1).as_deref(), Some("Link #2"));
        assert_eq!(controller.item_path(1), "links.1");
    }

    #[test]
    fn removing_items_clears_shifted_errors() {
        let mut session = FormSession::new(links(&[ArrayAction::Remove]), None);
        session.array("links").unwrap().append();
        session.array("links").unwrap().append();
        session.set_value("links.0.url", json!("bad"));
        let _ = session.submit(|_| {});
        assert!(session.error("links.0.url").is_some());

        session.array("links").unwrap().remove(0);
        assert!(session.error("links.0.url").is_none());
    }

    #[test]
    fn binding_requires_an_array_field() {
        let mut session = FormSession::new(links(&[]), None);
        assert!(session.array("links.0.url").is_none());
        assert!(session.array("missing").is_none());
    }
}
