// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Turn field configs plus session state into a renderable description.
//!
//! Resolution is read-only: it looks at the session but never changes it.
//! Leaf kinds are dispatched through a [`WidgetRegistry`], so supporting a
//! new widget is a registry entry. Kinds without an entry, and unknown kinds,
//! resolve to nothing.

use std::collections::HashMap;

use serde_json::Value;
use tracing::trace;

use crate::models::field::{ArrayAction, FieldConfig, FieldKind, ItemLabel};

use super::path;
use super::session::FormSession;

/// Maps leaf kinds to a widget handle `W`.
#[derive(Clone, Debug)]
pub struct WidgetRegistry<W> {
    widgets: HashMap<FieldKind, W>,
}

impl<W> Default for WidgetRegistry<W> {
    fn default() -> Self {
        Self {
            widgets: HashMap::new(),
        }
    }
}

impl<W> WidgetRegistry<W> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: FieldKind, widget: W) -> &mut Self {
        self.widgets.insert(kind, widget);
        self
    }

    pub fn with(mut self, kind: FieldKind, widget: W) -> Self {
        self.widgets.insert(kind, widget);
        self
    }

    pub fn get(&self, kind: &FieldKind) -> Option<&W> {
        self.widgets.get(kind)
    }

    pub fn contains(&self, kind: &FieldKind) -> bool {
        self.widgets.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

/// Trailing action rendered on a group or array item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupAction {
    Remove { array: String, index: usize },
    MoveUp { array: String, index: usize },
    MoveDown { array: String, index: usize },
    /// Caller-defined button from `custom_ui.actions`.
    Custom { path: String, id: String, label: String },
}

#[derive(Debug)]
pub struct ResolvedLeaf<'a, W> {
    pub path: String,
    pub config: &'a FieldConfig,
    pub value: Value,
    pub error: Option<String>,
    pub widget: W,
}

#[derive(Debug)]
pub struct ResolvedGroup<'a, W> {
    pub path: String,
    pub title: Option<String>,
    pub config: &'a FieldConfig,
    pub children: Vec<ResolvedField<'a, W>>,
    pub actions: Vec<GroupAction>,
    /// Message from the group's own rule.
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct ResolvedArray<'a, W> {
    pub path: String,
    pub label: Option<String>,
    pub config: &'a FieldConfig,
    pub items: Vec<ResolvedGroup<'a, W>>,
    pub can_add: bool,
    /// Message from list-level checks such as item counts.
    pub error: Option<String>,
}

#[derive(Debug)]
pub enum ResolvedField<'a, W> {
    Leaf(ResolvedLeaf<'a, W>),
    Group(ResolvedGroup<'a, W>),
    Array(ResolvedArray<'a, W>),
    Spacer { span: u8 },
}

impl<W> ResolvedField<'_, W> {
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Leaf(leaf) => Some(&leaf.path),
            Self::Group(group) => Some(&group.path),
            Self::Array(array) => Some(&array.path),
            Self::Spacer { .. } => None,
        }
    }

    /// Paths of every leaf below this node, depth first.
    pub fn leaf_paths(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaf_paths(&mut out);
        out
    }

    fn collect_leaf_paths<'s>(&'s self, out: &mut Vec<&'s str>) {
        match self {
            Self::Leaf(leaf) => out.push(&leaf.path),
            Self::Group(group) => group.children.iter().for_each(|c| c.collect_leaf_paths(out)),
            Self::Array(array) => array
                .items
                .iter()
                .flat_map(|item| item.children.iter())
                .for_each(|c| c.collect_leaf_paths(out)),
            Self::Spacer { .. } => {}
        }
    }
}

/// Resolve one field under `parent`.
pub fn resolve<'a, W: Clone>(
    field: &'a FieldConfig,
    parent: Option<&str>,
    session: &FormSession,
    registry: &WidgetRegistry<W>,
) -> Option<ResolvedField<'a, W>> {
    let field_path = path::join(parent, &field.name);
    match &field.kind {
        FieldKind::Unknown(token) => {
            trace!(path = %field_path, %token, "skipping field of unknown type");
            None
        }
        FieldKind::Spacer => Some(ResolvedField::Spacer {
            span: field.custom_ui.span.unwrap_or(1),
        }),
        FieldKind::Group => Some(ResolvedField::Group(resolve_group(
            field,
            field_path,
            field.label.clone(),
            Vec::new(),
            session,
            registry,
        ))),
        FieldKind::Array => Some(ResolvedField::Array(resolve_array(
            field, field_path, session, registry,
        ))),
        kind => {
            let Some(widget) = registry.get(kind) else {
                trace!(path = %field_path, %kind, "no widget registered");
                return None;
            };
            Some(ResolvedField::Leaf(ResolvedLeaf {
                value: session.get_value(&field_path).cloned().unwrap_or(Value::Null),
                error: session.error(&field_path).map(str::to_string),
                widget: widget.clone(),
                config: field,
                path: field_path,
            }))
        }
    }
}

/// Resolve every top-level field of the session's form.
pub fn resolve_form<'a, W: Clone>(
    session: &'a FormSession,
    registry: &WidgetRegistry<W>,
) -> Vec<ResolvedField<'a, W>> {
    session
        .fields()
        .iter()
        .filter_map(|field| resolve(field, None, session, registry))
        .collect()
}

fn resolve_group<'a, W: Clone>(
    config: &'a FieldConfig,
    group_path: String,
    title: Option<String>,
    mut actions: Vec<GroupAction>,
    session: &FormSession,
    registry: &WidgetRegistry<W>,
) -> ResolvedGroup<'a, W> {
    let children = config
        .fields
        .iter()
        .filter_map(|child| resolve(child, Some(&group_path), session, registry))
        .collect();
    let custom = config.custom_ui.actions.iter().map(|hint| GroupAction::Custom {
        path: group_path.clone(),
        id: hint.id.clone(),
        label: hint.label.clone(),
    });
    let mut all: Vec<GroupAction> = custom.collect();
    all.append(&mut actions);
    ResolvedGroup {
        error: session.error(&group_path).map(str::to_string),
        title,
        config,
        children,
        actions: all,
        path: group_path,
    }
}

fn resolve_array<'a, W: Clone>(
    config: &'a FieldConfig,
    array_path: String,
    session: &FormSession,
    registry: &WidgetRegistry<W>,
) -> ResolvedArray<'a, W> {
    let items: &[Value] = session
        .get_value(&array_path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let fallback_label = ItemLabel::default();
    let label_for = config
        .array
        .as_ref()
        .map_or(&fallback_label, |a| &a.item_label);
    let allows = |action: ArrayAction| config.array.as_ref().is_some_and(|a| a.allows(action));
    let len = items.len();

    let resolved = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let mut actions = Vec::new();
            if allows(ArrayAction::MoveUp) && index > 0 {
                actions.push(GroupAction::MoveUp {
                    array: array_path.clone(),
                    index,
                });
            }
            if allows(ArrayAction::MoveDown) && index + 1 < len {
                actions.push(GroupAction::MoveDown {
                    array: array_path.clone(),
                    index,
                });
            }
            if allows(ArrayAction::Remove) {
                actions.push(GroupAction::Remove {
                    array: array_path.clone(),
                    index,
                });
            }
            resolve_group(
                config,
                format!("{array_path}.{index}"),
                Some(label_for.render(item, index)),
                actions,
                session,
                registry,
            )
        })
        .collect();

    ResolvedArray {
        label: config.label.clone(),
        error: session.error(&array_path).map(str::to_string),
        // Appending is never gated by `actions`; only locking hides it.
        can_add: !config.is_locked(),
        config,
        items: resolved,
        path: array_path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::rules;
    use crate::models::field::{ActionHint, ArrayConfig, CustomUi};
    use serde_json::json;

    fn registry() -> WidgetRegistry<&'static str> {
        WidgetRegistry::new()
            .with(FieldKind::Text, "text")
            .with(FieldKind::Email, "email")
            .with(FieldKind::Url, "url")
            .with(FieldKind::Textarea, "textarea")
    }

    fn fields() -> Vec<FieldConfig> {
        vec![
            FieldConfig::new("name", FieldKind::Text)
                .validation(rules::min_length(2, "Too short")),
            FieldConfig::new("stars", FieldKind::from_token("rating")),
            FieldConfig::new("color", FieldKind::Color),
            FieldConfig::new("gap", FieldKind::Spacer).custom_ui(CustomUi {
                span: Some(2),
                ..CustomUi::default()
            }),
            FieldConfig::new("profile", FieldKind::Group)
                .label("Profile")
                .custom_ui(CustomUi {
                    actions: vec![ActionHint {
                        id: "clear".into(),
                        label: "Clear".into(),
                    }],
                    ..CustomUi::default()
                })
                .child(FieldConfig::new("bio", FieldKind::Textarea))
                .child(FieldConfig::new("website", FieldKind::Url)),
            FieldConfig::new("links", FieldKind::Array)
                .label("Links")
                .array_config(
                    ArrayConfig::new("uuid")
                        .action(ArrayAction::Remove)
                        .action(ArrayAction::MoveUp)
                        .item_label(ItemLabel::Text("Link".into())),
                )
                .child(FieldConfig::new("url", FieldKind::Url))
                .child(FieldConfig::new("desc", FieldKind::Textarea)),
        ]
    }

    #[test]
    fn unknown_and_unregistered_kinds_resolve_to_nothing() {
        let session = FormSession::new(fields(), None);
        let resolved = resolve_form(&session, &registry());
        let paths: Vec<_> = resolved.iter().filter_map(ResolvedField::path).collect();
        assert_eq!(paths, vec!["name", "profile", "links"]);
        assert!(matches!(resolved[1], ResolvedField::Spacer { span: 2 }));
    }

    #[test]
    fn group_children_use_group_path() {
        let session = FormSession::new(fields(), None);
        let resolved = resolve_form(&session, &registry());
        let ResolvedField::Group(group) = &resolved[2] else {
            panic!("expected group");
        };
        assert_eq!(group.title.as_deref(), Some("Profile"));
        assert_eq!(resolved[2].leaf_paths(), vec!["profile.bio", "profile.website"]);
        assert_eq!(
            group.actions,
            vec![GroupAction::Custom {
                path: "profile".into(),
                id: "clear".into(),
                label: "Clear".into()
            }]
        );
    }

    #[test]
    fn appending_follows_lock_state_not_declared_actions() {
        let mut fields = fields();
        let links = fields.iter().position(|f| f.name == "links").unwrap();
        assert!(!fields[links].array.as_ref().unwrap().allows(ArrayAction::Add));
        let session = FormSession::new(fields.clone(), None);
        let resolved = resolve_form(&session, &registry());
        let ResolvedField::Array(array) = &resolved[3] else {
            panic!("expected array");
        };
        assert!(array.can_add);

        fields[links].disabled = true;
        let session = FormSession::new(fields, None);
        let resolved = resolve_form(&session, &registry());
        let ResolvedField::Array(array) = &resolved[3] else {
            panic!("expected array");
        };
        assert!(!array.can_add);
    }

    #[test]
    fn array_items_become_labelled_groups_with_gated_actions() {
        let mut session = FormSession::new(fields(), None);
        session.array("links").unwrap().append();
        session.array("links").unwrap().append();

        let resolved = resolve_form(&session, &registry());
        let ResolvedField::Array(array) = &resolved[3] else {
            panic!("expected array");
        };
        assert!(array.can_add);
        assert_eq!(array.items.len(), 2);
        assert_eq!(array.items[0].path, "links.0");
        assert_eq!(array.items[1].title.as_deref(), Some("Link #2"));
        assert_eq!(
            resolved[3].leaf_paths(),
            vec!["links.0.url", "links.0.desc", "links.1.url", "links.1.desc"]
        );
        assert_eq!(
            array.items[0].actions,
            vec![GroupAction::Remove {
                array: "links".into(),
                index: 0
            }]
        );
        assert_eq!(
            array.items[1].actions,
            vec![
                GroupAction::MoveUp {
                    array: "links".into(),
                    index: 1
                },
                GroupAction::Remove {
                    array: "links".into(),
                    index: 1
                }
            ]
        );
    }

    #[test]
    fn leaves_carry_value_and_error() {
        let mut session = FormSession::new(fields(), Some(&json!({"name": "A"})));
        let _ = session.submit(|_| {});
        let leaf = resolve(&session.fields()[0], None, &session, &registry());
        let Some(ResolvedField::Leaf(leaf)) = leaf else {
            panic!("expected leaf");
        };
        assert_eq!(leaf.widget, "text");
        assert_eq!(leaf.value, json!("A"));
        assert_eq!(leaf.error.as_deref(), Some("Too short"));
    }

    #[test]
    fn resolution_does_not_mutate_session() {
        let session = FormSession::new(fields(), None);
        let before = session.values().clone();
        let _ = resolve_form(&session, &registry());
        assert_eq!(session.values(), &before);
        assert!(!session.is_dirty());
    }
}
