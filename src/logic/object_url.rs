// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! In-memory `blob:` references for uploaded image bytes.
//!
//! [`ObjectUrlStore::create`] hands out an [`ObjectUrl`] guard. Dropping the
//! guard releases the bytes unless it was [`retained`](ObjectUrl::retain),
//! which is how confirmed uploads outlive the picker workspace.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::{Rc, Weak};
use std::sync::Arc;

use serde_json::Value;
use tracing::trace;
use uuid::Uuid;

pub const SCHEME_PREFIX: &str = "blob:dynform/";

struct StoredObject {
    bytes: Arc<[u8]>,
    mime: String,
    retained: bool,
}

type Entries = RefCell<HashMap<String, StoredObject>>;

#[derive(Clone, Default)]
pub struct ObjectUrlStore {
    entries: Rc<Entries>,
}

impl ObjectUrlStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, bytes: Vec<u8>, mime: &str) -> ObjectUrl {
        let url = format!("{SCHEME_PREFIX}{}", Uuid::new_v4());
        self.entries.borrow_mut().insert(
            url.clone(),
            StoredObject {
                bytes: bytes.into(),
                mime: mime.to_string(),
                retained: false,
            },
        );
        trace!(%url, "object url created");
        ObjectUrl {
            url,
            store: Rc::downgrade(&self.entries),
            retained: false,
        }
    }

    pub fn bytes(&self, url: &str) -> Option<Arc<[u8]>> {
        self.entries.borrow().get(url).map(|o| o.bytes.clone())
    }

    pub fn mime(&self, url: &str) -> Option<String> {
        self.entries.borrow().get(url).map(|o| o.mime.clone())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.borrow().contains_key(url)
    }

    /// Release a retained reference once nothing points at it any more.
    pub fn revoke(&self, url: &str) -> bool {
        let removed = self.entries.borrow_mut().remove(url).is_some();
        if removed {
            trace!(%url, "object url revoked");
        }
        removed
    }

    /// Revoke URLs present in `before` that `after` no longer references.
    pub fn release_dropped(&self, before: &BTreeSet<String>, after: &Value) -> usize {
        let kept = collect_object_urls(after);
        before
            .difference(&kept)
            .filter(|url| self.revoke(url))
            .count()
    }

    pub fn live_count(&self) -> usize {
        self.entries.borrow().len()
    }

    /// References still owned by an unconfirmed guard.
    pub fn temporary_count(&self) -> usize {
        self.entries.borrow().values().filter(|o| !o.retained).count()
    }
}

pub fn is_object_url(url: &str) -> bool {
    url.starts_with(SCHEME_PREFIX)
}

/// Every object URL referenced anywhere inside `value`.
pub fn collect_object_urls(value: &Value) -> BTreeSet<String> {
    fn walk(value: &Value, out: &mut BTreeSet<String>) {
        match value {
            Value::String(s) if is_object_url(s) => {
                out.insert(s.clone());
            }
            Value::Array(items) => items.iter().for_each(|v| walk(v, out)),
            Value::Object(map) => map.values().for_each(|v| walk(v, out)),
            _ => {}
        }
    }
    let mut out = BTreeSet::new();
    walk(value, &mut out);
    out
}

/// Owning guard for one object URL.
pub struct ObjectUrl {
    url: String,
    store: Weak<Entries>,
    retained: bool,
}

impl ObjectUrl {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Keep the bytes alive past this guard; returns the URL.
    pub fn retain(mut self) -> String {
        if let Some(entries) = self.store.upgrade()
            && let Some(object) = entries.borrow_mut().get_mut(&self.url)
        {
            object.retained = true;
        }
        self.retained = true;
        std::mem::take(&mut self.url)
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        if self.retained {
            return;
        }
        if let Some(entries) = self.store.upgrade() {
            entries.borrow_mut().remove(&self.url);
            trace!(url = %self.url, "object url released");
        }
    }
}

impl std::fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectUrl")
            .field("url", &self.url)
            .field("retained", &self.retained)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_dropped_keeps_urls_still_referenced() {
        let store = ObjectUrlStore::new();
        let kept = store.create(vec![1], "image/png").retain();
        let dropped = store.create(vec![2], "image/png").retain();
        let before = collect_object_urls(&serde_json::json!({
            "avatar": { "url": kept.clone() },
            "gallery": [{ "url": dropped.clone() }, { "url": kept.clone() }],
        }));
        let after = serde_json::json!({ "avatar": { "url": kept.clone() }, "gallery": [] });

        assert_eq!(store.release_dropped(&before, &after), 1);
        assert!(store.contains(&kept));
        assert!(!store.contains(&dropped));
    }

    #[test]
    fn dropping_guard_releases_bytes() {
        let store = ObjectUrlStore::new();
        let guard = store.create(vec![1, 2, 3], "image/png");
        let url = guard.url().to_string();
        assert!(is_object_url(&url));
        assert_eq!(store.bytes(&url).as_deref(), Some(&[1u8, 2, 3][..]));
        drop(guard);
        assert!(!store.contains(&url));
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn retained_guard_survives_until_revoked() {
        let store = ObjectUrlStore::new();
        let url = store.create(vec![9], "image/jpeg").retain();
        assert!(store.contains(&url));
        assert_eq!(store.temporary_count(), 0);
        assert_eq!(store.mime(&url).as_deref(), Some("image/jpeg"));
        assert!(store.revoke(&url));
        assert!(!store.revoke(&url));
    }

    #[test]
    fn urls_are_unique() {
        let store = ObjectUrlStore::new();
        let a = store.create(vec![], "image/png");
        let b = store.create(vec![], "image/png");
        assert_ne!(a.url(), b.url());
        assert_eq!(store.temporary_count(), 2);
    }

    #[test]
    fn collects_nested_object_urls_only() {
        let value = serde_json::json!({
            "avatar": {"url": "blob:dynform/a"},
            "links": [{"url": "https://x.test"}, {"thumb": "blob:dynform/b"}],
            "note": "blob:elsewhere/c",
        });
        let urls: Vec<String> = collect_object_urls(&value).into_iter().collect();
        assert_eq!(urls, vec!["blob:dynform/a", "blob:dynform/b"]);
    }
}
