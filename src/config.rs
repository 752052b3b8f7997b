// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Runtime configuration read from the environment.
//!
//! | Variable           | Meaning                                  | Default          |
//! |--------------------|------------------------------------------|------------------|
//! | `DYNFORM_FORM`     | form definition JSON to open at startup  | built-in demo    |
//! | `DYNFORM_GALLERY`  | gallery JSON for the image picker        | built-in gallery |
//! | `DYNFORM_LOG`      | tracing filter directive                 | `info`           |
//! | `DYNFORM_LOG_JSON` | emit JSON log lines                      | `false`          |

use std::path::PathBuf;

use anyhow::Result;

use crate::models::form_file::{FormDefinition, load_form_definition, parse_form_definition};
use crate::models::image::StaticGallery;

const DEMO_FORM: &str = include_str!("../demos/profile_form.json");
const DEMO_GALLERY: &str = include_str!("../demos/gallery.json");

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub form_path: Option<PathBuf>,
    pub gallery_path: Option<PathBuf>,
    pub log_filter: String,
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            form_path: None,
            gallery_path: None,
            log_filter: "info".into(),
            log_json: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            form_path: get("DYNFORM_FORM").map(PathBuf::from),
            gallery_path: get("DYNFORM_GALLERY").map(PathBuf::from),
            log_filter: get("DYNFORM_LOG").unwrap_or(defaults.log_filter),
            log_json: get("DYNFORM_LOG_JSON")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.log_json),
        }
    }

    /// The configured form, or the embedded demo form.
    pub fn load_form(&self) -> Result<FormDefinition> {
        match &self.form_path {
            Some(path) => load_form_definition(path),
            None => parse_form_definition(DEMO_FORM),
        }
    }

    /// The configured gallery, or the embedded demo gallery.
    pub fn load_gallery(&self) -> Result<StaticGallery> {
        match &self.gallery_path {
            Some(path) => StaticGallery::load(path),
            None => StaticGallery::from_json(DEMO_GALLERY),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn reads_all_variables() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DYNFORM_FORM", "/tmp/form.json"),
            ("DYNFORM_GALLERY", "/tmp/gallery.json"),
            ("DYNFORM_LOG", "dynform=debug"),
            ("DYNFORM_LOG_JSON", "yes"),
        ]));
        assert_eq!(config.form_path, Some(PathBuf::from("/tmp/form.json")));
        assert_eq!(config.gallery_path, Some(PathBuf::from("/tmp/gallery.json")));
        assert_eq!(config.log_filter, "dynform=debug");
        assert!(config.log_json);
    }

    #[test]
    fn blank_and_garbage_values_fall_back() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DYNFORM_FORM", "  "),
            ("DYNFORM_LOG_JSON", "maybe"),
        ]));
        assert!(config.form_path.is_none());
        assert!(!config.log_json);
    }

    #[test]
    fn embedded_demos_load() {
        let config = AppConfig::default();
        let form = config.load_form().unwrap();
        assert!(!form.fields.is_empty());
        let gallery = config.load_gallery().unwrap();
        assert!(!gallery.is_empty());
    }

    #[test]
    fn loads_form_from_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("form.json");
        std::fs::write(
            &path,
            r#"{ "title": "Tiny", "fields": [{ "name": "a", "type": "text" }] }"#,
        )
        .unwrap();

        let config = AppConfig {
            form_path: Some(path),
            ..Default::default()
        };
        let form = config.load_form().unwrap();
        assert_eq!(form.title, "Tiny");
        assert_eq!(form.fields.len(), 1);
    }

    #[test]
    fn missing_gallery_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let config = AppConfig {
            gallery_path: Some(tmp.path().join("absent.json")),
            ..Default::default()
        };
        let err = config.load_gallery().unwrap_err();
        assert!(format!("{err:#}").contains("gallery"));
    }
}
