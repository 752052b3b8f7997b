// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Image records exchanged between the picker, its gallery and image fields.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    #[default]
    Gallery,
    Url,
    Upload,
}

/// One image as stored in a form value. `url` is its identity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ImageSource>,
}

impl ImageData {
    pub fn from_url(url: impl Into<String>, source: ImageSource) -> Self {
        Self {
            url: url.into(),
            source: Some(source),
            ..Self::default()
        }
    }

    /// Thumbnail when present, else the full image.
    pub fn preview_uri(&self) -> &str {
        self.thumbnail.as_deref().unwrap_or(&self.url)
    }

    pub fn caption(&self) -> &str {
        self.alt.as_deref().unwrap_or(&self.url)
    }

    /// Accepts full records or bare URL strings.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(url) if !url.is_empty() => Some(Self::from_url(url.clone(), ImageSource::Url)),
            Value::Object(_) => serde_json::from_value(value.clone()).ok(),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Source of ready-made images offered on the picker's gallery tab.
pub trait Gallery {
    fn images(&self) -> Vec<ImageData>;
}

#[derive(Clone, Debug, Default)]
pub struct StaticGallery {
    images: Vec<ImageData>,
}

impl StaticGallery {
    pub fn new(images: Vec<ImageData>) -> Self {
        Self { images }
    }

    /// Parse a JSON array of image records.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut images: Vec<ImageData> =
            serde_json::from_str(json).context("Invalid gallery JSON")?;
        for image in &mut images {
            image.source.get_or_insert(ImageSource::Gallery);
        }
        Ok(Self { images })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read gallery {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Failed to parse gallery {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl Gallery for StaticGallery {
    fn images(&self) -> Vec<ImageData> {
        self.images.clone()
    }
}
