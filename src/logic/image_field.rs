// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Binding between an image-picker field's value and picker selections.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::models::field::FieldConfig;
use crate::models::image::ImageData;

use super::image_picker::{ImageSelection, OpenRequest};

/// Custom merge: `(selection, existing images) -> new field value`.
pub type MergeFn = Arc<dyn Fn(&ImageSelection, &[ImageData]) -> Value + Send + Sync>;

/// How a confirmed selection is folded into the field's current value.
#[derive(Clone)]
pub enum ImageMergePolicy {
    /// The selection becomes the value.
    Replace,
    /// Append images whose URL is not present yet (multiple fields only).
    MergeByUrl,
    Custom(MergeFn),
}

impl ImageMergePolicy {
    /// Default for a field: merge for multiple pickers, replace otherwise.
    pub fn for_field(field: &FieldConfig) -> Self {
        match &field.on_image_select {
            Some(policy) => policy.clone(),
            None if field.multiple => Self::MergeByUrl,
            None => Self::Replace,
        }
    }
}

impl fmt::Debug for ImageMergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => f.write_str("Replace"),
            Self::MergeByUrl => f.write_str("MergeByUrl"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Images currently held by a field value.
pub fn selected_images(value: &Value, multiple: bool) -> Vec<ImageData> {
    match value {
        Value::Array(items) if multiple => items.iter().filter_map(ImageData::from_value).collect(),
        Value::Null => Vec::new(),
        other => ImageData::from_value(other).into_iter().collect(),
    }
}

fn to_field_value(images: Vec<ImageData>, multiple: bool) -> Value {
    if multiple {
        Value::Array(images.iter().map(ImageData::to_value).collect())
    } else {
        images.first().map_or(Value::Null, ImageData::to_value)
    }
}

/// New field value after a confirmed selection.
pub fn apply_selection(
    policy: &ImageMergePolicy,
    multiple: bool,
    existing: &[ImageData],
    selection: ImageSelection,
) -> Value {
    match policy {
        ImageMergePolicy::Custom(merge) => merge(&selection, existing),
        ImageMergePolicy::MergeByUrl if multiple => {
            let mut merged = existing.to_vec();
            for image in selection.into_vec() {
                if !merged.iter().any(|e| e.url == image.url) {
                    merged.push(image);
                }
            }
            to_field_value(merged, true)
        }
        _ => to_field_value(selection.into_vec(), multiple),
    }
}

/// Field value after removing the image at `url`. An emptied list becomes null.
pub fn remove_image(multiple: bool, existing: &[ImageData], url: &str) -> Value {
    if !multiple {
        return Value::Null;
    }
    let remaining: Vec<ImageData> = existing.iter().filter(|i| i.url != url).cloned().collect();
    if remaining.is_empty() {
        Value::Null
    } else {
        to_field_value(remaining, true)
    }
}

/// Whether the field can take more images.
pub fn can_add(field: &FieldConfig, current_count: usize) -> bool {
    if !field.multiple {
        return true;
    }
    field.max_images.is_none_or(|max| current_count < max)
}

/// Images still needed to reach `min_images` on a multiple picker.
pub fn images_missing(field: &FieldConfig, current_count: usize) -> Option<usize> {
    if !field.multiple {
        return None;
    }
    field
        .min_images
        .map(|min| min.saturating_sub(current_count))
        .filter(|&missing| missing > 0)
}

/// Build the picker request for `field` at `path`.
///
/// `deliver` receives the field path and its new value once the user confirms.
pub fn open_request(
    field: &FieldConfig,
    path: &str,
    current: &Value,
    deliver: impl FnOnce(String, Value) + 'static,
) -> OpenRequest {
    let multiple = field.multiple;
    let existing = selected_images(current, multiple);
    let policy = ImageMergePolicy::for_field(field);
    let target = path.to_string();
    let count = existing.len();
    let on_select = move |selection: ImageSelection| {
        let value = apply_selection(&policy, multiple, &existing, selection);
        deliver(target, value);
    };
    if multiple {
        OpenRequest::multiple(path, field.max_images, count, on_select)
    } else {
        OpenRequest::single(path, on_select)
    }
}
