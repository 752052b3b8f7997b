// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Values for the file and image uploader kinds.
//!
//! File uploaders hold a list of `{name, size, mime, sha256}` records. Image
//! uploaders hold image records whose bytes live in the object URL store.

use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::models::field::FieldKind;
use crate::models::image::{ImageData, ImageSource};
use crate::utils::hash_bytes;

use super::image_picker::{UploadFile, accept_images, probe_dimensions};
use super::object_url::ObjectUrlStore;

/// Outcome of attaching files to an uploader field.
#[derive(Debug, PartialEq)]
pub struct Attached {
    pub value: Value,
    pub added: usize,
    pub skipped: Vec<String>,
}

/// Read files picked on disk. Unreadable paths are reported, not fatal.
pub fn read_upload_files(paths: &[PathBuf]) -> (Vec<UploadFile>, Vec<String>) {
    let mut files = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();
    for path in paths {
        match std::fs::read(path) {
            Ok(bytes) => files.push(UploadFile {
                name: display_name(path),
                mime: Some(guess_mime(path)),
                bytes,
            }),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read upload");
                failures.push(format!("{}: {err}", display_name(path)));
            }
        }
    }
    (files, failures)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub(crate) fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Metadata record stored for a plain file upload.
pub fn file_record(file: &UploadFile) -> Value {
    json!({
        "name": file.name,
        "size": file.bytes.len(),
        "mime": file.effective_mime(),
        "sha256": hash_bytes(&file.bytes),
    })
}

/// Register an image upload in `store` and describe it. The reference is retained.
pub fn image_record(store: &ObjectUrlStore, file: UploadFile) -> Result<ImageData, String> {
    accept_images(&file)?;
    let (width, height) = probe_dimensions(&file.bytes)
        .map_err(|_| format!("{} could not be read as an image", file.name))?;
    let mime = file.effective_mime();
    let sha256 = hash_bytes(&file.bytes);
    let size = file.bytes.len() as u64;
    let url = store.create(file.bytes, &mime).retain();
    Ok(ImageData {
        id: Some(sha256),
        url,
        alt: Some(file.name),
        width: Some(width),
        height: Some(height),
        size: Some(size),
        format: mime.strip_prefix("image/").map(str::to_string),
        source: Some(ImageSource::Upload),
        ..ImageData::default()
    })
}

/// Append `files` to an uploader field's list, skipping duplicates by content hash.
pub fn attach(
    kind: &FieldKind,
    existing: &Value,
    files: Vec<UploadFile>,
    store: &ObjectUrlStore,
) -> Attached {
    let mut items = existing.as_array().cloned().unwrap_or_default();
    let mut known: Vec<String> = items
        .iter()
        .filter_map(|item| {
            item.get("sha256")
                .or_else(|| item.get("id"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .collect();
    let mut added = 0;
    let mut skipped = Vec::new();

    for file in files {
        let digest = hash_bytes(&file.bytes);
        if known.contains(&digest) {
            skipped.push(format!("{} is already attached", file.name));
            continue;
        }
        let entry = match kind {
            FieldKind::ImageUploader => image_record(store, file).map(|image| image.to_value()),
            _ => Ok(file_record(&file)),
        };
        match entry {
            Ok(entry) => {
                items.push(entry);
                known.push(digest);
                added += 1;
            }
            Err(reason) => skipped.push(reason),
        }
    }
    debug!(added, skipped = skipped.len(), "files attached");
    Attached {
        value: Value::Array(items),
        added,
        skipped,
    }
}

/// Human-readable byte size with binary units.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn png(shade: u8) -> Vec<u8> {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(5, 2, Rgba([shade, shade, 0, 255]));
        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, ImageFormat::Png).unwrap();
        cursor.into_inner()
    }

    fn text_file(name: &str, body: &str) -> UploadFile {
        UploadFile {
            name: name.into(),
            mime: None,
            bytes: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn file_records_carry_digest_and_mime() {
        let record = file_record(&text_file("notes.txt", "abc"));
        assert_eq!(record["name"], json!("notes.txt"));
        assert_eq!(record["size"], json!(3));
        assert_eq!(record["mime"], json!("text/plain"));
        assert_eq!(
            record["sha256"],
            json!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }

    #[test]
    fn attaching_skips_duplicate_content() {
        let store = ObjectUrlStore::new();
        let first = attach(
            &FieldKind::FileUploader,
            &json!([]),
            vec![text_file("a.txt", "same"), text_file("b.txt", "other")],
            &store,
        );
        assert_eq!(first.added, 2);

        let second = attach(
            &FieldKind::FileUploader,
            &first.value,
            vec![text_file("copy.txt", "same")],
            &store,
        );
        assert_eq!(second.added, 0);
        assert_eq!(second.skipped, vec!["copy.txt is already attached".to_string()]);
        assert_eq!(second.value.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn image_uploads_are_retained_in_the_store() {
        let store = ObjectUrlStore::new();
        let attached = attach(
            &FieldKind::ImageUploader,
            &Value::Null,
            vec![
                UploadFile {
                    name: "dot.png".into(),
                    mime: None,
                    bytes: png(10),
                },
                text_file("readme.md", "# hi"),
            ],
            &store,
        );
        assert_eq!(attached.added, 1);
        assert_eq!(attached.skipped.len(), 1);

        let image = ImageData::from_value(&attached.value[0]).unwrap();
        assert_eq!((image.width, image.height), (Some(5), Some(2)));
        assert!(store.contains(&image.url));
        assert_eq!(store.temporary_count(), 0);
    }

    #[test]
    fn undecodable_image_is_rejected() {
        let store = ObjectUrlStore::new();
        let result = image_record(
            &store,
            UploadFile {
                name: "broken.png".into(),
                mime: Some("image/png".into()),
                bytes: vec![1, 2, 3],
            },
        );
        assert!(result.is_err());
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn reading_reports_missing_paths() {
        let tmp = TempDir::new().unwrap();
        let present = tmp.path().join("photo.jpg");
        std::fs::write(&present, b"jpeg-ish").unwrap();
        let missing = tmp.path().join("gone.txt");

        let (files, failures) = read_upload_files(&[present, missing]);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "photo.jpg");
        assert_eq!(files[0].mime.as_deref(), Some("image/jpeg"));
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("gone.txt"));
    }

    #[test]
    fn formats_sizes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
