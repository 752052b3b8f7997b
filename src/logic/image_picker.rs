// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! One shared image-picker dialog serving every image field of a form.
//!
//! The picker is either closed or open on behalf of exactly one field. While
//! open it keeps a working selection that is only delivered to the field's
//! callback on confirm. Uploads live as [`ObjectUrl`] guards inside the
//! workspace, so every path out of the open state releases what was not
//! confirmed.

use std::collections::HashSet;
use std::io::Cursor;

use tracing::{debug, warn};

use crate::models::image::{ImageData, ImageSource};
use crate::utils::hash_bytes;

use super::object_url::{ObjectUrl, ObjectUrlStore};
use super::rules::is_web_url;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Multiplicity {
    #[default]
    Single,
    Multiple,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PickerTab {
    #[default]
    Gallery,
    Url,
}

/// Result delivered to the opener on confirm.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageSelection {
    Single(ImageData),
    Multiple(Vec<ImageData>),
}

impl ImageSelection {
    pub fn images(&self) -> &[ImageData] {
        match self {
            Self::Single(image) => std::slice::from_ref(image),
            Self::Multiple(images) => images,
        }
    }

    pub fn into_vec(self) -> Vec<ImageData> {
        match self {
            Self::Single(image) => vec![image],
            Self::Multiple(images) => images,
        }
    }
}

pub type SelectCallback = Box<dyn FnOnce(ImageSelection)>;

/// What a field asks for when it opens the picker.
pub struct OpenRequest {
    pub opener: String,
    pub mode: Multiplicity,
    pub max: Option<usize>,
    pub current_count: usize,
    pub on_select: SelectCallback,
}

impl OpenRequest {
    pub fn single(opener: impl Into<String>, on_select: impl FnOnce(ImageSelection) + 'static) -> Self {
        Self {
            opener: opener.into(),
            mode: Multiplicity::Single,
            max: None,
            current_count: 0,
            on_select: Box::new(on_select),
        }
    }

    pub fn multiple(
        opener: impl Into<String>,
        max: Option<usize>,
        current_count: usize,
        on_select: impl FnOnce(ImageSelection) + 'static,
    ) -> Self {
        Self {
            opener: opener.into(),
            mode: Multiplicity::Multiple,
            max,
            current_count,
            on_select: Box::new(on_select),
        }
    }
}

/// User-facing notice emitted by picker operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PickerEvent {
    pub message: String,
    pub is_error: bool,
}

impl PickerEvent {
    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

/// A file handed to [`ImagePicker::upload`].
#[derive(Clone, Debug)]
pub struct UploadFile {
    pub name: String,
    /// Declared MIME type, if the source knows it.
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Declared type, falling back to a guess from the file name.
    pub fn effective_mime(&self) -> String {
        self.mime.clone().unwrap_or_else(|| {
            mime_guess::from_path(&self.name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        })
    }
}

pub type UploadFilter = Box<dyn Fn(&UploadFile) -> Result<(), String>>;

/// Default acceptance filter: image MIME types only.
pub fn accept_images(file: &UploadFile) -> Result<(), String> {
    if file.effective_mime().starts_with("image/") {
        Ok(())
    } else {
        Err(format!("{} is not an image file", file.name))
    }
}

struct UploadedImage {
    image: ImageData,
    sha256: String,
    handle: ObjectUrl,
}

/// Transient state of one open dialog.
#[derive(Default)]
struct Workspace {
    tab: PickerTab,
    url_input: String,
    tentative: Vec<ImageData>,
    /// Newest first.
    uploads: Vec<UploadedImage>,
}

struct OpenDialog {
    opener: String,
    mode: Multiplicity,
    max: Option<usize>,
    current_count: usize,
    on_select: SelectCallback,
    workspace: Workspace,
}

impl OpenDialog {
    /// Images the opener can still take, if bounded.
    fn capacity(&self) -> Option<usize> {
        self.max.map(|max| max.saturating_sub(self.current_count))
    }

    fn is_selected(&self, url: &str) -> bool {
        self.workspace.tentative.iter().any(|i| i.url == url)
    }

    /// Single mode replaces; multiple mode toggles within capacity.
    fn pick(&mut self, image: ImageData) -> Option<PickerEvent> {
        match self.mode {
            Multiplicity::Single => {
                self.workspace.tentative = vec![image];
                None
            }
            Multiplicity::Multiple => {
                if self.is_selected(&image.url) {
                    self.workspace.tentative.retain(|i| i.url != image.url);
                    return None;
                }
                if let Some(event) = self.capacity_notice(1) {
                    return Some(event);
                }
                self.workspace.tentative.push(image);
                None
            }
        }
    }

    fn capacity_notice(&self, adding: usize) -> Option<PickerEvent> {
        let capacity = self.capacity()?;
        if self.workspace.tentative.len() + adding <= capacity {
            return None;
        }
        let max = self.max.unwrap_or(capacity);
        let message = if self.current_count > 0 {
            format!("You can select at most {max} images ({capacity} more)")
        } else {
            format!("You can select at most {max} images")
        };
        Some(PickerEvent::error(message))
    }
}

enum PickerState {
    Closed,
    Open(Box<OpenDialog>),
}

/// The shared dialog coordinator.
pub struct ImagePicker {
    state: PickerState,
    store: ObjectUrlStore,
    accept_upload: UploadFilter,
}

impl Default for ImagePicker {
    fn default() -> Self {
        Self::new(ObjectUrlStore::new())
    }
}

impl ImagePicker {
    pub fn new(store: ObjectUrlStore) -> Self {
        Self {
            state: PickerState::Closed,
            store,
            accept_upload: Box::new(accept_images),
        }
    }

    pub fn with_upload_filter(
        mut self,
        filter: impl Fn(&UploadFile) -> Result<(), String> + 'static,
    ) -> Self {
        self.accept_upload = Box::new(filter);
        self
    }

    pub fn store(&self) -> &ObjectUrlStore {
        &self.store
    }

    fn dialog(&self) -> Option<&OpenDialog> {
        match &self.state {
            PickerState::Open(dialog) => Some(&**dialog),
            PickerState::Closed => None,
        }
    }

    fn dialog_mut(&mut self) -> Option<&mut OpenDialog> {
        match &mut self.state {
            PickerState::Open(dialog) => Some(&mut **dialog),
            PickerState::Closed => None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.dialog().is_some()
    }

    pub fn opener(&self) -> Option<&str> {
        self.dialog().map(|d| d.opener.as_str())
    }

    pub fn mode(&self) -> Option<Multiplicity> {
        self.dialog().map(|d| d.mode)
    }

    pub fn max(&self) -> Option<usize> {
        self.dialog().and_then(|d| d.max)
    }

    pub fn capacity(&self) -> Option<usize> {
        self.dialog().and_then(OpenDialog::capacity)
    }

    pub fn tab(&self) -> PickerTab {
        self.dialog().map(|d| d.workspace.tab).unwrap_or_default()
    }

    pub fn url_input(&self) -> &str {
        self.dialog().map_or("", |d| d.workspace.url_input.as_str())
    }

    pub fn tentative(&self) -> &[ImageData] {
        self.dialog()
            .map(|d| d.workspace.tentative.as_slice())
            .unwrap_or_default()
    }

    pub fn is_selected(&self, url: &str) -> bool {
        self.dialog().is_some_and(|d| d.is_selected(url))
    }

    /// Uploaded images of the current session, newest first.
    pub fn uploads(&self) -> impl Iterator<Item = &ImageData> {
        self.dialog()
            .into_iter()
            .flat_map(|d| d.workspace.uploads.iter().map(|u| &u.image))
    }

    /// Open on behalf of a field. Ignored while another field holds the dialog.
    pub fn open(&mut self, request: OpenRequest) -> Option<PickerEvent> {
        if let Some(current) = self.opener() {
            warn!(
                current = %current,
                requested = %request.opener,
                "image picker already open; ignoring request"
            );
            return Some(PickerEvent::error("The image picker is already open"));
        }
        debug!(
            opener = %request.opener,
            mode = ?request.mode,
            max = ?request.max,
            current = request.current_count,
            "image picker opened"
        );
        self.state = PickerState::Open(Box::new(OpenDialog {
            opener: request.opener,
            mode: request.mode,
            max: request.max,
            current_count: request.current_count,
            on_select: request.on_select,
            workspace: Workspace::default(),
        }));
        None
    }

    /// Close without delivering anything. Returns whether it was open.
    pub fn cancel(&mut self) -> bool {
        match self.take_dialog() {
            Some(dialog) => {
                debug!(opener = %dialog.opener, "image picker cancelled");
                true
            }
            None => false,
        }
    }

    fn take_dialog(&mut self) -> Option<OpenDialog> {
        match std::mem::replace(&mut self.state, PickerState::Closed) {
            PickerState::Open(dialog) => Some(*dialog),
            PickerState::Closed => None,
        }
    }

    /// Deliver the working selection to the opener and close.
    pub fn confirm(&mut self) -> Option<PickerEvent> {
        let dialog = self.dialog()?;
        if dialog.workspace.tentative.is_empty() {
            return Some(PickerEvent::error("Please select at least one image"));
        }
        if dialog.mode == Multiplicity::Multiple
            && let Some(event) = dialog.capacity_notice(0)
        {
            return Some(event);
        }

        let mut dialog = self.take_dialog()?;
        let chosen: HashSet<String> = dialog
            .workspace
            .tentative
            .iter()
            .map(|i| i.url.clone())
            .collect();
        for upload in dialog.workspace.uploads.drain(..) {
            if chosen.contains(&upload.image.url) {
                upload.handle.retain();
            }
        }

        let mut tentative = std::mem::take(&mut dialog.workspace.tentative);
        let count = tentative.len();
        let selection = match dialog.mode {
            Multiplicity::Single => ImageSelection::Single(tentative.swap_remove(0)),
            Multiplicity::Multiple => ImageSelection::Multiple(tentative),
        };
        debug!(opener = %dialog.opener, count, "image picker confirmed");
        (dialog.on_select)(selection);

        Some(PickerEvent::info(if count == 1 {
            "1 image selected".to_string()
        } else {
            format!("{count} images selected")
        }))
    }

    pub fn toggle_gallery(&mut self, image: ImageData) -> Option<PickerEvent> {
        self.dialog_mut()?.pick(image)
    }

    pub fn toggle_upload(&mut self, url: &str) -> Option<PickerEvent> {
        let dialog = self.dialog_mut()?;
        let image = dialog
            .workspace
            .uploads
            .iter()
            .find(|u| u.image.url == url)?
            .image
            .clone();
        if dialog.mode == Multiplicity::Single && dialog.is_selected(url) {
            dialog.workspace.tentative.clear();
            return None;
        }
        dialog.pick(image)
    }

    /// Take the URL typed on the URL tab.
    ///
    /// Multiple mode adds it to the working selection; single mode selects
    /// it and confirms straight away.
    pub fn submit_url(&mut self) -> Option<PickerEvent> {
        let dialog = self.dialog_mut()?;
        let raw = dialog.workspace.url_input.trim().to_string();
        if raw.is_empty() {
            return None;
        }
        if !is_web_url(&raw) {
            return Some(PickerEvent::error("Please enter a valid image URL"));
        }
        let image = ImageData {
            alt: Some("Image from URL".to_string()),
            ..ImageData::from_url(raw, ImageSource::Url)
        };
        match dialog.mode {
            Multiplicity::Single => {
                dialog.workspace.tentative = vec![image];
                dialog.workspace.url_input.clear();
                self.confirm()
            }
            Multiplicity::Multiple => {
                if dialog.is_selected(&image.url) {
                    dialog.workspace.url_input.clear();
                    return Some(PickerEvent::info("That image is already selected"));
                }
                if let Some(event) = dialog.capacity_notice(1) {
                    return Some(event);
                }
                dialog.workspace.tentative.push(image);
                dialog.workspace.url_input.clear();
                Some(PickerEvent::info("Image added from URL"))
            }
        }
    }

    /// Register an uploaded file as a selectable image. Not auto-selected.
    pub fn upload(&mut self, file: UploadFile) -> Option<PickerEvent> {
        let PickerState::Open(dialog) = &mut self.state else {
            return None;
        };
        if let Err(reason) = (self.accept_upload)(&file) {
            warn!(file = %file.name, %reason, "upload rejected");
            return Some(PickerEvent::error(reason));
        }
        let sha256 = hash_bytes(&file.bytes);
        if dialog.workspace.uploads.iter().any(|u| u.sha256 == sha256) {
            return Some(PickerEvent::info(format!("{} is already uploaded", file.name)));
        }
        let (width, height) = match probe_dimensions(&file.bytes) {
            Ok(dimensions) => dimensions,
            Err(err) => {
                warn!(file = %file.name, error = %err, "upload could not be decoded");
                return Some(PickerEvent::error(format!(
                    "{} could not be read as an image",
                    file.name
                )));
            }
        };

        let mime = file.effective_mime();
        let format = mime.strip_prefix("image/").map(str::to_string);
        let size = file.bytes.len() as u64;
        let handle = self.store.create(file.bytes, &mime);
        let image = ImageData {
            id: Some(sha256.clone()),
            url: handle.url().to_string(),
            alt: Some(file.name.clone()),
            width: Some(width),
            height: Some(height),
            size: Some(size),
            format,
            source: Some(ImageSource::Upload),
            ..ImageData::default()
        };
        debug!(file = %file.name, url = %image.url, width, height, "image uploaded");
        dialog.workspace.uploads.insert(
            0,
            UploadedImage {
                image,
                sha256,
                handle,
            },
        );
        None
    }

    /// Upload several files, folding the notices into one.
    pub fn upload_many(&mut self, files: Vec<UploadFile>) -> Option<PickerEvent> {
        let total = files.len();
        let mut problems = Vec::new();
        for file in files {
            if let Some(event) = self.upload(file) {
                problems.push(event);
            }
        }
        match problems.len() {
            0 if total > 0 => Some(PickerEvent::info(format!("Uploaded {total} image(s)"))),
            0 => None,
            1 => problems.pop(),
            n => Some(PickerEvent {
                message: format!(
                    "{} of {total} file(s) skipped: {}",
                    n,
                    problems
                        .iter()
                        .map(|p| p.message.as_str())
                        .collect::<Vec<_>>()
                        .join("; ")
                ),
                is_error: problems.iter().any(|p| p.is_error),
            }),
        }
    }

    /// Drop an upload from this session, releasing its reference immediately.
    pub fn remove_upload(&mut self, url: &str) -> Option<PickerEvent> {
        let dialog = self.dialog_mut()?;
        let index = dialog
            .workspace
            .uploads
            .iter()
            .position(|u| u.image.url == url)?;
        let removed = dialog.workspace.uploads.remove(index);
        dialog.workspace.tentative.retain(|i| i.url != url);
        debug!(url, "upload removed");
        drop(removed);
        None
    }

    pub fn clear_selection(&mut self) {
        if let Some(dialog) = self.dialog_mut() {
            dialog.workspace.tentative.clear();
        }
    }

    pub fn set_tab(&mut self, tab: PickerTab) {
        if let Some(dialog) = self.dialog_mut() {
            dialog.workspace.tab = tab;
        }
    }

    pub fn set_url_input(&mut self, input: impl Into<String>) {
        if let Some(dialog) = self.dialog_mut() {
            dialog.workspace.url_input = input.into();
        }
    }
}

pub(crate) fn probe_dimensions(bytes: &[u8]) -> image::ImageResult<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()
}
