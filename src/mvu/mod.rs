// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Root Model-View-Update kernel wiring the form, the image picker, and background commands.

use std::path::PathBuf;

use crossbeam_channel::{Receiver, Sender};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::logic::image_field::open_request;
use crate::logic::image_picker::{ImagePicker, UploadFile};
use crate::logic::object_url::collect_object_urls;
use crate::logic::schema::SchemaCache;
use crate::logic::uploads::read_upload_files;
use crate::models::form_file::{FormDefinition, load_form_definition};
use crate::models::image::StaticGallery;
use crate::ui::components::dynamic_form::{self, FormCommand, FormModel, FormMsg};
use crate::ui::components::image_picker::{self, PickerCommand, PickerMsg};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "tif", "tiff"];

/// Where files read from disk should go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileTarget {
    /// An uploader field at this value path.
    Field(String),
    /// The open image picker.
    Picker,
}

/// Top-level application state.
pub struct AppModel {
    pub form: FormModel,
    /// Shared image picker; at most one field owns it at a time.
    pub picker: ImagePicker,
    pub gallery: StaticGallery,
    pub schema_cache: SchemaCache,
    /// Latest status message to display.
    pub status: Option<String>,
    /// Latest error message to display in modal.
    pub error: Option<String>,
    /// Count of queued background commands.
    pub pending_commands: usize,
    selection_tx: Sender<(String, Value)>,
    selection_rx: Receiver<(String, Value)>,
}

impl Default for AppModel {
    fn default() -> Self {
        let (selection_tx, selection_rx) = crossbeam_channel::unbounded();
        Self {
            form: FormModel::default(),
            picker: ImagePicker::default(),
            gallery: StaticGallery::default(),
            schema_cache: SchemaCache::new(),
            status: None,
            error: None,
            pending_commands: 0,
            selection_tx,
            selection_rx,
        }
    }
}

impl AppModel {
    pub fn new(definition: FormDefinition, gallery: StaticGallery) -> Self {
        let mut model = Self {
            gallery,
            ..Self::default()
        };
        model.form = FormModel::from_definition(definition, &mut model.schema_cache);
        model
    }
}

/// Application messages routed through the update function.
pub enum Msg {
    Form(FormMsg),
    Picker(PickerMsg),
    ImportFormRequested,
    FormLoaded {
        definition: FormDefinition,
        source: PathBuf,
    },
    FormImportCancelled,
    FormLoadFailed(String),
    FilesRead {
        target: FileTarget,
        files: Vec<UploadFile>,
        failures: Vec<String>,
    },
    DismissError,
}

/// Commands represent side-effects executed between frames.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    PickFormFile,
    PickFiles {
        target: FileTarget,
        images_only: bool,
    },
    ReadFiles {
        target: FileTarget,
        paths: Vec<PathBuf>,
    },
}

/// Update the application model and enqueue commands.
pub fn update(model: &mut AppModel, msg: Msg, cmds: &mut Vec<Command>) {
    match msg {
        Msg::Form(m) => forward_form(model, m, cmds),
        Msg::Picker(m) => {
            let mut picker_cmds = Vec::new();
            if let Some(event) = image_picker::update(&mut model.picker, m, &mut picker_cmds) {
                surface_event(model, event.message, event.is_error);
            }
            for c in picker_cmds {
                match c {
                    PickerCommand::PickImages => cmds.push(Command::PickFiles {
                        target: FileTarget::Picker,
                        images_only: true,
                    }),
                    PickerCommand::ReadFiles(paths) => cmds.push(Command::ReadFiles {
                        target: FileTarget::Picker,
                        paths,
                    }),
                }
            }
            drain_selections(model, cmds);
        }
        Msg::ImportFormRequested => cmds.push(Command::PickFormFile),
        Msg::FormLoaded { definition, source } => {
            let previous = collect_object_urls(model.form.session().values());
            model.picker.cancel();
            model.form = FormModel::from_definition(definition, &mut model.schema_cache);
            for url in &previous {
                model.picker.store().revoke(url);
            }
            info!(source = %source.display(), fields = model.form.session().fields().len(), "form loaded");
            let message = format!("Loaded '{}' from {}", model.form.title(), source.display());
            surface_event(model, message, false);
        }
        Msg::FormImportCancelled => surface_event(model, "Form import cancelled.".into(), false),
        Msg::FormLoadFailed(err) => {
            surface_event(model, format!("Failed to load form:\n\n{err}"), true)
        }
        Msg::FilesRead {
            target,
            files,
            failures,
        } => {
            if !files.is_empty() {
                match target {
                    FileTarget::Field(path) => {
                        forward_form(model, FormMsg::FilesAttached { path, files }, cmds)
                    }
                    FileTarget::Picker => {
                        update(model, Msg::Picker(PickerMsg::FilesRead(files)), cmds)
                    }
                }
            }
            if !failures.is_empty() {
                surface_event(
                    model,
                    format!("Some files could not be read:\n\n{}", failures.join("\n")),
                    true,
                );
            }
        }
        Msg::DismissError => model.error = None,
    }
}

fn forward_form(model: &mut AppModel, msg: FormMsg, cmds: &mut Vec<Command>) {
    let mut form_cmds = Vec::new();
    if let Some(event) =
        dynamic_form::update(&mut model.form, msg, model.picker.store(), &mut form_cmds)
    {
        surface_event(model, event.message, event.is_error);
    }
    for c in form_cmds {
        match c {
            FormCommand::OpenImagePicker { path } => open_picker(model, &path),
            FormCommand::PickFiles { path, images_only } => cmds.push(Command::PickFiles {
                target: FileTarget::Field(path),
                images_only,
            }),
        }
    }
}

/// Hand the shared picker to the image field at `path`.
fn open_picker(model: &mut AppModel, path: &str) {
    let session = model.form.session();
    let Some(field) = session.field_at(path) else {
        warn!(%path, "image picker requested for unknown field");
        return;
    };
    let current = session.get_value(path).cloned().unwrap_or(Value::Null);
    let tx = model.selection_tx.clone();
    let request = open_request(field, path, &current, move |target, value| {
        let _ = tx.send((target, value));
    });
    if let Some(event) = model.picker.open(request) {
        surface_event(model, event.message, event.is_error);
    }
}

/// Apply selections the picker delivered to its opener.
///
/// Uploads the new value no longer references are released.
fn drain_selections(model: &mut AppModel, cmds: &mut Vec<Command>) {
    while let Ok((path, value)) = model.selection_rx.try_recv() {
        debug!(%path, "applying image selection");
        let before = collect_object_urls(model.form.session().values());
        forward_form(model, FormMsg::SetValue { path, value }, cmds);
        model
            .picker
            .store()
            .release_dropped(&before, model.form.session().values());
    }
}

/// Execute a command and return a resulting message.
pub fn run_command(cmd: Command) -> Msg {
    match cmd {
        Command::PickFormFile => {
            let file = rfd::FileDialog::new()
                .set_title("Open form definition")
                .add_filter("JSON", &["json"])
                .pick_file();
            match file {
                Some(path) => match load_form_definition(&path) {
                    Ok(definition) => Msg::FormLoaded {
                        definition,
                        source: path,
                    },
                    Err(err) => Msg::FormLoadFailed(format!("{err:#}")),
                },
                None => Msg::FormImportCancelled,
            }
        }
        Command::PickFiles {
            target,
            images_only,
        } => {
            let mut dialog = rfd::FileDialog::new().set_title(if images_only {
                "Select images"
            } else {
                "Select files"
            });
            if images_only {
                dialog = dialog.add_filter("Images", IMAGE_EXTENSIONS);
            }
            let paths = dialog.pick_files().unwrap_or_default();
            read_files(target, &paths)
        }
        Command::ReadFiles { target, paths } => read_files(target, &paths),
    }
}

fn read_files(target: FileTarget, paths: &[PathBuf]) -> Msg {
    let (files, failures) = read_upload_files(paths);
    Msg::FilesRead {
        target,
        files,
        failures,
    }
}

/// Update status/error fields consistently for user feedback.
fn surface_event(model: &mut AppModel, message: String, is_error: bool) {
    if is_error {
        model.error = Some(message.clone());
    }
    model.status = Some(message);
}
