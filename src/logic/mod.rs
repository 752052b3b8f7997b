// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Form engine: validation, session state, arrays, resolution and the image picker.

pub mod array;
pub mod image_field;
pub mod image_picker;
pub mod object_url;
pub mod path;
pub mod resolver;
pub mod rules;
pub mod schema;
pub mod session;
pub mod uploads;
pub mod validator;
