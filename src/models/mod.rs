// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Domain layer: field configuration, image records and the form definition file format.

pub mod field;
pub mod form_file;
pub mod image;
