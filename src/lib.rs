// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Schema-driven dynamic forms for egui.
//!
//! A form is a list of [`models::field::FieldConfig`] values. From it the
//! engine derives a validator, holds the editable value tree in a
//! [`logic::session::FormSession`], and resolves each field to a widget.

pub mod app;
pub mod config;
pub mod logging;
pub mod logic;
pub mod models;
pub mod mvu;
pub mod ui;
pub mod utils;
