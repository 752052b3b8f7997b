// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Reusable egui components structured for MVU-style updates.

pub mod datetime_picker;
pub mod dynamic_form;
pub mod image_picker;
pub mod toggle;
pub mod widgets;

pub use toggle::Toggle;
