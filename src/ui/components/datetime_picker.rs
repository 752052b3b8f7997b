// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Date, date-time and time inputs bound to string field values.
//!
//! Values use the same formats the validation rules accept: `2024-06-15`,
//! `2024-06-15T14:30` and `14:30`. A null value shows the current local time
//! but is only written once the user changes something.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use eframe::egui;
use egui_extras::DatePickerButton;
use serde_json::Value;

use crate::logic::rules::{DATE_FORMAT, DATETIME_FORMAT, TIME_FORMAT};

/// Editable pieces of a date-time value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateTimeParts {
    pub date: NaiveDate,
    /// 0-23
    pub hour: u32,
    /// 0-59
    pub minute: u32,
}

impl DateTimeParts {
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            date: now.date_naive(),
            hour: now.hour(),
            minute: now.minute(),
        }
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        let dt = NaiveDateTime::parse_from_str(value.as_str()?, DATETIME_FORMAT).ok()?;
        Some(Self {
            date: dt.date(),
            hour: dt.hour(),
            minute: dt.minute(),
        })
    }

    /// `None` when hour or minute are out of range.
    pub fn to_value(self) -> Option<Value> {
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, 0)?;
        Some(Value::String(
            self.date.and_time(time).format(DATETIME_FORMAT).to_string(),
        ))
    }
}

pub fn date_from_value(value: &Value) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.as_str()?, DATE_FORMAT).ok()
}

pub fn date_to_value(date: NaiveDate) -> Value {
    Value::String(date.format(DATE_FORMAT).to_string())
}

pub fn time_from_value(value: &Value) -> Option<(u32, u32)> {
    let time = NaiveTime::parse_from_str(value.as_str()?, TIME_FORMAT).ok()?;
    Some((time.hour(), time.minute()))
}

pub fn time_to_value(hour: u32, minute: u32) -> Option<Value> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    Some(Value::String(time.format(TIME_FORMAT).to_string()))
}

fn two_digit_drag(value: &mut u32, max: u32) -> egui::DragValue<'_> {
    egui::DragValue::new(value)
        .range(0..=max)
        .speed(0.1)
        .clamp_existing_to_range(true)
        .custom_formatter(|v, _| format!("{:02}", v as u32))
}

fn clear_button(ui: &mut egui::Ui, has_value: bool) -> bool {
    has_value
        && ui
            .small_button(egui_phosphor::regular::X)
            .on_hover_text("Clear")
            .clicked()
}

/// Calendar button. Returns the new value when the user picks or clears a date.
pub fn date_view(ui: &mut egui::Ui, id_salt: &str, value: &Value) -> Option<Value> {
    let current = date_from_value(value);
    let mut date = current.unwrap_or_else(|| Local::now().date_naive());
    let mut out = None;
    ui.horizontal(|ui| {
        let changed = ui
            .push_id(id_salt, |ui| {
                ui.add(DatePickerButton::new(&mut date).show_icon(true))
                    .changed()
            })
            .inner;
        if changed {
            out = Some(date_to_value(date));
        }
        if clear_button(ui, current.is_some()) {
            out = Some(Value::Null);
        }
    });
    out
}

/// Date plus hour/minute spinners and a "Now" shortcut.
pub fn datetime_view(ui: &mut egui::Ui, id_salt: &str, value: &Value) -> Option<Value> {
    let current = DateTimeParts::from_value(value);
    let mut parts = current.unwrap_or_else(DateTimeParts::now);
    let mut changed = false;
    let mut cleared = false;

    ui.horizontal(|ui| {
        changed |= ui
            .push_id(id_salt, |ui| {
                ui.add(DatePickerButton::new(&mut parts.date).show_icon(true))
                    .changed()
            })
            .inner;
        ui.add_space(8.0);
        changed |= ui.add(two_digit_drag(&mut parts.hour, 23)).changed();
        ui.label(":");
        changed |= ui.add(two_digit_drag(&mut parts.minute, 59)).changed();
        ui.add_space(8.0);
        if ui
            .button(format!("{} Now", egui_phosphor::regular::CLOCK))
            .on_hover_text("Set to your current local time")
            .clicked()
        {
            parts = DateTimeParts::now();
            changed = true;
        }
        cleared = clear_button(ui, current.is_some());
    });

    if cleared {
        Some(Value::Null)
    } else if changed {
        parts.to_value()
    } else {
        None
    }
}

/// Hour/minute spinners.
pub fn time_view(ui: &mut egui::Ui, value: &Value) -> Option<Value> {
    let current = time_from_value(value);
    let (mut hour, mut minute) = current.unwrap_or_else(|| {
        let now = Local::now();
        (now.hour(), now.minute())
    });
    let mut changed = false;
    let mut cleared = false;

    ui.horizontal(|ui| {
        ui.label(egui_phosphor::regular::CLOCK);
        changed |= ui.add(two_digit_drag(&mut hour, 23)).changed();
        ui.label(":");
        changed |= ui.add(two_digit_drag(&mut minute, 59)).changed();
        cleared = clear_button(ui, current.is_some());
    });

    if cleared {
        Some(Value::Null)
    } else if changed {
        time_to_value(hour, minute)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn now_is_in_range() {
        let parts = DateTimeParts::now();
        assert!(parts.hour <= 23);
        assert!(parts.minute <= 59);
        assert!(parts.to_value().is_some());
    }

    #[test]
    fn datetime_values_round_trip_through_parts() {
        let parts = DateTimeParts::from_value(&json!("2024-06-15T14:30")).unwrap();
        assert_eq!(parts.date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        assert_eq!((parts.hour, parts.minute), (14, 30));
        assert_eq!(parts.to_value(), Some(json!("2024-06-15T14:30")));
    }

    #[test]
    fn out_of_range_parts_produce_no_value() {
        let parts = DateTimeParts {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            hour: 24,
            minute: 0,
        };
        assert!(parts.to_value().is_none());
        assert!(time_to_value(12, 60).is_none());
    }

    #[test]
    fn malformed_values_are_treated_as_unset() {
        assert!(DateTimeParts::from_value(&json!("yesterday")).is_none());
        assert!(date_from_value(&Value::Null).is_none());
        assert!(time_from_value(&json!(930)).is_none());
    }

    #[test]
    fn date_and_time_formats_match_rules() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        assert_eq!(date_to_value(date), json!("2023-12-01"));
        assert_eq!(date_from_value(&json!("2023-12-01")), Some(date));
        assert_eq!(time_to_value(7, 5), Some(json!("07:05")));
        assert_eq!(time_from_value(&json!("07:05")), Some((7, 5)));
    }
}
