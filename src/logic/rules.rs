// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Built-in rules for common field constraints.
//!
//! Every constructor takes the message to report so forms control their own wording.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use email_address::EmailAddress;
use serde_json::Value;
use url::Url;

use super::validator::{Rule, SharedRule};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";
pub const TIME_FORMAT: &str = "%H:%M";

/// Null, blank strings and empty lists count as "no value".
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Numbers, or strings that parse as numbers.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn shared(rule: impl Rule + 'static) -> SharedRule {
    Arc::new(rule)
}

fn check_str(value: &Value, message: &str, ok: impl Fn(&str) -> bool) -> Result<(), String> {
    match value.as_str() {
        Some(s) if ok(s) => Ok(()),
        _ => Err(message.to_string()),
    }
}

pub fn required(message: impl Into<String>) -> SharedRule {
    let message = message.into();
    shared(move |v: &Value| {
        if is_blank(v) { Err(message.clone()) } else { Ok(()) }
    })
}

/// Switches and checkboxes that must be on.
pub fn accepted(message: impl Into<String>) -> SharedRule {
    let message = message.into();
    shared(move |v: &Value| {
        if v.as_bool() == Some(true) { Ok(()) } else { Err(message.clone()) }
    })
}

pub fn min_length(min: usize, message: impl Into<String>) -> SharedRule {
    let message = message.into();
    shared(move |v: &Value| check_str(v, &message, |s| s.chars().count() >= min))
}

pub fn max_length(max: usize, message: impl Into<String>) -> SharedRule {
    let message = message.into();
    shared(move |v: &Value| check_str(v, &message, |s| s.chars().count() <= max))
}

pub fn email(message: impl Into<String>) -> SharedRule {
    let message = message.into();
    shared(move |v: &Value| {
        check_str(v, &message, |s| {
            EmailAddress::parse_with_options(s.trim(), Default::default()).is_ok()
        })
    })
}

/// Absolute http(s) URL with a host.
pub fn url(message: impl Into<String>) -> SharedRule {
    let message = message.into();
    shared(move |v: &Value| check_str(v, &message, is_web_url))
}

pub fn is_web_url(raw: &str) -> bool {
    Url::parse(raw.trim())
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .is_some()
}

pub fn number(message: impl Into<String>) -> SharedRule {
    let message = message.into();
    shared(move |v: &Value| {
        as_number(v).map(|_| ()).ok_or_else(|| message.clone())
    })
}

pub fn integer(message: impl Into<String>) -> SharedRule {
    let message = message.into();
    shared(move |v: &Value| match as_number(v) {
        Some(n) if n.fract() == 0.0 => Ok(()),
        _ => Err(message.clone()),
    })
}

pub fn min(bound: f64, message: impl Into<String>) -> SharedRule {
    let message = message.into();
    shared(move |v: &Value| match as_number(v) {
        Some(n) if n >= bound => Ok(()),
        _ => Err(message.clone()),
    })
}

pub fn max(bound: f64, message: impl Into<String>) -> SharedRule {
    let message = message.into();
    shared(move |v: &Value| match as_number(v) {
        Some(n) if n <= bound => Ok(()),
        _ => Err(message.clone()),
    })
}

pub fn min_items(min: usize, message: impl Into<String>) -> SharedRule {
    let message = message.into();
    shared(move |v: &Value| match v.as_array() {
        Some(items) if items.len() >= min => Ok(()),
        _ => Err(message.clone()),
    })
}

pub fn max_items(max: usize, message: impl Into<String>) -> SharedRule {
    let message = message.into();
    shared(move |v: &Value| match v {
        Value::Null => Ok(()),
        Value::Array(items) if items.len() <= max => Ok(()),
        _ => Err(message.clone()),
    })
}

/// Value must equal one of `allowed`.
pub fn one_of(allowed: Vec<Value>, message: impl Into<String>) -> SharedRule {
    let message = message.into();
    shared(move |v: &Value| {
        if allowed.contains(v) { Ok(()) } else { Err(message.clone()) }
    })
}

pub fn date(message: impl Into<String>) -> SharedRule {
    let message = message.into();
    shared(move |v: &Value| {
        check_str(v, &message, |s| NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok())
    })
}

pub fn datetime(message: impl Into<String>) -> SharedRule {
    let message = message.into();
    shared(move |v: &Value| {
        check_str(v, &message, |s| {
            NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).is_ok()
        })
    })
}

pub fn time(message: impl Into<String>) -> SharedRule {
    let message = message.into();
    shared(move |v: &Value| {
        check_str(v, &message, |s| NaiveTime::parse_from_str(s, TIME_FORMAT).is_ok())
    })
}

/// `{from, to}` objects with `from <= to`.
pub fn ordered_range(message: impl Into<String>) -> SharedRule {
    let message = message.into();
    shared(move |v: &Value| {
        match (as_number(&v["from"]), as_number(&v["to"])) {
            (Some(from), Some(to)) if from <= to => Ok(()),
            _ => Err(message.clone()),
        }
    })
}

/// Let blank values pass, otherwise defer to `inner`.
pub fn optional(inner: SharedRule) -> SharedRule {
    shared(move |v: &Value| {
        if is_blank(v) { Ok(()) } else { inner.check(v) }
    })
}

/// Rules checked in order; the first failure is reported.
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: Vec<SharedRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<SharedRule>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: SharedRule) {
        self.rules.push(rule);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn into_shared(self) -> SharedRule {
        Arc::new(self)
    }
}

impl Rule for RuleSet {
    fn check(&self, value: &Value) -> Result<(), String> {
        self.rules.iter().try_for_each(|rule| rule.check(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_treats_blank_as_missing() {
        let rule = required("Required");
        assert!(rule.check(&json!(null)).is_err());
        assert!(rule.check(&json!("  ")).is_err());
        assert!(rule.check(&json!([])).is_err());
        assert!(rule.check(&json!(false)).is_ok());
        assert!(rule.check(&json!("x")).is_ok());
    }

    #[test]
    fn email_and_url_follow_common_syntax() {
        let email = email("Invalid email");
        assert!(email.check(&json!("a@b.com")).is_ok());
        assert_eq!(email.check(&json!("bad")), Err("Invalid email".to_string()));

        let url = url("Invalid URL");
        assert!(url.check(&json!("https://example.org/x")).is_ok());
        assert!(url.check(&json!("ftp://example.org")).is_err());
        assert!(url.check(&json!("not a url")).is_err());
    }

    #[test]
    fn numeric_bounds_accept_numeric_strings() {
        let rule = RuleSet::new(vec![number("NaN"), min(1.0, "too small"), max(10.0, "too big")]);
        assert!(rule.check(&json!(5)).is_ok());
        assert!(rule.check(&json!("7.5")).is_ok());
        assert_eq!(rule.check(&json!(0)), Err("too small".to_string()));
        assert_eq!(rule.check(&json!("abc")), Err("NaN".to_string()));
        assert!(integer("int").check(&json!(2.5)).is_err());
    }

    #[test]
    fn optional_skips_blank_values() {
        let rule = optional(url("Invalid URL"));
        assert!(rule.check(&json!("")).is_ok());
        assert!(rule.check(&json!(null)).is_ok());
        assert!(rule.check(&json!("nope")).is_err());
    }

    #[test]
    fn lengths_count_characters() {
        assert!(min_length(2, "short").check(&json!("äö")).is_ok());
        assert!(max_length(3, "long").check(&json!("abcd")).is_err());
        assert!(min_length(1, "short").check(&json!(12)).is_err());
    }

    #[test]
    fn date_and_time_formats() {
        assert!(date("bad").check(&json!("2024-02-29")).is_ok());
        assert!(date("bad").check(&json!("2023-02-29")).is_err());
        assert!(datetime("bad").check(&json!("2024-05-01T13:45")).is_ok());
        assert!(time("bad").check(&json!("25:00")).is_err());
    }

    #[test]
    fn item_counts_and_ranges() {
        assert!(min_items(1, "few").check(&json!([])).is_err());
        assert!(max_items(2, "many").check(&json!([1, 2, 3])).is_err());
        assert!(ordered_range("order").check(&json!({"from": 1, "to": 5})).is_ok());
        assert!(ordered_range("order").check(&json!({"from": 9, "to": 5})).is_err());
        assert!(accepted("must accept").check(&json!(true)).is_ok());
        assert!(one_of(vec![json!("a")], "pick").check(&json!("b")).is_err());
    }
}
