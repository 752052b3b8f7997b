// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Tracing subscriber setup.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::AppConfig;

/// Build the filter from the configured directive, falling back to `info`.
pub fn filter_for(config: &AppConfig) -> EnvFilter {
    EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Fails if one is already set.
pub fn init(config: &AppConfig) -> Result<()> {
    let filter = filter_for(config);
    if config.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    }
    .context("Failed to install tracing subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_directive_falls_back_to_info() {
        let config = AppConfig {
            log_filter: "dynform=bogus".into(),
            ..Default::default()
        };
        assert_eq!(filter_for(&config).to_string(), "info");
    }

    #[test]
    fn valid_directive_is_kept() {
        let config = AppConfig {
            log_filter: "dynform=debug".into(),
            ..Default::default()
        };
        assert_eq!(filter_for(&config).to_string(), "dynform=debug");
    }
}
