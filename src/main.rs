// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

use anyhow::{Context, Result, anyhow};
use tracing::info;

use dynform::config::AppConfig;
use dynform::mvu::AppModel;
use dynform::{app, logging};

fn main() -> Result<()> {
    let config = AppConfig::from_env();
    logging::init(&config)?;

    let definition = config.load_form().context("Failed to load form definition")?;
    let gallery = config.load_gallery().context("Failed to load image gallery")?;
    info!(
        form = %definition.title,
        fields = definition.fields.len(),
        gallery = gallery.len(),
        "starting"
    );

    app::run(AppModel::new(definition, gallery)).map_err(|err| anyhow!("UI error: {err}"))
}
