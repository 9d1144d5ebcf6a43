// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "RENTVIEW_LOG";

pub fn filter_directive(configured: &str) -> String {
    match env::var(LOG_ENV) {
        Ok(directive) if !directive.trim().is_empty() => directive,
        _ => configured.to_owned(),
    }
}

pub fn init(configured_level: &str, file: &Path) -> Result<()> {
    let directive = filter_directive(configured_level);
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid log filter {directive:?}"))?;

    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let handle = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .with_context(|| format!("open log file {}", file.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(handle))
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}
