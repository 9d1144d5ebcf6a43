// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use rentview_api::{ApiConfig, DEFAULT_BASE_URL};
use rentview_app::{PageSize, Resource};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_VERSION: i64 = 1;
const APP_NAME: &str = "rentview";
const CONFIG_PATH_ENV: &str = "RENTVIEW_CONFIG_PATH";
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Client,
    Server,
}

impl Strategy {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim() {
            "client" => Ok(Self::Client),
            "server" => Ok(Self::Server),
            other => bail!("unknown strategy {other:?}; use \"client\" or \"server\""),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub table: Table,
    #[serde(default)]
    pub log: Log,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Table {
    pub strategy: Option<String>,
    pub page_size: Option<PageSizeSetting>,
    pub resource: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PageSizeSetting {
    Count(i64),
    Label(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Config {
    fn defaults() -> Self {
        Self {
            version: CONFIG_VERSION,
            ..Self::default()
        }
    }

    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::defaults());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` and put values under [api], [table], and [log]",
                    path.display()
                )
            })?;
        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.api.base_url
            && base_url.trim().trim_end_matches('/').is_empty()
        {
            bail!("api.base_url in {} must not be empty", path.display());
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed.is_zero() {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        self.strategy()
            .with_context(|| format!("table.strategy in {}", path.display()))?;
        self.page_size()
            .with_context(|| format!("table.page_size in {}", path.display()))?;
        self.resource()
            .with_context(|| format!("table.resource in {}", path.display()))?;
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn api_config(&self) -> Result<ApiConfig> {
        Ok(ApiConfig {
            base_url: self.base_url().to_owned(),
            timeout: self.timeout()?,
        })
    }

    pub fn strategy(&self) -> Result<Strategy> {
        self.table
            .strategy
            .as_deref()
            .map_or(Ok(Strategy::Client), Strategy::parse)
    }

    pub fn page_size(&self) -> Result<PageSize> {
        match &self.table.page_size {
            None => Ok(PageSize::default()),
            Some(PageSizeSetting::Count(count)) => usize::try_from(*count)
                .ok()
                .and_then(PageSize::fixed)
                .ok_or_else(|| anyhow!("page size must be positive, got {count}")),
            Some(PageSizeSetting::Label(label)) => PageSize::parse(label),
        }
    }

    pub fn resource(&self) -> Result<Resource> {
        match self.table.resource.as_deref() {
            None => Ok(Resource::Cars),
            Some(raw) => parse_resource(raw),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }
        let data_root = dirs::data_dir()
            .ok_or_else(|| anyhow!("cannot resolve data directory; set [log].file"))?;
        Ok(data_root.join(APP_NAME).join("rentview.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# rentview config\n# Place this file at: {}\n\nversion = 1\n\n[api]\nbase_url = \"{}\"\ntimeout = \"{}\"\n\n[table]\n# \"client\" loads the whole collection once; \"server\" asks the API for each page\nstrategy = \"client\"\n# A positive integer or \"All\"\npage_size = 10\nresource = \"cars\"\n\n[log]\nlevel = \"{}\"\n# Optional. Default is the platform data dir (for example ~/.local/share/rentview/rentview.log)\n# file = \"/absolute/path/to/rentview.log\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            DEFAULT_TIMEOUT,
            DEFAULT_LOG_LEVEL,
        )
    }
}

pub fn parse_resource(raw: &str) -> Result<Resource> {
    Resource::parse(raw.trim()).ok_or_else(|| {
        anyhow!("unknown resource {raw:?}; use one of: cars, bookings, users")
    })
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("timeout {raw:?} is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}
