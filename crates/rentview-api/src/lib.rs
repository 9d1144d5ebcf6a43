// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use rentview_app::{
    CollectionSource, PageReply, PageRequest, PageSource, RequestTicket, Resource,
};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let trimmed = config.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("api.base_url must not be empty");
        }
        if config.timeout.is_zero() {
            bail!("api.timeout must be positive");
        }
        // A trailing slash makes `join` append instead of replacing the last
        // segment.
        let base_url = Url::parse(&format!("{trimmed}/"))
            .with_context(|| format!("api.base_url {trimmed:?} is not a valid URL"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "api.base_url must use http or https, got {:?}",
                base_url.scheme()
            );
        }

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout: config.timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn resource(&self, resource: Resource) -> ResourceSource {
        ResourceSource {
            client: self.clone(),
            resource,
        }
    }

    pub fn endpoint(&self, resource: Resource, params: &[(String, String)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(resource.path())
            .with_context(|| format!("build URL for {}", resource.as_str()))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    pub fn fetch_collection(&self, resource: Resource) -> Result<Value> {
        let url = self.endpoint(resource, &[])?;
        self.get_json(url)
            .with_context(|| format!("load {}", resource.as_str()))
    }

    pub fn fetch_page(&self, resource: Resource, request: &PageRequest) -> Result<Value> {
        let url = self.endpoint(resource, &request.to_params())?;
        self.get_json(url)
            .with_context(|| format!("load {} page {}", resource.as_str(), request.page))
    }

    fn get_json(&self, url: Url) -> Result<Value> {
        debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|error| connection_error(self.base_url(), error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        response.json().context("decode response body")
    }
}

#[derive(Debug, Clone)]
pub struct ResourceSource {
    client: Client,
    resource: Resource,
}

impl ResourceSource {
    pub fn resource(&self) -> Resource {
        self.resource
    }
}

impl CollectionSource for ResourceSource {
    fn fetch_collection(&mut self) -> Result<Value> {
        self.client.fetch_collection(self.resource)
    }
}

impl PageSource for ResourceSource {
    fn fetch_page(&mut self, request: &PageRequest) -> Result<Value> {
        self.client.fetch_page(self.resource, request)
    }

    fn spawn_fetch_page(
        &mut self,
        ticket: RequestTicket,
        request: PageRequest,
        tx: Sender<PageReply>,
    ) -> Result<()> {
        let client = self.client.clone();
        let resource = self.resource;
        thread::Builder::new()
            .name(format!("rentview-page-{}", ticket.get()))
            .spawn(move || {
                let result = client
                    .fetch_page(resource, &request)
                    .map_err(|error| format!("{error:#}"));
                if tx.send(PageReply { ticket, result }).is_err() {
                    debug!(%ticket, "table gone before page reply");
                }
            })
            .context("spawn page worker")?;
        Ok(())
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        warn!(base_url, "request timed out");
        return anyhow!("{base_url} did not answer in time ({error})");
    }
    anyhow!("cannot reach {base_url} -- is the rental API running? ({error})")
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<Value>,
}

impl ErrorEnvelope {
    fn into_message(self) -> Option<String> {
        if let Some(message) = self.message.filter(|message| !message.is_empty()) {
            return Some(message);
        }
        match self.error? {
            Value::String(message) if !message.is_empty() => Some(message),
            Value::Object(fields) => fields
                .get("message")
                .and_then(Value::as_str)
                .filter(|message| !message.is_empty())
                .map(str::to_owned),
            _ => None,
        }
    }
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.into_message()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    let body = body.trim();
    if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), body);
    }

    anyhow!("server returned {}", status.as_u16())
}
