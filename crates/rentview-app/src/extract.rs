// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{PassThroughEngine, Record, Resource};
use serde::Deserialize;
use serde_json::Value;

const DATA_KEY: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStrategy {
    Direct,
    Key(String),
}

impl ExtractionStrategy {
    pub fn key(name: impl Into<String>) -> Self {
        Self::Key(name.into())
    }

    pub fn locate<'a>(&self, payload: &'a Value) -> Option<&'a Vec<Value>> {
        match self {
            Self::Direct => payload.as_array(),
            Self::Key(name) => payload.get(name.as_str()).and_then(Value::as_array),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extracted {
    pub records: Vec<Record>,
    pub malformed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extractor {
    strategies: Vec<ExtractionStrategy>,
}

impl Default for Extractor {
    fn default() -> Self {
        let mut strategies = vec![
            ExtractionStrategy::Direct,
            ExtractionStrategy::key(DATA_KEY),
        ];
        strategies.extend(
            [Resource::Cars, Resource::Users, Resource::Bookings]
                .into_iter()
                .map(|resource| ExtractionStrategy::key(resource.collection_key())),
        );
        Self { strategies }
    }
}

impl Extractor {
    pub fn new(strategies: Vec<ExtractionStrategy>) -> Self {
        Self { strategies }
    }

    pub fn for_resource(resource: Resource) -> Self {
        Self::new(vec![
            ExtractionStrategy::Direct,
            ExtractionStrategy::key(resource.collection_key()),
            ExtractionStrategy::key(DATA_KEY),
        ])
    }

    pub fn extract(&self, payload: &Value) -> Extracted {
        let Some(items) = self
            .strategies
            .iter()
            .find_map(|strategy| strategy.locate(payload))
        else {
            return Extracted {
                records: Vec::new(),
                malformed: true,
            };
        };

        Extracted {
            records: items.iter().cloned().filter_map(Record::from_value).collect(),
            malformed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServerPage {
    pub records: Vec<Record>,
    pub total_count: Option<usize>,
    pub page_count: Option<usize>,
    pub malformed: bool,
}

#[derive(Debug, Deserialize)]
struct RawServerPage {
    #[serde(default, alias = "records")]
    data: Option<Value>,
    #[serde(default, alias = "totalCount")]
    total: Option<u64>,
    #[serde(default, rename = "totalPages", alias = "pageCount")]
    total_pages: Option<u64>,
}

impl ServerPage {
    pub fn from_payload(payload: Value) -> Self {
        let raw = match serde_json::from_value::<RawServerPage>(payload) {
            Ok(raw) => raw,
            Err(_) => return Self::malformed(),
        };
        let Some(Value::Array(items)) = raw.data else {
            return Self::malformed();
        };

        Self {
            records: items.into_iter().filter_map(Record::from_value).collect(),
            total_count: raw.total.and_then(|total| usize::try_from(total).ok()),
            page_count: raw.total_pages.and_then(|pages| usize::try_from(pages).ok()),
            malformed: false,
        }
    }

    pub fn malformed() -> Self {
        Self {
            malformed: true,
            ..Self::default()
        }
    }

    pub fn engine(&self) -> PassThroughEngine {
        PassThroughEngine {
            total_count: self.total_count,
            page_count: self.page_count,
        }
    }
}
