// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Prefix tried when a filter key is missing on a record. Some user-scoped
/// record shapes store `role` as `user_role`.
pub const ROLE_SCOPED_PREFIX: &str = "user_";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Field lookup used by equality filters: the direct field wins, a
    /// role-scoped `user_<field>` is consulted only when the direct field is
    /// absent (a present `null` does not fall through).
    pub fn filter_value(&self, field: &str) -> Option<&Value> {
        self.0
            .get(field)
            .or_else(|| self.0.get(&format!("{ROLE_SCOPED_PREFIX}{field}")))
    }

    pub fn display(&self, field: &str) -> String {
        self.get(field).map(stringify_value).unwrap_or_default()
    }

}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
