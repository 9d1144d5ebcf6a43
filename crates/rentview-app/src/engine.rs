// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    Filters, PageSize, QueryState, Record, SortConfig, SortDirection, page_bounds, page_count,
    stringify_value,
};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivedView {
    pub records: Vec<Record>,
    pub total_count: usize,
    pub page_count: usize,
}

pub trait ViewEngine {
    fn derive(&self, records: &[Record], query: &QueryState) -> DerivedView;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryEngine;

impl ViewEngine for InMemoryEngine {
    fn derive(&self, records: &[Record], query: &QueryState) -> DerivedView {
        derive_view(records, query)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughEngine {
    pub total_count: Option<usize>,
    pub page_count: Option<usize>,
}

impl ViewEngine for PassThroughEngine {
    fn derive(&self, records: &[Record], query: &QueryState) -> DerivedView {
        let total_count = self.total_count.unwrap_or(records.len());
        let page_count = self
            .page_count
            .unwrap_or_else(|| page_count(total_count, query.page_size()));
        DerivedView {
            records: records.to_vec(),
            total_count,
            page_count,
        }
    }
}

pub fn derive_view(records: &[Record], query: &QueryState) -> DerivedView {
    let rows: Vec<&Record> = records.iter().collect();
    let rows = search(rows, query.search_term());
    let mut rows = filter(rows, query.filters());
    sort_records(&mut rows, query.sort());

    let total_count = rows.len();
    DerivedView {
        records: paginate(&rows, query.page(), query.page_size())
            .iter()
            .map(|row| (*row).clone())
            .collect(),
        total_count,
        page_count: page_count(total_count, query.page_size()),
    }
}

pub fn paginate<T>(rows: &[T], page: usize, page_size: PageSize) -> &[T] {
    let (start, end) = page_bounds(page, page_size, rows.len());
    &rows[start..end]
}

pub fn search<'a>(rows: Vec<&'a Record>, term: &str) -> Vec<&'a Record> {
    if term.is_empty() {
        return rows;
    }
    let needle = term.to_lowercase();
    rows.into_iter()
        .filter(|row| matches_search(row, &needle))
        .collect()
}

pub fn matches_search(record: &Record, needle: &str) -> bool {
    record
        .fields()
        .any(|(_, value)| stringify_value(value).to_lowercase().contains(needle))
}

pub fn filter<'a>(rows: Vec<&'a Record>, filters: &Filters) -> Vec<&'a Record> {
    if filters.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| matches_filters(row, filters))
        .collect()
}

pub fn matches_filters(record: &Record, filters: &Filters) -> bool {
    filters
        .iter()
        .filter(|(_, expected)| !expected.is_empty())
        .all(|(field, expected)| {
            matches!(record.filter_value(field), Some(Value::String(actual)) if actual == expected)
        })
}

/// Stable; rows with equal keys keep their input order.
pub fn sort_records(rows: &mut [&Record], sort: &SortConfig) {
    let Some(field) = sort.field.as_deref() else {
        return;
    };
    rows.sort_by(|left, right| compare_records(left, right, field, sort.direction));
}

/// Missing and `null` values sort after every present value in both
/// directions.
pub fn compare_records(
    left: &Record,
    right: &Record,
    field: &str,
    direction: SortDirection,
) -> Ordering {
    let left = left.get(field).filter(|value| !value.is_null());
    let right = right.get(field).filter(|value| !value.is_null());
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => {
            let ordering = compare_values(left, right);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
    }
}

pub fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => {
            if let (Some(left), Some(right)) = (left.as_i64(), right.as_i64()) {
                return left.cmp(&right);
            }
            if let (Some(left), Some(right)) = (left.as_u64(), right.as_u64()) {
                return left.cmp(&right);
            }
            let left = left.as_f64().unwrap_or(f64::NAN);
            let right = right.as_f64().unwrap_or(f64::NAN);
            left.total_cmp(&right)
        }
        (Value::String(left), Value::String(right)) => left.cmp(right),
        (Value::Bool(left), Value::Bool(right)) => left.cmp(right),
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
            left.to_string().cmp(&right.to_string())
        }
        _ => type_rank(left).cmp(&type_rank(right)),
    }
}

const fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
