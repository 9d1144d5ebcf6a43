// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Filters, PageSize, QueryState, SortDirection};
use anyhow::{Result, anyhow};
use serde_json::Value;
use std::fmt;
use std::sync::mpsc::Sender;

const RESERVED_PARAMS: [&str; 5] = ["page", "limit", "search", "sortField", "sortDirection"];

/// Monotonic stamp on every outbound page request. Only the reply carrying
/// the latest ticket may update a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for RequestTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: PageSize,
    pub search: String,
    pub sort_field: Option<String>,
    pub sort_direction: SortDirection,
    pub filters: Filters,
}

impl PageRequest {
    pub fn from_query(query: &QueryState) -> Self {
        Self {
            page: query.page(),
            limit: query.page_size(),
            search: query.search_term().to_owned(),
            sort_field: query.sort().field.clone(),
            sort_direction: query.sort().direction,
            filters: query.filters().clone(),
        }
    }

    /// `page, limit, search, sortField, sortDirection` followed by the
    /// active filters. Empty search and an unset sort are left out; the
    /// `All` page size is sent as `limit=all`.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_owned(), self.page.to_string()),
            ("limit".to_owned(), limit_param(self.limit)),
        ];
        if !self.search.is_empty() {
            params.push(("search".to_owned(), self.search.clone()));
        }
        if let Some(field) = &self.sort_field {
            params.push(("sortField".to_owned(), field.clone()));
            params.push((
                "sortDirection".to_owned(),
                self.sort_direction.as_str().to_owned(),
            ));
        }
        for (field, value) in &self.filters {
            if value.is_empty() {
                continue;
            }
            if RESERVED_PARAMS.contains(&field.as_str()) {
                tracing::warn!(field = %field, "filter key shadows a paging parameter; dropped");
                continue;
            }
            params.push((field.clone(), value.clone()));
        }
        params
    }
}

fn limit_param(limit: PageSize) -> String {
    match limit {
        PageSize::Fixed(size) => size.to_string(),
        PageSize::All => "all".to_owned(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageReply {
    pub ticket: RequestTicket,
    pub result: std::result::Result<Value, String>,
}

pub trait CollectionSource {
    fn fetch_collection(&mut self) -> Result<Value>;
}

pub trait PageSource {
    fn fetch_page(&mut self, request: &PageRequest) -> Result<Value>;

    fn spawn_fetch_page(
        &mut self,
        ticket: RequestTicket,
        request: PageRequest,
        tx: Sender<PageReply>,
    ) -> Result<()> {
        let result = self
            .fetch_page(&request)
            .map_err(|error| format!("{error:#}"));
        tx.send(PageReply { ticket, result })
            .map_err(|_| anyhow!("page reply channel closed"))?;
        Ok(())
    }
}

impl<S: CollectionSource + ?Sized> CollectionSource for Box<S> {
    fn fetch_collection(&mut self) -> Result<Value> {
        (**self).fetch_collection()
    }
}

impl<S: PageSource + ?Sized> PageSource for Box<S> {
    fn fetch_page(&mut self, request: &PageRequest) -> Result<Value> {
        (**self).fetch_page(request)
    }

    fn spawn_fetch_page(
        &mut self,
        ticket: RequestTicket,
        request: PageRequest,
        tx: Sender<PageReply>,
    ) -> Result<()> {
        (**self).spawn_fetch_page(ticket, request, tx)
    }
}
