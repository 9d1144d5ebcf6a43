// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::SortDirection;
use anyhow::{Result, bail};
use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_PAGE_SIZE: usize = 10;
const ALL_LABEL: &str = "All";

pub type Filters = BTreeMap<String, String>;

pub type FilterPatch = BTreeMap<String, Option<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageSize {
    Fixed(usize),
    All,
}

impl PageSize {
    pub const fn fixed(size: usize) -> Option<Self> {
        if size == 0 {
            None
        } else {
            Some(Self::Fixed(size))
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(ALL_LABEL) {
            return Ok(Self::All);
        }
        match trimmed.parse::<usize>() {
            Ok(size) if size > 0 => Ok(Self::Fixed(size)),
            _ => bail!("invalid page size {raw:?}; use a positive integer or \"All\""),
        }
    }

}

impl Default for PageSize {
    fn default() -> Self {
        Self::Fixed(DEFAULT_PAGE_SIZE)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(size) => write!(f, "{size}"),
            Self::All => f.write_str(ALL_LABEL),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortConfig {
    pub field: Option<String>,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn by(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: Some(field.into()),
            direction,
        }
    }
}

/// The view controls of one table.
///
/// Changing the search term, filters, sort or page size sends the page back
/// to 1. Changing the page touches nothing else. Every setter reports
/// whether the state actually changed so callers can skip redundant work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    search_term: String,
    filters: Filters,
    sort: SortConfig,
    page: usize,
    page_size: PageSize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            filters: Filters::new(),
            sort: SortConfig::default(),
            page: 1,
            page_size: PageSize::default(),
        }
    }
}

impl QueryState {
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn sort(&self) -> &SortConfig {
        &self.sort
    }

    pub const fn page(&self) -> usize {
        self.page
    }

    pub const fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.set_search(term);
        self
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        let mut patch = FilterPatch::new();
        patch.insert(field.into(), Some(value.into()));
        self.merge_filters(patch);
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.set_sort(field, Some(direction));
        self
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.set_page_size(page_size);
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.set_page(page);
        self
    }

    pub fn set_search(&mut self, term: impl Into<String>) -> bool {
        let term = term.into();
        if term == self.search_term {
            return false;
        }
        self.search_term = term;
        self.page = 1;
        true
    }

    pub fn merge_filters(&mut self, patch: FilterPatch) -> bool {
        let mut changed = false;
        for (field, value) in patch {
            match value.filter(|value| !value.is_empty()) {
                Some(value) => {
                    if self.filters.get(&field) != Some(&value) {
                        self.filters.insert(field, value);
                        changed = true;
                    }
                }
                None => {
                    changed |= self.filters.remove(&field).is_some();
                }
            }
        }
        if changed {
            self.page = 1;
        }
        changed
    }

    pub fn clear_filters(&mut self) -> bool {
        if self.filters.is_empty() {
            return false;
        }
        self.filters.clear();
        self.page = 1;
        true
    }

    /// Without an explicit direction a new field starts ascending and a
    /// repeated field flips direction.
    pub fn set_sort(&mut self, field: impl Into<String>, direction: Option<SortDirection>) -> bool {
        let field = field.into();
        let same_field = self.sort.field.as_deref() == Some(field.as_str());
        let direction = match direction {
            Some(direction) => direction,
            None if same_field => self.sort.direction.toggled(),
            None => SortDirection::Asc,
        };
        if same_field && direction == self.sort.direction {
            return false;
        }
        self.sort = SortConfig::by(field, direction);
        self.page = 1;
        true
    }

    pub fn set_page(&mut self, page: usize) -> bool {
        let page = page.max(1);
        if page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    pub fn set_page_size(&mut self, page_size: PageSize) -> bool {
        if page_size == self.page_size {
            return false;
        }
        self.page_size = page_size;
        self.page = 1;
        true
    }

    pub fn clamp_page(&mut self, page_count: usize) -> Option<(usize, usize)> {
        let clamped = crate::clamp_page(self.page, page_count);
        if clamped == self.page {
            return None;
        }
        let from = self.page;
        self.page = clamped;
        Some((from, clamped))
    }
}
