// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{FilterPatch, PageSize, RequestTicket, SortDirection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCommand {
    Search(String),
    ChangeFilters(FilterPatch),
    ClearFilters,
    Sort {
        field: String,
        direction: Option<SortDirection>,
    },
    ChangePage(usize),
    ChangePageSize(PageSize),
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    QueryChanged,
    PageClamped { from: usize, to: usize },
    RequestIssued(RequestTicket),
    Loaded { total: usize },
    LoadFailed(String),
    MalformedPayload,
    StaleReplyDiscarded(RequestTicket),
}

impl TableEvent {
    pub fn status(&self) -> Option<String> {
        match self {
            Self::QueryChanged | Self::RequestIssued(_) | Self::StaleReplyDiscarded(_) => None,
            Self::PageClamped { from, to } => Some(format!("page {from} is gone, showing {to}")),
            Self::Loaded { total } => Some(format!("{total} loaded")),
            Self::LoadFailed(message) => Some(format!("load failed: {message}")),
            Self::MalformedPayload => Some("unexpected response shape".to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TableEvent;
    use crate::RequestTicket;

    #[test]
    fn status_text_skips_bookkeeping_events() {
        assert_eq!(TableEvent::QueryChanged.status(), None);
        assert_eq!(
            TableEvent::StaleReplyDiscarded(RequestTicket::new(3)).status(),
            None
        );
        assert_eq!(
            TableEvent::PageClamped { from: 4, to: 2 }.status(),
            Some("page 4 is gone, showing 2".to_owned())
        );
        assert_eq!(
            TableEvent::LoadFailed("timeout".to_owned()).status(),
            Some("load failed: timeout".to_owned())
        );
    }
}
