// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    FilterPatch, Filters, PageMarker, PageSize, Record, SortConfig, SortDirection, TableCommand,
    TableEvent, page_window,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableView<'a> {
    pub data: &'a [Record],
    pub loading: bool,
    pub error: Option<&'a str>,
    pub total_items: usize,
    pub total_pages: usize,
    pub search_term: &'a str,
    pub filters: &'a Filters,
    pub sort_config: &'a SortConfig,
    pub current_page: usize,
    pub items_per_page: PageSize,
}

impl TableView<'_> {
    pub fn page_window(&self) -> Vec<PageMarker> {
        page_window(self.current_page, self.total_pages)
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages
    }
}

pub trait TableController {
    fn view(&self) -> TableView<'_>;

    fn dispatch(&mut self, command: TableCommand) -> Vec<TableEvent>;

    fn poll(&mut self) -> Vec<TableEvent> {
        Vec::new()
    }

    fn handle_search(&mut self, term: &str) -> Vec<TableEvent> {
        self.dispatch(TableCommand::Search(term.to_owned()))
    }

    fn handle_filter_change(&mut self, patch: FilterPatch) -> Vec<TableEvent> {
        self.dispatch(TableCommand::ChangeFilters(patch))
    }

    fn clear_filters(&mut self) -> Vec<TableEvent> {
        self.dispatch(TableCommand::ClearFilters)
    }

    fn handle_sort(&mut self, field: &str, direction: Option<SortDirection>) -> Vec<TableEvent> {
        self.dispatch(TableCommand::Sort {
            field: field.to_owned(),
            direction,
        })
    }

    fn handle_page_change(&mut self, page: usize) -> Vec<TableEvent> {
        self.dispatch(TableCommand::ChangePage(page))
    }

    fn handle_items_per_page_change(&mut self, size: PageSize) -> Vec<TableEvent> {
        self.dispatch(TableCommand::ChangePageSize(size))
    }

    fn refresh(&mut self) -> Vec<TableEvent> {
        self.dispatch(TableCommand::Refresh)
    }
}

impl<T: TableController + ?Sized> TableController for Box<T> {
    fn view(&self) -> TableView<'_> {
        (**self).view()
    }

    fn dispatch(&mut self, command: TableCommand) -> Vec<TableEvent> {
        (**self).dispatch(command)
    }

    fn poll(&mut self) -> Vec<TableEvent> {
        (**self).poll()
    }
}
