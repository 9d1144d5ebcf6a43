// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    CollectionSource, DerivedView, Extractor, InMemoryEngine, QueryState, Record, TableCommand,
    TableController, TableEvent, TableView, ViewEngine,
};
use tracing::{debug, warn};

pub struct ClientTable<S> {
    source: S,
    extractor: Extractor,
    records: Vec<Record>,
    query: QueryState,
    view: DerivedView,
    loading: bool,
    error: Option<String>,
}

impl<S: CollectionSource> ClientTable<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            extractor: Extractor::default(),
            records: Vec::new(),
            query: QueryState::default(),
            view: DerivedView::default(),
            loading: false,
            error: None,
        }
    }

    pub fn open(source: S, extractor: Extractor, query: QueryState) -> Self {
        let mut table = Self::new(source).with_extractor(extractor).with_query(query);
        table.load();
        table
    }

    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_query(mut self, query: QueryState) -> Self {
        self.query = query;
        self.recompute();
        self
    }

    pub fn load(&mut self) -> Vec<TableEvent> {
        self.query.set_page(1);
        self.fetch()
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    fn fetch(&mut self) -> Vec<TableEvent> {
        self.loading = true;
        debug!("fetching collection");

        let mut events = Vec::new();
        match self.source.fetch_collection() {
            Ok(payload) => {
                let extracted = self.extractor.extract(&payload);
                if extracted.malformed {
                    warn!("collection payload matched no extraction strategy");
                    events.push(TableEvent::MalformedPayload);
                }
                self.records = extracted.records;
                self.error = None;
                debug!(count = self.records.len(), "collection loaded");
                events.push(TableEvent::Loaded {
                    total: self.records.len(),
                });
            }
            Err(error) => {
                let message = format!("{error:#}");
                warn!(error = %message, "collection load failed");
                self.records = Vec::new();
                self.error = Some(message.clone());
                events.push(TableEvent::LoadFailed(message));
            }
        }
        self.loading = false;

        events.extend(self.recompute());
        events
    }

    fn recompute(&mut self) -> Vec<TableEvent> {
        let mut events = Vec::new();
        let mut view = InMemoryEngine.derive(&self.records, &self.query);
        if let Some((from, to)) = self.query.clamp_page(view.page_count) {
            debug!(from, to, "page clamped");
            events.push(TableEvent::PageClamped { from, to });
            view = InMemoryEngine.derive(&self.records, &self.query);
        }
        self.view = view;
        events
    }
}

impl<S: CollectionSource> TableController for ClientTable<S> {
    fn view(&self) -> TableView<'_> {
        TableView {
            data: &self.view.records,
            loading: self.loading,
            error: self.error.as_deref(),
            total_items: self.view.total_count,
            total_pages: self.view.page_count,
            search_term: self.query.search_term(),
            filters: self.query.filters(),
            sort_config: self.query.sort(),
            current_page: self.query.page(),
            items_per_page: self.query.page_size(),
        }
    }

    fn dispatch(&mut self, command: TableCommand) -> Vec<TableEvent> {
        let changed = match command {
            TableCommand::Search(term) => self.query.set_search(term),
            TableCommand::ChangeFilters(patch) => self.query.merge_filters(patch),
            TableCommand::ClearFilters => self.query.clear_filters(),
            TableCommand::Sort { field, direction } => self.query.set_sort(field, direction),
            TableCommand::ChangePage(page) => self.query.set_page(page),
            TableCommand::ChangePageSize(size) => self.query.set_page_size(size),
            TableCommand::Refresh => return self.fetch(),
        };
        if !changed {
            return Vec::new();
        }

        let mut events = vec![TableEvent::QueryChanged];
        events.extend(self.recompute());
        events
    }
}
