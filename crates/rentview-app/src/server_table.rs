// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    PageReply, PageRequest, PageSource, QueryState, Record, RequestTicket, ServerPage,
    TableCommand, TableController, TableEvent, TableView, ViewEngine,
};
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, info, warn};

/// Asks the server for one page per view change. Replies may arrive in any
/// order; only the reply to the most recent request is applied.
pub struct ServerTable<S> {
    source: S,
    query: QueryState,
    records: Vec<Record>,
    total_count: usize,
    page_count: usize,
    loading: bool,
    error: Option<String>,
    last_ticket: RequestTicket,
    pending: Option<RequestTicket>,
    tx: Sender<PageReply>,
    rx: Receiver<PageReply>,
}

impl<S: PageSource> ServerTable<S> {
    pub fn new(source: S) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            query: QueryState::default(),
            records: Vec::new(),
            total_count: 0,
            page_count: 0,
            loading: false,
            error: None,
            last_ticket: RequestTicket::default(),
            pending: None,
            tx,
            rx,
        }
    }

    pub fn open(source: S, query: QueryState) -> Self {
        let mut table = Self::new(source);
        table.query = query;
        table.query.set_page(1);
        table.issue();
        table.poll();
        table
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn pending(&self) -> Option<RequestTicket> {
        self.pending
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    fn issue(&mut self) -> Vec<TableEvent> {
        let ticket = self.last_ticket.next();
        self.last_ticket = ticket;
        self.pending = Some(ticket);
        self.loading = true;

        let request = PageRequest::from_query(&self.query);
        debug!(%ticket, page = request.page, "requesting page");
        let mut events = vec![TableEvent::RequestIssued(ticket)];
        if let Err(error) = self.source.spawn_fetch_page(ticket, request, self.tx.clone()) {
            events.extend(self.apply(PageReply {
                ticket,
                result: Err(format!("{error:#}")),
            }));
        }
        events
    }

    fn apply(&mut self, reply: PageReply) -> Vec<TableEvent> {
        if self.pending != Some(reply.ticket) {
            debug!(ticket = %reply.ticket, "discarding stale page reply");
            return vec![TableEvent::StaleReplyDiscarded(reply.ticket)];
        }
        self.pending = None;
        self.loading = false;

        match reply.result {
            Ok(payload) => self.apply_page(ServerPage::from_payload(payload)),
            Err(message) => {
                warn!(ticket = %reply.ticket, error = %message, "page request failed");
                self.records.clear();
                self.total_count = 0;
                self.page_count = 0;
                self.error = Some(message.clone());
                vec![TableEvent::LoadFailed(message)]
            }
        }
    }

    fn apply_page(&mut self, page: ServerPage) -> Vec<TableEvent> {
        let mut events = Vec::new();
        if page.malformed {
            warn!("page payload has no record array");
            events.push(TableEvent::MalformedPayload);
        }
        let view = page.engine().derive(&page.records, &self.query);
        self.records = view.records;
        self.total_count = view.total_count;
        self.page_count = view.page_count;
        self.error = None;
        info!(total = self.total_count, pages = self.page_count, "page loaded");
        events.push(TableEvent::Loaded {
            total: self.total_count,
        });

        if let Some((from, to)) = self.query.clamp_page(self.page_count) {
            debug!(from, to, "page clamped after reply");
            events.push(TableEvent::PageClamped { from, to });
            events.extend(self.issue());
        }
        events
    }
}

impl<S: PageSource> TableController for ServerTable<S> {
    fn view(&self) -> TableView<'_> {
        TableView {
            data: &self.records,
            loading: self.loading,
            error: self.error.as_deref(),
            total_items: self.total_count,
            total_pages: self.page_count,
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
            TableCommand::Refresh => {
                let mut events = self.issue();
                events.extend(self.poll());
                return events;
            }
        };
        if !changed {
            return Vec::new();
        }

        let mut events = vec![TableEvent::QueryChanged];
        events.extend(self.issue());
        events.extend(self.poll());
        events
    }

    fn poll(&mut self) -> Vec<TableEvent> {
        let mut events = Vec::new();
        while let Ok(reply) = self.rx.try_recv() {
            events.extend(self.apply(reply));
        }
        events
    }
}
