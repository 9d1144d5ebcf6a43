// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use rentview_app::{
    FilterPatch, PageMarker, PageSize, Resource, SortDirection, TableController, TableEvent,
    TableView,
};
use std::collections::BTreeSet;
use std::io;
use std::time::Duration;
use tracing::debug;

const PAGE_SIZE_STEPS: [PageSize; 5] = [
    PageSize::Fixed(5),
    PageSize::Fixed(10),
    PageSize::Fixed(25),
    PageSize::Fixed(50),
    PageSize::All,
];
const TICK: Duration = Duration::from_millis(120);
const GAP_MARK: &str = "…";
const SORT_MARK_ASC: &str = "▲";
const SORT_MARK_DESC: &str = "▼";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Search,
    Filter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewData {
    pub selected_col: usize,
    pub prompt: Option<Prompt>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    OpenSearch,
    OpenFilter,
    ClearFilters,
    SortSelected,
    SortSelectedDesc,
    MoveColumn(isize),
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,
    GrowPageSize,
    ShrinkPageSize,
    Refresh,
    Quit,
}

pub fn run_table<C: TableController + ?Sized>(controller: &mut C, resource: Resource) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    let mut view_data = ViewData::default();

    let mut result = Ok(());
    loop {
        let events = controller.poll();
        note_events(&mut view_data, &events);

        let view = controller.view();
        if let Err(error) = terminal.draw(|frame| render(frame, &view, &view_data, resource)) {
            result = Err(error).context("draw frame");
            break;
        }

        match event::poll(TICK).and_then(|ready| ready.then(event::read).transpose()) {
            Ok(Some(Event::Key(key))) => {
                if handle_key_event(controller, &mut view_data, resource, key) {
                    break;
                }
            }
            Ok(_) => {}
            Err(error) => {
                result = Err(error).context("read terminal event");
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

pub fn handle_key_event<C: TableController + ?Sized>(
    controller: &mut C,
    view_data: &mut ViewData,
    resource: Resource,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.prompt.is_some() {
        handle_prompt_key(controller, view_data, key);
        return false;
    }

    let Some(action) = key_action(key) else {
        return false;
    };
    let columns = table_columns(&controller.view(), resource);
    let events = match action {
        KeyAction::Quit => return true,
        KeyAction::OpenSearch => {
            view_data.prompt = Some(Prompt {
                kind: PromptKind::Search,
                input: controller.view().search_term.to_owned(),
            });
            return false;
        }
        KeyAction::OpenFilter => {
            view_data.prompt = Some(Prompt {
                kind: PromptKind::Filter,
                input: columns
                    .get(view_data.selected_col)
                    .map(|column| format!("{column}="))
                    .unwrap_or_default(),
            });
            return false;
        }
        KeyAction::MoveColumn(delta) => {
            view_data.selected_col = move_column(view_data.selected_col, delta, columns.len());
            return false;
        }
        KeyAction::ClearFilters => controller.clear_filters(),
        KeyAction::SortSelected | KeyAction::SortSelectedDesc => {
            let Some(column) = columns.get(view_data.selected_col) else {
                return false;
            };
            let direction = (action == KeyAction::SortSelectedDesc).then_some(SortDirection::Desc);
            controller.handle_sort(column, direction)
        }
        KeyAction::NextPage => {
            let view = controller.view();
            if !view.has_next_page() {
                return false;
            }
            let next = view.current_page + 1;
            controller.handle_page_change(next)
        }
        KeyAction::PreviousPage => {
            let previous = controller.view().current_page.saturating_sub(1);
            controller.handle_page_change(previous)
        }
        KeyAction::FirstPage => controller.handle_page_change(1),
        KeyAction::LastPage => {
            let last = controller.view().total_pages.max(1);
            controller.handle_page_change(last)
        }
        KeyAction::GrowPageSize | KeyAction::ShrinkPageSize => {
            let current = controller.view().items_per_page;
            let size = step_page_size(current, action == KeyAction::GrowPageSize);
            controller.handle_items_per_page_change(size)
        }
        KeyAction::Refresh => controller.refresh(),
    };
    note_events(view_data, &events);
    false
}

fn key_action(key: KeyEvent) -> Option<KeyAction> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => Some(KeyAction::Quit),
        (KeyCode::Char('/'), _) => Some(KeyAction::OpenSearch),
        (KeyCode::Char('f'), KeyModifiers::NONE) => Some(KeyAction::OpenFilter),
        (KeyCode::Char('F'), _) => Some(KeyAction::ClearFilters),
        (KeyCode::Char('s'), KeyModifiers::NONE) => Some(KeyAction::SortSelected),
        (KeyCode::Char('S'), _) => Some(KeyAction::SortSelectedDesc),
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => Some(KeyAction::MoveColumn(-1)),
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => Some(KeyAction::MoveColumn(1)),
        (KeyCode::Char('n'), _) | (KeyCode::PageDown, _) => Some(KeyAction::NextPage),
        (KeyCode::Char('p'), _) | (KeyCode::PageUp, _) => Some(KeyAction::PreviousPage),
        (KeyCode::Char('g'), _) | (KeyCode::Home, _) => Some(KeyAction::FirstPage),
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => Some(KeyAction::LastPage),
        (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => Some(KeyAction::GrowPageSize),
        (KeyCode::Char('-'), _) => Some(KeyAction::ShrinkPageSize),
        (KeyCode::Char('r'), KeyModifiers::NONE) => Some(KeyAction::Refresh),
        _ => None,
    }
}

fn handle_prompt_key<C: TableController + ?Sized>(
    controller: &mut C,
    view_data: &mut ViewData,
    key: KeyEvent,
) {
    let Some(prompt) = view_data.prompt.as_mut() else {
        return;
    };
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            view_data.prompt = None;
        }
        (KeyCode::Backspace, _) => {
            prompt.input.pop();
        }
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            prompt.input.clear();
        }
        (KeyCode::Enter, _) => {
            let Some(prompt) = view_data.prompt.take() else {
                return;
            };
            let events = match prompt.kind {
                PromptKind::Search => controller.handle_search(prompt.input.trim()),
                PromptKind::Filter => match parse_filter_input(&prompt.input) {
                    Some(patch) => controller.handle_filter_change(patch),
                    None => {
                        view_data.status = Some("filter must look like field=value".to_owned());
                        return;
                    }
                },
            };
            note_events(view_data, &events);
        }
        (KeyCode::Char(ch), modifiers) => {
            if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT {
                prompt.input.push(ch);
            }
        }
        _ => {}
    }
}

pub fn parse_filter_input(input: &str) -> Option<FilterPatch> {
    let (field, value) = input.split_once('=')?;
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    let value = value.trim();
    let value = (!value.is_empty()).then(|| value.to_owned());
    Some(FilterPatch::from([(field.to_owned(), value)]))
}

fn note_events(view_data: &mut ViewData, events: &[TableEvent]) {
    for event in events {
        debug!(?event, "table event");
    }
    if let Some(status) = events.iter().rev().find_map(TableEvent::status) {
        view_data.status = Some(status);
    }
}

fn move_column(selected: usize, delta: isize, column_count: usize) -> usize {
    if column_count == 0 {
        return 0;
    }
    selected
        .saturating_add_signed(delta)
        .min(column_count - 1)
}

pub fn step_page_size(current: PageSize, grow: bool) -> PageSize {
    let position = PAGE_SIZE_STEPS.iter().position(|step| *step == current);
    let index = match (position, current) {
        (Some(index), _) if grow => (index + 1).min(PAGE_SIZE_STEPS.len() - 1),
        (Some(index), _) => index.saturating_sub(1),
        (None, PageSize::All) => PAGE_SIZE_STEPS.len() - 1,
        (None, PageSize::Fixed(size)) => {
            let above = PAGE_SIZE_STEPS
                .iter()
                .position(|step| matches!(step, PageSize::Fixed(limit) if *limit > size))
                .unwrap_or(PAGE_SIZE_STEPS.len() - 1);
            if grow { above } else { above.saturating_sub(1) }
        }
    };
    PAGE_SIZE_STEPS[index]
}

pub fn table_columns(view: &TableView<'_>, resource: Resource) -> Vec<String> {
    let preferred = resource.preferred_columns();
    if view.data.is_empty() {
        return preferred.iter().map(|column| (*column).to_owned()).collect();
    }

    let present: BTreeSet<&str> = view.data.iter().flat_map(|record| record.keys()).collect();
    let mut columns: Vec<String> = preferred
        .iter()
        .copied()
        .filter(|column| present.contains(column))
        .map(str::to_owned)
        .collect();
    columns.extend(
        present
            .iter()
            .copied()
            .filter(|column| !preferred.contains(column))
            .map(str::to_owned),
    );
    columns
}

fn header_label(view: &TableView<'_>, column: &str) -> String {
    if view.sort_config.field.as_deref() != Some(column) {
        return column.to_owned();
    }
    let mark = match view.sort_config.direction {
        SortDirection::Asc => SORT_MARK_ASC,
        SortDirection::Desc => SORT_MARK_DESC,
    };
    format!("{column} {mark}")
}

pub fn header_text(view: &TableView<'_>, resource: Resource) -> String {
    let mut parts = vec![resource.label().to_owned()];
    if !view.search_term.is_empty() {
        parts.push(format!("search {:?}", view.search_term));
    }
    if !view.filters.is_empty() {
        let filters = view
            .filters
            .iter()
            .map(|(field, value)| format!("{field}={value}"))
            .collect::<Vec<_>>()
            .join(" ");
        parts.push(format!("filters {filters}"));
    }
    if let Some(field) = &view.sort_config.field {
        parts.push(format!("sort {field} {}", view.sort_config.direction.as_str()));
    }
    parts.join(" | ")
}

pub fn pager_text(view: &TableView<'_>) -> String {
    let window = view
        .page_window()
        .into_iter()
        .map(|marker| match marker {
            PageMarker::Page(page) if page == view.current_page => format!("[{page}]"),
            PageMarker::Page(page) => page.to_string(),
            PageMarker::Gap => GAP_MARK.to_owned(),
        })
        .collect::<Vec<_>>()
        .join(" ");
    let noun = if view.total_items == 1 { "item" } else { "items" };
    format!(
        "{window} | {} {noun} | {} per page",
        view.total_items, view.items_per_page
    )
}

pub fn status_text(view: &TableView<'_>, view_data: &ViewData) -> String {
    if let Some(prompt) = &view_data.prompt {
        let label = match prompt.kind {
            PromptKind::Search => "search",
            PromptKind::Filter => "filter",
        };
        return format!("{label}: {}_  (enter apply, esc cancel)", prompt.input);
    }

    let state = if view.loading {
        "loading…".to_owned()
    } else if let Some(error) = view.error {
        format!("error: {error} (r to retry)")
    } else {
        view_data.status.clone().unwrap_or_default()
    };
    let hints = "/ search | f/F filter | s/S sort | h/l col | n/p g/G page | +/- size | r | q";
    if state.is_empty() {
        hints.to_owned()
    } else {
        format!("{state} | {hints}")
    }
}

pub fn render_text_table(view: &TableView<'_>, columns: &[String]) -> String {
    let rows: Vec<Vec<String>> = view
        .data
        .iter()
        .map(|record| columns.iter().map(|column| record.display(column)).collect())
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            rows.iter()
                .map(|row| row[index].chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_text_row(&mut out, columns, &widths);
    for row in &rows {
        push_text_row(&mut out, row, &widths);
    }
    if rows.is_empty() {
        out.push_str(match view.error {
            Some(_) => "(load failed)\n",
            None => "(no matching records)\n",
        });
    }
    out
}

fn push_text_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

fn render(
    frame: &mut ratatui::Frame<'_>,
    view: &TableView<'_>,
    view_data: &ViewData,
    resource: Resource,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(view, resource))
        .block(Block::default().title("rentview").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    let columns = table_columns(view, resource);
    let widths = vec![Constraint::Min(6); columns.len().max(1)];
    let header_cells = columns.iter().enumerate().map(|(index, column)| {
        let mut style = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        if index == view_data.selected_col {
            style = style.fg(Color::Black).bg(Color::Cyan);
        }
        Cell::from(header_label(view, column)).style(style)
    });
    let rows = view.data.iter().map(|record| {
        Row::new(
            columns
                .iter()
                .map(|column| Cell::from(record.display(column)))
                .collect::<Vec<_>>(),
        )
    });
    let title = format!(
        "{} p{}/{}",
        resource.label(),
        view.current_page,
        view.total_pages.max(1)
    );
    let table = Table::new(rows, widths)
        .header(Row::new(header_cells))
        .column_spacing(1)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, layout[1]);

    let pager = Paragraph::new(pager_text(view)).style(Style::default().fg(Color::Cyan));
    frame.render_widget(pager, layout[2]);

    let status_style = if view.error.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let status = Paragraph::new(status_text(view, view_data))
        .style(status_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[3]);
}
