// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::PageSize;

const WINDOW_RADIUS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
    Page(usize),
    Gap,
}

/// `All` spans the whole result set; an empty result still uses 1 so page
/// arithmetic never divides by zero.
pub fn effective_page_size(page_size: PageSize, total_count: usize) -> usize {
    match page_size {
        PageSize::Fixed(size) => size.max(1),
        PageSize::All => total_count.max(1),
    }
}

pub fn page_count(total_count: usize, page_size: PageSize) -> usize {
    total_count.div_ceil(effective_page_size(page_size, total_count))
}

pub fn clamp_page(page: usize, page_count: usize) -> usize {
    page.clamp(1, page_count.max(1))
}

pub fn page_bounds(page: usize, page_size: PageSize, total_count: usize) -> (usize, usize) {
    let size = effective_page_size(page_size, total_count);
    let start = page.saturating_sub(1).saturating_mul(size).min(total_count);
    let end = start.saturating_add(size).min(total_count);
    (start, end)
}

pub fn page_window(page: usize, page_count: usize) -> Vec<PageMarker> {
    if page_count <= 1 {
        return vec![PageMarker::Page(1)];
    }

    let current = clamp_page(page, page_count);
    let low = current.saturating_sub(WINDOW_RADIUS).max(1);
    let high = (current + WINDOW_RADIUS).min(page_count);

    let mut pages = Vec::with_capacity(high - low + 3);
    pages.push(1);
    pages.extend(low..=high);
    pages.push(page_count);
    pages.dedup();

    let mut markers = Vec::with_capacity(pages.len() + 2);
    let mut previous: Option<usize> = None;
    for number in pages {
        if let Some(previous) = previous
            && number > previous + 1
        {
            markers.push(PageMarker::Gap);
        }
        markers.push(PageMarker::Page(number));
        previous = Some(number);
    }
    markers
}
