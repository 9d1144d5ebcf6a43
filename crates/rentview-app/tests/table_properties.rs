// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use rentview_app::{
    ClientTable, Extractor, FilterPatch, PageSize, QueryState, Record, Resource, ServerTable,
    SortDirection, TableController, TableEvent, derive_view,
};
use rentview_testkit::{
    FleetFaker, HeldPageSource, MemoryCollectionSource, MemoryPageSource, fleet_payload,
    rated_cars,
};
use serde_json::{Value, json};

fn fleet(count: usize, seed: u64) -> Vec<Record> {
    Extractor::default()
        .extract(&fleet_payload(Resource::Cars, count, seed))
        .records
}

fn ids(records: &[Record]) -> Vec<u64> {
    records
        .iter()
        .filter_map(|record| record.get("id").and_then(Value::as_u64))
        .collect()
}

fn rates(records: &[Record]) -> Vec<i64> {
    records
        .iter()
        .filter_map(|record| record.get("daily_rate").and_then(Value::as_i64))
        .collect()
}

fn patch(field: &str, value: &str) -> FilterPatch {
    FilterPatch::from([(field.to_owned(), Some(value.to_owned()))])
}

#[test]
fn derivation_is_idempotent() {
    let records = fleet(40, 7);
    let query = QueryState::default()
        .with_search("o")
        .with_filter("status", "available")
        .with_sort("daily_rate", SortDirection::Desc)
        .with_page_size(PageSize::Fixed(5));
    assert_eq!(derive_view(&records, &query), derive_view(&records, &query));
}

#[test]
fn search_only_narrows() {
    let records = fleet(60, 11);
    let everything = derive_view(&records, &QueryState::default().with_page_size(PageSize::All));
    let all_ids = ids(&everything.records);
    for term in ["a", "TOYOTA", "suv", "20", "airport", "zzz"] {
        let query = QueryState::default()
            .with_search(term)
            .with_page_size(PageSize::All);
        let found = derive_view(&records, &query);
        assert!(
            ids(&found.records).iter().all(|id| all_ids.contains(id)),
            "term {term}"
        );
        assert!(found.total_count <= everything.total_count);
    }
}

#[test]
fn filters_compose_as_intersection() {
    let records = fleet(80, 3);
    let all = PageSize::All;
    let by_status =
        derive_view(&records, &QueryState::default().with_filter("status", "available").with_page_size(all));
    let by_category =
        derive_view(&records, &QueryState::default().with_filter("category", "suv").with_page_size(all));
    let both = derive_view(
        &records,
        &QueryState::default()
            .with_filter("status", "available")
            .with_filter("category", "suv")
            .with_page_size(all),
    );

    let status_ids = ids(&by_status.records);
    let category_ids = ids(&by_category.records);
    let expected: Vec<u64> = status_ids
        .iter()
        .copied()
        .filter(|id| category_ids.contains(id))
        .collect();
    assert_eq!(ids(&both.records), expected);
}

#[test]
fn sort_is_stable_for_equal_keys() {
    let records = rated_cars(&[40, 30, 40, 30, 40]);
    let query = QueryState::default().with_sort("daily_rate", SortDirection::Asc);
    let view = derive_view(&records, &query);
    assert_eq!(ids(&view.records), vec![2, 4, 1, 3, 5]);

    let query = QueryState::default().with_sort("daily_rate", SortDirection::Desc);
    let view = derive_view(&records, &query);
    assert_eq!(ids(&view.records), vec![1, 3, 5, 2, 4]);
}

#[test]
fn pages_partition_the_matches() {
    let records = fleet(23, 5);
    for size in [1, 4, 5, 10, 23, 50] {
        let base = QueryState::default().with_page_size(PageSize::Fixed(size));
        let pages = derive_view(&records, &base).page_count;
        let mut seen = Vec::new();
        for page in 1..=pages {
            let view = derive_view(&records, &base.clone().with_page(page));
            assert!(view.records.len() <= size);
            seen.extend(ids(&view.records));
        }
        assert_eq!(seen, ids(&records), "size {size}");
    }
}

#[test]
fn twelve_records_in_pages_of_five() {
    let records = fleet(12, 1);
    let query = QueryState::default().with_page_size(PageSize::Fixed(5));
    assert_eq!(derive_view(&records, &query).page_count, 3);
    let view = derive_view(&records, &query.with_page(3));
    assert_eq!(view.records.len(), 2);
}

#[test]
fn role_filter_counts_matching_users() {
    let records: Vec<Record> = [json!({"role": "admin"}), json!({"role": "staff"}), json!({"role": "admin"})]
        .into_iter()
        .filter_map(Record::from_value)
        .collect();
    let view = derive_view(&records, &QueryState::default().with_filter("role", "admin"));
    assert_eq!(view.total_count, 2);
}

#[test]
fn role_filter_falls_back_to_scoped_field() {
    let mut faker = FleetFaker::new(4);
    let records: Vec<Record> = (1..=30)
        .map(|id| faker.scoped_user(id))
        .filter_map(Record::from_value)
        .collect();
    let admins = records
        .iter()
        .filter(|record| record.get("user_role") == Some(&json!("admin")))
        .count();
    let view = derive_view(
        &records,
        &QueryState::default()
            .with_filter("role", "admin")
            .with_page_size(PageSize::All),
    );
    assert_eq!(view.total_count, admins);
}

#[test]
fn all_page_size_shows_everything_on_one_page() {
    let records = fleet(37, 2);
    let view = derive_view(&records, &QueryState::default().with_page_size(PageSize::All));
    assert_eq!(view.page_count, 1);
    assert_eq!(view.records.len(), 37);
    assert_eq!(view.total_count, 37);
}

#[test]
fn daily_rate_sort_keeps_ties_in_order() {
    let records = rated_cars(&[50, 30, 30, 70]);
    let view = derive_view(
        &records,
        &QueryState::default().with_sort("daily_rate", SortDirection::Asc),
    );
    assert_eq!(rates(&view.records), vec![30, 30, 50, 70]);
    assert_eq!(ids(&view.records), vec![2, 3, 1, 4]);
}

#[test]
fn every_control_change_but_paging_resets_page() {
    let payload = fleet_payload(Resource::Cars, 50, 9);
    let query = QueryState::default().with_page_size(PageSize::Fixed(5));
    let mut table = ClientTable::open(MemoryCollectionSource::new(payload), Extractor::default(), query);

    table.handle_page_change(4);
    table.handle_search("a");
    assert_eq!(table.view().current_page, 1);

    table.handle_page_change(2);
    table.handle_filter_change(patch("status", "available"));
    assert_eq!(table.view().current_page, 1);

    table.handle_page_change(2);
    table.handle_sort("daily_rate", None);
    assert_eq!(table.view().current_page, 1);

    table.handle_page_change(2);
    table.handle_items_per_page_change(PageSize::Fixed(10));
    assert_eq!(table.view().current_page, 1);
}

#[test]
fn client_table_clamps_after_narrowing() {
    let payload = fleet_payload(Resource::Cars, 30, 12);
    let query = QueryState::default().with_page_size(PageSize::Fixed(5));
    let mut table = ClientTable::open(MemoryCollectionSource::new(payload), Extractor::default(), query);
    table.handle_page_change(6);
    assert_eq!(table.view().current_page, 6);

    table
        .source_mut()
        .set_payload(fleet_payload(Resource::Cars, 8, 12));
    table.refresh();
    let view = table.view();
    assert_eq!(view.total_pages, 2);
    assert_eq!(view.current_page, 2);
    assert!(view.current_page <= view.total_pages.max(1));
}

#[test]
fn client_refresh_keeps_filters_and_reports_failures() {
    let payload = fleet_payload(Resource::Cars, 20, 6);
    let mut table = ClientTable::open(
        MemoryCollectionSource::new(payload),
        Extractor::for_resource(Resource::Cars),
        QueryState::default(),
    );
    table.handle_filter_change(patch("category", "suv"));

    table.source_mut().fail_with("connection reset");
    let events = table.refresh();
    assert!(events.contains(&TableEvent::LoadFailed("connection reset".to_owned())));
    let view = table.view();
    assert!(view.data.is_empty());
    assert_eq!(view.error, Some("connection reset"));
    assert_eq!(view.filters.get("category").map(String::as_str), Some("suv"));
    assert_eq!(table.source().calls(), 2);
}

#[test]
fn server_table_matches_client_table() {
    let records = fleet(33, 21);
    let payload = json!({ "cars": records });
    let query = QueryState::default().with_page_size(PageSize::Fixed(4));

    let mut client = ClientTable::open(
        MemoryCollectionSource::new(payload),
        Extractor::default(),
        query.clone(),
    );
    let mut server = ServerTable::open(MemoryPageSource::new(records), query);

    let steps: Vec<Box<dyn Fn(&mut dyn TableController)>> = vec![
        Box::new(|table: &mut dyn TableController| {
            table.handle_search("o");
        }),
        Box::new(|table: &mut dyn TableController| {
            table.handle_sort("daily_rate", Some(SortDirection::Desc));
        }),
        Box::new(|table: &mut dyn TableController| {
            table.handle_page_change(2);
        }),
        Box::new(|table: &mut dyn TableController| {
            table.handle_filter_change(patch("status", "rented"));
        }),
        Box::new(|table: &mut dyn TableController| {
            table.handle_items_per_page_change(PageSize::All);
        }),
        Box::new(|table: &mut dyn TableController| {
            table.clear_filters();
        }),
    ];
    for step in steps {
        step(&mut client);
        step(&mut server);
        let (left, right) = (client.view(), server.view());
        assert_eq!(left.data, right.data);
        assert_eq!(left.total_items, right.total_items);
        assert_eq!(left.total_pages, right.total_pages);
        assert_eq!(left.current_page, right.current_page);
    }
}

#[test]
fn server_table_sends_one_request_per_change() {
    let mut table = ServerTable::open(MemoryPageSource::new(fleet(10, 1)), QueryState::default());
    table.handle_search("ford");
    table.handle_sort("year", None);
    table.handle_sort("year", None);
    table.handle_page_change(1);

    let requests = table.source().requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[3].sort_direction, SortDirection::Desc);
    assert_eq!(requests[3].search, "ford");
}

#[test]
fn out_of_order_replies_keep_latest_query() -> Result<()> {
    let backend = MemoryPageSource::new(fleet(40, 8));
    let mut table = ServerTable::open(HeldPageSource::new(), QueryState::default());
    table.handle_search("a");
    table.handle_filter_change(patch("status", "available"));

    let held = table.source();
    assert_eq!(held.len(), 3);
    held.release_from(2, &backend)?;
    held.release_from(0, &backend)?;
    held.release_from(1, &backend)?;
    let events = table.poll();

    let expected = backend.respond(&rentview_app::PageRequest::from_query(table.query()));
    let expected_ids: Vec<u64> = expected["data"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|row| row["id"].as_u64()).collect())
        .unwrap_or_default();
    assert_eq!(ids(table.view().data), expected_ids);
    let stale = events
        .iter()
        .filter(|event| matches!(event, TableEvent::StaleReplyDiscarded(_)))
        .count();
    assert_eq!(stale, 2);
    Ok(())
}

#[test]
fn server_error_clears_rows_until_refresh() {
    let mut table = ServerTable::open(MemoryPageSource::new(fleet(12, 2)), QueryState::default());
    assert_eq!(table.view().data.len(), 10);

    table.source_mut().fail_with("503 service unavailable");
    table.handle_page_change(2);
    assert!(table.view().data.is_empty());
    assert_eq!(table.view().error, Some("503 service unavailable"));

    table.source_mut().recover();
    table.refresh();
    assert_eq!(table.view().error, None);
    assert_eq!(table.view().data.len(), 2);
    assert_eq!(table.view().current_page, 2);
}

#[test]
fn server_page_past_the_end_is_clamped() {
    let query = QueryState::default().with_page_size(PageSize::Fixed(10));
    let mut table = ServerTable::open(MemoryPageSource::new(fleet(25, 4)), query);
    let events = table.handle_page_change(9);
    let view = table.view();
    assert_eq!(view.current_page, 3);
    assert_eq!(view.data.len(), 5);
    assert!(events.contains(&TableEvent::PageClamped { from: 9, to: 3 }));
    let pages: Vec<usize> = table.source().requests().iter().map(|request| request.page).collect();
    assert_eq!(pages, vec![1, 9, 3]);
}

#[test]
fn both_strategies_open_on_the_first_page() {
    let records = fleet(30, 13);
    let query = QueryState::default()
        .with_page_size(PageSize::Fixed(5))
        .with_page(4);
    let client = ClientTable::open(
        MemoryCollectionSource::new(json!({ "cars": records })),
        Extractor::default(),
        query.clone(),
    );
    let server = ServerTable::open(MemoryPageSource::new(records), query);
    assert_eq!(client.view().current_page, 1);
    assert_eq!(server.view().current_page, 1);
    assert_eq!(client.view().data, server.view().data);
}
