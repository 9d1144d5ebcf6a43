// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use rentview_api::{ApiConfig, Client};
use rentview_app::{
    ClientTable, CollectionSource, Extractor, PageSize, QueryState, Resource, ServerTable,
    TableController,
};
use std::thread;
use std::time::{Duration, Instant};
use tiny_http::{Header, Response, Server};

fn json_response(body: &str, status: u16) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        )
}

fn mock_client(server: &Server) -> Result<Client> {
    Client::new(&ApiConfig {
        base_url: format!("http://{}/api", server.server_addr()),
        timeout: Duration::from_secs(2),
    })
}

#[test]
fn unreachable_backend_names_the_url() {
    let client = Client::new(&ApiConfig {
        base_url: "http://127.0.0.1:1/api".to_owned(),
        timeout: Duration::from_millis(200),
    })
    .expect("client should initialize");

    let error = client
        .resource(Resource::Cars)
        .fetch_collection()
        .expect_err("fetch should fail for unreachable endpoint");
    let message = format!("{error:#}");
    assert!(message.contains("http://127.0.0.1:1/api"), "{message}");
    assert!(message.contains("load cars"), "{message}");
}

#[test]
fn client_table_loads_nested_collection() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let client = mock_client(&server)?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/cars");
        let body = r#"{"cars":[{"id":1,"make":"Kia","daily_rate":45},{"id":2,"make":"Ford","daily_rate":60}]}"#;
        request
            .respond(json_response(body, 200))
            .expect("response should succeed");
    });

    let mut table = ClientTable::open(
        client.resource(Resource::Cars),
        Extractor::for_resource(Resource::Cars),
        QueryState::default(),
    );
    handle.join().expect("server thread should join");

    assert_eq!(table.view().total_items, 2);
    table.handle_search("ford");
    assert_eq!(table.view().total_items, 1);
    Ok(())
}

#[test]
fn server_error_envelope_becomes_table_error() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let client = mock_client(&server)?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(r#"{"message":"Access denied"}"#, 403))
            .expect("response should succeed");
    });

    let table = ClientTable::open(
        client.resource(Resource::Users),
        Extractor::for_resource(Resource::Users),
        QueryState::default(),
    );
    handle.join().expect("server thread should join");

    let error = table.view().error.unwrap_or_default();
    assert!(error.contains("server error (403): Access denied"), "{error}");
    assert!(table.view().data.is_empty());
    Ok(())
}

#[test]
fn server_table_sends_query_and_reads_totals() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let client = mock_client(&server)?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(
            request.url(),
            "/api/bookings?page=1&limit=all&search=walker&status=confirmed"
        );
        let body = r#"{"data":[{"id":7,"customer":"Avery Walker"}],"total":1,"totalPages":1}"#;
        request
            .respond(json_response(body, 200))
            .expect("response should succeed");
    });

    let query = QueryState::default()
        .with_search("walker")
        .with_filter("status", "confirmed")
        .with_page_size(PageSize::All);
    let mut table = ServerTable::open(client.resource(Resource::Bookings), query);

    let deadline = Instant::now() + Duration::from_secs(5);
    while table.view().loading && Instant::now() < deadline {
        table.poll();
        thread::sleep(Duration::from_millis(10));
    }
    handle.join().expect("server thread should join");

    let view = table.view();
    assert!(!view.loading);
    assert_eq!(view.total_items, 1);
    assert_eq!(view.data.len(), 1);
    Ok(())
}

#[test]
fn undecodable_body_is_an_error() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let client = mock_client(&server)?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response("<html>oops</html>", 200))
            .expect("response should succeed");
    });

    let error = client
        .fetch_collection(Resource::Cars)
        .expect_err("html body should not decode");
    handle.join().expect("server thread should join");
    assert!(format!("{error:#}").contains("decode response body"));
    Ok(())
}
