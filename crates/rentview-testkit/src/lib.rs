// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use rentview_app::{
    CollectionSource, Extractor, PageReply, PageRequest, PageSource, QueryState, Record,
    RequestTicket, Resource, derive_view,
};
use serde_json::{Value, json};
use std::sync::mpsc::Sender;
use time::macros::date;
use time::{Date, Duration};

const MAKES: [(&str, [&str; 3]); 8] = [
    ("Toyota", ["Corolla", "RAV4", "Camry"]),
    ("Honda", ["Civic", "CR-V", "Accord"]),
    ("Ford", ["Focus", "Escape", "Mustang"]),
    ("Kia", ["Rio", "Sportage", "Sorento"]),
    ("Tesla", ["Model 3", "Model Y", "Model S"]),
    ("Volkswagen", ["Golf", "Tiguan", "Passat"]),
    ("Subaru", ["Impreza", "Forester", "Outback"]),
    ("Hyundai", ["Elantra", "Tucson", "Santa Fe"]),
];

const CATEGORIES: [&str; 6] = ["economy", "compact", "midsize", "suv", "luxury", "van"];
const CAR_STATUSES: [&str; 3] = ["available", "rented", "maintenance"];
const BOOKING_STATUSES: [&str; 4] = ["pending", "confirmed", "completed", "cancelled"];
const LOCATIONS: [&str; 8] = [
    "Airport",
    "Downtown",
    "Harbor",
    "University",
    "Central Station",
    "Westside",
    "Old Town",
    "Riverside",
];
const ROLES: [&str; 3] = ["admin", "staff", "customer"];

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];

const BOOKING_SEASON_START: Date = date!(2026 - 01 - 01);

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

#[derive(Debug, Clone)]
pub struct FleetFaker {
    rng: DeterministicRng,
}

impl FleetFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn car(&mut self, id: u64) -> Value {
        let (make, models) = MAKES[self.rng.int_n(MAKES.len())];
        let model = self.pick(&models);
        // Whole-dollar rates in steps of five.
        let daily_rate = self.int_range(6, 40) * 5;
        json!({
            "id": id,
            "make": make,
            "model": model,
            "year": self.int_range(2015, 2026),
            "category": self.pick(&CATEGORIES),
            "daily_rate": daily_rate,
            "status": self.pick(&CAR_STATUSES),
            "location": self.pick(&LOCATIONS),
        })
    }

    pub fn booking(&mut self, id: u64, car_id: u64) -> Value {
        let pickup = BOOKING_SEASON_START + Duration::days(self.int_range(0, 300));
        let days = self.int_range(1, 14);
        let return_date = pickup + Duration::days(days);
        let rate = self.int_range(6, 40) * 5;
        json!({
            "id": id,
            "car_id": car_id,
            "customer": self.full_name(),
            "pickup_date": pickup.to_string(),
            "return_date": return_date.to_string(),
            "total_cost": rate * days,
            "status": self.pick(&BOOKING_STATUSES),
        })
    }

    pub fn user(&mut self, id: u64) -> Value {
        let name = self.full_name();
        json!({
            "id": id,
            "email": email_for(&name, id),
            "name": name,
            "role": self.pick(&ROLES),
        })
    }

    pub fn scoped_user(&mut self, id: u64) -> Value {
        let name = self.full_name();
        json!({
            "id": id,
            "email": email_for(&name, id),
            "name": name,
            "user_role": self.pick(&ROLES),
        })
    }

    pub fn records(&mut self, resource: Resource, count: usize) -> Vec<Value> {
        (1..=count as u64)
            .map(|id| match resource {
                Resource::Cars => self.car(id),
                Resource::Bookings => {
                    let car_id = self.int_range(1, count as i64) as u64;
                    self.booking(id, car_id)
                }
                Resource::Users => self.user(id),
            })
            .collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }

    fn full_name(&mut self) -> String {
        format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES))
    }
}

fn email_for(name: &str, id: u64) -> String {
    let local = name.to_lowercase().replace(' ', ".");
    format!("{local}{id}@example.com")
}

pub fn fleet_payload(resource: Resource, count: usize, seed: u64) -> Value {
    let key = resource.collection_key();
    let records = FleetFaker::new(seed).records(resource, count);
    json!({ key: records })
}

pub fn rated_cars(rates: &[i64]) -> Vec<Record> {
    rates
        .iter()
        .zip(1_u64..)
        .filter_map(|(rate, id)| Record::from_value(json!({"id": id, "daily_rate": rate})))
        .collect()
}

#[derive(Debug, Clone)]
pub struct MemoryCollectionSource {
    payload: std::result::Result<Value, String>,
    calls: usize,
}

impl MemoryCollectionSource {
    pub fn new(payload: Value) -> Self {
        Self {
            payload: Ok(payload),
            calls: 0,
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            payload: Err(message.into()),
            calls: 0,
        }
    }

    pub fn set_payload(&mut self, payload: Value) {
        self.payload = Ok(payload);
    }

    pub fn fail_with(&mut self, message: impl Into<String>) {
        self.payload = Err(message.into());
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl CollectionSource for MemoryCollectionSource {
    fn fetch_collection(&mut self) -> Result<Value> {
        self.calls += 1;
        self.payload.clone().map_err(|message| anyhow!(message))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPageSource {
    records: Vec<Record>,
    failure: Option<String>,
    requests: Vec<PageRequest>,
}

impl MemoryPageSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn from_payload(payload: &Value) -> Self {
        Self::new(Extractor::default().extract(payload).records)
    }

    pub fn fail_with(&mut self, message: impl Into<String>) {
        self.failure = Some(message.into());
    }

    pub fn recover(&mut self) {
        self.failure = None;
    }

    pub fn requests(&self) -> &[PageRequest] {
        &self.requests
    }

    pub fn respond(&self, request: &PageRequest) -> Value {
        let mut query = QueryState::default()
            .with_page_size(request.limit)
            .with_search(request.search.clone());
        for (field, value) in &request.filters {
            query = query.with_filter(field.clone(), value.clone());
        }
        if let Some(field) = &request.sort_field {
            query = query.with_sort(field.clone(), request.sort_direction);
        }
        let query = query.with_page(request.page);

        let view = derive_view(&self.records, &query);
        json!({
            "data": view.records,
            "total": view.total_count,
            "totalPages": view.page_count,
        })
    }
}

impl PageSource for MemoryPageSource {
    fn fetch_page(&mut self, request: &PageRequest) -> Result<Value> {
        self.requests.push(request.clone());
        if let Some(message) = &self.failure {
            bail!("{message}");
        }
        Ok(self.respond(request))
    }
}

#[derive(Debug)]
pub struct HeldRequest {
    pub ticket: RequestTicket,
    pub request: PageRequest,
    tx: Sender<PageReply>,
}

impl HeldRequest {
    pub fn reply(&self, result: std::result::Result<Value, String>) -> Result<()> {
        self.tx
            .send(PageReply {
                ticket: self.ticket,
                result,
            })
            .map_err(|_| anyhow!("table dropped its reply channel"))
    }
}

#[derive(Debug, Default)]
pub struct HeldPageSource {
    held: Vec<HeldRequest>,
}

impl HeldPageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn release(&self, index: usize, payload: Value) -> Result<()> {
        self.held_at(index)?.reply(Ok(payload))
    }

    pub fn release_error(&self, index: usize, message: impl Into<String>) -> Result<()> {
        self.held_at(index)?.reply(Err(message.into()))
    }

    pub fn release_from(&self, index: usize, backend: &MemoryPageSource) -> Result<()> {
        let held = self.held_at(index)?;
        held.reply(Ok(backend.respond(&held.request)))
    }

    fn held_at(&self, index: usize) -> Result<&HeldRequest> {
        self.held
            .get(index)
            .ok_or_else(|| anyhow!("no held request at index {index}"))
    }
}

impl PageSource for HeldPageSource {
    fn fetch_page(&mut self, _request: &PageRequest) -> Result<Value> {
        bail!("held sources only answer through spawn_fetch_page")
    }

    fn spawn_fetch_page(
        &mut self,
        ticket: RequestTicket,
        request: PageRequest,
        tx: Sender<PageReply>,
    ) -> Result<()> {
        self.held.push(HeldRequest {
            ticket,
            request,
            tx,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FleetFaker, MemoryPageSource, fleet_payload, rated_cars};
    use rentview_app::{Extractor, PageRequest, PageSize, QueryState, Resource};
    use serde_json::Value;
    use std::collections::BTreeSet;

    #[test]
    fn new_deterministic_seed() {
        let mut left = FleetFaker::new(42);
        let mut right = FleetFaker::new(42);
        assert_eq!(left.car(1), right.car(1));
        assert_eq!(left.booking(1, 3), right.booking(1, 3));
    }

    #[test]
    fn car_has_every_column() {
        let car = FleetFaker::new(3).car(7);
        for column in Resource::Cars.preferred_columns() {
            assert!(car.get(*column).is_some(), "missing {column}");
        }
        let rate = car["daily_rate"].as_i64().unwrap_or_default();
        assert!((30..=200).contains(&rate));
        assert_eq!(rate % 5, 0);
    }

    #[test]
    fn booking_returns_after_pickup() {
        let booking = FleetFaker::new(9).booking(1, 2);
        let pickup = booking["pickup_date"].as_str().unwrap_or_default();
        let returned = booking["return_date"].as_str().unwrap_or_default();
        assert!(returned > pickup, "{pickup} .. {returned}");
        assert_eq!(booking["car_id"], 2);
    }

    #[test]
    fn scoped_user_uses_prefixed_role() {
        let user = FleetFaker::new(5).scoped_user(1);
        assert!(user.get("role").is_none());
        assert!(user.get("user_role").and_then(Value::as_str).is_some());
    }

    #[test]
    fn variety_across_seeds() {
        let mut makes = BTreeSet::new();
        for seed in 0_u64..20_u64 {
            let car = FleetFaker::new(seed).car(1);
            makes.insert(car["make"].as_str().unwrap_or_default().to_owned());
        }
        assert!(makes.len() >= 4, "got {}", makes.len());
    }

    #[test]
    fn payload_nests_under_collection_key() {
        let payload = fleet_payload(Resource::Bookings, 4, 1);
        assert_eq!(payload["bookings"].as_array().map(Vec::len), Some(4));
        assert_eq!(Extractor::default().extract(&payload).records.len(), 4);
    }

    #[test]
    fn memory_page_source_pages_like_the_backend() {
        let backend = MemoryPageSource::new(rated_cars(&[10; 12]));
        let query = QueryState::default()
            .with_page_size(PageSize::Fixed(5))
            .with_page(3);
        let body = backend.respond(&PageRequest::from_query(&query));
        assert_eq!(body["total"], 12);
        assert_eq!(body["totalPages"], 3);
        assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    }
}
