// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::config::Strategy;
use anyhow::{Result, bail};
use rentview_api::{ApiConfig, Client};
use rentview_app::{
    ClientTable, Extractor, PageSize, QueryState, Resource, Role, ServerTable, TableController,
};
use rentview_testkit::{MemoryCollectionSource, MemoryPageSource, fleet_payload};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const DEMO_SEED: u64 = 2026;
const SETTLE_STEP: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSetup {
    pub resource: Resource,
    pub role: Role,
    pub strategy: Strategy,
    pub page_size: PageSize,
    pub demo: bool,
}

pub fn demo_count(resource: Resource) -> usize {
    match resource {
        Resource::Cars => 48,
        Resource::Bookings => 120,
        Resource::Users => 30,
    }
}

pub fn ensure_visible(role: Role, resource: Resource) -> Result<()> {
    if !role.can_view(resource) {
        bail!(
            "role {} cannot view {}; pick another --resource",
            role.as_str(),
            resource.as_str()
        );
    }
    Ok(())
}

pub fn check(setup: TableSetup, api: &ApiConfig) -> Result<()> {
    ensure_visible(setup.role, setup.resource)?;
    if !setup.demo {
        Client::new(api)?;
    }
    Ok(())
}

pub fn open_table(setup: TableSetup, api: &ApiConfig) -> Result<Box<dyn TableController>> {
    ensure_visible(setup.role, setup.resource)?;
    let query = QueryState::default().with_page_size(setup.page_size);
    let resource = setup.resource;
    info!(
        resource = resource.as_str(),
        role = setup.role.as_str(),
        strategy = ?setup.strategy,
        demo = setup.demo,
        "opening table"
    );

    let table: Box<dyn TableController> = if setup.demo {
        let payload = fleet_payload(resource, demo_count(resource), DEMO_SEED);
        match setup.strategy {
            Strategy::Client => Box::new(ClientTable::open(
                MemoryCollectionSource::new(payload),
                Extractor::for_resource(resource),
                query,
            )),
            Strategy::Server => Box::new(ServerTable::open(
                MemoryPageSource::from_payload(&payload),
                query,
            )),
        }
    } else {
        let source = Client::new(api)?.resource(resource);
        match setup.strategy {
            Strategy::Client => Box::new(ClientTable::open(
                source,
                Extractor::for_resource(resource),
                query,
            )),
            Strategy::Server => Box::new(ServerTable::open(source, query)),
        }
    };
    Ok(table)
}

pub fn settle(table: &mut dyn TableController, limit: Duration) -> bool {
    let deadline = Instant::now() + limit;
    loop {
        table.poll();
        if !table.view().loading {
            return true;
        }
        if Instant::now() >= deadline {
            warn!(?limit, "table still loading");
            return false;
        }
        thread::sleep(SETTLE_STEP);
    }
}
