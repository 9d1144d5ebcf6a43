// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod client_table;
pub mod command;
pub mod controller;
pub mod engine;
pub mod extract;
pub mod model;
pub mod pagination;
pub mod query;
pub mod record;
pub mod server_table;
pub mod source;

pub use client_table::*;
pub use command::*;
pub use controller::*;
pub use engine::*;
pub use extract::*;
pub use model::*;
pub use pagination::*;
pub use query::*;
pub use record::*;
pub use server_table::*;
pub use source::*;
