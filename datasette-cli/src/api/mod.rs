//! Datasette write API client
//!
//! Translates loaded row sets into the wire format of Datasette's JSON API
//! (create/insert/update/delete plus the read endpoints) and normalizes
//! every response into a uniform success/error envelope.

pub mod batch;
pub mod client;
pub mod config;
pub mod encoding;
pub mod models;

pub use batch::{BatchReport, RowOutcome};
pub use client::DatasetteClient;
pub use config::ConnectionConfig;
pub use models::{CallResult, Column, ResponseBody};
