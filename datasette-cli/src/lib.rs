//! Upload and manage tabular data in Datasette instances
//!
//! The crate is split into the API client ([`api`]), file ingestion
//! ([`load`]), layered configuration ([`config`]) and the command-line
//! surface ([`cli`]).

pub mod api;
pub mod cli;
pub mod config;
pub mod load;
