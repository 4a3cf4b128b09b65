//! # League Dash
//!
//! A fantasy football league companion: weekly prize winners, total
//! winnings, chip usage, the head-to-head cup bracket and the prize fund.
//!
//! ## Architecture
//!
//! - **models**: Raw table records (scores, chips, cup matches) and derived views
//! - **storage**: Flat-file JSONL tables with schema validation
//! - **snapshot**: Process-wide immutable snapshot of the raw tables
//! - **calculate**: Winner, prize, chip and bracket aggregation
//! - **api**: REST API endpoints
//! - **fetch**: Fantasy API client
//! - **sync**: Batch ingestion writing the raw tables
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod models;
pub mod snapshot;
pub mod storage;
pub mod sync;

pub use models::*;
