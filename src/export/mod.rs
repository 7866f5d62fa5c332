//! Flattening of the identity store and the daily snapshots into CSV tables for bulk loading.

mod tables;

pub use tables::{ExportSummary, export};
