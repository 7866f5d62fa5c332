//! hubcrawl crate
//!
//! An incremental crawler for a public code-hosting site. Each run walks trending lists,
//! topics, owners and repositories, keeps the latest known identity of every entity in a
//! JSON identity store, and records the session's time-varying measurements in a daily
//! visit snapshot. The `export` command flattens both into CSV tables.
//!
//! This crate's API is an implementation detail of the `hubcrawl` tool and may change
//! without warning.

/// Result type alias using `ohno::AppError` as the default error type.
pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[doc(hidden)]
pub mod commands;

#[doc(hidden)]
pub mod config;

#[doc(hidden)]
pub mod crawl;

#[doc(hidden)]
pub mod export;

#[doc(hidden)]
pub mod extract;

#[doc(hidden)]
pub mod misc;

#[doc(hidden)]
pub mod model;

#[doc(hidden)]
pub mod store;

#[doc(hidden)]
pub mod transport;

pub use commands::{Host, run};
