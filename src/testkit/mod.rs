//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`source`]: [`ScriptedSource`](source::ScriptedSource), an in-memory
//!   implementation of the outbound data ports.
//! - [`domain`]: Builders for metrics, pool listings and price series.
//! - [`config`]: Canonical test configurations.

pub mod config;
pub mod domain;
pub mod source;
