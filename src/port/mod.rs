//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! The scoring pipeline never talks to a provider directly. It asks an
//! outbound port for metrics and price histories; adapters decide whether
//! those come from live HTTP providers or a recorded snapshot.
//!
//! # Available Ports
//!
//! - [`MarketDataSource`] - Per-asset financial metrics
//! - [`PriceHistorySource`] - Historical prices and the chain head

pub mod outbound;

pub use outbound::{MarketDataSource, PriceHistorySource};
