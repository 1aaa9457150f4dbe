//! Outbound adapters (driven side).
//!
//! - [`http`] - Dispatcher-backed JSON client for live providers
//! - [`live`] - Provider-backed data ports over [`http`]
//! - [`snapshot`] - Recorded pool data for offline scoring

pub mod http;
pub mod live;
pub mod snapshot;

pub use http::HttpClient;
pub use live::{LiveSource, ProviderEndpoints};
pub use snapshot::SnapshotSource;
