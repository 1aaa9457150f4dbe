//! Provider-agnostic domain types.

pub mod error;
pub mod id;
pub mod liquidation;
pub mod metrics;
pub mod overrides;
pub mod price;
pub mod score;

pub use id::{AssetAddress, PoolId, RequestId, ServiceName};
pub use liquidation::LiquidationParameters;
pub use metrics::{AssetMetrics, ProviderMetrics, Ticker};
pub use overrides::{OverrideMode, OverrideTable, TestCategory, TestOverrides};
pub use price::{PriceSample, PriceSeries};
pub use score::{AssetInfo, AssetScore, Grade, PoolScore, Score, SubScore};
