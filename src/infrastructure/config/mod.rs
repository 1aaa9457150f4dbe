//! Infrastructure configuration modules.

pub mod dispatcher;
pub mod logging;
pub mod overrides;
pub mod providers;
pub mod scoring;
pub mod settings;

pub use settings::Config;
