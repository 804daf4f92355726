//! Core business logic abstractions

pub mod config;
pub mod currency;
pub mod log;
pub mod revenue;
pub mod state;
pub mod store;

// Re-export main types for cleaner imports
pub use currency::format_currency;
pub use revenue::{Credentials, RevenueSource, RevenueStats, SourceError, SourceId};
pub use state::AggregateState;
pub use store::{KeyValueStore, Settings};
