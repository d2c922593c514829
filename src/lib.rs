pub mod calculate;
pub mod chart_data;
pub mod clean;
pub mod config;
pub mod elo;
pub mod error;
pub mod projections;
pub mod records;
pub mod schedule_fetch;
pub mod store;
pub mod stream;
