pub mod api;
pub mod catalog;
pub mod config;
pub mod resolve;
pub mod stats;
pub mod trend;
