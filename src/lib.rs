pub mod analytics;
pub mod api;
pub mod config;
pub mod error;
pub mod state;
pub mod store;
