pub mod api;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod models;
pub mod observability;
pub mod registry;
pub mod state;
pub mod store;
