// Public API for integration tests and potential library usage

pub mod api;
pub mod cards;
pub mod config;
pub mod identity;
pub mod routes;
pub mod session;
pub mod state;
pub mod types;
