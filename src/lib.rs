//! mealboard library
//!
//! School lunch menus from the NEIS Open API, with per-user ratings,
//! school-wide rating aggregates, and favorites. The binary wraps this in a
//! terminal UI; integration tests drive the orchestrator directly.

pub mod app;
pub mod auth;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod orchestrator;
pub mod ratings;
pub mod report;
pub mod stats;
pub mod store;
pub mod ui;
pub mod window;
