//! Terminal front end: config, logging, effect execution and rendering.
mod app;
pub mod config;
mod effects;
pub mod logging;
mod ui;

pub use app::{run_search, run_tours};
