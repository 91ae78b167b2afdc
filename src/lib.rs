pub mod boards;
pub mod catalog;
pub mod config;
pub mod core;
pub mod delivery;
pub mod http;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod scrapers;
pub mod stats;
pub mod storage;

pub use crate::core::{run_board, BoardSession, JobBoard, Runner, ScoutError, ScoutResult};
pub use config::SearchSettings;
pub use http::{HttpRequest, HttpResponse};
pub use scrapers::Scraper;
pub use stats::StatsTracker;
pub use storage::DiskStorage;

/// Logger setup shared by the board binaries. `RUST_LOG` overrides the defaults.
pub fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .filter_module("selectors", log::LevelFilter::Warn)
        .filter_module("html5ever", log::LevelFilter::Error)
        .parse_default_env()
        .init();
}
