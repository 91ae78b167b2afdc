mod board;
mod errors;
pub mod retry;
mod runner;

pub use board::{BoardSession, JobBoard, PageQuery};
pub use errors::{ScoutError, ScoutResult};
pub use runner::{run_board, CycleReport, Runner};
