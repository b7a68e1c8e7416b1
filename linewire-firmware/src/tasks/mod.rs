//! Embassy async tasks

pub mod stats;

pub use stats::stats_task;
