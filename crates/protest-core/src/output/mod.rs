//! Reporting surface.

pub mod stats;

pub use stats::{collect_run_report, record_stats, write_report, ProtestStats, REPORT_OUTPUT_PATH};
