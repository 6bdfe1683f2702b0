//! Personal time tracker for the command line. Sessions are started and
//! stopped explicitly, tagged with a project, and kept in a single JSON
//! history file that can be summarized into per-day, per-project totals.
//!

pub mod cli;
pub mod storage;
pub mod tracker;
pub mod utils;
