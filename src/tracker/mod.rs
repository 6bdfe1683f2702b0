//! The session lifecycle and the history summarization.
//!
//! A [session::Session] moves idle -> running -> stopped, guarded so that
//! neither transition can fire twice. Stopped sessions accumulate in the
//! history, which [merge::merge_sessions] collapses into one summary per
//! (UTC day, project). [manager::SessionManager] ties both to storage.

pub mod manager;
pub mod merge;
pub mod session;
