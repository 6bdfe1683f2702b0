use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::tracker::{manager::TrackerState, session::Session};

use super::{overwrite_json, read_json};

pub const HISTORY_FILE: &str = "workhours.json";
pub const STATE_FILE: &str = "state.json";

/// Disk home of the tracker: the session history (a JSON array of sessions)
/// and the cross-invocation state, both inside one data directory.
pub struct HistoryStorage {
    data_dir: PathBuf,
}

impl HistoryStorage {
    pub fn new(data_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&data_dir)?;

        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE)
    }

    fn state_path(&self) -> PathBuf {
        self.data_dir.join(STATE_FILE)
    }

    /// A missing history file is an empty history; malformed JSON is a read
    /// failure for the caller to surface.
    pub async fn load_history(&self) -> Result<Vec<Session>> {
        Ok(read_json(&self.history_path()).await?.unwrap_or_default())
    }

    pub async fn save_history(&self, sessions: &[Session]) -> Result<()> {
        overwrite_json(&self.history_path(), sessions).await
    }

    pub async fn load_state(&self) -> Result<TrackerState> {
        Ok(read_json(&self.state_path()).await?.unwrap_or_default())
    }

    pub async fn save_state(&self, state: &TrackerState) -> Result<()> {
        overwrite_json(&self.state_path(), state).await
    }
}
