use std::path::PathBuf;

use anyhow::Error;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    storage::{history::HistoryStorage, settings::Settings},
    tracker::{merge::merge_sessions, session::Session},
    utils::clock::Clock,
};

const DEFAULT_DESCRIPTION: &str = "Coding session";

/// Host state that outlives a single command invocation: the in-progress
/// session and the project new sessions are tagged with. Persisted next to
/// the history because every command runs in a fresh process.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_session: Option<Session>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_project: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum StartOutcome {
    Started { project: Option<String> },
    AlreadyRunning,
}

#[derive(Debug, PartialEq)]
pub enum StopOutcome {
    Stopped { hours: f64 },
    NotRunning,
}

/// Owns the current session, the loaded history and the selected project,
/// and pushes every mutation through [HistoryStorage]. One manager is
/// constructed per command invocation and dropped when it ends; commands are
/// serial, so no locking is needed beyond the storage file locks.
pub struct SessionManager {
    storage: HistoryStorage,
    settings: Settings,
    history: Vec<Session>,
    state: TrackerState,
    clock: Box<dyn Clock>,
}

impl SessionManager {
    /// Loads history and state from disk. Read failures are surfaced to the
    /// user and degrade to empty data; they never fail the command.
    pub async fn load(storage: HistoryStorage, settings: Settings, clock: Box<dyn Clock>) -> Self {
        let history = storage.load_history().await.unwrap_or_else(|e| {
            report_storage_error("load time data", &e);
            Vec::new()
        });
        let mut state = storage.load_state().await.unwrap_or_else(|e| {
            report_storage_error("load tracker state", &e);
            TrackerState::default()
        });
        if state.current_project.is_none() {
            state.current_project = settings.default_project.clone();
        }

        Self {
            storage,
            settings,
            history,
            state,
            clock,
        }
    }

    /// Starts a new session tagged with the current project, unless one is
    /// already in progress.
    pub async fn start(&mut self, description: Option<String>) -> StartOutcome {
        if self.state.current_session.is_some() {
            return StartOutcome::AlreadyRunning;
        }

        let mut session = Session::new(
            Some(description.unwrap_or_else(|| DEFAULT_DESCRIPTION.to_owned())),
            self.state.current_project.clone(),
        );
        session.start_at(self.clock.time());
        let project = session.project_tag.clone();

        self.state.current_session = Some(session);
        self.persist_state().await;
        StartOutcome::Started { project }
    }

    /// Stops the in-progress session, appends it to the history and persists
    /// both. Returns the total hours of the stopped session.
    pub async fn stop(&mut self) -> StopOutcome {
        let Some(mut session) = self.state.current_session.take() else {
            return StopOutcome::NotRunning;
        };

        let now = self.clock.time();
        session.stop_at(now);
        let hours = session.duration_hours(now);

        self.history.push(session);
        self.persist_history().await;
        self.persist_state().await;
        StopOutcome::Stopped { hours }
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn current_hours(&self) -> Option<f64> {
        self.state
            .current_session
            .as_ref()
            .map(|s| s.duration_hours(self.clock.time()))
    }

    /// The status-line text rendered by `watch`, refreshed once per second.
    pub fn status_line(&self) -> String {
        match &self.state.current_session {
            Some(session) => {
                let time_text = format!(
                    "Current Session: {:.2} hrs",
                    session.duration_hours(self.clock.time())
                );
                match &session.project_tag {
                    Some(tag) => format!("Project: {tag} | {time_text}"),
                    None => time_text,
                }
            }
            None => "No active session".to_owned(),
        }
    }

    /// Selects the project for new sessions; an in-progress session is
    /// retagged as well.
    pub async fn select_project(&mut self, project: String) {
        if let Some(session) = self.state.current_session.as_mut() {
            session.project_tag = Some(project.clone());
        }
        self.state.current_project = Some(project);
        self.persist_state().await;
    }

    /// Persists the currently selected project as the settings default.
    /// Returns the project, or `None` when nothing is selected.
    pub async fn set_default_project(&mut self) -> Option<String> {
        let project = self.state.current_project.clone()?;
        self.settings.default_project = Some(project.clone());
        if let Err(e) = self.settings.save(self.storage.data_dir()).await {
            report_storage_error("save settings", &e);
        }
        Some(project)
    }

    /// Merges same-day, same-project history entries and overwrites the
    /// history file. Returns the history length before and after.
    pub async fn summarize(&mut self) -> (usize, usize) {
        let before = self.history.len();
        self.history = merge_sessions(std::mem::take(&mut self.history));
        let after = self.history.len();
        self.persist_history().await;
        (before, after)
    }

    pub fn projects(&self) -> &[String] {
        &self.settings.projects
    }

    pub fn history_path(&self) -> PathBuf {
        self.storage.history_path()
    }

    async fn persist_history(&self) {
        if let Err(e) = self.storage.save_history(&self.history).await {
            report_storage_error("save time data", &e);
        }
    }

    async fn persist_state(&self) {
        if let Err(e) = self.storage.save_state(&self.state).await {
            report_storage_error("save tracker state", &e);
        }
    }
}

/// Storage failures are non-fatal: the user is told, the command carries on
/// with whatever is in memory.
fn report_storage_error(action: &str, error: &Error) {
    warn!("Failed to {action}: {error:#}");
    eprintln!("Failed to {action}: {error:#}");
}
