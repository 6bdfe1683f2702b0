use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::time::iso_millis_opt;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// One tracked interval of work. Every field is optional: a session is
/// created idle (no start), started once, stopped once, and appended to the
/// history. `duration` is only populated by summarization, where it caches
/// the combined hours of the collapsed sessions.
///
/// Serialized with camelCase names and without absent fields, matching the
/// on-disk history format.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_tag: Option<String>,
    #[serde(with = "iso_millis_opt", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(with = "iso_millis_opt", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl Session {
    pub fn new(description: Option<String>, project_tag: Option<String>) -> Self {
        Self {
            description,
            project_tag,
            ..Self::default()
        }
    }

    /// Marks the session as started. A second call is a no-op, so an
    /// in-progress session can never lose its original start.
    pub fn start_at(&mut self, now: DateTime<Utc>) {
        if self.start_time.is_none() {
            self.start_time = Some(now);
        }
    }

    /// Marks the session as stopped. Does nothing before the first start or
    /// after a previous stop, so the true end time is never overwritten.
    pub fn stop_at(&mut self, now: DateTime<Utc>) {
        if self.start_time.is_some() && self.end_time.is_none() {
            self.end_time = Some(now);
        }
    }

    pub fn is_running(&self) -> bool {
        self.start_time.is_some() && self.end_time.is_none()
    }

    /// Elapsed hours. A cached `duration` is authoritative; otherwise the
    /// interval is measured against `end_time`, or against `now` while the
    /// session is still running. A session that never started has length 0.
    pub fn duration_hours(&self, now: DateTime<Utc>) -> f64 {
        if let Some(hours) = self.duration {
            return hours;
        }
        match self.start_time {
            Some(start) => hours_between(start, self.end_time.unwrap_or(now)),
            None => 0.0,
        }
    }

    /// Hours of a closed session, defined without consulting a clock. `None`
    /// while the session is idle or running and carries no cached duration.
    pub(crate) fn closed_hours(&self) -> Option<f64> {
        match (self.duration, self.start_time, self.end_time) {
            (Some(hours), _, _) => Some(hours),
            (None, Some(start), Some(end)) => Some(hours_between(start, end)),
            _ => None,
        }
    }

    pub(crate) fn with_times(self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start_time: Some(start),
            end_time: Some(end),
            ..self
        }
    }
}

fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::Session;

    fn utc(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 3, hour, minute, 0).unwrap()
    }

    #[test]
    fn duration_from_start_and_end() {
        let session = Session::new(Some("Test Session".into()), None).with_times(utc(8, 0), utc(10, 0));
        assert_eq!(session.duration_hours(utc(23, 0)), 2.0);
    }

    #[test]
    fn duration_is_zero_without_start() {
        let session = Session::new(Some("Test Session".into()), None);
        assert_eq!(session.duration_hours(utc(12, 0)), 0.0);
    }

    #[test]
    fn duration_of_running_session_uses_now() {
        let mut session = Session::new(Some("Test Session".into()), None);
        session.start_at(utc(8, 0));
        assert_eq!(session.duration_hours(utc(8, 30)), 0.5);
    }

    #[test]
    fn cached_duration_wins_over_interval() {
        let mut session = Session::new(None, None).with_times(utc(8, 0), utc(10, 0));
        session.duration = Some(7.25);
        assert_eq!(session.duration_hours(utc(23, 0)), 7.25);
    }

    #[test]
    fn second_start_keeps_original_start_time() {
        let mut session = Session::new(Some("Test Session".into()), None);
        session.start_at(utc(8, 0));
        session.start_at(utc(9, 0));
        assert_eq!(session.start_time, Some(utc(8, 0)));
    }

    #[test]
    fn stop_before_start_does_nothing() {
        let mut session = Session::new(Some("Test Session".into()), None);
        session.stop_at(utc(9, 0));
        assert_eq!(session.end_time, None);
    }

    #[test]
    fn second_stop_keeps_original_end_time() {
        let mut session = Session::new(Some("Test Session".into()), None);
        session.start_at(utc(8, 0));
        session.stop_at(utc(9, 0));
        session.stop_at(utc(10, 0));
        assert_eq!(session.end_time, Some(utc(9, 0)));
    }

    #[test]
    fn absent_fields_are_omitted_from_json() {
        let session = Session::new(Some("desc".into()), Some("proj".into()));
        assert_eq!(
            serde_json::to_string(&session).unwrap(),
            r#"{"description":"desc","projectTag":"proj"}"#
        );
    }

    #[test]
    fn timestamps_serialize_as_iso_millis() {
        let session =
            Session::new(Some("desc".into()), Some("proj".into())).with_times(utc(8, 0), utc(10, 0));
        assert_eq!(
            serde_json::to_string(&session).unwrap(),
            r#"{"description":"desc","projectTag":"proj","startTime":"2024-12-03T08:00:00.000Z","endTime":"2024-12-03T10:00:00.000Z"}"#
        );
    }

    #[test]
    fn revival_is_schema_aware() {
        // A description that happens to look like a timestamp stays a string.
        let json = r#"{"description":"2024-12-03T08:00:00.000Z","startTime":"2024-12-03T08:00:00.000Z"}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.description.as_deref(), Some("2024-12-03T08:00:00.000Z"));
        assert_eq!(session.start_time, Some(utc(8, 0)));
        assert_eq!(session.end_time, None);
    }
}
