use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::application::ApplicationStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Stage {
    pub id: i64,
    pub application_id: i64,
    pub stage_name: ApplicationStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Seconds between `started_at` and `completed_at`, set when the stage closes.
    pub duration_seconds: Option<i64>,
    pub handled_by: Option<i64>,
    pub notes: Option<String>,
}

impl Stage {
    pub fn is_open(&self) -> bool {
        self.completed_at.is_none()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration_seconds.map(Duration::seconds)
    }

    pub fn duration_days(&self) -> Option<i64> {
        self.duration().map(|d| d.num_days())
    }

    /// Closes the stage at `at`. A clock that reads earlier than `started_at`
    /// is clamped so the stored interval is never negative.
    pub fn close(&mut self, at: DateTime<Utc>, notes: Option<&str>) {
        let completed_at = at.max(self.started_at);
        self.completed_at = Some(completed_at);
        self.duration_seconds = Some((completed_at - self.started_at).num_seconds());
        self.notes = merge_notes(self.notes.take(), notes);
    }
}

/// Appends `extra` to existing stage notes on a new line.
pub fn merge_notes(existing: Option<String>, extra: Option<&str>) -> Option<String> {
    let extra = extra.map(str::trim).filter(|s| !s.is_empty());
    match (existing, extra) {
        (Some(current), Some(add)) if !current.is_empty() => Some(format!("{}\n{}", current, add)),
        (_, Some(add)) => Some(add.to_string()),
        (current, None) => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_stage(started_at: DateTime<Utc>) -> Stage {
        Stage {
            id: 1,
            application_id: 1,
            stage_name: ApplicationStatus::Screening,
            started_at,
            completed_at: None,
            duration_seconds: None,
            handled_by: Some(3),
            notes: Some("phone screen booked".to_string()),
        }
    }

    #[test]
    fn close_records_duration_and_merges_notes() {
        let start = Utc::now() - Duration::days(3) - Duration::hours(2);
        let mut stage = open_stage(start);
        stage.close(Utc::now(), Some("passed"));

        assert!(!stage.is_open());
        assert_eq!(stage.duration_days(), Some(3));
        assert_eq!(stage.notes.as_deref(), Some("phone screen booked\npassed"));
    }

    #[test]
    fn close_never_produces_negative_duration() {
        let start = Utc::now();
        let mut stage = open_stage(start);
        stage.close(start - Duration::minutes(10), None);

        assert_eq!(stage.completed_at, Some(start));
        assert_eq!(stage.duration_seconds, Some(0));
        assert_eq!(stage.notes.as_deref(), Some("phone screen booked"));
    }

    #[test]
    fn merge_notes_ignores_blank_additions() {
        assert_eq!(merge_notes(None, Some("  ")), None);
        assert_eq!(merge_notes(Some(String::new()), Some("x")), Some("x".to_string()));
    }
}
