//! Study statistics derived from completed focus sessions.
//!
//! Totals only move on a focus -> break transition. The streak counts
//! distinct calendar days with at least one completed session and never
//! resets on its own after a missed day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStats {
    #[serde(default)]
    pub total_sessions: u64,
    #[serde(default)]
    pub total_minutes: u64,
    #[serde(default)]
    pub current_streak: u64,
    /// Serialized as `YYYY-MM-DD`, or an empty string before the first session.
    #[serde(default, with = "date_or_empty")]
    pub last_study_date: Option<NaiveDate>,
}

impl StudyStats {
    /// Fold one completed focus session into the totals.
    ///
    /// `focus_minutes` is the length of the session that just ended, not the
    /// currently configured one; changing durations is never reconciled
    /// against history.
    pub fn record_focus_session(&self, focus_minutes: u32, today: NaiveDate) -> StudyStats {
        let is_new_day = self.last_study_date != Some(today);
        StudyStats {
            total_sessions: self.total_sessions.saturating_add(1),
            total_minutes: self.total_minutes.saturating_add(u64::from(focus_minutes)),
            current_streak: if is_new_day {
                self.current_streak.saturating_add(1)
            } else {
                self.current_streak
            },
            last_study_date: Some(today),
        }
    }

    pub fn studied_on(&self, day: NaiveDate) -> bool {
        self.last_study_date == Some(day)
    }
}

mod date_or_empty {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format(FORMAT).to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => NaiveDate::parse_from_str(text, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn first_session_starts_streak() {
        let stats = StudyStats::default().record_focus_session(25, day(1));
        assert_eq!(stats.total_sessions, 1);
        assert_eq!(stats.total_minutes, 25);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.last_study_date, Some(day(1)));
    }

    #[test]
    fn same_day_counts_streak_once() {
        let stats = StudyStats::default()
            .record_focus_session(45, day(2))
            .record_focus_session(45, day(2));
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_minutes, 90);
        assert_eq!(stats.current_streak, 1);
    }

    #[test]
    fn missed_days_do_not_reset_streak() {
        let stats = StudyStats::default()
            .record_focus_session(25, day(1))
            .record_focus_session(25, day(9));
        assert_eq!(stats.current_streak, 2);
        assert!(stats.studied_on(day(9)));
    }

    #[test]
    fn serializes_with_original_field_names() {
        let stats = StudyStats::default();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["lastStudyDate"], "");
        assert_eq!(json["totalSessions"], 0);

        let recorded = stats.record_focus_session(25, day(4));
        let json = serde_json::to_string(&recorded).unwrap();
        assert!(json.contains("\"lastStudyDate\":\"2026-03-04\""));
    }

    #[test]
    fn accepts_null_and_empty_dates() {
        let a: StudyStats = serde_json::from_str(
            r#"{"totalSessions":3,"totalMinutes":75,"currentStreak":2,"lastStudyDate":""}"#,
        )
        .unwrap();
        assert_eq!(a.last_study_date, None);

        let b: StudyStats = serde_json::from_str(r#"{"totalSessions":1,"lastStudyDate":null}"#).unwrap();
        assert_eq!(b.total_sessions, 1);
        assert_eq!(b.last_study_date, None);
    }

    #[test]
    fn rejects_garbage_date() {
        let result = serde_json::from_str::<StudyStats>(r#"{"lastStudyDate":"yesterday"}"#);
        assert!(result.is_err());
    }
}
