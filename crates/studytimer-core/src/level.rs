//! Study levels and their interval lengths.
//!
//! Every level maps to a fixed `{focus, break, long break}` triple. Lookups
//! never fail: an unknown label, a missing profile, or a broken override all
//! land on the `Standard` durations.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyLevel {
    /// School-level study (grades 9-12).
    #[default]
    #[serde(alias = "9-12")]
    Standard,
    /// Long-form exam preparation (medical entrance track).
    #[serde(alias = "NEET")]
    ExamTrackA,
    /// Long-form exam preparation (engineering entrance track).
    #[serde(alias = "IIT-JEE")]
    ExamTrackB,
}

impl StudyLevel {
    pub const ALL: [StudyLevel; 3] = [
        StudyLevel::Standard,
        StudyLevel::ExamTrackA,
        StudyLevel::ExamTrackB,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StudyLevel::Standard => "standard",
            StudyLevel::ExamTrackA => "exam_track_a",
            StudyLevel::ExamTrackB => "exam_track_b",
        }
    }

    /// Parse a level label, falling back to `Standard` for anything unknown.
    pub fn parse_or_default(label: &str) -> Self {
        label.parse().unwrap_or_else(|_| {
            tracing::warn!(label, "unknown study level, using standard");
            StudyLevel::Standard
        })
    }
}

impl fmt::Display for StudyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudyLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "standard" | "9-12" => Ok(StudyLevel::Standard),
            "exam_track_a" | "NEET" => Ok(StudyLevel::ExamTrackA),
            "exam_track_b" | "IIT-JEE" => Ok(StudyLevel::ExamTrackB),
            other => Err(ValidationError::invalid(
                "studyLevel",
                format!("unknown study level '{other}'"),
            )),
        }
    }
}

/// Interval lengths in minutes for one study level.
///
/// Invariant: all three are non-zero and `long_break_minutes >= break_minutes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub focus_minutes: u32,
    pub break_minutes: u32,
    pub long_break_minutes: u32,
}

impl LevelConfig {
    pub const STANDARD: LevelConfig = LevelConfig {
        focus_minutes: 25,
        break_minutes: 5,
        long_break_minutes: 15,
    };
    pub const EXAM_TRACK_A: LevelConfig = LevelConfig {
        focus_minutes: 45,
        break_minutes: 10,
        long_break_minutes: 30,
    };
    pub const EXAM_TRACK_B: LevelConfig = LevelConfig {
        focus_minutes: 50,
        break_minutes: 10,
        long_break_minutes: 30,
    };

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.focus_minutes == 0 || self.break_minutes == 0 || self.long_break_minutes == 0 {
            return Err(ValidationError::invalid(
                "levelConfig",
                "durations must be greater than zero",
            ));
        }
        if self.long_break_minutes < self.break_minutes {
            return Err(ValidationError::invalid(
                "levelConfig",
                format!(
                    "long break ({}) shorter than break ({})",
                    self.long_break_minutes, self.break_minutes
                ),
            ));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Minutes for the given mode.
    pub fn minutes_for(&self, is_break: bool, is_long_break: bool) -> u32 {
        match (is_break, is_long_break) {
            (false, _) => self.focus_minutes,
            (true, true) => self.long_break_minutes,
            (true, false) => self.break_minutes,
        }
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Built-in durations for a level.
pub fn resolve(level: StudyLevel) -> LevelConfig {
    match level {
        StudyLevel::Standard => LevelConfig::STANDARD,
        StudyLevel::ExamTrackA => LevelConfig::EXAM_TRACK_A,
        StudyLevel::ExamTrackB => LevelConfig::EXAM_TRACK_B,
    }
}

/// Resolver with optional per-level overrides from the config file.
#[derive(Debug, Clone, Default)]
pub struct LevelResolver {
    overrides: HashMap<StudyLevel, LevelConfig>,
}

impl LevelResolver {
    /// Build a resolver. Overrides breaking the `LevelConfig` invariant are
    /// dropped here so `resolve` stays total.
    pub fn new(overrides: HashMap<StudyLevel, LevelConfig>) -> Self {
        let overrides = overrides
            .into_iter()
            .filter(|(level, cfg)| match cfg.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(%level, error = %e, "ignoring level override");
                    false
                }
            })
            .collect();
        Self { overrides }
    }

    pub fn resolve(&self, level: StudyLevel) -> LevelConfig {
        self.overrides
            .get(&level)
            .copied()
            .unwrap_or_else(|| resolve(level))
    }

    /// Resolve for an optional level, e.g. when no profile has been saved yet.
    pub fn resolve_or_default(&self, level: Option<StudyLevel>) -> LevelConfig {
        self.resolve(level.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table() {
        assert_eq!(resolve(StudyLevel::Standard), LevelConfig::STANDARD);
        assert_eq!(resolve(StudyLevel::ExamTrackA).focus_minutes, 45);
        assert_eq!(resolve(StudyLevel::ExamTrackB).focus_minutes, 50);
        for level in StudyLevel::ALL {
            assert!(resolve(level).is_valid());
        }
    }

    #[test]
    fn unknown_label_falls_back_to_standard() {
        assert_eq!(StudyLevel::parse_or_default("college"), StudyLevel::Standard);
        assert_eq!(StudyLevel::parse_or_default("NEET"), StudyLevel::ExamTrackA);
        assert_eq!(
            StudyLevel::parse_or_default("exam_track_b"),
            StudyLevel::ExamTrackB
        );
    }

    #[test]
    fn legacy_labels_deserialize() {
        let level: StudyLevel = serde_json::from_str("\"IIT-JEE\"").unwrap();
        assert_eq!(level, StudyLevel::ExamTrackB);
        let level: StudyLevel = serde_json::from_str("\"9-12\"").unwrap();
        assert_eq!(level, StudyLevel::Standard);
        assert_eq!(
            serde_json::to_string(&StudyLevel::ExamTrackA).unwrap(),
            "\"exam_track_a\""
        );
    }

    #[test]
    fn validate_rejects_zero_and_short_long_break() {
        let zero = LevelConfig {
            focus_minutes: 0,
            ..LevelConfig::STANDARD
        };
        assert!(zero.validate().is_err());

        let inverted = LevelConfig {
            focus_minutes: 25,
            break_minutes: 10,
            long_break_minutes: 5,
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn resolver_prefers_valid_overrides() {
        let custom = LevelConfig {
            focus_minutes: 30,
            break_minutes: 6,
            long_break_minutes: 20,
        };
        let broken = LevelConfig {
            focus_minutes: 40,
            break_minutes: 10,
            long_break_minutes: 2,
        };
        let resolver = LevelResolver::new(HashMap::from([
            (StudyLevel::Standard, custom),
            (StudyLevel::ExamTrackA, broken),
        ]));

        assert_eq!(resolver.resolve(StudyLevel::Standard), custom);
        assert_eq!(
            resolver.resolve(StudyLevel::ExamTrackA),
            LevelConfig::EXAM_TRACK_A
        );
        assert_eq!(resolver.resolve_or_default(None), custom);
    }

    #[test]
    fn minutes_for_each_mode() {
        let cfg = LevelConfig::STANDARD;
        assert_eq!(cfg.minutes_for(false, true), 25);
        assert_eq!(cfg.minutes_for(true, false), 5);
        assert_eq!(cfg.minutes_for(true, true), 15);
    }
}
