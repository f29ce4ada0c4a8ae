//! The student's profile, captured once at onboarding.
//!
//! Only `study_level` matters to the timer; the rest is display data.
//! Values are validated here, at the boundary, so nothing invalid is ever
//! stored.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, ValidationError};
use crate::level::StudyLevel;
use crate::storage::{load_json, save_json, KeyValueStore, PROFILE_KEY};

pub const MAX_DAILY_GOAL_HOURS: u32 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub student_name: String,
    /// An unrecognised stored label reads as `Standard`.
    #[serde(deserialize_with = "level_or_standard")]
    pub study_level: StudyLevel,
    /// School class (9-12); only meaningful for the standard level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_class: Option<String>,
    /// Daily study goal in whole hours, kept as text like the onboarding form.
    pub daily_goal: String,
}

impl UserProfile {
    /// Build and validate a profile.
    ///
    /// # Errors
    /// Returns the first field that fails validation.
    pub fn new(
        student_name: &str,
        study_level: StudyLevel,
        current_class: Option<&str>,
        daily_goal: &str,
    ) -> Result<Self, ValidationError> {
        let profile = Self {
            student_name: student_name.trim().to_string(),
            study_level,
            current_class: current_class
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            daily_goal: daily_goal.trim().to_string(),
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.student_name.trim().chars().count() < 2 {
            return Err(ValidationError::invalid(
                "studentName",
                "name must be at least 2 characters",
            ));
        }

        self.daily_goal_hours()?;

        let class = self
            .current_class
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        if let Some(class) = class {
            if self.study_level != StudyLevel::Standard {
                return Err(ValidationError::invalid(
                    "currentClass",
                    "class only applies to the standard level",
                ));
            }
            match class.parse::<u32>() {
                Ok(9..=12) => {}
                _ => {
                    return Err(ValidationError::invalid(
                        "currentClass",
                        format!("'{class}' is not a class between 9 and 12"),
                    ))
                }
            }
        }
        Ok(())
    }

    /// The daily goal as hours.
    pub fn daily_goal_hours(&self) -> Result<u32, ValidationError> {
        match self.daily_goal.trim().parse::<u32>() {
            Ok(h) if (1..=MAX_DAILY_GOAL_HOURS).contains(&h) => Ok(h),
            _ => Err(ValidationError::invalid(
                "dailyGoal",
                format!(
                    "'{}' is not a whole number of hours between 1 and {MAX_DAILY_GOAL_HOURS}",
                    self.daily_goal
                ),
            )),
        }
    }

    /// Load the saved profile. A malformed record reads as absent.
    ///
    /// # Errors
    /// Returns an error only if the store itself fails.
    pub fn load(store: &impl KeyValueStore) -> Result<Option<Self>> {
        match load_json::<UserProfile>(store, PROFILE_KEY) {
            Ok(Some(profile)) if profile.validate().is_ok() => Ok(Some(profile)),
            Ok(Some(_)) => {
                tracing::warn!("ignoring invalid saved profile");
                Ok(None)
            }
            Ok(None) => Ok(None),
            Err(crate::error::CoreError::Json(e)) => {
                tracing::warn!(error = %e, "ignoring unreadable saved profile");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Validate and save.
    ///
    /// # Errors
    /// Returns a validation error, or a storage error if the write fails.
    pub fn save(&self, store: &impl KeyValueStore) -> Result<()> {
        self.validate()?;
        save_json(store, PROFILE_KEY, self)
    }

    /// Remove the saved profile.
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub fn clear(store: &impl KeyValueStore) -> Result<()> {
        store.remove(PROFILE_KEY)?;
        Ok(())
    }
}

fn level_or_standard<'de, D: Deserializer<'de>>(d: D) -> Result<StudyLevel, D::Error> {
    let label = String::deserialize(d)?;
    Ok(StudyLevel::parse_or_default(&label))
}
