//! Upcoming homework, project and exam deadlines.
//!
//! A plain ordered list stored under its own key. The timer never reads it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ValidationError};
use crate::storage::{load_json, save_json, KeyValueStore, DEADLINES_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadlineKind {
    Homework,
    Project,
    Exam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: DeadlineKind,
    pub priority: Priority,
}

impl Deadline {
    /// Whole days from `today` until the deadline; negative once it passed.
    pub fn days_until(&self, today: NaiveDate) -> i64 {
        (self.date - today).num_days()
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.days_until(today) < 0
    }
}

/// The saved deadline list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deadlines {
    items: Vec<Deadline>,
}

impl Deadlines {
    /// Load the list. An unreadable record reads as empty.
    ///
    /// # Errors
    /// Returns an error only if the store itself fails.
    pub fn load(store: &impl KeyValueStore) -> Result<Self> {
        match load_json::<Deadlines>(store, DEADLINES_KEY) {
            Ok(list) => Ok(list.unwrap_or_default()),
            Err(crate::error::CoreError::Json(e)) => {
                tracing::warn!(error = %e, "ignoring unreadable deadline list");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// # Errors
    /// Returns an error if the write fails.
    pub fn save(&self, store: &impl KeyValueStore) -> Result<()> {
        save_json(store, DEADLINES_KEY, self)
    }

    /// Append a deadline and return its generated id.
    ///
    /// # Errors
    /// Returns a validation error for an empty title.
    pub fn add(
        &mut self,
        title: &str,
        date: NaiveDate,
        kind: DeadlineKind,
        priority: Priority,
    ) -> Result<&Deadline, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::invalid("title", "title must not be empty"));
        }
        self.items.push(Deadline {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            date,
            kind,
            priority,
        });
        let added = &self.items[self.items.len() - 1];
        tracing::info!(id = %added.id, title = %added.title, "deadline added");
        Ok(added)
    }

    /// Remove a deadline by id.
    ///
    /// # Errors
    /// Returns `NotFound` if no deadline has that id.
    pub fn remove(&mut self, id: &str) -> Result<Deadline, ValidationError> {
        let index = self
            .items
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| ValidationError::NotFound {
                what: "deadline".into(),
                id: id.to_string(),
            })?;
        Ok(self.items.remove(index))
    }

    /// Entries in insertion order.
    pub fn items(&self) -> &[Deadline] {
        &self.items
    }

    /// Entries ordered by date, earliest first. Ties keep insertion order.
    pub fn sorted(&self) -> Vec<&Deadline> {
        let mut sorted: Vec<&Deadline> = self.items.iter().collect();
        sorted.sort_by_key(|d| d.date);
        sorted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
