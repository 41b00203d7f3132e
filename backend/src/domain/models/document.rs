//! The whole persisted board document.
//!
//! The document is always read and written as one unit; there are no
//! partial updates at the storage boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use super::{LibraryTask, Payout, RecurringRule, Template, User, WeekSnapshot};
use crate::domain::WeekId;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoardDocument {
    /// The week store: at most one snapshot per identifier
    #[serde(default, deserialize_with = "deserialize_weeks")]
    pub weeks: BTreeMap<WeekId, WeekSnapshot>,
    #[serde(default, deserialize_with = "super::lenient::skip_invalid")]
    pub users: Vec<User>,
    #[serde(default, deserialize_with = "super::lenient::skip_invalid")]
    pub task_library: Vec<LibraryTask>,
    #[serde(default, deserialize_with = "super::lenient::skip_invalid")]
    pub templates: Vec<Template>,
    /// Chronological, oldest first
    #[serde(default, deserialize_with = "super::lenient::skip_invalid")]
    pub payouts: Vec<Payout>,
    #[serde(default, deserialize_with = "super::lenient::skip_invalid")]
    pub recurring_rules: Vec<RecurringRule>,
}

impl BoardDocument {
    /// First-run content: two household members and a couple of chores
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let mut first = User::new("Alex", 20.0, now);
        first.default_color_index = 0;
        first.icon = "⭐".to_string();
        let mut second = User::new("Sam", 20.0, now);
        second.default_color_index = 1;
        second.icon = "🌟".to_string();

        Self {
            users: vec![first, second],
            task_library: vec![
                LibraryTask {
                    id: LibraryTask::generate_id(),
                    text: "Empty the dishwasher".to_string(),
                    value: 5.0,
                    icon: "🍽️".to_string(),
                },
                LibraryTask {
                    id: LibraryTask::generate_id(),
                    text: "Set the table".to_string(),
                    value: 3.0,
                    icon: "🍴".to_string(),
                },
            ],
            ..Self::default()
        }
    }

    /// True for a document that carries no board data at all (first run)
    pub fn is_blank(&self) -> bool {
        self.weeks.is_empty()
            && self.users.is_empty()
            && self.task_library.is_empty()
            && self.templates.is_empty()
            && self.payouts.is_empty()
            && self.recurring_rules.is_empty()
    }

    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|user| user.id == user_id)
    }

    pub fn user_mut(&mut self, user_id: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|user| user.id == user_id)
    }

    pub fn user_by_name(&self, name: &str) -> Option<&User> {
        self.users.iter().find(|user| user.name == name)
    }

    pub fn library_task(&self, library_id: &str) -> Option<&LibraryTask> {
        self.task_library.iter().find(|task| task.id == library_id)
    }
}

/// Week keys are re-parsed into [`WeekId`]. Keys that do not parse are
/// dropped, and two spellings of the same week keep the first one.
/// A snapshot that is not an object is dropped on its own.
fn deserialize_weeks<'de, D>(deserializer: D) -> Result<BTreeMap<WeekId, WeekSnapshot>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: BTreeMap<String, Value> = match Value::deserialize(deserializer)? {
        Value::Object(entries) => entries.into_iter().collect(),
        Value::Null => BTreeMap::new(),
        other => {
            warn!("Expected an object of weeks, ignoring {}", other);
            BTreeMap::new()
        }
    };
    let mut weeks = BTreeMap::new();
    for (key, value) in raw {
        let week_id = match key.parse::<WeekId>() {
            Ok(week_id) => week_id,
            Err(e) => {
                warn!("Dropping week snapshot with unusable key '{}': {}", key, e);
                continue;
            }
        };
        if weeks.contains_key(&week_id) {
            warn!("Duplicate snapshot for week {} under key '{}', keeping the first", week_id, key);
            continue;
        }
        match serde_json::from_value::<WeekSnapshot>(value) {
            Ok(mut snapshot) => {
                snapshot.normalize();
                weeks.insert(week_id, snapshot);
            }
            Err(e) => warn!("Dropping unreadable snapshot for week {}: {}", week_id, e),
        }
    }
    Ok(weeks)
}
