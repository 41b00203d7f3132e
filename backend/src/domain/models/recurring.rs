//! Domain model for a standing rule that seeds new weeks with tasks.

use serde::{Deserialize, Serialize};
use shared::{DayKey, RecurrenceInterval};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringRule {
    pub id: String,
    /// Target buckets; `market` places the task in the unscheduled bucket
    #[serde(default, deserialize_with = "super::lenient::skip_invalid")]
    pub days: Vec<DayKey>,
    pub text: String,
    #[serde(default, deserialize_with = "super::lenient::amount")]
    pub value: f64,
    #[serde(default, deserialize_with = "super::lenient::or_default")]
    pub icon: String,
    /// User id the seeded tasks are assigned to
    #[serde(default, deserialize_with = "super::lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, deserialize_with = "super::lenient::or_default")]
    pub interval: RecurrenceInterval,
    /// ISO week number the biweekly parity is counted from
    #[serde(default, deserialize_with = "super::lenient::or_default")]
    pub start_week: u32,
}

impl RecurringRule {
    pub fn generate_id() -> String {
        format!("rule::{}", Uuid::new_v4())
    }
}
