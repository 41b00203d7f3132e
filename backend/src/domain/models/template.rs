//! A saved week layout that can be loaded into the displayed week.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::WeekSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "super::lenient::or_default")]
    pub week: WeekSnapshot,
}

impl Template {
    pub fn generate_id() -> String {
        format!("template::{}", Uuid::new_v4())
    }
}
