//! Domain model for money handed out to a user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable once registered; only the bulk reset removes payouts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub id: String,
    pub date: DateTime<Utc>,
    pub user_id: String,
    #[serde(default, deserialize_with = "super::lenient::amount")]
    pub amount: f64,
}

impl Payout {
    pub fn generate_id() -> String {
        format!("payout::{}", Uuid::new_v4())
    }
}
