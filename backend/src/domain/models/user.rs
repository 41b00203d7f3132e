//! Domain model for a household member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Display name, unique among live users
    pub name: String,
    #[serde(default, deserialize_with = "super::lenient::amount")]
    pub fixed_allowance: f64,
    #[serde(default, deserialize_with = "super::lenient::or_default")]
    pub default_color_index: u8,
    #[serde(default, deserialize_with = "super::lenient::or_default")]
    pub icon: String,
    /// Absent for users that predate creation tracking; those earn the
    /// allowance for every stored week
    #[serde(default, deserialize_with = "super::lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Net earned-minus-paid folded out of archived weeks and payouts
    #[serde(default, deserialize_with = "super::lenient::amount")]
    pub archived_balance: f64,
}

impl User {
    pub fn generate_id() -> String {
        format!("user::{}", Uuid::new_v4())
    }

    pub fn new(name: &str, fixed_allowance: f64, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Self::generate_id(),
            name: name.to_string(),
            fixed_allowance,
            default_color_index: 0,
            icon: String::new(),
            created_at: Some(created_at),
            archived_balance: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_user_record_gets_defaults() {
        let user: User = serde_json::from_str(r#"{"id":"1","name":"Isak"}"#).unwrap();
        assert_eq!(user.fixed_allowance, 0.0);
        assert_eq!(user.archived_balance, 0.0);
        assert!(user.created_at.is_none());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(User::generate_id(), User::generate_id());
        assert!(User::generate_id().starts_with("user::"));
    }
}
