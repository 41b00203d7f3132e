//! Task templates and task instances placed on a week.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Appended to the display name of a tombstoned assignee
pub const DELETED_SUFFIX: &str = " (deleted)";

/// Reusable task template, independent of any week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryTask {
    pub id: String,
    pub text: String,
    #[serde(default, deserialize_with = "super::lenient::amount")]
    pub value: f64,
    #[serde(default, deserialize_with = "super::lenient::or_default")]
    pub icon: String,
}

impl LibraryTask {
    pub fn generate_id() -> String {
        format!("library::{}", Uuid::new_v4())
    }
}

/// Owner of a task instance.
///
/// Tasks reference users by their stable id. A task whose user is gone is
/// kept as a tombstone carrying the last known name, so its history stays
/// visible without ever counting towards a live user.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", from = "AssigneeRepr")]
pub enum Assignee {
    #[default]
    Unassigned,
    Active { user_id: String },
    Tombstoned { last_known_name: String },
    /// Bare name reference from a legacy document. Only exists between
    /// parsing and the load-time repair pass, which resolves it to
    /// `Active` or `Tombstoned`.
    Named { name: String },
}

impl Assignee {
    pub fn user(user_id: &str) -> Self {
        Assignee::Active {
            user_id: user_id.to_string(),
        }
    }

    /// Tombstone for `name`; an already tagged name is not tagged twice
    pub fn tombstone(name: &str) -> Self {
        let base = name.strip_suffix(DELETED_SUFFIX).unwrap_or(name);
        Assignee::Tombstoned {
            last_known_name: base.to_string(),
        }
    }

    pub fn is_user(&self, id: &str) -> bool {
        matches!(self, Assignee::Active { user_id } if user_id == id)
    }

    /// Display label of a tombstone, e.g. `Alice (deleted)`
    pub fn tombstone_label(&self) -> Option<String> {
        match self {
            Assignee::Tombstoned { last_known_name } => {
                Some(format!("{}{}", last_known_name, DELETED_SUFFIX))
            }
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AssigneeRepr {
    Tagged(TaggedAssignee),
    Legacy(Option<String>),
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TaggedAssignee {
    Unassigned,
    Active { user_id: String },
    Tombstoned { last_known_name: String },
    Named { name: String },
}

impl From<AssigneeRepr> for Assignee {
    fn from(repr: AssigneeRepr) -> Self {
        match repr {
            AssigneeRepr::Tagged(TaggedAssignee::Unassigned) => Assignee::Unassigned,
            AssigneeRepr::Tagged(TaggedAssignee::Active { user_id }) => Assignee::Active { user_id },
            AssigneeRepr::Tagged(TaggedAssignee::Tombstoned { last_known_name }) => {
                Assignee::Tombstoned { last_known_name }
            }
            AssigneeRepr::Tagged(TaggedAssignee::Named { name }) => Assignee::Named { name },
            AssigneeRepr::Legacy(Some(name)) if !name.trim().is_empty() => Assignee::Named { name },
            AssigneeRepr::Legacy(_) => Assignee::Unassigned,
        }
    }
}

/// A task placed in one day slot of one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInstance {
    pub id: String,
    pub text: String,
    #[serde(default, deserialize_with = "super::lenient::amount")]
    pub value: f64,
    #[serde(default, deserialize_with = "super::lenient::or_default")]
    pub icon: String,
    #[serde(default, deserialize_with = "super::lenient::or_default")]
    pub assignee: Assignee,
    /// Library entry this instance was created from
    #[serde(default, deserialize_with = "super::lenient::or_default", skip_serializing_if = "Option::is_none")]
    pub library_id: Option<String>,
    /// Soft delete: hidden on the board, still counted when completed
    #[serde(default, deserialize_with = "super::lenient::or_default")]
    pub deleted: bool,
}

impl TaskInstance {
    pub fn generate_id() -> String {
        format!("task::{}", Uuid::new_v4())
    }

    pub fn new(text: &str, value: f64, icon: &str, assignee: Assignee) -> Self {
        Self {
            id: Self::generate_id(),
            text: text.to_string(),
            value,
            icon: icon.to_string(),
            assignee,
            library_id: None,
            deleted: false,
        }
    }

    pub fn from_library(entry: &LibraryTask, assignee: Assignee) -> Self {
        Self {
            library_id: Some(entry.id.clone()),
            ..Self::new(&entry.text, entry.value, &entry.icon, assignee)
        }
    }

    /// Same task under a fresh id
    pub fn duplicate(&self) -> Self {
        Self {
            id: Self::generate_id(),
            ..self.clone()
        }
    }
}
