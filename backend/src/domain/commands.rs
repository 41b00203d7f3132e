//! Domain-level command types.
//!
//! These structs are used by services inside the domain layer and are not
//! exposed over the public API. The REST layer maps the DTOs of the
//! `shared` crate to these internal types.

pub mod users {
    /// Input for creating a household member.
    #[derive(Debug, Clone)]
    pub struct CreateUserCommand {
        pub name: String,
        pub fixed_allowance: f64,
        pub default_color_index: Option<u8>,
        pub icon: Option<String>,
    }

    /// Input for editing a household member. `None` leaves a field as is.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateUserCommand {
        pub user_id: String,
        pub name: Option<String>,
        pub fixed_allowance: Option<f64>,
        pub default_color_index: Option<u8>,
        pub icon: Option<String>,
    }

    /// Result of deleting a household member.
    #[derive(Debug, Clone, PartialEq)]
    pub struct DeleteUserResult {
        pub user_id: String,
        pub user_name: String,
        pub removed_tasks: usize,
        pub removed_payouts: usize,
    }
}

pub mod library {
    #[derive(Debug, Clone)]
    pub struct CreateLibraryTaskCommand {
        pub text: String,
        pub value: f64,
        pub icon: String,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateLibraryTaskCommand {
        pub library_id: String,
        pub text: Option<String>,
        pub value: Option<f64>,
        pub icon: Option<String>,
        /// Also rewrite the editable week's instances of this entry
        pub propagate_to_week: bool,
    }
}

pub mod week {
    use shared::DayKey;

    /// Place a library task on one or more days of the editable week.
    #[derive(Debug, Clone)]
    pub struct AddTasksCommand {
        pub library_id: String,
        pub days: Vec<DayKey>,
        pub assignee_id: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Default)]
    pub enum AssigneeChange {
        #[default]
        Keep,
        Unassign,
        User(String),
    }

    #[derive(Debug, Clone)]
    pub struct EditTaskCommand {
        pub day: DayKey,
        pub task_id: String,
        pub text: Option<String>,
        pub value: Option<f64>,
        pub icon: Option<String>,
        pub assignee: AssigneeChange,
    }

    #[derive(Debug, Clone)]
    pub struct MoveTaskCommand {
        pub task_id: String,
        pub from_day: DayKey,
        pub to_day: DayKey,
    }

    /// Soft delete every visible task with this text (and owner, if given).
    #[derive(Debug, Clone)]
    pub struct DeleteMatchingCommand {
        pub text: String,
        pub assignee_id: Option<String>,
    }
}

pub mod payouts {
    #[derive(Debug, Clone)]
    pub struct RegisterPayoutCommand {
        pub user_id: String,
        pub amount: f64,
    }
}

pub mod recurring {
    use shared::{DayKey, RecurrenceInterval, RecurrenceStart};

    #[derive(Debug, Clone)]
    pub struct CreateRecurringRuleCommand {
        pub days: Vec<DayKey>,
        pub text: String,
        pub value: f64,
        pub icon: String,
        pub assignee_id: Option<String>,
        pub interval: RecurrenceInterval,
        pub start: RecurrenceStart,
    }
}
