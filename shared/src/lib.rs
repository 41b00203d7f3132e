use serde::{Deserialize, Serialize};
use std::fmt;

/// A column on the weekly board: the seven weekdays plus the unscheduled
/// "market" bucket where tasks can be picked up on any day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayKey {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
    Market,
}

impl DayKey {
    /// Every bucket of a week, weekdays first and market last
    pub const ALL: [DayKey; 8] = [
        DayKey::Monday,
        DayKey::Tuesday,
        DayKey::Wednesday,
        DayKey::Thursday,
        DayKey::Friday,
        DayKey::Saturday,
        DayKey::Sunday,
        DayKey::Market,
    ];

    /// The seven scheduled days, Monday first
    pub const WEEKDAYS: [DayKey; 7] = [
        DayKey::Monday,
        DayKey::Tuesday,
        DayKey::Wednesday,
        DayKey::Thursday,
        DayKey::Friday,
        DayKey::Saturday,
        DayKey::Sunday,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DayKey::Monday => "monday",
            DayKey::Tuesday => "tuesday",
            DayKey::Wednesday => "wednesday",
            DayKey::Thursday => "thursday",
            DayKey::Friday => "friday",
            DayKey::Saturday => "saturday",
            DayKey::Sunday => "sunday",
            DayKey::Market => "market",
        }
    }

    pub fn is_market(&self) -> bool {
        matches!(self, DayKey::Market)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How often a recurring rule seeds new weeks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceInterval {
    #[default]
    Every,
    Biweekly,
}

/// Whether a new recurring rule starts this week or the next one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceStart {
    #[default]
    ThisWeek,
    NextWeek,
}

/// Direction for week navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigateDirection {
    Previous,
    Next,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Represents a household member on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub fixed_allowance: f64,
    pub default_color_index: u8,
    pub icon: String,
    /// RFC 3339 timestamp, absent for users created before creation tracking
    pub created_at: Option<String>,
    /// Net earned-minus-paid folded out of pruned history
    pub archived_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    #[serde(default)]
    pub fixed_allowance: f64,
    pub default_color_index: Option<u8>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub fixed_allowance: Option<f64>,
    pub default_color_index: Option<u8>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: User,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
}

/// Response after a user was removed; the removal can be undone for
/// `undo_seconds` seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteUserResponse {
    pub user_id: String,
    pub removed_tasks: usize,
    pub removed_payouts: usize,
    pub undo_seconds: i64,
    pub success_message: String,
}

// ---------------------------------------------------------------------------
// Balances
// ---------------------------------------------------------------------------

/// Lifetime accounting for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub user_id: String,
    pub user_name: String,
    pub earned: f64,
    pub paid: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceListResponse {
    pub balances: Vec<Balance>,
}

/// Earnings of one user within the displayed week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTotal {
    pub user_id: String,
    pub user_name: String,
    pub color_index: u8,
    pub fixed: f64,
    pub tasks: f64,
    pub total: f64,
}

// ---------------------------------------------------------------------------
// Task library
// ---------------------------------------------------------------------------

/// Reusable task template, independent of any week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryTask {
    pub id: String,
    pub text: String,
    pub value: f64,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLibraryTaskRequest {
    pub text: String,
    #[serde(default)]
    pub value: f64,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateLibraryTaskRequest {
    pub text: Option<String>,
    pub value: Option<f64>,
    pub icon: Option<String>,
    /// Also rewrite linked task instances in the displayed week
    #[serde(default)]
    pub propagate_to_week: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryTaskResponse {
    pub task: LibraryTask,
    pub success_message: String,
}

// ---------------------------------------------------------------------------
// Week board
// ---------------------------------------------------------------------------

/// Who a task on the board belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskAssignee {
    Unassigned,
    User { user_id: String, name: String },
    /// The owning user was deleted; `name` already carries the "(deleted)" tag
    Deleted { name: String },
}

/// A task instance as shown on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardTask {
    pub id: String,
    pub text: String,
    pub value: f64,
    pub icon: String,
    pub assignee: TaskAssignee,
    pub library_id: Option<String>,
    pub deleted: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayColumn {
    pub day: DayKey,
    /// ISO date of the day, absent for the market bucket
    pub date: Option<String>,
    pub tasks: Vec<BoardTask>,
}

/// Status of the pending undo action, if any
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoStatus {
    pub action: String,
    pub seconds_remaining: i64,
}

/// Everything the board needs to render the displayed week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardView {
    pub week_id: String,
    pub week_start: String,
    pub week_end: String,
    pub is_current_week: bool,
    pub allowance_disabled: bool,
    pub days: Vec<DayColumn>,
    pub totals: Vec<WeeklyTotal>,
    pub balances: Vec<Balance>,
    pub users: Vec<User>,
    pub task_library: Vec<LibraryTask>,
    pub recurring_rules: Vec<RecurringRule>,
    pub templates: Vec<TemplateSummary>,
    pub recent_payouts: Vec<Payout>,
    pub undo: Option<UndoStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigateRequest {
    pub direction: NavigateDirection,
}

/// Place one copy of a library task on each of the given days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddTasksRequest {
    pub library_id: String,
    pub days: Vec<DayKey>,
    pub assignee_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddTasksResponse {
    pub task_ids: Vec<String>,
    pub success_message: String,
}

/// Addresses one task instance of the displayed week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRef {
    pub day: DayKey,
    pub task_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleTaskResponse {
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveTaskRequest {
    pub task_id: String,
    pub from_day: DayKey,
    pub to_day: DayKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyTaskResponse {
    pub task_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditTaskRequest {
    pub day: DayKey,
    pub task_id: String,
    pub text: Option<String>,
    pub value: Option<f64>,
    pub icon: Option<String>,
    pub assignee_id: Option<String>,
    /// Remove the current assignee; ignored when `assignee_id` is set
    #[serde(default)]
    pub unassign: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteMatchingRequest {
    pub text: String,
    pub assignee_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteMatchingResponse {
    pub deleted_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearWeekResponse {
    pub week_id: String,
    pub undo_seconds: i64,
    pub success_message: String,
}

// ---------------------------------------------------------------------------
// Payouts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub id: String,
    /// RFC 3339 timestamp
    pub date: String,
    pub user_id: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterPayoutRequest {
    pub user_id: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutResponse {
    pub payout: Payout,
    pub new_balance: f64,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetPayoutsResponse {
    pub removed_payouts: usize,
    pub undo_seconds: i64,
    pub success_message: String,
}

// ---------------------------------------------------------------------------
// Recurring rules and templates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringRule {
    pub id: String,
    pub days: Vec<DayKey>,
    pub text: String,
    pub value: f64,
    pub icon: String,
    pub assignee_id: Option<String>,
    pub interval: RecurrenceInterval,
    pub start_week: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRecurringRuleRequest {
    pub days: Vec<DayKey>,
    pub text: String,
    #[serde(default)]
    pub value: f64,
    pub icon: Option<String>,
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub interval: RecurrenceInterval,
    #[serde(default)]
    pub start: RecurrenceStart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringRuleResponse {
    pub rule: RecurringRule,
    pub applied_to_current_week: bool,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub task_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveTemplateRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateResponse {
    pub template: TemplateSummary,
    pub success_message: String,
}

// ---------------------------------------------------------------------------
// Undo, import and generic responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoResponse {
    pub restored: String,
    pub success_message: String,
}

/// Full overwrite of the board document. Destructive, so the caller has to
/// confirm explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub confirm: bool,
    pub document: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success_message: String,
}
