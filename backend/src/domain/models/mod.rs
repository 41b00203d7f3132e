//! Persisted board entities.
//!
//! Every record is an explicit struct with defaulted optional fields so a
//! document written by an older version (or by hand) still loads.

pub mod document;
pub mod lenient;
pub mod payout;
pub mod recurring;
pub mod task;
pub mod template;
pub mod user;
pub mod week;

pub use document::BoardDocument;
pub use payout::Payout;
pub use recurring::RecurringRule;
pub use task::{Assignee, LibraryTask, TaskInstance, DELETED_SUFFIX};
pub use template::Template;
pub use user::User;
pub use week::WeekSnapshot;

/// Amounts read from persisted data may be anything; the ledger treats
/// non-finite values as zero instead of poisoning every total.
pub fn finite_or_zero(amount: f64) -> f64 {
    if amount.is_finite() {
        amount
    } else {
        0.0
    }
}
