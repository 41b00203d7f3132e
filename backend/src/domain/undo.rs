//! Undo window for destructive actions.
//!
//! Deleting a user, clearing a week and resetting payouts capture a backup
//! and arm a single pending undo. The undo expires at a deadline that is
//! checked when it is invoked; arming a new one discards the previous.

use chrono::{DateTime, Duration, Utc};
use shared::DayKey;
use tracing::{debug, info};

use crate::domain::errors::BoardError;
use crate::domain::models::{Payout, TaskInstance, User, WeekSnapshot};
use crate::domain::WeekId;

pub const DEFAULT_UNDO_WINDOW_SECS: i64 = 5;

/// Where a removed task lived, so it can go back to the same slot
#[derive(Debug, Clone, PartialEq)]
pub struct TaskPlacement {
    pub week_id: WeekId,
    pub day: DayKey,
    pub index: usize,
    pub task: TaskInstance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayoutPlacement {
    pub index: usize,
    pub payout: Payout,
}

/// Everything a user deletion removed
#[derive(Debug, Clone, PartialEq)]
pub struct UserBackup {
    pub user_index: usize,
    pub user: User,
    pub payouts: Vec<PayoutPlacement>,
    pub tasks: Vec<TaskPlacement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UndoAction {
    DeletedUser(UserBackup),
    ClearedWeek {
        week_id: WeekId,
        snapshot: WeekSnapshot,
    },
    ResetPayouts {
        payouts: Vec<Payout>,
    },
}

impl UndoAction {
    pub fn label(&self) -> String {
        match self {
            UndoAction::DeletedUser(backup) => format!("Deleted {}", backup.user.name),
            UndoAction::ClearedWeek { week_id, .. } => format!("Cleared week {}", week_id),
            UndoAction::ResetPayouts { payouts, .. } => format!("Reset {} payouts", payouts.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UndoStatus {
    pub label: String,
    pub seconds_remaining: i64,
}

#[derive(Debug, Clone)]
struct PendingUndo {
    action: UndoAction,
    deadline: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UndoManager {
    window: Duration,
    pending: Option<PendingUndo>,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_UNDO_WINDOW_SECS))
    }
}

impl UndoManager {
    pub fn new(window: Duration) -> Self {
        Self { window, pending: None }
    }

    /// Replace any pending undo with `action`
    pub fn arm(&mut self, action: UndoAction, now: DateTime<Utc>) {
        if let Some(previous) = &self.pending {
            debug!("Discarding pending undo '{}'", previous.action.label());
        }
        info!("Undo available for {}s: {}", self.window.num_seconds(), action.label());
        self.pending = Some(PendingUndo {
            action,
            deadline: now + self.window,
        });
    }

    /// Take the pending action if its window is still open
    pub fn take(&mut self, now: DateTime<Utc>) -> Result<UndoAction, BoardError> {
        match self.pending.take() {
            Some(pending) if now <= pending.deadline => Ok(pending.action),
            Some(pending) => {
                debug!("Undo for '{}' expired at {}", pending.action.label(), pending.deadline);
                Err(BoardError::NothingToUndo)
            }
            None => Err(BoardError::NothingToUndo),
        }
    }

    pub fn status(&self, now: DateTime<Utc>) -> Option<UndoStatus> {
        self.pending
            .as_ref()
            .filter(|pending| now <= pending.deadline)
            .map(|pending| UndoStatus {
                label: pending.action.label(),
                seconds_remaining: (pending.deadline - now).num_seconds(),
            })
    }

    /// True while an action can still be undone
    pub fn is_pending(&self, now: DateTime<Utc>) -> bool {
        self.pending.as_ref().is_some_and(|pending| now <= pending.deadline)
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cleared(week: u32) -> UndoAction {
        UndoAction::ClearedWeek {
            week_id: WeekId::new(2026, week).unwrap(),
            snapshot: WeekSnapshot::empty(),
        }
    }

    #[test]
    fn test_undo_within_window() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap();
        let mut undo = UndoManager::default();
        undo.arm(cleared(10), now);

        let status = undo.status(now + Duration::seconds(2)).unwrap();
        assert_eq!(status.seconds_remaining, 3);
        assert_eq!(status.label, "Cleared week 2026-W10");

        assert_eq!(undo.take(now + Duration::seconds(5)).unwrap(), cleared(10));
        assert_eq!(undo.take(now), Err(BoardError::NothingToUndo));
    }

    #[test]
    fn test_expired_undo_is_discarded() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap();
        let mut undo = UndoManager::new(Duration::seconds(5));
        undo.arm(cleared(10), now);
        assert!(undo.is_pending(now + Duration::seconds(5)));
        assert!(!undo.is_pending(now + Duration::seconds(6)));
        assert!(undo.status(now + Duration::seconds(6)).is_none());
        assert_eq!(undo.take(now + Duration::seconds(6)), Err(BoardError::NothingToUndo));
    }

    #[test]
    fn test_arming_replaces_previous_action() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap();
        let mut undo = UndoManager::default();
        undo.arm(cleared(10), now);
        undo.arm(cleared(11), now);
        assert_eq!(undo.take(now).unwrap(), cleared(11));
    }
}
