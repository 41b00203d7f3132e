//! Archival of old history.
//!
//! The document keeps a bounded number of weeks and payouts. Whatever falls
//! out of the window is folded into each user's `archived_balance` so that
//! no balance changes:
//!
//! - an archived week adds exactly what the ledger counted for it
//! - an archived payout subtracts its amount, matching the drop in `paid`

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::balance_service::BalanceService;
use crate::domain::models::{finite_or_zero, BoardDocument};
use crate::domain::WeekId;

pub const DEFAULT_KEEP_WEEKS: usize = 10;
pub const DEFAULT_KEEP_PAYOUTS: usize = 50;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchiveReport {
    pub archived_weeks: Vec<WeekId>,
    pub archived_payouts: usize,
}

impl ArchiveReport {
    pub fn is_empty(&self) -> bool {
        self.archived_weeks.is_empty() && self.archived_payouts == 0
    }
}

#[derive(Debug, Clone)]
pub struct ArchiveService {
    keep_weeks: usize,
    keep_payouts: usize,
    balance_service: BalanceService,
}

impl Default for ArchiveService {
    fn default() -> Self {
        Self::new(DEFAULT_KEEP_WEEKS, DEFAULT_KEEP_PAYOUTS)
    }
}

impl ArchiveService {
    pub fn new(keep_weeks: usize, keep_payouts: usize) -> Self {
        Self {
            keep_weeks,
            keep_payouts,
            balance_service: BalanceService::new(),
        }
    }

    /// Prune weeks, then payouts. `protected` is never archived; it is the
    /// displayed week, which would otherwise come back on the next flush.
    pub fn run(&self, document: &mut BoardDocument, protected: Option<WeekId>, now: DateTime<Utc>) -> ArchiveReport {
        let report = ArchiveReport {
            archived_weeks: self.prune_weeks(document, protected, now),
            archived_payouts: self.prune_payouts(document),
        };
        if !report.is_empty() {
            info!(
                "Archived {} weeks and {} payouts",
                report.archived_weeks.len(),
                report.archived_payouts
            );
        }
        report
    }

    /// Archive the oldest weeks beyond `keep_weeks`
    pub fn prune_weeks(&self, document: &mut BoardDocument, protected: Option<WeekId>, now: DateTime<Utc>) -> Vec<WeekId> {
        let stored = document.weeks.len();
        if stored <= self.keep_weeks {
            return Vec::new();
        }
        let overflow = stored - self.keep_weeks;

        let oldest: Vec<WeekId> = document
            .weeks
            .keys()
            .copied()
            .filter(|week_id| Some(*week_id) != protected)
            .take(overflow)
            .collect();

        for week_id in &oldest {
            let Some(week) = document.weeks.remove(week_id) else {
                continue;
            };
            for user in document.users.iter_mut() {
                let earnings = self.balance_service.week_earnings(user, *week_id, &week, now);
                user.archived_balance = finite_or_zero(user.archived_balance) + earnings;
            }
            debug!("Archived week {}", week_id);
        }
        oldest
    }

    /// Archive the oldest payouts beyond `keep_payouts`
    pub fn prune_payouts(&self, document: &mut BoardDocument) -> usize {
        let stored = document.payouts.len();
        if stored <= self.keep_payouts {
            return 0;
        }
        let overflow = stored - self.keep_payouts;

        let archived: Vec<_> = document.payouts.drain(..overflow).collect();
        for payout in &archived {
            match document.user_mut(&payout.user_id) {
                Some(user) => {
                    user.archived_balance =
                        finite_or_zero(user.archived_balance) - finite_or_zero(payout.amount);
                }
                None => debug!("Dropping payout {} of unknown user {}", payout.id, payout.user_id),
            }
        }
        archived.len()
    }
}
