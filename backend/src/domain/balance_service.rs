//! Ledger for the chore board.
//!
//! Balances are never stored. They are recomputed on demand as a pure fold
//! over the week store, the payout list and each user's archived balance:
//!
//! 1. `earned` starts at the user's archived balance.
//! 2. Every stored week adds the fixed allowance, unless the week was
//!    cleared, lies in the future, or starts more than a week before the
//!    user was created (the current week is always allowed). It also adds
//!    the value of every completed task assigned to the user, soft deleted
//!    ones included.
//! 3. `paid` is the sum of the user's payouts.
//! 4. `balance = earned - paid`.
//!
//! Non-finite amounts from persisted data count as zero.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

use crate::domain::models::{finite_or_zero, Payout, User, WeekSnapshot};
use crate::domain::WeekId;

/// Weeks starting up to this many days before a user was created still pay
/// the allowance
const CREATION_GRACE_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    pub user_id: String,
    pub earned: f64,
    pub paid: f64,
    pub balance: f64,
}

impl Balance {
    fn zero(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            earned: 0.0,
            paid: 0.0,
            balance: 0.0,
        }
    }
}

/// Earnings of one user within the displayed week
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyTotal {
    pub user_id: String,
    pub fixed: f64,
    pub tasks: f64,
    pub total: f64,
}

/// Service responsible for balance calculations
#[derive(Debug, Clone, Default)]
pub struct BalanceService;

impl BalanceService {
    pub fn new() -> Self {
        Self
    }

    /// Full ledger for one user
    pub fn balance_of(
        &self,
        user: &User,
        weeks: &BTreeMap<WeekId, WeekSnapshot>,
        payouts: &[Payout],
        now: DateTime<Utc>,
    ) -> Balance {
        let earned = finite_or_zero(user.archived_balance)
            + weeks
                .iter()
                .map(|(week_id, week)| self.week_earnings(user, *week_id, week, now))
                .sum::<f64>();
        let paid = self.paid_by(&user.id, payouts);

        Balance {
            user_id: user.id.clone(),
            earned,
            paid,
            balance: earned - paid,
        }
    }

    /// Ledger for a user id; an unknown id yields zeros
    pub fn balance_for_id(
        &self,
        user_id: &str,
        users: &[User],
        weeks: &BTreeMap<WeekId, WeekSnapshot>,
        payouts: &[Payout],
        now: DateTime<Utc>,
    ) -> Balance {
        match users.iter().find(|user| user.id == user_id) {
            Some(user) => self.balance_of(user, weeks, payouts, now),
            None => Balance::zero(user_id),
        }
    }

    /// Ledger for every user, in user order
    pub fn all_balances(
        &self,
        users: &[User],
        weeks: &BTreeMap<WeekId, WeekSnapshot>,
        payouts: &[Payout],
        now: DateTime<Utc>,
    ) -> Vec<Balance> {
        users
            .iter()
            .map(|user| self.balance_of(user, weeks, payouts, now))
            .collect()
    }

    /// What one stored week contributes to `earned`.
    ///
    /// Archival folds exactly this amount into the archived balance, which
    /// is what keeps balances unchanged across pruning.
    pub fn week_earnings(&self, user: &User, week_id: WeekId, week: &WeekSnapshot, now: DateTime<Utc>) -> f64 {
        let allowance = if self.earns_allowance(user, week_id, week, now) {
            finite_or_zero(user.fixed_allowance)
        } else {
            0.0
        };
        allowance + self.completed_task_value(user, week)
    }

    /// Whether the fixed allowance is paid for this week
    pub fn earns_allowance(&self, user: &User, week_id: WeekId, week: &WeekSnapshot, now: DateTime<Utc>) -> bool {
        if week.allowance_disabled {
            return false;
        }

        let today = now.date_naive();
        let week_start = week_id.start_date();
        if week_start > today {
            return false;
        }

        if let Some(created_at) = user.created_at {
            let is_current_week = week_id == WeekId::of(today);
            let earliest = created_at.date_naive() - Duration::days(CREATION_GRACE_DAYS);
            if !is_current_week && week_start < earliest {
                return false;
            }
        }
        true
    }

    /// Sum of the completed tasks assigned to the user in this week
    pub fn completed_task_value(&self, user: &User, week: &WeekSnapshot) -> f64 {
        week.completed_tasks()
            .filter(|(_, task)| task.assignee.is_user(&user.id))
            .map(|(_, task)| finite_or_zero(task.value))
            .sum()
    }

    pub fn paid_by(&self, user_id: &str, payouts: &[Payout]) -> f64 {
        payouts
            .iter()
            .filter(|payout| payout.user_id == user_id)
            .map(|payout| finite_or_zero(payout.amount))
            .sum()
    }

    /// Header totals for the displayed week, one entry per user
    pub fn weekly_totals(&self, week: &WeekSnapshot, users: &[User]) -> Vec<WeeklyTotal> {
        users
            .iter()
            .map(|user| {
                let fixed = if week.allowance_disabled {
                    0.0
                } else {
                    finite_or_zero(user.fixed_allowance)
                };
                let tasks = self.completed_task_value(user, week);
                WeeklyTotal {
                    user_id: user.id.clone(),
                    fixed,
                    tasks,
                    total: fixed + tasks,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Assignee, TaskInstance};
    use chrono::{NaiveDate, TimeZone};
    use shared::DayKey;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn week_of(y: i32, m: u32, d: u32) -> WeekId {
        WeekId::of(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn user(allowance: f64, created_at: Option<DateTime<Utc>>) -> User {
        let mut user = User::new("Maja", allowance, at(2026, 1, 1));
        user.created_at = created_at;
        user
    }

    fn completed_task(week: &mut WeekSnapshot, day: DayKey, value: f64, assignee: Assignee) -> String {
        let task = TaskInstance::new("Dishes", value, "", assignee);
        let id = task.id.clone();
        week.tasks_mut(day).push(task);
        week.set_completed(day, &id, true);
        id
    }

    #[test]
    fn test_balance_from_allowance_tasks_and_payouts() {
        let service = BalanceService::new();
        let now = at(2026, 3, 4);
        let maja = user(20.0, None);

        let mut weeks = BTreeMap::new();
        let mut this_week = WeekSnapshot::empty();
        completed_task(&mut this_week, DayKey::Monday, 5.0, Assignee::user(&maja.id));
        // not completed
        this_week
            .tasks_mut(DayKey::Tuesday)
            .push(TaskInstance::new("Vacuum", 7.0, "", Assignee::user(&maja.id)));
        // someone else's
        completed_task(&mut this_week, DayKey::Tuesday, 9.0, Assignee::user("user::other"));
        weeks.insert(WeekId::of(now.date_naive()), this_week);
        weeks.insert(week_of(2026, 2, 23), WeekSnapshot::empty());

        let payouts = vec![
            Payout {
                id: Payout::generate_id(),
                date: now,
                user_id: maja.id.clone(),
                amount: 12.0,
            },
            Payout {
                id: Payout::generate_id(),
                date: now,
                user_id: "user::other".to_string(),
                amount: 100.0,
            },
        ];

        let balance = service.balance_of(&maja, &weeks, &payouts, now);
        assert_eq!(balance.earned, 45.0);
        assert_eq!(balance.paid, 12.0);
        assert_eq!(balance.balance, 33.0);
    }

    #[test]
    fn test_user_created_today_earns_current_week() {
        let service = BalanceService::new();
        // Sunday evening: the week started six days before creation
        let now = Utc.with_ymd_and_hms(2026, 3, 8, 20, 0, 0).unwrap();
        let maja = user(20.0, Some(now));
        let mut weeks = BTreeMap::new();
        weeks.insert(WeekId::of(now.date_naive()), WeekSnapshot::empty());

        let balance = service.balance_of(&maja, &weeks, &[], now);
        assert_eq!(balance.earned, 20.0);
    }

    #[test]
    fn test_weeks_long_before_creation_earn_nothing() {
        let service = BalanceService::new();
        let now = at(2026, 3, 4);
        // created on Monday 2026-03-02
        let maja = user(20.0, Some(at(2026, 3, 2)));
        let mut weeks = BTreeMap::new();
        weeks.insert(WeekId::of(now.date_naive()), WeekSnapshot::empty());
        // starts exactly seven days before creation
        weeks.insert(week_of(2026, 2, 23), WeekSnapshot::empty());
        // starts fourteen days before creation
        weeks.insert(week_of(2026, 2, 16), WeekSnapshot::empty());

        let balance = service.balance_of(&maja, &weeks, &[], now);
        assert_eq!(balance.earned, 40.0);
    }

    #[test]
    fn test_future_and_cleared_weeks_pay_no_allowance() {
        let service = BalanceService::new();
        let now = at(2026, 3, 4);
        let maja = user(20.0, None);
        let mut weeks = BTreeMap::new();
        weeks.insert(week_of(2026, 3, 16), WeekSnapshot::empty());
        weeks.insert(WeekId::of(now.date_naive()), WeekSnapshot::cleared());

        assert_eq!(service.balance_of(&maja, &weeks, &[], now).earned, 0.0);
    }

    #[test]
    fn test_cleared_week_still_counts_completed_tasks() {
        let service = BalanceService::new();
        let now = at(2026, 3, 4);
        let maja = user(20.0, None);
        let mut cleared = WeekSnapshot::cleared();
        completed_task(&mut cleared, DayKey::Friday, 3.0, Assignee::user(&maja.id));
        let mut weeks = BTreeMap::new();
        weeks.insert(WeekId::of(now.date_naive()), cleared);

        assert_eq!(service.balance_of(&maja, &weeks, &[], now).earned, 3.0);
    }

    #[test]
    fn test_soft_deleted_completed_task_still_counts() {
        let service = BalanceService::new();
        let now = at(2026, 3, 4);
        let maja = user(0.0, None);
        let mut week = WeekSnapshot::empty();
        let id = completed_task(&mut week, DayKey::Monday, 4.0, Assignee::user(&maja.id));
        week.find_task_mut(DayKey::Monday, &id).unwrap().deleted = true;

        assert_eq!(service.completed_task_value(&maja, &week), 4.0);
    }

    #[test]
    fn test_tombstoned_and_named_tasks_never_count() {
        let service = BalanceService::new();
        let maja = user(0.0, None);
        let mut week = WeekSnapshot::empty();
        completed_task(&mut week, DayKey::Monday, 4.0, Assignee::tombstone("Maja"));
        completed_task(&mut week, DayKey::Monday, 6.0, Assignee::Named { name: "Maja".to_string() });

        assert_eq!(service.completed_task_value(&maja, &week), 0.0);
    }

    #[test]
    fn test_completion_under_other_day_does_not_count() {
        let service = BalanceService::new();
        let maja = user(0.0, None);
        let mut week = WeekSnapshot::empty();
        let task = TaskInstance::new("Dishes", 5.0, "", Assignee::user(&maja.id));
        let id = task.id.clone();
        week.tasks_mut(DayKey::Monday).push(task);
        week.set_completed(DayKey::Tuesday, &id, true);

        assert_eq!(service.completed_task_value(&maja, &week), 0.0);
    }

    #[test]
    fn test_non_finite_amounts_count_as_zero() {
        let service = BalanceService::new();
        let now = at(2026, 3, 4);
        let mut maja = user(f64::NAN, None);
        maja.archived_balance = f64::INFINITY;
        let mut week = WeekSnapshot::empty();
        completed_task(&mut week, DayKey::Monday, f64::NAN, Assignee::user(&maja.id));
        let mut weeks = BTreeMap::new();
        weeks.insert(WeekId::of(now.date_naive()), week);
        let payouts = vec![Payout {
            id: Payout::generate_id(),
            date: now,
            user_id: maja.id.clone(),
            amount: f64::NEG_INFINITY,
        }];

        let balance = service.balance_of(&maja, &weeks, &payouts, now);
        assert_eq!(balance.earned, 0.0);
        assert_eq!(balance.paid, 0.0);
        assert_eq!(balance.balance, 0.0);
    }

    #[test]
    fn test_unknown_user_yields_zero_balance() {
        let service = BalanceService::new();
        let balance = service.balance_for_id("user::gone", &[], &BTreeMap::new(), &[], at(2026, 3, 4));
        assert_eq!(balance, Balance::zero("user::gone"));
    }

    #[test]
    fn test_weekly_totals() {
        let service = BalanceService::new();
        let maja = user(20.0, None);
        let mut week = WeekSnapshot::empty();
        completed_task(&mut week, DayKey::Monday, 5.0, Assignee::user(&maja.id));

        let totals = service.weekly_totals(&week, std::slice::from_ref(&maja));
        assert_eq!(totals[0].fixed, 20.0);
        assert_eq!(totals[0].tasks, 5.0);
        assert_eq!(totals[0].total, 25.0);

        week.allowance_disabled = true;
        assert_eq!(service.weekly_totals(&week, &[maja])[0].total, 5.0);
    }
}
