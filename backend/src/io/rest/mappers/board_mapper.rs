use crate::domain::commands::payouts::RegisterPayoutCommand;
use crate::domain::commands::recurring::CreateRecurringRuleCommand;
use crate::domain::models::{Payout as DomainPayout, RecurringRule as DomainRule, Template, User, WeekSnapshot};
use crate::domain::undo::UndoStatus as DomainUndoStatus;
use crate::domain::{BoardOverview, WeekId, WeeklyTotal as DomainWeeklyTotal};
use crate::io::rest::mappers::{TaskMapper, UserMapper};
use chrono::Weekday;
use shared::{
    BoardView, CreateRecurringRuleRequest, DayColumn, DayKey, Payout as SharedPayout, RecurringRule as SharedRule,
    RegisterPayoutRequest, TemplateSummary, UndoStatus, WeeklyTotal as SharedWeeklyTotal,
};

/// Mapper for the board view and the smaller records shown alongside it.
pub struct BoardMapper;

impl BoardMapper {
    pub fn to_view(overview: BoardOverview) -> BoardView {
        let BoardOverview {
            week_id,
            is_current_week,
            week,
            totals,
            balances,
            users,
            task_library,
            recurring_rules,
            templates,
            recent_payouts,
            undo,
        } = overview;

        let days = Self::day_columns(week_id, &week, &users);
        let totals = totals
            .into_iter()
            .filter_map(|total| Self::weekly_total_to_dto(total, &users))
            .collect();
        let balances = balances
            .into_iter()
            .filter_map(|balance| {
                let user = users.iter().find(|user| user.id == balance.user_id)?;
                Some(UserMapper::to_balance_dto(user, balance))
            })
            .collect();

        BoardView {
            week_id: week_id.to_string(),
            week_start: week_id.start_date().to_string(),
            week_end: week_id.end_date().to_string(),
            is_current_week,
            allowance_disabled: week.allowance_disabled,
            days,
            totals,
            balances,
            task_library: task_library.into_iter().map(TaskMapper::library_to_dto).collect(),
            recurring_rules: recurring_rules.into_iter().map(Self::rule_to_dto).collect(),
            templates: templates.iter().map(Self::template_summary).collect(),
            recent_payouts: recent_payouts.into_iter().map(Self::payout_to_dto).collect(),
            undo: undo.map(Self::undo_to_dto),
            users: users.into_iter().map(UserMapper::to_dto).collect(),
        }
    }

    /// Soft-deleted tasks stay in the snapshot for the ledger but are not shown
    fn day_columns(week_id: WeekId, week: &WeekSnapshot, users: &[User]) -> Vec<DayColumn> {
        DayKey::ALL
            .iter()
            .map(|&day| DayColumn {
                day,
                date: Self::weekday(day).map(|weekday| week_id.date_of(weekday).to_string()),
                tasks: week
                    .tasks(day)
                    .iter()
                    .filter(|task| !task.deleted)
                    .map(|task| TaskMapper::to_board_task(task, week.is_completed(day, &task.id), users))
                    .collect(),
            })
            .collect()
    }

    fn weekday(day: DayKey) -> Option<Weekday> {
        match day {
            DayKey::Monday => Some(Weekday::Mon),
            DayKey::Tuesday => Some(Weekday::Tue),
            DayKey::Wednesday => Some(Weekday::Wed),
            DayKey::Thursday => Some(Weekday::Thu),
            DayKey::Friday => Some(Weekday::Fri),
            DayKey::Saturday => Some(Weekday::Sat),
            DayKey::Sunday => Some(Weekday::Sun),
            DayKey::Market => None,
        }
    }

    fn weekly_total_to_dto(total: DomainWeeklyTotal, users: &[User]) -> Option<SharedWeeklyTotal> {
        let user = users.iter().find(|user| user.id == total.user_id)?;
        Some(SharedWeeklyTotal {
            user_id: total.user_id,
            user_name: user.name.clone(),
            color_index: user.default_color_index,
            fixed: total.fixed,
            tasks: total.tasks,
            total: total.total,
        })
    }

    pub fn payout_to_dto(domain: DomainPayout) -> SharedPayout {
        SharedPayout {
            id: domain.id,
            date: domain.date.to_rfc3339(),
            user_id: domain.user_id,
            amount: domain.amount,
        }
    }

    pub fn rule_to_dto(domain: DomainRule) -> SharedRule {
        SharedRule {
            id: domain.id,
            days: domain.days,
            text: domain.text,
            value: domain.value,
            icon: domain.icon,
            assignee_id: domain.assignee,
            interval: domain.interval,
            start_week: domain.start_week,
        }
    }

    pub fn template_summary(template: &Template) -> TemplateSummary {
        TemplateSummary {
            id: template.id.clone(),
            name: template.name.clone(),
            task_count: template.week.task_count(),
        }
    }

    fn undo_to_dto(status: DomainUndoStatus) -> UndoStatus {
        UndoStatus {
            action: status.label,
            seconds_remaining: status.seconds_remaining,
        }
    }

    pub fn to_register_payout_command(request: RegisterPayoutRequest) -> RegisterPayoutCommand {
        RegisterPayoutCommand {
            user_id: request.user_id,
            amount: request.amount,
        }
    }

    pub fn to_recurring_command(request: CreateRecurringRuleRequest) -> CreateRecurringRuleCommand {
        CreateRecurringRuleCommand {
            days: request.days,
            text: request.text,
            value: request.value,
            icon: request.icon.unwrap_or_default(),
            assignee_id: request.assignee_id.filter(|id| !id.is_empty()),
            interval: request.interval,
            start: request.start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Assignee, TaskInstance};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn overview_with_tasks() -> (BoardOverview, User) {
        let maja = User::new("Maja", 20.0, Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap());
        let mut week = WeekSnapshot::empty();
        let visible = TaskInstance::new("Feed the cat", 2.0, "🐈", Assignee::user(&maja.id));
        let mut hidden = TaskInstance::new("Water plants", 1.0, "", Assignee::Unassigned);
        hidden.deleted = true;
        week.set_completed(DayKey::Tuesday, &visible.id, true);
        week.tasks_mut(DayKey::Tuesday).push(visible);
        week.tasks_mut(DayKey::Tuesday).push(hidden);

        let overview = BoardOverview {
            week_id: WeekId::of(NaiveDate::from_ymd_opt(2026, 3, 4).unwrap()),
            is_current_week: true,
            week,
            totals: vec![DomainWeeklyTotal {
                user_id: maja.id.clone(),
                fixed: 20.0,
                tasks: 2.0,
                total: 22.0,
            }],
            balances: Vec::new(),
            users: vec![maja.clone()],
            task_library: Vec::new(),
            recurring_rules: Vec::new(),
            templates: Vec::new(),
            recent_payouts: Vec::new(),
            undo: None,
        };
        (overview, maja)
    }

    #[test]
    fn test_board_view_columns() {
        let (overview, maja) = overview_with_tasks();
        let view = BoardMapper::to_view(overview);

        assert_eq!(view.week_id, "2026-W10");
        assert_eq!(view.week_start, "2026-03-02");
        assert_eq!(view.days.len(), 8);

        let tuesday = view.days.iter().find(|column| column.day == DayKey::Tuesday).unwrap();
        assert_eq!(tuesday.date.as_deref(), Some("2026-03-03"));
        assert_eq!(tuesday.tasks.len(), 1);
        assert!(tuesday.tasks[0].completed);

        let market = view.days.iter().find(|column| column.day == DayKey::Market).unwrap();
        assert_eq!(market.date, None);

        assert_eq!(view.totals[0].user_name, "Maja");
        assert_eq!(view.totals[0].color_index, maja.default_color_index);
    }
}
