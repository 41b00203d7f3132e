//! Recurring rule engine.
//!
//! Rules are only consulted when a week identifier is visited for the
//! first time. Adding or deleting a rule never rewrites stored weeks; a
//! rule starting this week is applied to the editable week right away.

use anyhow::Result;
use chrono::NaiveDate;
use shared::{DayKey, RecurrenceInterval, RecurrenceStart};
use tracing::info;

use crate::domain::board::Board;
use crate::domain::commands::recurring::CreateRecurringRuleCommand;
use crate::domain::errors::BoardError;
use crate::domain::models::{finite_or_zero, Assignee, RecurringRule, TaskInstance, WeekSnapshot};
use crate::domain::WeekId;

#[derive(Debug, Clone, Default)]
pub struct RecurringEngine;

impl RecurringEngine {
    pub fn new() -> Self {
        Self
    }

    /// Whether `rule` seeds the week with ISO week number `iso_week`.
    ///
    /// Biweekly parity is counted on plain week numbers, so it restarts
    /// at every new ISO year.
    pub fn applies_to_week(&self, rule: &RecurringRule, iso_week: u32) -> bool {
        match rule.interval {
            RecurrenceInterval::Every => true,
            RecurrenceInterval::Biweekly => {
                (iso_week as i64 - rule.start_week as i64).rem_euclid(2) == 0
            }
        }
    }

    /// A fresh snapshot for the week containing `date`, seeded with one
    /// new task per target day of every applicable rule.
    pub fn initialize_week(&self, rules: &[RecurringRule], date: NaiveDate) -> WeekSnapshot {
        let week_id = WeekId::of(date);
        let mut week = WeekSnapshot::empty();
        let mut seeded = 0;
        for rule in rules {
            if self.applies_to_week(rule, week_id.week()) {
                seeded += self.append_rule_tasks(rule, &mut week);
            }
        }
        if seeded > 0 {
            info!("Initialized week {} with {} recurring tasks", week_id, seeded);
        }
        week
    }

    /// Append one task per target day of `rule`; returns how many were added
    pub fn append_rule_tasks(&self, rule: &RecurringRule, week: &mut WeekSnapshot) -> usize {
        let assignee = match &rule.assignee {
            Some(user_id) if !user_id.is_empty() => Assignee::user(user_id),
            _ => Assignee::Unassigned,
        };
        for day in &rule.days {
            let task = TaskInstance::new(&rule.text, finite_or_zero(rule.value), &rule.icon, assignee.clone());
            week.tasks_mut(*day).push(task);
        }
        rule.days.len()
    }

    /// ISO week number the biweekly parity of a new rule is counted from
    pub fn start_week_for(&self, start: RecurrenceStart, today: NaiveDate) -> u32 {
        let current = WeekId::of(today).week();
        match start {
            RecurrenceStart::ThisWeek => current,
            RecurrenceStart::NextWeek => current + 1,
        }
    }

    /// Register a new rule. Returns the rule and whether it was applied to
    /// the editable week.
    pub fn add_rule(
        &self,
        board: &mut Board,
        command: CreateRecurringRuleCommand,
        today: NaiveDate,
    ) -> Result<(RecurringRule, bool)> {
        let text = command.text.trim();
        if text.is_empty() {
            return Err(BoardError::validation("Recurring task text cannot be empty").into());
        }
        let mut days: Vec<DayKey> = Vec::new();
        for day in command.days {
            if !days.contains(&day) {
                days.push(day);
            }
        }
        if days.is_empty() {
            return Err(BoardError::validation("Pick at least one day for the recurring task").into());
        }
        if let Some(user_id) = &command.assignee_id {
            if board.document().user(user_id).is_none() {
                return Err(BoardError::UserNotFound(user_id.clone()).into());
            }
        }

        let rule = RecurringRule {
            id: RecurringRule::generate_id(),
            days,
            text: text.to_string(),
            value: finite_or_zero(command.value),
            icon: command.icon,
            assignee: command.assignee_id,
            interval: command.interval,
            start_week: self.start_week_for(command.start, today),
        };

        let applied = command.start == RecurrenceStart::ThisWeek;
        if applied {
            self.append_rule_tasks(&rule, board.editable_mut());
        }
        board.document_mut().recurring_rules.push(rule.clone());

        info!(
            "Added recurring rule {} '{}' ({:?}, start week {})",
            rule.id, rule.text, rule.interval, rule.start_week
        );
        Ok((rule, applied))
    }

    /// Remove a rule; tasks it already placed stay where they are
    pub fn delete_rule(&self, board: &mut Board, rule_id: &str) -> Result<RecurringRule> {
        let rules = &mut board.document_mut().recurring_rules;
        let index = rules
            .iter()
            .position(|rule| rule.id == rule_id)
            .ok_or_else(|| BoardError::RuleNotFound(rule_id.to_string()))?;
        let rule = rules.remove(index);
        info!("Deleted recurring rule {} '{}'", rule.id, rule.text);
        Ok(rule)
    }
}
