//! Household member lifecycle.
//!
//! Users are referenced from tasks by id only. Deleting a user removes the
//! user, their payouts and their tasks everywhere, keeping a backup for the
//! undo window. A later user with the same name never inherits anything:
//! ids are fresh and name based references are resolved on load.

use anyhow::Result;
use chrono::{DateTime, Utc};
use shared::DayKey;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::domain::board::Board;
use crate::domain::commands::users::{CreateUserCommand, DeleteUserResult, UpdateUserCommand};
use crate::domain::errors::BoardError;
use crate::domain::models::{Assignee, BoardDocument, User, WeekSnapshot};
use crate::domain::undo::{PayoutPlacement, TaskPlacement, UndoAction, UserBackup};

/// Number of distinct header colors the board cycles through
const COLOR_COUNT: usize = 8;

/// Service for managing household members on the board
#[derive(Debug, Clone, Default)]
pub struct UserService;

impl UserService {
    pub fn new() -> Self {
        Self
    }

    /// Create a new user
    pub fn create_user(&self, board: &mut Board, command: CreateUserCommand, now: DateTime<Utc>) -> Result<User> {
        info!("Creating user: name={}", command.name);

        // Validate the request
        let name = self.validate_name(board.document(), &command.name, None)?;
        self.validate_allowance(command.fixed_allowance)?;

        // Stale name references must not attach to the new user
        let tombstoned = self.tombstone_name_references(board, &name);
        if tombstoned > 0 {
            info!("Tombstoned {} stale references to '{}'", tombstoned, name);
        }

        let mut user = User::new(&name, command.fixed_allowance, now);
        user.default_color_index = command
            .default_color_index
            .unwrap_or((board.document().users.len() % COLOR_COUNT) as u8);
        user.icon = command.icon.unwrap_or_default();
        board.document_mut().users.push(user.clone());

        info!("Created user: {} with ID: {}", user.name, user.id);
        Ok(user)
    }

    /// Update an existing user
    pub fn update_user(&self, board: &mut Board, command: UpdateUserCommand) -> Result<User> {
        info!("Updating user: {}", command.user_id);

        if board.document().user(&command.user_id).is_none() {
            return Err(BoardError::UserNotFound(command.user_id).into());
        }

        // Validate the update request
        let name = match &command.name {
            Some(name) => Some(self.validate_name(board.document(), name, Some(&command.user_id))?),
            None => None,
        };
        if let Some(allowance) = command.fixed_allowance {
            self.validate_allowance(allowance)?;
        }

        let user = board
            .document_mut()
            .user_mut(&command.user_id)
            .ok_or_else(|| BoardError::UserNotFound(command.user_id.clone()))?;

        // Update fields if provided
        if let Some(name) = name {
            user.name = name;
        }
        if let Some(allowance) = command.fixed_allowance {
            user.fixed_allowance = allowance;
        }
        if let Some(color) = command.default_color_index {
            user.default_color_index = color;
        }
        if let Some(icon) = command.icon {
            user.icon = icon;
        }

        info!("Updated user: {} with ID: {}", user.name, user.id);
        Ok(user.clone())
    }

    /// Hard delete a user with their payouts and tasks, arming undo
    pub fn delete_user(&self, board: &mut Board, user_id: &str, now: DateTime<Utc>) -> Result<DeleteUserResult> {
        info!("Deleting user: {}", user_id);

        let user_index = board
            .document()
            .users
            .iter()
            .position(|user| user.id == user_id)
            .ok_or_else(|| BoardError::UserNotFound(user_id.to_string()))?;

        // Payouts, remembering their positions
        let payouts: Vec<PayoutPlacement> = board
            .document()
            .payouts
            .iter()
            .enumerate()
            .filter(|(_, payout)| payout.user_id == user_id)
            .map(|(index, payout)| PayoutPlacement {
                index,
                payout: payout.clone(),
            })
            .collect();
        board.document_mut().payouts.retain(|payout| payout.user_id != user_id);

        // Tasks in every week, remembering their slots
        let mut tasks = Vec::new();
        for (week_id, week) in board.weeks_mut() {
            for day in DayKey::ALL {
                let slot = week.tasks_mut(day);
                for (index, task) in slot.iter().enumerate() {
                    if task.assignee.is_user(user_id) {
                        tasks.push(TaskPlacement {
                            week_id,
                            day,
                            index,
                            task: task.clone(),
                        });
                    }
                }
                slot.retain(|task| !task.assignee.is_user(user_id));
            }
        }

        let user = board.document_mut().users.remove(user_index);
        let result = DeleteUserResult {
            user_id: user.id.clone(),
            user_name: user.name.clone(),
            removed_tasks: tasks.len(),
            removed_payouts: payouts.len(),
        };

        board.undo_mut().arm(
            UndoAction::DeletedUser(UserBackup {
                user_index,
                user,
                payouts,
                tasks,
            }),
            now,
        );

        info!(
            "Deleted user {} ({} tasks, {} payouts removed)",
            result.user_name, result.removed_tasks, result.removed_payouts
        );
        Ok(result)
    }

    /// Put a deleted user back exactly where they were
    pub fn restore_user(&self, board: &mut Board, backup: UserBackup) -> Result<User> {
        let UserBackup {
            user_index,
            user,
            payouts,
            mut tasks,
        } = backup;

        if board.document().user(&user.id).is_some() {
            return Err(BoardError::validation(format!("User {} already exists", user.id)).into());
        }
        if board.document().user_by_name(&user.name).is_some() {
            return Err(BoardError::DuplicateName(user.name).into());
        }

        let document = board.document_mut();
        let index = user_index.min(document.users.len());
        document.users.insert(index, user.clone());

        // Ascending positions so each insert lands on its original index
        for placement in payouts {
            let index = placement.index.min(document.payouts.len());
            document.payouts.insert(index, placement.payout);
        }

        tasks.sort_by(|a, b| (a.week_id, a.day, a.index).cmp(&(b.week_id, b.day, b.index)));
        let mut restored = 0;
        for placement in tasks {
            match board.week_mut(placement.week_id) {
                Some(week) => {
                    let slot = week.tasks_mut(placement.day);
                    let index = placement.index.min(slot.len());
                    slot.insert(index, placement.task);
                    restored += 1;
                }
                None => warn!(
                    "Week {} was archived meanwhile, task {} not restored",
                    placement.week_id, placement.task.id
                ),
            }
        }

        info!("Restored user {} with {} tasks", user.name, restored);
        Ok(user)
    }

    /// Resolve assignees that do not point at a live user.
    ///
    /// `Active` ids without a user become tombstones, legacy `Named`
    /// references become `Active` when a user has that name and tombstones
    /// otherwise. Rules assigned to a missing user become unassigned.
    /// Running it twice changes nothing the second time.
    pub fn cleanup_orphans(&self, document: &mut BoardDocument) -> usize {
        let users = &document.users;
        let mut repaired = 0;

        let weeks = document
            .weeks
            .values_mut()
            .chain(document.templates.iter_mut().map(|template| &mut template.week));
        for week in weeks {
            repaired += Self::repair_week_assignees(users, week);
        }

        for rule in document.recurring_rules.iter_mut() {
            let orphaned = matches!(&rule.assignee, Some(id) if !users.iter().any(|user| &user.id == id));
            if orphaned {
                warn!("Recurring rule {} pointed at a missing user, now unassigned", rule.id);
                rule.assignee = None;
                repaired += 1;
            }
        }

        if repaired > 0 {
            warn!("Repaired {} orphaned assignee references", repaired);
        }
        repaired
    }

    fn repair_week_assignees(users: &[User], week: &mut WeekSnapshot) -> usize {
        let mut repaired = 0;
        for task in week.iter_tasks_mut() {
            let replacement = match &task.assignee {
                Assignee::Active { user_id } if !users.iter().any(|user| &user.id == user_id) => {
                    Some(Assignee::tombstone(user_id))
                }
                Assignee::Named { name } => Some(match users.iter().find(|user| &user.name == name) {
                    Some(user) => Assignee::user(&user.id),
                    None => Assignee::tombstone(name),
                }),
                _ => None,
            };
            if let Some(assignee) = replacement {
                task.assignee = assignee;
                repaired += 1;
            }
        }
        repaired
    }

    /// Give every repeated user id after the first a fresh id.
    ///
    /// Payouts keep pointing at the first holder of the id.
    pub fn repair_duplicate_ids(&self, document: &mut BoardDocument) -> usize {
        let mut seen = HashSet::new();
        let mut repaired = 0;
        for user in document.users.iter_mut() {
            if !seen.insert(user.id.clone()) {
                let fresh = User::generate_id();
                warn!("Duplicate user id {} for {}, reassigned to {}", user.id, user.name, fresh);
                user.id = fresh;
                repaired += 1;
            }
        }
        repaired
    }

    fn tombstone_name_references(&self, board: &mut Board, name: &str) -> usize {
        let mut count = 0;
        for (_, week) in board.weeks_mut() {
            for task in week.iter_tasks_mut() {
                if matches!(&task.assignee, Assignee::Named { name: n } if n == name) {
                    task.assignee = Assignee::tombstone(name);
                    count += 1;
                }
            }
        }
        count
    }

    fn validate_name(&self, document: &BoardDocument, name: &str, current_id: Option<&str>) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BoardError::validation("User name cannot be empty").into());
        }
        let taken = document
            .users
            .iter()
            .any(|user| user.name == name && Some(user.id.as_str()) != current_id);
        if taken {
            return Err(BoardError::DuplicateName(name.to_string()).into());
        }
        Ok(name.to_string())
    }

    fn validate_allowance(&self, amount: f64) -> Result<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(BoardError::validation("Allowance must be a non-negative amount").into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::balance_service::BalanceService;
    use crate::domain::models::{Payout, TaskInstance};
    use crate::domain::undo::UndoManager;
    use chrono::{Duration, NaiveDate, TimeZone};
    use shared::NavigateDirection;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap()
    }

    fn board() -> Board {
        Board::open(BoardDocument::default(), now().date_naive(), UndoManager::default())
    }

    fn create(board: &mut Board, name: &str, allowance: f64) -> User {
        UserService::new()
            .create_user(
                board,
                CreateUserCommand {
                    name: name.to_string(),
                    fixed_allowance: allowance,
                    default_color_index: None,
                    icon: None,
                },
                now(),
            )
            .unwrap()
    }

    fn add_completed(board: &mut Board, day: DayKey, value: f64, user: &User) -> String {
        let task = TaskInstance::new("Dishes", value, "", Assignee::user(&user.id));
        let id = task.id.clone();
        board.editable_mut().tasks_mut(day).push(task);
        board.editable_mut().set_completed(day, &id, true);
        id
    }

    fn balance(board: &Board, user_id: &str) -> f64 {
        let document = board.document();
        BalanceService::new()
            .balance_for_id(user_id, &document.users, &document.weeks, &document.payouts, now())
            .balance
    }

    #[test]
    fn test_create_user_validation() {
        let service = UserService::new();
        let mut board = board();
        create(&mut board, "Maja", 20.0);

        let empty = CreateUserCommand {
            name: "  ".to_string(),
            fixed_allowance: 0.0,
            default_color_index: None,
            icon: None,
        };
        let err = service.create_user(&mut board, empty, now()).unwrap_err();
        assert!(matches!(err.downcast_ref::<BoardError>(), Some(BoardError::Validation(_))));

        let duplicate = CreateUserCommand {
            name: " Maja ".to_string(),
            fixed_allowance: 0.0,
            default_color_index: None,
            icon: None,
        };
        let err = service.create_user(&mut board, duplicate, now()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<BoardError>(),
            Some(&BoardError::DuplicateName("Maja".to_string()))
        );

        let negative = CreateUserCommand {
            name: "Isak".to_string(),
            fixed_allowance: -1.0,
            default_color_index: None,
            icon: None,
        };
        assert!(service.create_user(&mut board, negative, now()).is_err());
    }

    #[test]
    fn test_update_user() {
        let service = UserService::new();
        let mut board = board();
        let maja = create(&mut board, "Maja", 20.0);
        create(&mut board, "Isak", 20.0);

        let updated = service
            .update_user(
                &mut board,
                UpdateUserCommand {
                    user_id: maja.id.clone(),
                    fixed_allowance: Some(25.0),
                    icon: Some("🦊".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.fixed_allowance, 25.0);
        assert_eq!(updated.name, "Maja");

        let rename = UpdateUserCommand {
            user_id: maja.id.clone(),
            name: Some("Isak".to_string()),
            ..Default::default()
        };
        assert!(service.update_user(&mut board, rename).is_err());

        let missing = UpdateUserCommand {
            user_id: "user::missing".to_string(),
            ..Default::default()
        };
        let err = service.update_user(&mut board, missing).unwrap_err();
        assert!(matches!(err.downcast_ref::<BoardError>(), Some(BoardError::UserNotFound(_))));
    }

    #[test]
    fn test_delete_and_undo_restores_everything() {
        let service = UserService::new();
        let mut board = board();
        let isak = create(&mut board, "Isak", 10.0);
        let maja = create(&mut board, "Maja", 20.0);

        // history in a previous week
        board.navigate(NavigateDirection::Previous);
        add_completed(&mut board, DayKey::Friday, 4.0, &maja);
        board.navigate(NavigateDirection::Next);

        board
            .editable_mut()
            .tasks_mut(DayKey::Monday)
            .push(TaskInstance::new("Trash", 1.0, "", Assignee::user(&isak.id)));
        add_completed(&mut board, DayKey::Monday, 5.0, &maja);
        board
            .editable_mut()
            .tasks_mut(DayKey::Monday)
            .push(TaskInstance::new("Vacuum", 2.0, "", Assignee::Unassigned));
        board.document_mut().payouts.push(Payout {
            id: Payout::generate_id(),
            date: now(),
            user_id: maja.id.clone(),
            amount: 8.0,
        });
        board.flush();

        let editable_before = board.editable().clone();
        let document_before = board.document().clone();
        let balance_before = balance(&board, &maja.id);
        assert_eq!(balance_before, 20.0 + 4.0 + 5.0 - 8.0);

        let result = service.delete_user(&mut board, &maja.id, now()).unwrap();
        board.flush();
        assert_eq!(result.removed_tasks, 2);
        assert_eq!(result.removed_payouts, 1);
        assert!(board.document().user(&maja.id).is_none());
        assert!(board.document().payouts.is_empty());
        assert_eq!(board.editable().tasks(DayKey::Monday).len(), 2);
        assert_eq!(balance(&board, &maja.id), 0.0);

        let action = board.undo_mut().take(now() + Duration::seconds(3)).unwrap();
        let UndoAction::DeletedUser(backup) = action else {
            panic!("expected a user backup");
        };
        service.restore_user(&mut board, backup).unwrap();
        board.flush();

        assert_eq!(board.editable(), &editable_before);
        assert_eq!(board.document(), &document_before);
        assert_eq!(balance(&board, &maja.id), balance_before);
    }

    #[test]
    fn test_recreated_user_inherits_nothing() {
        let service = UserService::new();
        let mut board = board();
        let first = create(&mut board, "Maja", 20.0);
        add_completed(&mut board, DayKey::Tuesday, 5.0, &first);
        board.document_mut().payouts.push(Payout {
            id: Payout::generate_id(),
            date: now(),
            user_id: first.id.clone(),
            amount: 3.0,
        });
        // a legacy name reference that nobody resolved
        board.editable_mut().tasks_mut(DayKey::Sunday).push(TaskInstance::new(
            "Old chore",
            9.0,
            "",
            Assignee::Named {
                name: "Maja".to_string(),
            },
        ));
        service.delete_user(&mut board, &first.id, now()).unwrap();

        let second = create(&mut board, "Maja", 0.0);
        board.flush();
        assert_ne!(first.id, second.id);
        assert_eq!(balance(&board, &second.id), 0.0);
        assert_eq!(
            board.editable().tasks(DayKey::Sunday)[0].assignee,
            Assignee::tombstone("Maja")
        );
    }

    #[test]
    fn test_cleanup_orphans_is_idempotent() {
        let service = UserService::new();
        let mut document = BoardDocument::default();
        let isak = User::new("Isak", 10.0, now());
        document.users.push(isak.clone());

        let mut week = WeekSnapshot::empty();
        for assignee in [
            Assignee::user(&isak.id),
            Assignee::user("user::gone"),
            Assignee::Named { name: "Isak".to_string() },
            Assignee::Named { name: "Alva".to_string() },
            Assignee::tombstone("Alva (deleted)"),
        ] {
            week.tasks_mut(DayKey::Monday).push(TaskInstance::new("Chore", 1.0, "", assignee));
        }
        let week_id = crate::domain::WeekId::of(NaiveDate::from_ymd_opt(2026, 3, 4).unwrap());
        document.weeks.insert(week_id, week);

        assert_eq!(service.cleanup_orphans(&mut document), 3);
        let assignees: Vec<Assignee> = document.weeks[&week_id]
            .tasks(DayKey::Monday)
            .iter()
            .map(|task| task.assignee.clone())
            .collect();
        assert_eq!(
            assignees,
            vec![
                Assignee::user(&isak.id),
                Assignee::tombstone("user::gone"),
                Assignee::user(&isak.id),
                Assignee::tombstone("Alva"),
                Assignee::tombstone("Alva"),
            ]
        );

        let after_first = document.clone();
        assert_eq!(service.cleanup_orphans(&mut document), 0);
        assert_eq!(document, after_first);
    }

    #[test]
    fn test_repair_duplicate_ids() {
        let service = UserService::new();
        let mut document = BoardDocument::default();
        let first = User::new("Isak", 10.0, now());
        let mut second = User::new("Maja", 10.0, now());
        second.id = first.id.clone();
        document.users = vec![first.clone(), second];

        assert_eq!(service.repair_duplicate_ids(&mut document), 1);
        assert_eq!(document.users[0].id, first.id);
        assert_ne!(document.users[1].id, first.id);
        assert_eq!(service.repair_duplicate_ids(&mut document), 0);
    }
}
