//! Board orchestration.
//!
//! [`BoardService`] owns the board behind a mutex and runs every mutating
//! operation the same way: apply the change to the editable week or the
//! document, flush the editable week into the store, prune old history,
//! clone the document, release the lock, then write the whole document.
//! Save failures are logged and never undo the in-memory change; the next
//! successful save carries it.
//!
//! Each clone is stamped with a revision taken under the board lock. Saves
//! run one at a time and a save older than the last written revision is
//! dropped, so the file always ends up with the latest edit. Pruning waits
//! while an undo is pending, because the undo restores state captured
//! before the destructive action.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use shared::{DayKey, NavigateDirection};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use crate::domain::archive_service::{ArchiveService, DEFAULT_KEEP_PAYOUTS, DEFAULT_KEEP_WEEKS};
use crate::domain::balance_service::{Balance, BalanceService, WeeklyTotal};
use crate::domain::board::Board;
use crate::domain::clock::Clock;
use crate::domain::commands::library::{CreateLibraryTaskCommand, UpdateLibraryTaskCommand};
use crate::domain::commands::payouts::RegisterPayoutCommand;
use crate::domain::commands::recurring::CreateRecurringRuleCommand;
use crate::domain::commands::users::{CreateUserCommand, DeleteUserResult, UpdateUserCommand};
use crate::domain::commands::week::{AddTasksCommand, DeleteMatchingCommand, EditTaskCommand, MoveTaskCommand};
use crate::domain::errors::BoardError;
use crate::domain::models::{
    BoardDocument, LibraryTask, Payout, RecurringRule, TaskInstance, Template, User, WeekSnapshot,
};
use crate::domain::payout_service::PayoutService;
use crate::domain::recurring_engine::RecurringEngine;
use crate::domain::task_service::TaskService;
use crate::domain::undo::{UndoAction, UndoManager, UndoStatus, DEFAULT_UNDO_WINDOW_SECS};
use crate::domain::user_service::UserService;
use crate::domain::week_service::WeekService;
use crate::domain::WeekId;
use crate::storage::DocumentStorage;

/// Number of payouts listed on the board, newest first
const RECENT_PAYOUTS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct BoardSettings {
    pub keep_weeks: usize,
    pub keep_payouts: usize,
    pub undo_window: Duration,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            keep_weeks: DEFAULT_KEEP_WEEKS,
            keep_payouts: DEFAULT_KEEP_PAYOUTS,
            undo_window: Duration::seconds(DEFAULT_UNDO_WINDOW_SECS),
        }
    }
}

/// Everything the board screen shows for the displayed week
#[derive(Debug, Clone)]
pub struct BoardOverview {
    pub week_id: WeekId,
    pub is_current_week: bool,
    pub week: WeekSnapshot,
    pub totals: Vec<WeeklyTotal>,
    pub balances: Vec<Balance>,
    pub users: Vec<User>,
    pub task_library: Vec<LibraryTask>,
    pub recurring_rules: Vec<RecurringRule>,
    pub templates: Vec<Template>,
    pub recent_payouts: Vec<Payout>,
    pub undo: Option<UndoStatus>,
}

#[derive(Clone)]
pub struct BoardService {
    board: Arc<Mutex<Board>>,
    /// Bumped under the board lock for every document handed to storage
    revision: Arc<AtomicU64>,
    /// Last revision written; held for the duration of a save
    saved_revision: Arc<tokio::sync::Mutex<u64>>,
    storage: Arc<dyn DocumentStorage>,
    clock: Arc<dyn Clock>,
    undo_window: Duration,
    archive_service: ArchiveService,
    balance_service: BalanceService,
    user_service: UserService,
    task_service: TaskService,
    week_service: WeekService,
    payout_service: PayoutService,
    recurring_engine: RecurringEngine,
}

impl BoardService {
    /// Load the stored board (or seed a new one), repair it and open it on
    /// the current week
    pub async fn initialize(storage: Arc<dyn DocumentStorage>, clock: Arc<dyn Clock>, settings: BoardSettings) -> Self {
        let now = clock.now();
        let user_service = UserService::new();

        let mut document = match storage.load().await {
            Ok(Some(document)) => document,
            Ok(None) => {
                info!("First run, seeding default users and tasks");
                BoardDocument::seeded(now)
            }
            Err(e) => {
                error!("Failed to load board, starting fresh: {:#}", e);
                BoardDocument::seeded(now)
            }
        };
        Self::repair(&user_service, &mut document);

        let board = Board::open(document, now.date_naive(), UndoManager::new(settings.undo_window));
        let service = Self {
            board: Arc::new(Mutex::new(board)),
            revision: Arc::new(AtomicU64::new(0)),
            saved_revision: Arc::new(tokio::sync::Mutex::new(0)),
            storage,
            clock,
            undo_window: settings.undo_window,
            archive_service: ArchiveService::new(settings.keep_weeks, settings.keep_payouts),
            balance_service: BalanceService::new(),
            user_service,
            task_service: TaskService::new(),
            week_service: WeekService::new(),
            payout_service: PayoutService::new(),
            recurring_engine: RecurringEngine::new(),
        };

        // store the opened week and write back any repairs
        if let Err(e) = service.mutate(|_, _| Ok(())).await {
            error!("Failed to store initial board: {:#}", e);
        }
        service
    }

    fn repair(user_service: &UserService, document: &mut BoardDocument) {
        let duplicates = user_service.repair_duplicate_ids(document);
        let orphans = user_service.cleanup_orphans(document);
        if duplicates + orphans > 0 {
            warn!("Repaired board on load: {} duplicate ids, {} orphaned assignees", duplicates, orphans);
        }
    }

    pub fn undo_window_secs(&self) -> i64 {
        self.undo_window.num_seconds()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Board>> {
        self.board.lock().map_err(|_| anyhow!("Board state lock poisoned"))
    }

    /// Run `op` under the lock, then flush, prune and persist
    async fn mutate<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Board, DateTime<Utc>) -> Result<T> + Send,
        T: Send,
    {
        let now = self.clock.now();
        let (value, document, revision) = {
            let mut board = self.lock()?;
            let value = op(&mut board, now)?;
            board.flush();
            if board.undo().is_pending(now) {
                debug!("Undo pending, pruning deferred");
            } else {
                let displayed = board.displayed_week();
                self.archive_service.run(board.document_mut(), Some(displayed), now);
            }
            let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
            (value, board.document().clone(), revision)
        };
        self.persist(&document, revision).await;
        Ok(value)
    }

    fn read<T>(&self, op: impl FnOnce(&Board, DateTime<Utc>) -> T) -> Result<T> {
        let now = self.clock.now();
        let board = self.lock()?;
        Ok(op(&board, now))
    }

    async fn persist(&self, document: &BoardDocument, revision: u64) {
        let mut saved_revision = self.saved_revision.lock().await;
        if revision < *saved_revision {
            debug!("Skipping save of revision {}, {} is already stored", revision, *saved_revision);
            return;
        }
        match self.storage.save(document).await {
            Ok(()) => *saved_revision = revision,
            Err(e) => error!("Failed to save board: {:#}", e),
        }
    }

    // -- views ------------------------------------------------------------

    pub async fn overview(&self) -> Result<BoardOverview> {
        self.read(|board, now| self.build_overview(board, now))
    }

    fn build_overview(&self, board: &Board, now: DateTime<Utc>) -> BoardOverview {
        let document = board.document();
        let week_id = board.displayed_week();
        BoardOverview {
            week_id,
            is_current_week: week_id == WeekId::of(now.date_naive()),
            week: board.editable().clone(),
            totals: self.balance_service.weekly_totals(board.editable(), &document.users),
            balances: self
                .balance_service
                .all_balances(&document.users, &document.weeks, &document.payouts, now),
            users: document.users.clone(),
            task_library: document.task_library.clone(),
            recurring_rules: document.recurring_rules.clone(),
            templates: document.templates.clone(),
            recent_payouts: document.payouts.iter().rev().take(RECENT_PAYOUTS).cloned().collect(),
            undo: board.undo().status(now),
        }
    }

    /// Balance of one user; unknown users are an error here
    pub async fn user_balance(&self, user_id: &str) -> Result<(User, Balance)> {
        self.read(|board, now| -> Result<(User, Balance)> {
            let document = board.document();
            let user = document
                .user(user_id)
                .cloned()
                .ok_or_else(|| BoardError::UserNotFound(user_id.to_string()))?;
            let balance = self
                .balance_service
                .balance_of(&user, &document.weeks, &document.payouts, now);
            Ok((user, balance))
        })?
    }

    pub async fn balances(&self) -> Result<Vec<(User, Balance)>> {
        self.read(|board, now| {
            let document = board.document();
            document
                .users
                .iter()
                .map(|user| {
                    let balance = self
                        .balance_service
                        .balance_of(user, &document.weeks, &document.payouts, now);
                    (user.clone(), balance)
                })
                .collect::<Vec<_>>()
        })
    }

    pub async fn users(&self) -> Result<Vec<User>> {
        self.read(|board, _| board.document().users.clone())
    }

    // -- navigation -------------------------------------------------------

    pub async fn navigate(&self, direction: NavigateDirection) -> Result<BoardOverview> {
        self.mutate(|board, _| {
            board.navigate(direction);
            Ok(())
        })
        .await?;
        self.overview().await
    }

    pub async fn go_to_today(&self) -> Result<BoardOverview> {
        self.mutate(|board, now| {
            board.go_to(now.date_naive());
            Ok(())
        })
        .await?;
        self.overview().await
    }

    // -- users ------------------------------------------------------------

    pub async fn create_user(&self, command: CreateUserCommand) -> Result<User> {
        self.mutate(|board, now| self.user_service.create_user(board, command, now))
            .await
    }

    pub async fn update_user(&self, command: UpdateUserCommand) -> Result<User> {
        self.mutate(|board, _| self.user_service.update_user(board, command))
            .await
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<DeleteUserResult> {
        self.mutate(|board, now| self.user_service.delete_user(board, user_id, now))
            .await
    }

    // -- library ----------------------------------------------------------

    pub async fn add_library_task(&self, command: CreateLibraryTaskCommand) -> Result<LibraryTask> {
        self.mutate(|board, _| self.task_service.add_library_task(board, command))
            .await
    }

    pub async fn update_library_task(&self, command: UpdateLibraryTaskCommand) -> Result<(LibraryTask, usize)> {
        self.mutate(|board, _| self.task_service.update_library_task(board, command))
            .await
    }

    pub async fn delete_library_task(&self, library_id: &str) -> Result<LibraryTask> {
        self.mutate(|board, _| self.task_service.delete_library_task(board, library_id))
            .await
    }

    // -- editable week ----------------------------------------------------

    pub async fn add_tasks(&self, command: AddTasksCommand) -> Result<Vec<String>> {
        self.mutate(|board, _| self.task_service.add_tasks(board, command))
            .await
    }

    pub async fn toggle_task(&self, day: DayKey, task_id: &str) -> Result<bool> {
        self.mutate(|board, _| self.task_service.toggle_task(board, day, task_id))
            .await
    }

    pub async fn move_task(&self, command: MoveTaskCommand) -> Result<()> {
        self.mutate(|board, _| self.task_service.move_task(board, command))
            .await
    }

    pub async fn copy_task(&self, command: MoveTaskCommand) -> Result<String> {
        self.mutate(|board, _| self.task_service.copy_task(board, command))
            .await
    }

    pub async fn edit_task(&self, command: EditTaskCommand) -> Result<TaskInstance> {
        self.mutate(|board, _| self.task_service.edit_task(board, command))
            .await
    }

    pub async fn delete_task(&self, day: DayKey, task_id: &str) -> Result<()> {
        self.mutate(|board, _| self.task_service.delete_task(board, day, task_id))
            .await
    }

    pub async fn delete_matching(&self, command: DeleteMatchingCommand) -> Result<usize> {
        self.mutate(|board, _| self.task_service.delete_matching(board, command))
            .await
    }

    pub async fn clear_week(&self) -> Result<WeekId> {
        self.mutate(|board, now| Ok(self.week_service.clear_week(board, now)))
            .await
    }

    // -- templates --------------------------------------------------------

    pub async fn save_template(&self, name: &str) -> Result<Template> {
        self.mutate(|board, _| self.week_service.save_template(board, name))
            .await
    }

    pub async fn load_template(&self, template_id: &str) -> Result<usize> {
        self.mutate(|board, _| self.week_service.load_template(board, template_id))
            .await
    }

    pub async fn delete_template(&self, template_id: &str) -> Result<Template> {
        self.mutate(|board, _| self.week_service.delete_template(board, template_id))
            .await
    }

    // -- payouts ----------------------------------------------------------

    /// Register a payout; returns it with the user's new balance
    pub async fn register_payout(&self, command: RegisterPayoutCommand) -> Result<(Payout, Balance)> {
        self.mutate(|board, now| {
            let payout = self.payout_service.register_payout(board, command, now)?;
            let document = board.document();
            let balance = self.balance_service.balance_for_id(
                &payout.user_id,
                &document.users,
                &document.weeks,
                &document.payouts,
                now,
            );
            Ok((payout, balance))
        })
        .await
    }

    pub async fn reset_payouts(&self) -> Result<usize> {
        self.mutate(|board, now| Ok(self.payout_service.reset_payouts(board, now)))
            .await
    }

    // -- recurring rules --------------------------------------------------

    pub async fn add_recurring_rule(&self, command: CreateRecurringRuleCommand) -> Result<(RecurringRule, bool)> {
        self.mutate(|board, now| self.recurring_engine.add_rule(board, command, now.date_naive()))
            .await
    }

    pub async fn delete_recurring_rule(&self, rule_id: &str) -> Result<RecurringRule> {
        self.mutate(|board, _| self.recurring_engine.delete_rule(board, rule_id))
            .await
    }

    // -- undo -------------------------------------------------------------

    /// Reverse the pending destructive action; returns its label
    pub async fn undo(&self) -> Result<String> {
        self.mutate(|board, now| {
            let action = board.undo_mut().take(now)?;
            let label = action.label();
            match action {
                UndoAction::DeletedUser(backup) => {
                    self.user_service.restore_user(board, backup)?;
                }
                UndoAction::ClearedWeek { week_id, snapshot } => {
                    self.week_service.restore_week(board, week_id, snapshot)?;
                }
                UndoAction::ResetPayouts { payouts } => {
                    self.payout_service.restore_payouts(board, payouts);
                }
            }
            info!("Undid: {}", label);
            Ok(label)
        })
        .await
    }

    // -- export / import --------------------------------------------------

    /// The whole document, displayed week included
    pub async fn export(&self) -> Result<BoardDocument> {
        self.read(|board, _| {
            let mut document = board.document().clone();
            document.weeks.insert(board.displayed_week(), board.editable().clone());
            document
        })
    }

    /// Replace all data with `document`. Destructive, so it must be confirmed.
    pub async fn import(&self, document: BoardDocument, confirm: bool) -> Result<()> {
        if !confirm {
            return Err(BoardError::ConfirmationRequired.into());
        }
        let mut document = document;
        Self::repair(&self.user_service, &mut document);
        let summary = format!(
            "{} users, {} weeks, {} payouts",
            document.users.len(),
            document.weeks.len(),
            document.payouts.len()
        );

        self.mutate(move |board, now| {
            board.replace_document(document, now.date_naive());
            Ok(())
        })
        .await?;
        info!("Imported board: {}", summary);
        Ok(())
    }
}
