//! Payouts: money handed to a user, subtracted from their balance.

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::board::Board;
use crate::domain::commands::payouts::RegisterPayoutCommand;
use crate::domain::errors::BoardError;
use crate::domain::models::{finite_or_zero, Payout};
use crate::domain::undo::UndoAction;

#[derive(Debug, Clone, Default)]
pub struct PayoutService;

impl PayoutService {
    pub fn new() -> Self {
        Self
    }

    pub fn register_payout(&self, board: &mut Board, command: RegisterPayoutCommand, now: DateTime<Utc>) -> Result<Payout> {
        info!("Registering payout of {:.2} to {}", command.amount, command.user_id);

        if !command.amount.is_finite() || command.amount <= 0.0 {
            return Err(BoardError::validation("Payout amount must be greater than zero").into());
        }
        if board.document().user(&command.user_id).is_none() {
            return Err(BoardError::UserNotFound(command.user_id).into());
        }

        let payout = Payout {
            id: Payout::generate_id(),
            date: now,
            user_id: command.user_id,
            amount: command.amount,
        };
        board.document_mut().payouts.push(payout.clone());
        Ok(payout)
    }

    /// Clear the payout history without changing any balance.
    ///
    /// Each user's payouts are netted out of their archived balance, so
    /// `paid` drops to zero and `earned` drops by the same amount.
    pub fn reset_payouts(&self, board: &mut Board, now: DateTime<Utc>) -> usize {
        let document = board.document_mut();
        let payouts = std::mem::take(&mut document.payouts);
        for payout in &payouts {
            if let Some(user) = document.user_mut(&payout.user_id) {
                user.archived_balance = finite_or_zero(user.archived_balance) - finite_or_zero(payout.amount);
            }
        }

        let removed = payouts.len();
        info!("Reset payout history ({} payouts)", removed);
        board.undo_mut().arm(UndoAction::ResetPayouts { payouts }, now);
        removed
    }

    /// Bring the reset history back, followed by any payout registered since.
    ///
    /// The amounts netted out by the reset are added back to the archived
    /// balances, so anything folded in meanwhile is kept.
    pub fn restore_payouts(&self, board: &mut Board, payouts: Vec<Payout>) {
        let document = board.document_mut();
        for payout in &payouts {
            if let Some(user) = document.user_mut(&payout.user_id) {
                user.archived_balance = finite_or_zero(user.archived_balance) + finite_or_zero(payout.amount);
            }
        }
        let newer = std::mem::replace(&mut document.payouts, payouts);
        document.payouts.extend(newer);
        info!("Restored payout history ({} payouts)", document.payouts.len());
    }
}
