use crate::domain::commands::users::{CreateUserCommand, DeleteUserResult, UpdateUserCommand};
use crate::domain::models::User as DomainUser;
use crate::domain::Balance as DomainBalance;
use shared::{
    Balance as SharedBalance, CreateUserRequest, DeleteUserResponse, UpdateUserRequest, User as SharedUser,
};

/// Mapper between shared user DTOs and domain users.
pub struct UserMapper;

impl UserMapper {
    pub fn to_dto(domain: DomainUser) -> SharedUser {
        SharedUser {
            id: domain.id,
            name: domain.name,
            fixed_allowance: domain.fixed_allowance,
            default_color_index: domain.default_color_index,
            icon: domain.icon,
            created_at: domain.created_at.map(|at| at.to_rfc3339()),
            archived_balance: domain.archived_balance,
        }
    }

    pub fn to_create_command(request: CreateUserRequest) -> CreateUserCommand {
        CreateUserCommand {
            name: request.name,
            fixed_allowance: request.fixed_allowance,
            default_color_index: request.default_color_index,
            icon: request.icon,
        }
    }

    pub fn to_update_command(user_id: String, request: UpdateUserRequest) -> UpdateUserCommand {
        UpdateUserCommand {
            user_id,
            name: request.name,
            fixed_allowance: request.fixed_allowance,
            default_color_index: request.default_color_index,
            icon: request.icon,
        }
    }

    pub fn to_balance_dto(user: &DomainUser, balance: DomainBalance) -> SharedBalance {
        SharedBalance {
            user_id: balance.user_id,
            user_name: user.name.clone(),
            earned: balance.earned,
            paid: balance.paid,
            balance: balance.balance,
        }
    }

    pub fn to_delete_response(result: DeleteUserResult, undo_seconds: i64) -> DeleteUserResponse {
        DeleteUserResponse {
            success_message: format!("{} was removed", result.user_name),
            user_id: result.user_id,
            removed_tasks: result.removed_tasks,
            removed_payouts: result.removed_payouts,
            undo_seconds,
        }
    }
}
