//! User use-case service.
//!
//! # Responsibility
//! - User CRUD with id preconditions and display-name defaulting.
//! - Friendship edges with conflict reporting.
//!
//! # Invariants
//! - A blank name is replaced by the login before the first write.
//! - A duplicate friendship, a missing friendship or befriending oneself is
//!   a `Conflict`.

use crate::model::user::{User, UserId};
use crate::model::{EntityKind, UNASSIGNED_ID};
use crate::repo::user_repo::UserRepository;
use crate::service::id_guard::require_id;
use crate::service::{ServiceError, ServiceResult};
use log::{info, warn};

/// User service facade over repository implementations.
pub struct UserService<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> UserService<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    /// Stores a new user. Storage assigns the id.
    pub fn create(&self, user: &User) -> ServiceResult<User> {
        if user.id != UNASSIGNED_ID {
            return Err(ServiceError::IdAssignedByStorage {
                kind: EntityKind::User,
                id: user.id,
            });
        }
        let user = user.clone().with_default_name();
        Ok(self.users.add(&user)?)
    }

    /// Overwrites the user addressed by `user.id`.
    pub fn update(&self, user: &User) -> ServiceResult<User> {
        require_id(EntityKind::User, Some(user.id))?;
        Ok(self.users.update(user)?)
    }

    pub fn get_all(&self) -> ServiceResult<Vec<User>> {
        Ok(self.users.get_all()?)
    }

    pub fn get_by_id(&self, id: Option<i64>) -> ServiceResult<User> {
        let id = require_id(EntityKind::User, id)?;
        Ok(self.users.get_by_id(id)?)
    }

    pub fn add_friend(&self, user_id: Option<i64>, friend_id: Option<i64>) -> ServiceResult<()> {
        let (user_id, friend_id) = pair_ids(user_id, friend_id)?;
        if self.users.add_friend(user_id, friend_id)? {
            info!(
                "event=friend_add module=service status=ok user_id={user_id} friend_id={friend_id}"
            );
            return Ok(());
        }

        let message = if user_id == friend_id {
            format!("user {user_id} cannot befriend themselves")
        } else {
            format!("users {user_id} and {friend_id} are already friends")
        };
        Err(friend_conflict(user_id, friend_id, message))
    }

    pub fn delete_friend(
        &self,
        user_id: Option<i64>,
        friend_id: Option<i64>,
    ) -> ServiceResult<()> {
        let (user_id, friend_id) = pair_ids(user_id, friend_id)?;
        if self.users.delete_friend(user_id, friend_id)? {
            info!(
                "event=friend_delete module=service status=ok user_id={user_id} friend_id={friend_id}"
            );
            return Ok(());
        }
        Err(friend_conflict(
            user_id,
            friend_id,
            format!("users {user_id} and {friend_id} are not friends"),
        ))
    }

    /// Friends of the user, ascending by id.
    pub fn friends(&self, user_id: Option<i64>) -> ServiceResult<Vec<User>> {
        let user_id = require_id(EntityKind::User, user_id)?;
        Ok(self.users.friends(user_id)?)
    }

    /// Users befriended by both, ascending by id.
    pub fn mutual_friends(
        &self,
        user_id: Option<i64>,
        other_id: Option<i64>,
    ) -> ServiceResult<Vec<User>> {
        let (user_id, other_id) = pair_ids(user_id, other_id)?;
        Ok(self.users.mutual_friends(user_id, other_id)?)
    }

    /// Drops every user with their friendships and likes.
    pub fn reset(&self) -> ServiceResult<()> {
        Ok(self.users.reset()?)
    }
}

fn pair_ids(first: Option<i64>, second: Option<i64>) -> ServiceResult<(UserId, UserId)> {
    Ok((
        require_id(EntityKind::User, first)?,
        require_id(EntityKind::User, second)?,
    ))
}

fn friend_conflict(user_id: UserId, friend_id: UserId, message: String) -> ServiceError {
    warn!(
        "event=friend_conflict module=service status=error user_id={user_id} friend_id={friend_id}"
    );
    ServiceError::Conflict(message)
}
