//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over user rows.
//! - Own the symmetric friendship-edge set and friend-list projections.
//!
//! # Invariants
//! - Friendship rows always exist in both directions; add/delete touch both
//!   inside one immediate transaction.
//! - A user is never their own friend: such requests change nothing.
//! - Friend and mutual-friend lists are ascending by user id.

use crate::db::SharedConnection;
use crate::model::user::{User, UserId};
use crate::model::EntityKind;
use crate::repo::catalog_repo::row_exists;
use crate::repo::{lock, RepoError, RepoResult};
use log::info;
use rusqlite::{params, Connection, Params, Row, TransactionBehavior};
use std::sync::Arc;

const USER_SELECT_SQL: &str = "SELECT
    u.id AS id,
    u.email AS email,
    u.login AS login,
    u.name AS name,
    u.birthday AS birthday
FROM users u";

/// Repository interface for users and their friendships.
pub trait UserRepository: Send + Sync {
    /// Persists a new user and returns it with the assigned id.
    fn add(&self, user: &User) -> RepoResult<User>;
    fn update(&self, user: &User) -> RepoResult<User>;
    fn get_all(&self) -> RepoResult<Vec<User>>;
    fn get_by_id(&self, id: UserId) -> RepoResult<User>;
    /// Existence probe for referential checks. Never reports `NotFound`.
    fn exists(&self, id: UserId) -> RepoResult<bool>;
    /// Returns `true` when the friendship was newly created.
    fn add_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<bool>;
    /// Returns `true` when an existing friendship was removed.
    fn delete_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<bool>;
    fn friends(&self, user_id: UserId) -> RepoResult<Vec<User>>;
    fn mutual_friends(&self, user_id: UserId, other_id: UserId) -> RepoResult<Vec<User>>;
    /// Drops every user together with their friendships and likes.
    fn reset(&self) -> RepoResult<()>;
}

impl<T: UserRepository + ?Sized> UserRepository for Arc<T> {
    fn add(&self, user: &User) -> RepoResult<User> {
        (**self).add(user)
    }

    fn update(&self, user: &User) -> RepoResult<User> {
        (**self).update(user)
    }

    fn get_all(&self) -> RepoResult<Vec<User>> {
        (**self).get_all()
    }

    fn get_by_id(&self, id: UserId) -> RepoResult<User> {
        (**self).get_by_id(id)
    }

    fn exists(&self, id: UserId) -> RepoResult<bool> {
        (**self).exists(id)
    }

    fn add_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<bool> {
        (**self).add_friend(user_id, friend_id)
    }

    fn delete_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<bool> {
        (**self).delete_friend(user_id, friend_id)
    }

    fn friends(&self, user_id: UserId) -> RepoResult<Vec<User>> {
        (**self).friends(user_id)
    }

    fn mutual_friends(&self, user_id: UserId, other_id: UserId) -> RepoResult<Vec<User>> {
        (**self).mutual_friends(user_id, other_id)
    }

    fn reset(&self) -> RepoResult<()> {
        (**self).reset()
    }
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository {
    conn: SharedConnection,
}

impl SqliteUserRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository {
    fn add(&self, user: &User) -> RepoResult<User> {
        user.validate()?;

        let conn = lock(&self.conn, "sqlite connection")?;
        conn.execute(
            "INSERT INTO users (email, login, name, birthday) VALUES (?1, ?2, ?3, ?4);",
            params![
                user.email.as_str(),
                user.login.as_str(),
                user.name.as_str(),
                user.birthday,
            ],
        )?;
        let id = conn.last_insert_rowid();

        info!("event=user_add module=repo status=ok backend=sqlite user_id={id}");
        load_user(&conn, id)?
            .ok_or_else(|| RepoError::InvalidData(format!("user {id} missing after insert")))
    }

    fn update(&self, user: &User) -> RepoResult<User> {
        user.validate()?;

        let conn = lock(&self.conn, "sqlite connection")?;
        let changed = conn.execute(
            "UPDATE users
             SET
                email = ?1,
                login = ?2,
                name = ?3,
                birthday = ?4
             WHERE id = ?5;",
            params![
                user.email.as_str(),
                user.login.as_str(),
                user.name.as_str(),
                user.birthday,
                user.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::User, user.id));
        }

        info!(
            "event=user_update module=repo status=ok backend=sqlite user_id={}",
            user.id
        );
        load_user(&conn, user.id)?.ok_or(RepoError::not_found(EntityKind::User, user.id))
    }

    fn get_all(&self) -> RepoResult<Vec<User>> {
        let conn = lock(&self.conn, "sqlite connection")?;
        query_users(&conn, &format!("{USER_SELECT_SQL} ORDER BY u.id ASC;"), [])
    }

    fn get_by_id(&self, id: UserId) -> RepoResult<User> {
        let conn = lock(&self.conn, "sqlite connection")?;
        load_user(&conn, id)?.ok_or(RepoError::not_found(EntityKind::User, id))
    }

    fn exists(&self, id: UserId) -> RepoResult<bool> {
        let conn = lock(&self.conn, "sqlite connection")?;
        user_exists(&conn, id)
    }

    fn add_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<bool> {
        let mut conn = lock(&self.conn, "sqlite connection")?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_user_exists(&tx, user_id)?;
        ensure_user_exists(&tx, friend_id)?;
        if user_id == friend_id {
            return Ok(false);
        }

        let mut insert =
            tx.prepare("INSERT OR IGNORE INTO friendships (user_id, friend_id) VALUES (?1, ?2);")?;
        let changed = insert.execute(params![user_id, friend_id])?
            + insert.execute(params![friend_id, user_id])?;
        drop(insert);
        tx.commit()?;

        if changed > 0 {
            info!(
                "event=friend_add module=repo status=ok backend=sqlite user_id={user_id} friend_id={friend_id}"
            );
        }
        Ok(changed > 0)
    }

    fn delete_friend(&self, user_id: UserId, friend_id: UserId) -> RepoResult<bool> {
        let mut conn = lock(&self.conn, "sqlite connection")?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_user_exists(&tx, user_id)?;
        ensure_user_exists(&tx, friend_id)?;

        let changed = tx.execute(
            "DELETE FROM friendships
             WHERE (user_id = ?1 AND friend_id = ?2)
                OR (user_id = ?2 AND friend_id = ?1);",
            params![user_id, friend_id],
        )?;
        tx.commit()?;

        if changed > 0 {
            info!(
                "event=friend_delete module=repo status=ok backend=sqlite user_id={user_id} friend_id={friend_id}"
            );
        }
        Ok(changed > 0)
    }

    fn friends(&self, user_id: UserId) -> RepoResult<Vec<User>> {
        let conn = lock(&self.conn, "sqlite connection")?;
        ensure_user_exists(&conn, user_id)?;
        query_users(
            &conn,
            &format!(
                "{USER_SELECT_SQL}
                 INNER JOIN friendships f ON f.friend_id = u.id
                 WHERE f.user_id = ?1
                 ORDER BY u.id ASC;"
            ),
            [user_id],
        )
    }

    fn mutual_friends(&self, user_id: UserId, other_id: UserId) -> RepoResult<Vec<User>> {
        let conn = lock(&self.conn, "sqlite connection")?;
        ensure_user_exists(&conn, user_id)?;
        ensure_user_exists(&conn, other_id)?;
        query_users(
            &conn,
            &format!(
                "{USER_SELECT_SQL}
                 INNER JOIN friendships f1 ON f1.friend_id = u.id
                 INNER JOIN friendships f2 ON f2.friend_id = u.id
                 WHERE f1.user_id = ?1 AND f2.user_id = ?2
                 ORDER BY u.id ASC;"
            ),
            [user_id, other_id],
        )
    }

    fn reset(&self) -> RepoResult<()> {
        let mut conn = lock(&self.conn, "sqlite connection")?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute_batch(
            "DELETE FROM friendships;
             DELETE FROM likes;
             DELETE FROM users;",
        )?;
        tx.commit()?;

        info!("event=storage_reset module=repo status=ok backend=sqlite scope=users");
        Ok(())
    }
}

pub(crate) fn user_exists(conn: &Connection, id: UserId) -> RepoResult<bool> {
    row_exists(conn, "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);", id)
}

pub(crate) fn ensure_user_exists(conn: &Connection, id: UserId) -> RepoResult<()> {
    if user_exists(conn, id)? {
        Ok(())
    } else {
        Err(RepoError::not_found(EntityKind::User, id))
    }
}

fn load_user(conn: &Connection, id: UserId) -> RepoResult<Option<User>> {
    let mut users = query_users(conn, &format!("{USER_SELECT_SQL} WHERE u.id = ?1;"), [id])?;
    Ok(users.pop())
}

fn query_users<P: Params>(conn: &Connection, sql: &str, params: P) -> RepoResult<Vec<User>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut users = Vec::new();
    while let Some(row) = rows.next()? {
        users.push(parse_user_row(row)?);
    }
    Ok(users)
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        login: row.get("login")?,
        name: row.get("name")?,
        birthday: row.get("birthday")?,
    })
}
