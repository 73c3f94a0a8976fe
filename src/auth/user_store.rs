//! User Storage
//! Mission: Persist identity records with SQLite (the credential store)

use crate::auth::models::User;
use crate::storage::{self, SharedConnection};
use anyhow::{Context, Result};
use bcrypt::{hash, verify};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, name, email, password_hash, avatar, date";

/// User storage with SQLite backend
pub struct UserStore {
    conn: SharedConnection,
    bcrypt_cost: u32,
}

impl UserStore {
    /// Create a new user store and initialize database
    pub fn new<P: AsRef<Path>>(db_path: P, bcrypt_cost: u32) -> Result<Self> {
        let store = Self {
            conn: storage::open(db_path)?,
            bcrypt_cost,
        };
        store.init_db()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory(bcrypt_cost: u32) -> Result<Self> {
        let store = Self {
            conn: storage::open_in_memory()?,
            bcrypt_cost,
        };
        store.init_db()?;
        Ok(store)
    }

    /// Initialize database schema
    fn init_db(&self) -> Result<()> {
        let conn = self.conn.lock();

        // One identity per email, enforced by the schema
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                avatar TEXT NOT NULL,
                date TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create users table")?;

        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )
        .optional()
        .context("Failed to load user by id")
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            user_from_row,
        )
        .optional()
        .context("Failed to load user by email")
    }

    /// Insert or update a user record by id.
    pub fn save(&self, user: &User) -> Result<(), UserStoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO users (id, name, email, password_hash, avatar, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                password_hash = excluded.password_hash,
                avatar = excluded.avatar",
            params![
                user.id,
                user.name,
                user.email,
                user.password_hash,
                user.avatar,
                storage::format_timestamp(&user.date),
            ],
        )
        .map_err(|e| {
            if storage::is_unique_violation(&e) {
                UserStoreError::EmailTaken
            } else {
                UserStoreError::Storage(anyhow::Error::new(e).context("Failed to save user"))
            }
        })?;

        Ok(())
    }

    /// Hash the password, derive the avatar, and persist a new account
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, UserStoreError> {
        let password_hash = hash(password, self.bcrypt_cost)
            .context("Failed to hash password")
            .map_err(UserStoreError::Storage)?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            avatar: gravatar_url(email),
            date: Utc::now(),
        };

        self.save(&user)?;

        info!("✅ Created user {}", user.id);

        Ok(user)
    }

    /// Verify email and password; `None` for unknown email or wrong password
    pub fn verify_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        match self.find_by_email(email)? {
            Some(user) => {
                let valid =
                    verify(password, &user.password_hash).context("Failed to verify password")?;
                Ok(valid.then_some(user))
            }
            None => Ok(None),
        }
    }

    /// Delete a user by ID. Returns whether a row was removed.
    pub fn delete_user(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();

        let rows_affected = conn
            .execute("DELETE FROM users WHERE id = ?1", params![id])
            .context("Failed to delete user")?;

        if rows_affected > 0 {
            info!("🗑️  Deleted user {}", id);
        }
        Ok(rows_affected > 0)
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let date: String = row.get(5)?;
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        avatar: row.get(4)?,
        date: storage::parse_timestamp(5, &date)?,
    })
}

/// Gravatar URL for an email: 200px, PG-rated, mystery-person fallback.
pub fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{}?s=200&r=pg&d=mm",
        hex::encode(digest)
    )
}

#[derive(Debug)]
pub enum UserStoreError {
    EmailTaken,
    Storage(anyhow::Error),
}

impl std::fmt::Display for UserStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmailTaken => write!(f, "Email already registered"),
            Self::Storage(e) => write!(f, "User storage error: {:#}", e),
        }
    }
}

impl std::error::Error for UserStoreError {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    // Lowest cost bcrypt accepts; keeps tests fast
    const TEST_COST: u32 = 4;

    fn create_test_store() -> UserStore {
        UserStore::in_memory(TEST_COST).unwrap()
    }

    #[test]
    fn test_create_and_retrieve_user() {
        let store = create_test_store();

        let user = store
            .create_user("Jane", "jane@example.com", "password123")
            .unwrap();
        assert_eq!(user.name, "Jane");
        assert_ne!(user.password_hash, "password123");

        let by_email = store.find_by_email("jane@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        let by_id = store.find_by_id(&user.id).unwrap().unwrap();
        assert_eq!(by_id.email, "jane@example.com");
        assert_eq!(by_id.avatar, user.avatar);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = create_test_store();

        store.create_user("Jane", "jane@example.com", "pw1234").unwrap();
        let err = store
            .create_user("Impostor", "jane@example.com", "pw5678")
            .unwrap_err();

        assert!(matches!(err, UserStoreError::EmailTaken));
    }

    #[test]
    fn test_password_verification() {
        let store = create_test_store();
        store.create_user("Jane", "jane@example.com", "password123").unwrap();

        // Correct password
        assert!(store
            .verify_password("jane@example.com", "password123")
            .unwrap()
            .is_some());

        // Incorrect password
        assert!(store
            .verify_password("jane@example.com", "wrongpassword")
            .unwrap()
            .is_none());

        // Non-existent user
        assert!(store
            .verify_password("nobody@example.com", "password123")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_save_updates_existing() {
        let store = create_test_store();
        let mut user = store.create_user("Jane", "jane@example.com", "pw1234").unwrap();

        user.name = "Jane Doe".to_string();
        store.save(&user).unwrap();

        let reloaded = store.find_by_id(&user.id).unwrap().unwrap();
        assert_eq!(reloaded.name, "Jane Doe");
        assert_eq!(reloaded.date.timestamp(), user.date.timestamp());
    }

    #[test]
    fn test_delete_user() {
        let store = create_test_store();
        let user = store.create_user("Temp", "temp@example.com", "pw1234").unwrap();

        assert!(store.delete_user(&user.id).unwrap());
        assert!(store.find_by_id(&user.id).unwrap().is_none());
        assert!(!store.delete_user(&user.id).unwrap());
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp = NamedTempFile::new().unwrap();

        let id = {
            let store = UserStore::new(temp.path(), TEST_COST).unwrap();
            store.create_user("Jane", "jane@example.com", "pw1234").unwrap().id
        };

        let store = UserStore::new(temp.path(), TEST_COST).unwrap();
        assert!(store.find_by_id(&id).unwrap().is_some());
    }

    #[test]
    fn test_gravatar_normalizes_email() {
        let a = gravatar_url("Jane@Example.com ");
        let b = gravatar_url("jane@example.com");
        assert_eq!(a, b);
        assert!(a.starts_with("https://www.gravatar.com/avatar/"));
        assert!(a.ends_with("?s=200&r=pg&d=mm"));
    }
}
