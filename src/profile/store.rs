//! Profile Storage
//! Mission: Persist one profile document per user with SQLite

use crate::profile::models::Profile;
use crate::storage::{self, SharedConnection};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use tracing::debug;

/// Profile storage with SQLite backend
pub struct ProfileStore {
    conn: SharedConnection,
}

impl ProfileStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let store = Self {
            conn: storage::open(db_path)?,
        };
        store.init_db()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self> {
        let store = Self {
            conn: storage::open_in_memory()?,
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS profiles (
                user_id TEXT PRIMARY KEY,
                doc TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create profiles table")?;
        Ok(())
    }

    pub fn find_by_user(&self, user_id: &str) -> Result<Option<Profile>> {
        let conn = self.conn.lock();
        load_profile(&conn, user_id)
    }

    /// All profiles in creation order
    pub fn list(&self) -> Result<Vec<Profile>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT user_id, doc FROM profiles ORDER BY rowid")?;

        let profiles = stmt
            .query_map([], profile_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list profiles")?;

        Ok(profiles)
    }

    /// Insert or replace the profile keyed by `profile.user_id`
    pub fn upsert(&self, profile: &Profile) -> Result<()> {
        let conn = self.conn.lock();
        write_profile(&conn, profile)
    }

    /// Build the user's profile from the stored one (if any) and save it,
    /// all inside one transaction.
    pub fn upsert_with(
        &self,
        user_id: &str,
        f: impl FnOnce(Option<Profile>) -> Profile,
    ) -> Result<Profile> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to begin profile update")?;

        let profile = f(load_profile(&tx, user_id)?);
        write_profile(&tx, &profile)?;

        tx.commit().context("Failed to commit profile update")?;
        Ok(profile)
    }

    /// Load, change, and rewrite an existing profile as a single step.
    /// Returns `None` when the user has no profile.
    pub fn modify<T>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut Profile) -> T,
    ) -> Result<Option<(Profile, T)>> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to begin profile update")?;

        let Some(mut profile) = load_profile(&tx, user_id)? else {
            return Ok(None);
        };
        let outcome = f(&mut profile);
        write_profile(&tx, &profile)?;

        tx.commit().context("Failed to commit profile update")?;
        Ok(Some((profile, outcome)))
    }

    /// Returns whether a profile was removed
    pub fn delete_by_user(&self, user_id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let rows = conn
            .execute("DELETE FROM profiles WHERE user_id = ?1", params![user_id])
            .context("Failed to delete profile")?;
        Ok(rows > 0)
    }
}

fn load_profile(conn: &Connection, user_id: &str) -> Result<Option<Profile>> {
    conn.query_row(
        "SELECT user_id, doc FROM profiles WHERE user_id = ?1",
        params![user_id],
        profile_from_row,
    )
    .optional()
    .context("Failed to load profile")
}

fn write_profile(conn: &Connection, profile: &Profile) -> Result<()> {
    let doc = serde_json::to_string(profile).context("Failed to encode profile")?;
    conn.execute(
        "INSERT INTO profiles (user_id, doc, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id) DO UPDATE SET
            doc = excluded.doc,
            updated_at = excluded.updated_at",
        params![
            profile.user_id,
            doc,
            storage::format_timestamp(&Utc::now())
        ],
    )
    .context("Failed to save profile")?;

    debug!("Saved profile for user {}", profile.user_id);
    Ok(())
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    let user_id: String = row.get(0)?;
    let doc: String = row.get(1)?;
    let mut profile: Profile = storage::parse_document(1, &doc)?;
    profile.user_id = user_id;
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::models::{ProfileRequest, Experience};
    use chrono::NaiveDate;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn profile_for(user_id: &str, status: &str) -> Profile {
        Profile::new(
            user_id,
            ProfileRequest {
                status: Some(status.to_string()),
                skills: Some("rust, sql".to_string()),
                ..Default::default()
            }
            .into_fields(),
        )
    }

    #[test]
    fn test_upsert_and_find() {
        let store = ProfileStore::in_memory().unwrap();
        let mut profile = profile_for("u1", "Developer");
        profile.add_experience(Experience {
            id: "e1".into(),
            title: "Engineer".into(),
            company: "Acme".into(),
            location: None,
            from: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            to: None,
            current: true,
            description: None,
        });
        store.upsert(&profile).unwrap();

        let loaded = store.find_by_user("u1").unwrap().unwrap();
        assert_eq!(loaded.user_id, "u1");
        assert_eq!(loaded.skills, vec!["rust", "sql"]);
        assert_eq!(loaded.experience.len(), 1);
        assert!(store.find_by_user("u2").unwrap().is_none());
    }

    #[test]
    fn test_upsert_replaces() {
        let store = ProfileStore::in_memory().unwrap();
        store.upsert(&profile_for("u1", "Developer")).unwrap();
        store.upsert(&profile_for("u1", "Manager")).unwrap();

        let all = store.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, "Manager");
    }

    #[test]
    fn test_list_in_creation_order() {
        let store = ProfileStore::in_memory().unwrap();
        store.upsert(&profile_for("u1", "A")).unwrap();
        store.upsert(&profile_for("u2", "B")).unwrap();
        store.upsert(&profile_for("u1", "A2")).unwrap();

        let users: Vec<_> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|p| p.user_id)
            .collect();
        assert_eq!(users, vec!["u1", "u2"]);
    }

    fn experience(id: &str) -> Experience {
        Experience {
            id: id.into(),
            title: "Engineer".into(),
            company: "Acme".into(),
            location: None,
            from: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            to: None,
            current: false,
            description: None,
        }
    }

    #[test]
    fn test_modify_requires_existing_profile() {
        let store = ProfileStore::in_memory().unwrap();
        let outcome = store
            .modify("u1", |p| p.add_experience(experience("e1")))
            .unwrap();
        assert!(outcome.is_none());
        assert!(store.find_by_user("u1").unwrap().is_none());
    }

    #[test]
    fn test_upsert_with_sees_stored_profile() {
        let store = ProfileStore::in_memory().unwrap();
        let created = store
            .upsert_with("u1", |existing| {
                assert!(existing.is_none());
                profile_for("u1", "Developer")
            })
            .unwrap();
        assert_eq!(created.status, "Developer");

        store
            .upsert_with("u1", |existing| {
                let mut profile = existing.unwrap();
                profile.status = "Lead".into();
                profile
            })
            .unwrap();
        assert_eq!(store.find_by_user("u1").unwrap().unwrap().status, "Lead");
    }

    #[test]
    fn test_concurrent_entries_are_not_lost() {
        let store = Arc::new(ProfileStore::in_memory().unwrap());
        store.upsert(&profile_for("u1", "Developer")).unwrap();

        let start = Arc::new(Barrier::new(6));
        let handles: Vec<_> = (0..6)
            .map(|i| {
                let store = Arc::clone(&store);
                let start = Arc::clone(&start);
                thread::spawn(move || {
                    start.wait();
                    store
                        .modify("u1", |p| p.add_experience(experience(&format!("e{i}"))))
                        .unwrap()
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let loaded = store.find_by_user("u1").unwrap().unwrap();
        assert_eq!(loaded.experience.len(), 6);
    }

    #[test]
    fn test_delete_by_user() {
        let store = ProfileStore::in_memory().unwrap();
        store.upsert(&profile_for("u1", "Developer")).unwrap();

        assert!(store.delete_by_user("u1").unwrap());
        assert!(!store.delete_by_user("u1").unwrap());
        assert!(store.find_by_user("u1").unwrap().is_none());
    }
}
