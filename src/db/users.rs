use super::Database;
use crate::models::user::User;
use leptos::logging::log;
use rusqlite::{params, Error};

/// Row shape used by the login path. Carries the password hash and lockout
/// state, so it never leaves the server.
#[derive(Debug, Clone)]
pub struct UserAuthRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role_name: String,
    pub is_active: String,
    pub failed_logins: i64,
    pub locked_until: Option<String>,
}

const USER_COLUMNS: &str = "u.id, u.username, u.email, u.role_id, r.name, u.is_active, u.created_at, u.updated_at";

fn user_from_row(row: &rusqlite::Row<'_>) -> Result<User, Error> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        role_id: row.get(3)?,
        role_name: row.get(4)?,
        is_active: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

impl Database {
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role_id: i64,
    ) -> Result<i64, Error> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO users (username, email, password_hash, role_id) VALUES (?, ?, ?, ?)",
            params![username, email, password_hash, role_id],
        )?;
        let id = conn.last_insert_rowid();
        log!("[DB] User created: {} (id {})", username, id);
        Ok(id)
    }

    pub async fn role_id_by_name(&self, name: &str) -> Result<Option<i64>, Error> {
        let conn = self.conn.lock().await;
        match conn.query_row("SELECT id FROM roles WHERE name = ?", [name], |row| {
            row.get(0)
        }) {
            Ok(id) => Ok(Some(id)),
            Err(Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<User>, Error> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON u.role_id = r.id WHERE u.id = ?"
        );
        match conn.query_row(&sql, [id], user_from_row) {
            Ok(user) => Ok(Some(user)),
            Err(Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn get_user_auth(&self, username: &str) -> Result<Option<UserAuthRow>, Error> {
        let conn = self.conn.lock().await;
        match conn.query_row(
            "SELECT u.id, u.username, u.email, u.password_hash, r.name, u.is_active,
                    u.failed_logins, u.locked_until
             FROM users u JOIN roles r ON u.role_id = r.id
             WHERE u.username = ?",
            [username],
            |row| {
                Ok(UserAuthRow {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                    password_hash: row.get(3)?,
                    role_name: row.get(4)?,
                    is_active: row.get(5)?,
                    failed_logins: row.get(6)?,
                    locked_until: row.get(7)?,
                })
            },
        ) {
            Ok(row) => Ok(Some(row)),
            Err(Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Bumps the failure counter and locks the account once the threshold is
    /// reached. Returns the new failure count.
    pub async fn record_login_failure(
        &self,
        user_id: i64,
        max_failures: i64,
        lock_minutes: i64,
    ) -> Result<i64, Error> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        tx.execute(
            "UPDATE users SET failed_logins = failed_logins + 1, updated_at = datetime('now')
             WHERE id = ?",
            [user_id],
        )?;
        let failures: i64 = tx.query_row(
            "SELECT failed_logins FROM users WHERE id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        if failures >= max_failures {
            tx.execute(
                "UPDATE users SET locked_until = datetime('now', '+' || ? || ' minutes')
                 WHERE id = ?",
                params![lock_minutes, user_id],
            )?;
            log!("[DB] User {} locked after {} failed logins", user_id, failures);
        }

        tx.commit()?;
        Ok(failures)
    }

    pub async fn clear_login_failures(&self, user_id: i64) -> Result<(), Error> {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE users SET failed_logins = 0, locked_until = NULL, updated_at = datetime('now')
             WHERE id = ?",
            [user_id],
        )?;
        Ok(())
    }

    /// The scheduled unlock pass. Clears every lock whose window has passed
    /// and returns how many accounts were released.
    pub async fn unlock_expired_users(&self) -> Result<usize, Error> {
        let conn = self.conn.lock().await;
        let unlocked = conn.execute(
            "UPDATE users SET failed_logins = 0, locked_until = NULL, updated_at = datetime('now')
             WHERE locked_until IS NOT NULL AND locked_until <= datetime('now')",
            [],
        )?;
        if unlocked > 0 {
            log!("[DB] Unlocked {} expired account lock(s)", unlocked);
        }
        Ok(unlocked)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::create_test_db;
    use leptos::logging::log;

    #[tokio::test]
    async fn test_create_and_fetch_user() {
        log!("[TEST] Starting test_create_and_fetch_user");
        let db = create_test_db().await;
        let role_id = db.role_id_by_name("Customer").await.unwrap().unwrap();
        let id = db
            .create_user("alice", "alice@example.com", "$argon2id$hash", role_id)
            .await
            .unwrap();

        let user = db.get_user(id).await.unwrap().unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.role_name.as_deref(), Some("Customer"));
        assert_eq!(user.is_active, "Y");

        let auth = db.get_user_auth("alice").await.unwrap().unwrap();
        assert_eq!(auth.password_hash, "$argon2id$hash");
        assert_eq!(auth.failed_logins, 0);
        assert!(auth.locked_until.is_none());

        assert!(db.get_user_auth("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lockout_after_repeated_failures() {
        log!("[TEST] Starting test_lockout_after_repeated_failures");
        let db = create_test_db().await;
        let role_id = db.role_id_by_name("Customer").await.unwrap().unwrap();
        let id = db
            .create_user("bob", "bob@example.com", "$argon2id$hash", role_id)
            .await
            .unwrap();

        for expected in 1..=4 {
            let failures = db.record_login_failure(id, 5, 15).await.unwrap();
            assert_eq!(failures, expected);
        }
        let auth = db.get_user_auth("bob").await.unwrap().unwrap();
        assert!(auth.locked_until.is_none(), "not locked before threshold");

        let failures = db.record_login_failure(id, 5, 15).await.unwrap();
        assert_eq!(failures, 5);
        let auth = db.get_user_auth("bob").await.unwrap().unwrap();
        assert!(auth.locked_until.is_some(), "locked at threshold");

        // A successful login resets the counter and the lock
        db.clear_login_failures(id).await.unwrap();
        let auth = db.get_user_auth("bob").await.unwrap().unwrap();
        assert_eq!(auth.failed_logins, 0);
        assert!(auth.locked_until.is_none());
    }

    #[tokio::test]
    async fn test_unlock_expired_users() {
        log!("[TEST] Starting test_unlock_expired_users");
        let db = create_test_db().await;
        let role_id = db.role_id_by_name("Customer").await.unwrap().unwrap();
        let expired = db
            .create_user("carol", "carol@example.com", "$argon2id$hash", role_id)
            .await
            .unwrap();
        let still_locked = db
            .create_user("dave", "dave@example.com", "$argon2id$hash", role_id)
            .await
            .unwrap();

        {
            let conn = db.conn.lock().await;
            conn.execute(
                "UPDATE users SET failed_logins = 5, locked_until = datetime('now', '-1 minutes')
                 WHERE id = ?",
                [expired],
            )
            .unwrap();
            conn.execute(
                "UPDATE users SET failed_logins = 5, locked_until = datetime('now', '+10 minutes')
                 WHERE id = ?",
                [still_locked],
            )
            .unwrap();
        }

        let unlocked = db.unlock_expired_users().await.unwrap();
        assert_eq!(unlocked, 1);

        let auth = db.get_user_auth("carol").await.unwrap().unwrap();
        assert!(auth.locked_until.is_none());
        assert_eq!(auth.failed_logins, 0);

        let auth = db.get_user_auth("dave").await.unwrap().unwrap();
        assert!(auth.locked_until.is_some(), "future lock must survive the pass");
    }
}
