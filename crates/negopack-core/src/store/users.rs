//! Account, session, and password-reset operations.

use super::{map_constraint, parsed_col, uuid_col, Store};
use crate::account::{self, PasswordReset, Profile, Session};
use crate::error::{NegoError, Result};
use crate::types::Role;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

fn read_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: uuid_col(row, 0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        role: parsed_col(row, 3)?,
        created_at: row.get(4)?,
    })
}

const PROFILE_COLS: &str = "id, full_name, email, role, created_at";

impl Store {
    // -----------------------------------------------------------------------
    // Sign-up / sign-in
    // -----------------------------------------------------------------------

    pub fn sign_up(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<(Profile, Session)> {
        let email = email.trim().to_lowercase();
        if full_name.trim().is_empty() {
            return Err(NegoError::Validation("full_name is required".into()));
        }
        if !email.contains('@') {
            return Err(NegoError::Validation("email is not valid".into()));
        }
        let hash = account::hash_password(password)?;
        let profile = Profile::new(full_name.trim(), email, role);

        {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO users (id, full_name, email, role, password_hash, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    profile.id.to_string(),
                    profile.full_name,
                    profile.email,
                    profile.role.as_str(),
                    hash,
                    profile.created_at,
                ],
            )
            .map_err(|e| map_constraint(e, "email is already registered"))?;
        }

        tracing::info!(user = %profile.id, role = %profile.role, "account created");
        let session = self.insert_session(profile.id)?;
        Ok((profile, session))
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<(Profile, Session)> {
        let email = email.trim().to_lowercase();
        let found: Option<(Profile, String)> = {
            let conn = self.conn();
            conn.query_row(
                "SELECT id, full_name, email, role, created_at, password_hash \
                 FROM users WHERE email = ?1",
                [&email],
                |row| Ok((read_profile(row)?, row.get::<_, String>(5)?)),
            )
            .optional()?
        };
        let (profile, hash) = found.ok_or(NegoError::InvalidCredentials)?;
        if !account::verify_password(password, &hash)? {
            return Err(NegoError::InvalidCredentials);
        }
        let session = self.insert_session(profile.id)?;
        Ok((profile, session))
    }

    pub fn sign_out(&self, token: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM sessions WHERE token = ?1", [token])?;
        Ok(())
    }

    fn insert_session(&self, user_id: Uuid) -> Result<Session> {
        let session = Session::new(user_id);
        let conn = self.conn();
        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                session.token,
                session.user_id.to_string(),
                session.created_at,
                session.expires_at,
            ],
        )?;
        Ok(session)
    }

    /// Resolve a session token to the signed-in profile. Expired sessions are
    /// removed on sight.
    pub fn session_profile(&self, token: &str) -> Result<Profile> {
        let found: Option<(Uuid, DateTime<Utc>)> = {
            let conn = self.conn();
            conn.query_row(
                "SELECT user_id, expires_at FROM sessions WHERE token = ?1",
                [token],
                |row| Ok((uuid_col(row, 0)?, row.get(1)?)),
            )
            .optional()?
        };
        let (user_id, expires_at) = found.ok_or(NegoError::SessionNotFound)?;
        if Utc::now() >= expires_at {
            self.sign_out(token)?;
            return Err(NegoError::SessionExpired);
        }
        self.get_profile(user_id)
    }

    // -----------------------------------------------------------------------
    // Profiles
    // -----------------------------------------------------------------------

    pub fn get_profile(&self, id: Uuid) -> Result<Profile> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {PROFILE_COLS} FROM users WHERE id = ?1"),
            [id.to_string()],
            read_profile,
        )
        .optional()?
        .ok_or_else(|| NegoError::UserNotFound(id.to_string()))
    }

    /// All profiles, for attendee pickers and comment author display.
    pub fn list_profiles(&self) -> Result<Vec<Profile>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare(&format!("SELECT {PROFILE_COLS} FROM users ORDER BY full_name"))?;
        let rows = stmt.query_map([], read_profile)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_profile(&self, actor: &Profile, full_name: &str) -> Result<Profile> {
        if full_name.trim().is_empty() {
            return Err(NegoError::Validation("full_name is required".into()));
        }
        {
            let conn = self.conn();
            conn.execute(
                "UPDATE users SET full_name = ?1 WHERE id = ?2",
                params![full_name.trim(), actor.id.to_string()],
            )?;
        }
        self.get_profile(actor.id)
    }

    // -----------------------------------------------------------------------
    // Passwords
    // -----------------------------------------------------------------------

    /// Change the acting user's password, re-authenticating with the old one.
    pub fn change_password(&self, actor: &Profile, old: &str, new: &str) -> Result<()> {
        let hash: String = {
            let conn = self.conn();
            conn.query_row(
                "SELECT password_hash FROM users WHERE id = ?1",
                [actor.id.to_string()],
                |row| row.get(0),
            )?
        };
        if !account::verify_password(old, &hash)? {
            return Err(NegoError::InvalidCredentials);
        }
        let new_hash = account::hash_password(new)?;
        let conn = self.conn();
        conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE id = ?2",
            params![new_hash, actor.id.to_string()],
        )?;
        Ok(())
    }

    /// Issue a single-use reset token for the account behind `email`.
    ///
    /// Returns `Ok(None)` for unknown addresses so callers cannot probe which
    /// emails exist.
    pub fn request_password_reset(&self, email: &str) -> Result<Option<PasswordReset>> {
        let email = email.trim().to_lowercase();
        let user_id: Option<Uuid> = {
            let conn = self.conn();
            conn.query_row("SELECT id FROM users WHERE email = ?1", [&email], |row| {
                uuid_col(row, 0)
            })
            .optional()?
        };
        let Some(user_id) = user_id else {
            return Ok(None);
        };

        let reset = PasswordReset::new(user_id);
        let conn = self.conn();
        conn.execute(
            "DELETE FROM password_resets WHERE user_id = ?1",
            [user_id.to_string()],
        )?;
        conn.execute(
            "INSERT INTO password_resets (token, user_id, expires_at) VALUES (?1, ?2, ?3)",
            params![reset.token, reset.user_id.to_string(), reset.expires_at],
        )?;
        Ok(Some(reset))
    }

    /// Complete a password reset. Consumes the token and revokes all sessions
    /// for the account.
    pub fn confirm_password_reset(&self, token: &str, new_password: &str) -> Result<()> {
        let found: Option<(Uuid, DateTime<Utc>)> = {
            let conn = self.conn();
            conn.query_row(
                "SELECT user_id, expires_at FROM password_resets WHERE token = ?1",
                [token],
                |row| Ok((uuid_col(row, 0)?, row.get(1)?)),
            )
            .optional()?
        };
        let (user_id, expires_at) = found.ok_or(NegoError::ResetTokenInvalid)?;
        if Utc::now() >= expires_at {
            let conn = self.conn();
            conn.execute("DELETE FROM password_resets WHERE token = ?1", [token])?;
            return Err(NegoError::ResetTokenInvalid);
        }

        let new_hash = account::hash_password(new_password)?;
        let conn = self.conn();
        conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE id = ?2",
            params![new_hash, user_id.to_string()],
        )?;
        conn.execute("DELETE FROM password_resets WHERE token = ?1", [token])?;
        conn.execute(
            "DELETE FROM sessions WHERE user_id = ?1",
            [user_id.to_string()],
        )?;
        tracing::info!(user = %user_id, "password reset completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil;
    use crate::error::NegoError;
    use crate::types::Role;

    #[test]
    fn sign_up_then_sign_in() {
        let store = testutil::store();
        let (profile, session) = store
            .sign_up("Aina Rahman", "Aina@Example.com", "a-long-password", Role::Employee)
            .unwrap();
        assert_eq!(profile.email, "aina@example.com");
        assert_eq!(store.session_profile(&session.token).unwrap().id, profile.id);

        let (again, _) = store.sign_in("aina@example.com", "a-long-password").unwrap();
        assert_eq!(again.id, profile.id);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let store = testutil::store();
        testutil::employee(&store, "dup@example.com");
        let err = store
            .sign_up("Another", "dup@example.com", "a-long-password", Role::Employee)
            .unwrap_err();
        assert!(matches!(err, NegoError::Constraint(_)));
    }

    #[test]
    fn wrong_password_is_invalid_credentials() {
        let store = testutil::store();
        testutil::employee(&store, "aina@example.com");
        assert!(matches!(
            store.sign_in("aina@example.com", "wrong-password"),
            Err(NegoError::InvalidCredentials)
        ));
        assert!(matches!(
            store.sign_in("nobody@example.com", "whatever-pass"),
            Err(NegoError::InvalidCredentials)
        ));
    }

    #[test]
    fn sign_out_invalidates_session() {
        let store = testutil::store();
        let (_, session) = store
            .sign_up("Aina", "aina@example.com", "a-long-password", Role::Employee)
            .unwrap();
        store.sign_out(&session.token).unwrap();
        assert!(matches!(
            store.session_profile(&session.token),
            Err(NegoError::SessionNotFound)
        ));
    }

    #[test]
    fn change_password_requires_old_password() {
        let store = testutil::store();
        let profile = testutil::employee(&store, "aina@example.com");
        assert!(matches!(
            store.change_password(&profile, "not-the-old-one", "new-password-1"),
            Err(NegoError::InvalidCredentials)
        ));
        store
            .change_password(&profile, "hunter2hunter2", "new-password-1")
            .unwrap();
        assert!(store.sign_in("aina@example.com", "new-password-1").is_ok());
    }

    #[test]
    fn password_reset_flow() {
        let store = testutil::store();
        let (_, session) = store
            .sign_up("Aina", "aina@example.com", "a-long-password", Role::Employee)
            .unwrap();

        // unknown email does not leak existence
        assert!(store
            .request_password_reset("ghost@example.com")
            .unwrap()
            .is_none());

        let reset = store
            .request_password_reset("aina@example.com")
            .unwrap()
            .unwrap();
        store
            .confirm_password_reset(&reset.token, "brand-new-pass")
            .unwrap();

        // token is single-use, old sessions are revoked
        assert!(matches!(
            store.confirm_password_reset(&reset.token, "another-pass-1"),
            Err(NegoError::ResetTokenInvalid)
        ));
        assert!(store.session_profile(&session.token).is_err());
        assert!(store.sign_in("aina@example.com", "brand-new-pass").is_ok());
    }

    #[test]
    fn update_profile_changes_name() {
        let store = testutil::store();
        let profile = testutil::employee(&store, "aina@example.com");
        let updated = store.update_profile(&profile, "Aina R.").unwrap();
        assert_eq!(updated.full_name, "Aina R.");
        assert!(store.update_profile(&profile, "  ").is_err());
    }
}
