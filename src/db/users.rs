use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::auth;
use crate::error::DomainError;
use crate::models::{Role, User};

/// Email seeded for the very first account so the operator can sign in on a
/// fresh database at all.
const DEFAULT_ADMIN_EMAIL: &str = "admin@localhost";
/// Starting password for the seeded account. It is expected to be changed
/// from the profile screen right after the first login.
const DEFAULT_ADMIN_PASSWORD: &str = "changeme";

/// List every account for the user manager. The password hash stays inside
/// this module; only id, email and role travel upward.
pub fn fetch_users(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn
        .prepare("SELECT id, email, role FROM users ORDER BY LOWER(email)")
        .context("failed to prepare user query")?;

    let users = stmt
        .query_map([], |row| {
            let role: String = row.get(2)?;
            Ok(User {
                id: row.get(0)?,
                email: row.get(1)?,
                role: Role::parse(&role),
            })
        })
        .context("failed to load users")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect users")?;

    Ok(users)
}

/// Register a new administrator account. Email and password are required;
/// the email must not be taken. The password is stored as an Argon2 hash.
pub fn create_user(conn: &Connection, email: &str, password: &str, role: Role) -> Result<User> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(
            DomainError::Validation("Email and password are required.".to_string()).into(),
        );
    }

    if email_in_use(conn, email, None)? {
        return Err(DomainError::EmailTaken.into());
    }

    let hash = auth::hash_password(password)?;
    conn.execute(
        "INSERT INTO users (email, password_hash, role) VALUES (?1, ?2, ?3)",
        params![email, hash, role.as_str()],
    )
    .context("failed to insert user")?;

    let id = conn.last_insert_rowid();
    log::info!("created {role} account for {email}");
    Ok(User {
        id,
        email: email.to_string(),
        role,
    })
}

/// Check an email/password pair and return the matching account. Unknown
/// email and wrong password fail identically so the login screen does not
/// reveal which accounts exist.
pub fn authenticate(conn: &Connection, email: &str, password: &str) -> Result<User> {
    let row: Option<(i64, String, String)> = conn
        .query_row(
            "SELECT id, password_hash, role FROM users WHERE email = ?1",
            params![email.trim()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()
        .context("failed to look up user")?;

    match row {
        Some((id, hash, role)) if auth::verify_password(password, &hash) => Ok(User {
            id,
            email: email.trim().to_string(),
            role: Role::parse(&role),
        }),
        _ => {
            log::warn!("failed login attempt for {}", email.trim());
            Err(DomainError::InvalidCredentials.into())
        }
    }
}

/// Update the signed-in user's own credentials. Either field may be omitted;
/// providing neither is a validation error. A changed email must not collide
/// with another account.
pub fn update_profile(
    conn: &Connection,
    user_id: i64,
    new_email: Option<&str>,
    new_password: Option<&str>,
) -> Result<User> {
    if new_email.is_none() && new_password.is_none() {
        return Err(DomainError::Validation("Nothing to update.".to_string()).into());
    }

    if let Some(email) = new_email {
        if email_in_use(conn, email.trim(), Some(user_id))? {
            return Err(DomainError::EmailTaken.into());
        }
        let updated = conn
            .execute(
                "UPDATE users SET email = ?1 WHERE id = ?2",
                params![email.trim(), user_id],
            )
            .context("failed to update email")?;
        if updated == 0 {
            return Err(DomainError::NotFound { entity: "User" }.into());
        }
    }

    if let Some(password) = new_password {
        let hash = auth::hash_password(password)?;
        let updated = conn
            .execute(
                "UPDATE users SET password_hash = ?1 WHERE id = ?2",
                params![hash, user_id],
            )
            .context("failed to update password")?;
        if updated == 0 {
            return Err(DomainError::NotFound { entity: "User" }.into());
        }
    }

    let (email, role): (String, String) = conn
        .query_row(
            "SELECT email, role FROM users WHERE id = ?1",
            params![user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .context("failed to reload user")?;

    Ok(User {
        id: user_id,
        email,
        role: Role::parse(&role),
    })
}

/// Delete another administrator's account. Deleting the account you are
/// signed in with is refused outright.
pub fn delete_user(conn: &Connection, current_user_id: i64, target_id: i64) -> Result<()> {
    if current_user_id == target_id {
        return Err(DomainError::SelfDelete.into());
    }

    let deleted = conn
        .execute("DELETE FROM users WHERE id = ?1", params![target_id])
        .context("failed to delete user")?;

    if deleted == 0 {
        Err(DomainError::NotFound { entity: "User" }.into())
    } else {
        Ok(())
    }
}

/// Seed a superadmin on an empty database so there is always a way in.
/// Returns the seeded email when a row was created so the caller can tell
/// the operator about the default credentials.
pub fn ensure_default_admin(conn: &Connection) -> Result<Option<String>> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .context("failed to count users")?;

    if count > 0 {
        return Ok(None);
    }

    create_user(conn, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD, Role::Superadmin)?;
    log::warn!("seeded default superadmin {DEFAULT_ADMIN_EMAIL}; change its password");
    Ok(Some(DEFAULT_ADMIN_EMAIL.to_string()))
}

/// Whether an email belongs to any account other than `exclude_id`.
fn email_in_use(conn: &Connection, email: &str, exclude_id: Option<i64>) -> Result<bool> {
    let count: i64 = match exclude_id {
        Some(id) => conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE email = ?1 AND id <> ?2",
                params![email, id],
                |row| row.get(0),
            )
            .context("failed to check email")?,
        None => conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE email = ?1",
                params![email],
                |row| row.get(0),
            )
            .context("failed to check email")?,
    };
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::open_in_memory;

    #[test]
    fn authenticate_accepts_the_right_password_only() {
        let conn = open_in_memory().unwrap();
        create_user(&conn, "ana@example.org", "secreta", Role::Admin).unwrap();

        let user = authenticate(&conn, "ana@example.org", "secreta").unwrap();
        assert_eq!(user.role, Role::Admin);

        let err = authenticate(&conn, "ana@example.org", "incorrecta").unwrap_err();
        assert_eq!(
            err.chain().last().unwrap().to_string(),
            "Invalid email or password."
        );
        // Unknown accounts fail with the same message.
        let err = authenticate(&conn, "nadie@example.org", "secreta").unwrap_err();
        assert_eq!(
            err.chain().last().unwrap().to_string(),
            "Invalid email or password."
        );
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let conn = open_in_memory().unwrap();
        create_user(&conn, "ana@example.org", "secreta", Role::Admin).unwrap();
        let err = create_user(&conn, "ana@example.org", "otra", Role::Admin).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::EmailTaken)
        ));
    }

    #[test]
    fn profile_update_checks_email_collisions() {
        let conn = open_in_memory().unwrap();
        create_user(&conn, "ana@example.org", "secreta", Role::Admin).unwrap();
        let beto = create_user(&conn, "beto@example.org", "secreta", Role::Admin).unwrap();

        let err = update_profile(&conn, beto.id, Some("ana@example.org"), None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::EmailTaken)
        ));

        // Changing password and keeping your own email works.
        update_profile(&conn, beto.id, Some("beto@example.org"), Some("nueva")).unwrap();
        authenticate(&conn, "beto@example.org", "nueva").unwrap();
    }

    #[test]
    fn self_delete_is_refused() {
        let conn = open_in_memory().unwrap();
        let ana = create_user(&conn, "ana@example.org", "secreta", Role::Superadmin).unwrap();
        let beto = create_user(&conn, "beto@example.org", "secreta", Role::Admin).unwrap();

        let err = delete_user(&conn, ana.id, ana.id).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::SelfDelete)
        ));

        delete_user(&conn, ana.id, beto.id).unwrap();
        assert_eq!(fetch_users(&conn).unwrap().len(), 1);
    }

    #[test]
    fn default_admin_is_seeded_exactly_once() {
        let conn = open_in_memory().unwrap();
        let seeded = ensure_default_admin(&conn).unwrap();
        assert!(seeded.is_some());
        assert!(ensure_default_admin(&conn).unwrap().is_none());

        let users = fetch_users(&conn).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Role::Superadmin);
    }
}
