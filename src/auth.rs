//! Password hashing and the authorization policy. Every screen that gates an
//! admin action asks [`permits`] instead of comparing role strings, so the
//! rules live in exactly one place.

use anyhow::{anyhow, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::models::Role;

/// Admin capabilities the policy distinguishes. Catalog management and
/// profile edits are open to every signed-in admin; account management is
/// the superadmin's alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ManageCatalog,
    ManageUsers,
    EditOwnProfile,
}

/// The single authorization check. The gate is deliberately binary
/// (superadmin vs. not) to match how accounts are actually used.
pub fn permits(role: Role, action: Action) -> bool {
    match action {
        Action::ManageCatalog | Action::EditOwnProfile => true,
        Action::ManageUsers => matches!(role, Role::Superadmin),
    }
}

/// Hash a password with Argon2id and a fresh random salt. The encoded string
/// carries its own parameters, so verification keeps working if defaults
/// change later.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?;
    Ok(hash.to_string())
}

/// Check a candidate password against a stored hash. An unparsable hash
/// counts as a mismatch rather than an error; login simply fails.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_superadmin_manages_users() {
        assert!(!permits(Role::Admin, Action::ManageUsers));
        assert!(permits(Role::Superadmin, Action::ManageUsers));
    }

    #[test]
    fn both_roles_manage_the_catalog_and_their_profile() {
        for role in [Role::Admin, Role::Superadmin] {
            assert!(permits(role, Action::ManageCatalog));
            assert!(permits(role, Action::EditOwnProfile));
        }
    }

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("shalom123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("shalom123", &hash));
        assert!(!verify_password("shalom124", &hash));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-hash"));
    }
}
