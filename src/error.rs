//! Domain error taxonomy. Persistence and auth helpers return these as the
//! root cause inside an `anyhow` chain; the footer surfaces the innermost
//! message, so every variant's text is written for the operator, not for a
//! log file.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// A form field failed validation. The message is shown inline.
    #[error("{0}")]
    Validation(String),

    /// The referenced row no longer exists (deleted from another session or
    /// a stale selection).
    #[error("{entity} not found.")]
    NotFound { entity: &'static str },

    /// Deleting an artist is refused while songs still reference it. The
    /// count makes the refusal actionable.
    #[error("Artist is still referenced by {count} song(s).")]
    ArtistInUse { count: i64 },

    /// Another account already uses the requested email.
    #[error("That email is already registered.")]
    EmailTaken,

    /// Login failed. One message for both unknown email and wrong password,
    /// so the login screen does not leak which accounts exist.
    #[error("Invalid email or password.")]
    InvalidCredentials,

    /// A superadmin tried to delete the account they are logged in with.
    #[error("You cannot delete your own account.")]
    SelfDelete,
}
