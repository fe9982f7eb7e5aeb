//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. The intent is that these types stay light-weight data holders so other
//! layers can focus on presentation and persistence logic. Keeping the
//! commentary here means later refactors can reconstruct the assumptions even
//! if other context is lost.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

/// Access levels recognized by the application. The enum is closed on purpose:
/// every authorization decision goes through [`crate::auth::permits`], so a
/// typo'd role string cannot silently grant or deny access the way a loose
/// string comparison would.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Superadmin,
}

impl Role {
    /// Stable string form stored in the `users.role` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }

    /// Parse the persisted form back into the enum. Unknown values collapse to
    /// `Admin`, the least privileged role, so a hand-edited database row can
    /// never escalate privileges by accident.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "superadmin" => Role::Superadmin,
            _ => Role::Admin,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
/// A songwriter or worship leader the catalog attributes songs to. Artists are
/// created standalone from the artist manager or inline while authoring a
/// song.
pub struct Artist {
    /// Primary key from the database.
    pub id: i64,
    /// Unique display name.
    pub name: String,
    /// Number of songs currently referencing this artist. Populated by the
    /// list query so the manager screen can show it next to the name; the
    /// same count backs the refusal message when a delete is attempted.
    pub song_count: i64,
}

impl fmt::Display for Artist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone)]
/// In-memory representation of a song. The struct mirrors rows in the `songs`
/// table joined with the owning artist, because every display path needs the
/// artist name anyway.
pub struct Song {
    /// Primary key from the SQLite store.
    pub id: i64,
    /// Title displayed in lists and search results.
    pub title: String,
    /// Foreign key to the artist row. Edit flows bubble this back to the
    /// persistence layer.
    pub artist_id: i64,
    /// Artist name resolved by the read query.
    pub artist: String,
    /// Raw chord-annotated lyric text. This string is the single source of
    /// truth for chord positions; chords are never stored separately.
    pub lyrics: String,
    /// Optional musical key, e.g. "G" or "Em".
    pub tone: Option<String>,
    /// Optional URL pointing to an online reference (kept as raw text so we
    /// can store non-web references as well).
    pub url: Option<String>,
    /// Creation timestamp, used to order the song manager newest-first.
    pub created_at: DateTime<Utc>,
}

impl Song {
    /// Compose a `Title - Artist` string that gracefully omits the hyphen if
    /// the artist is blank. Many views (song picker, playlist listings) rely
    /// on this ready-to-use formatting.
    pub fn display_title(&self) -> String {
        if self.artist.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.artist)
        }
    }
}

#[derive(Debug, Clone)]
/// A dated, ordered collection of song references representing one service's
/// repertoire. The song order itself lives in the `playlist_songs` join table
/// and travels through the editor as a [`crate::setlist::SongOrder`].
pub struct Playlist {
    /// Primary key from the SQLite store.
    pub id: i64,
    /// User-facing title, e.g. "Servicio de Shabat".
    pub title: String,
    /// Calendar date of the service. Day granularity only; the display
    /// ordering on the public landing screen compares dates, never times.
    pub date: NaiveDate,
    /// Whether the playlist is visible on the public landing screen.
    pub is_active: bool,
    /// Number of linked songs, populated by the list queries for display.
    pub song_count: i64,
}

#[derive(Debug, Clone)]
/// An administrator account. The password hash never leaves the persistence
/// layer; this struct is what the rest of the application sees.
pub struct User {
    /// Primary key from the SQLite store.
    pub id: i64,
    /// Unique login email.
    pub email: String,
    /// Access level.
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_storage_form() {
        assert_eq!(Role::parse(Role::Admin.as_str()), Role::Admin);
        assert_eq!(Role::parse(Role::Superadmin.as_str()), Role::Superadmin);
    }

    #[test]
    fn unknown_role_falls_back_to_least_privilege() {
        assert_eq!(Role::parse("root"), Role::Admin);
        assert_eq!(Role::parse(""), Role::Admin);
    }

    #[test]
    fn display_title_omits_blank_artist() {
        let mut song = sample_song();
        assert_eq!(song.display_title(), "Bendice a Israel - Marcos");
        song.artist = "  ".to_string();
        assert_eq!(song.display_title(), "Bendice a Israel");
    }

    fn sample_song() -> Song {
        Song {
            id: 1,
            title: "Bendice a Israel".to_string(),
            artist_id: 1,
            artist: "Marcos".to_string(),
            lyrics: String::new(),
            tone: None,
            url: None,
            created_at: Utc::now(),
        }
    }
}
