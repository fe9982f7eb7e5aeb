//! Core library surface for the Repertoire Manager TUI application.
//!
//! The public modules exposed here provide an intentionally small API so the
//! `bin` target as well as potential external tooling can reuse the same
//! pieces. Keeping the glue logic documented makes it easy to recall why each
//! re-export exists when revisiting the project.
pub mod auth;
pub mod db;
pub mod error;
pub mod lyrics;
pub mod models;
pub mod setlist;
pub mod ui;

/// Convenience re-exports for the persistence layer. These functions are
/// typically used by `main.rs` to initialize the embedded SQLite store and
/// preload data.
pub use db::{ensure_default_admin, ensure_schema, fetch_artist_names};

/// The primary domain types that other layers manipulate.
pub use models::{Artist, Playlist, Role, Song, User};

/// The chord-lyric tokenizer and the playlist ordering model, the two pieces
/// most likely to be reused outside the TUI.
pub use lyrics::{clean, tokenize, Chunk};
pub use setlist::{order_for_display, SongOrder};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
