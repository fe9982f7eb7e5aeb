//! Persistence module split across logical submodules.

mod artists;
mod connection;
mod playlists;
mod songs;
mod users;

pub use artists::{
    create_artist, delete_artist, fetch_artist_names, fetch_artists, find_or_create_artist,
    update_artist,
};
pub use connection::{ensure_schema, open_in_memory};
pub use playlists::{
    create_playlist, delete_playlist, fetch_active_playlists, fetch_playlist, fetch_playlists,
    fetch_songs_for_playlist, update_playlist,
};
pub use songs::{create_song, delete_song, fetch_all_songs, fetch_song, update_song};
pub use users::{
    authenticate, create_user, delete_user, ensure_default_admin, fetch_users, update_profile,
};
