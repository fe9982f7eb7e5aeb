use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, Row};

use crate::error::DomainError;
use crate::models::Song;

/// Shared column list + row mapper so every song query hydrates the struct
/// the same way, artist name included.
const SONG_COLUMNS: &str =
    "s.id, s.title, s.artist_id, a.name, s.lyrics, s.tone, s.url, s.created_at";

fn song_from_row(row: &Row<'_>) -> rusqlite::Result<Song> {
    Ok(Song {
        id: row.get(0)?,
        title: row.get(1)?,
        artist_id: row.get(2)?,
        artist: row.get(3)?,
        lyrics: row.get(4)?,
        tone: row.get(5)?,
        url: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Fetch the whole catalog, newest first, with the artist name joined in.
pub fn fetch_all_songs(conn: &Connection) -> Result<Vec<Song>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {SONG_COLUMNS}
             FROM songs s
             INNER JOIN artists a ON a.id = s.artist_id
             ORDER BY s.created_at DESC, s.id DESC"
        ))
        .context("failed to prepare all songs query")?;

    let songs = stmt
        .query_map([], song_from_row)
        .context("failed to iterate songs")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect songs")?;

    Ok(songs)
}

/// Load a single song by id for the lyric screen.
pub fn fetch_song(conn: &Connection, id: i64) -> Result<Song> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {SONG_COLUMNS}
             FROM songs s
             INNER JOIN artists a ON a.id = s.artist_id
             WHERE s.id = ?1"
        ))
        .context("failed to prepare song query")?;

    let mut songs = stmt
        .query_map([id], song_from_row)
        .context("failed to iterate song")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect songs")?;

    songs
        .pop()
        .ok_or_else(|| DomainError::NotFound { entity: "Song" }.into())
}

/// Insert a brand new song. We echo the hydrated struct so callers can update
/// UI state without having to re-query the catalog.
pub fn create_song(
    conn: &Connection,
    title: &str,
    artist_id: i64,
    lyrics: &str,
    tone: Option<&str>,
    url: Option<&str>,
) -> Result<Song> {
    conn.execute(
        "INSERT INTO songs (title, artist_id, lyrics, tone, url, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![title, artist_id, lyrics, tone, url, Utc::now()],
    )
    .context("failed to insert song")?;

    let id = conn.last_insert_rowid();
    log::debug!("created song {id} ({title})");
    fetch_song(conn, id)
}

/// Update all editable song fields. Like other update helpers, we surface an
/// explicit error when zero rows are touched.
pub fn update_song(
    conn: &Connection,
    id: i64,
    title: &str,
    artist_id: i64,
    lyrics: &str,
    tone: Option<&str>,
    url: Option<&str>,
) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE songs
             SET title = ?1, artist_id = ?2, lyrics = ?3, tone = ?4, url = ?5
             WHERE id = ?6",
            params![title, artist_id, lyrics, tone, url, id],
        )
        .context("failed to update song")?;

    if updated == 0 {
        Err(DomainError::NotFound { entity: "Song" }.into())
    } else {
        Ok(())
    }
}

/// Permanently delete a song. The playlist join table cascades automatically
/// so repertoires lose the entry without additional cleanup.
pub fn delete_song(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM songs WHERE id = ?1", params![id])
        .context("failed to delete song")?;

    if deleted == 0 {
        Err(DomainError::NotFound { entity: "Song" }.into())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::artists::create_artist;
    use crate::db::connection::open_in_memory;

    #[test]
    fn create_and_fetch_round_trip_keeps_every_field() {
        let conn = open_in_memory().unwrap();
        let artist = create_artist(&conn, "Marcos").unwrap();
        let song = create_song(
            &conn,
            "Bendice a Israel",
            artist.id,
            "[G]Bendice a [C]Israel",
            Some("G"),
            Some("https://example.org/v"),
        )
        .unwrap();

        let fetched = fetch_song(&conn, song.id).unwrap();
        assert_eq!(fetched.title, "Bendice a Israel");
        assert_eq!(fetched.artist, "Marcos");
        assert_eq!(fetched.lyrics, "[G]Bendice a [C]Israel");
        assert_eq!(fetched.tone.as_deref(), Some("G"));
        assert_eq!(fetched.url.as_deref(), Some("https://example.org/v"));
    }

    #[test]
    fn catalog_lists_newest_first() {
        let conn = open_in_memory().unwrap();
        let artist = create_artist(&conn, "Marcos").unwrap();
        create_song(&conn, "Primero", artist.id, "la", None, None).unwrap();
        create_song(&conn, "Segundo", artist.id, "la", None, None).unwrap();

        let songs = fetch_all_songs(&conn).unwrap();
        let titles: Vec<&str> = songs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Segundo", "Primero"]);
    }

    #[test]
    fn missing_song_surfaces_not_found() {
        let conn = open_in_memory().unwrap();
        let err = fetch_song(&conn, 99).unwrap_err();
        assert_eq!(err.chain().last().unwrap().to_string(), "Song not found.");
        assert!(update_song(&conn, 99, "x", 1, "y", None, None).is_err());
        assert!(delete_song(&conn, 99).is_err());
    }
}
