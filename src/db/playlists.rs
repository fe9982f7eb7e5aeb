use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

use crate::error::DomainError;
use crate::models::{Playlist, Song};

fn playlist_from_row(row: &Row<'_>) -> rusqlite::Result<Playlist> {
    Ok(Playlist {
        id: row.get(0)?,
        title: row.get(1)?,
        date: row.get(2)?,
        is_active: row.get(3)?,
        song_count: row.get(4)?,
    })
}

const PLAYLIST_COLUMNS: &str = "p.id, p.title, p.date, p.is_active,
     (SELECT COUNT(*) FROM playlist_songs ps WHERE ps.playlist_id = p.id)";

/// Retrieve every playlist for the admin manager, newest date first.
pub fn fetch_playlists(conn: &Connection) -> Result<Vec<Playlist>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {PLAYLIST_COLUMNS} FROM playlists p ORDER BY p.date DESC, p.id DESC"
        ))
        .context("failed to prepare playlist query")?;

    let playlists = stmt
        .query_map([], playlist_from_row)
        .context("failed to load playlists")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect playlists")?;

    Ok(playlists)
}

/// Retrieve the playlists flagged for public visibility. The caller applies
/// the temporal display ordering; the query itself promises nothing beyond a
/// stable base order.
pub fn fetch_active_playlists(conn: &Connection) -> Result<Vec<Playlist>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {PLAYLIST_COLUMNS} FROM playlists p WHERE p.is_active = 1 ORDER BY p.id"
        ))
        .context("failed to prepare active playlist query")?;

    let playlists = stmt
        .query_map([], playlist_from_row)
        .context("failed to load active playlists")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect active playlists")?;

    Ok(playlists)
}

/// Load a single playlist header by id.
pub fn fetch_playlist(conn: &Connection, id: i64) -> Result<Playlist> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {PLAYLIST_COLUMNS} FROM playlists p WHERE p.id = ?1"
        ))
        .context("failed to prepare playlist lookup")?;

    let mut playlists = stmt
        .query_map([id], playlist_from_row)
        .context("failed to load playlist")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect playlist")?;

    playlists
        .pop()
        .ok_or_else(|| DomainError::NotFound { entity: "Playlist" }.into())
}

/// Get every song linked to a playlist in performance order. The `position`
/// column is the only thing that decides the order here; nothing re-sorts by
/// title downstream.
pub fn fetch_songs_for_playlist(conn: &Connection, playlist_id: i64) -> Result<Vec<Song>> {
    let mut stmt = conn
        .prepare(
            "SELECT s.id, s.title, s.artist_id, a.name, s.lyrics, s.tone, s.url, s.created_at
             FROM songs s
             INNER JOIN playlist_songs ps ON ps.song_id = s.id
             INNER JOIN artists a ON a.id = s.artist_id
             WHERE ps.playlist_id = ?1
             ORDER BY ps.position",
        )
        .context("failed to prepare playlist songs query")?;

    let songs = stmt
        .query_map([playlist_id], |row| {
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
        })
        .context("failed to iterate playlist songs")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect playlist songs")?;

    Ok(songs)
}

/// Insert a new playlist together with its ordered song references in one
/// transaction, returning the hydrated struct.
pub fn create_playlist(
    conn: &Connection,
    title: &str,
    date: NaiveDate,
    is_active: bool,
    song_ids: &[i64],
) -> Result<Playlist> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to start transaction")?;

    tx.execute(
        "INSERT INTO playlists (title, date, is_active) VALUES (?1, ?2, ?3)",
        params![title, date, is_active],
    )
    .context("failed to insert playlist")?;

    let id = tx.last_insert_rowid();
    insert_song_refs(&tx, id, song_ids)?;
    tx.commit().context("failed to commit playlist")?;

    log::debug!("created playlist {id} ({title}) with {} songs", song_ids.len());
    Ok(Playlist {
        id,
        title: title.to_string(),
        date,
        is_active,
        song_count: song_ids.len() as i64,
    })
}

/// Replace a playlist wholesale: header fields and the full ordered song
/// list, in one transaction. Saving is whole-document replacement on
/// purpose; the last writer wins and there is no merge.
pub fn update_playlist(
    conn: &Connection,
    id: i64,
    title: &str,
    date: NaiveDate,
    is_active: bool,
    song_ids: &[i64],
) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to start transaction")?;

    let updated = tx
        .execute(
            "UPDATE playlists SET title = ?1, date = ?2, is_active = ?3 WHERE id = ?4",
            params![title, date, is_active, id],
        )
        .context("failed to update playlist")?;

    if updated == 0 {
        return Err(DomainError::NotFound { entity: "Playlist" }.into());
    }

    tx.execute(
        "DELETE FROM playlist_songs WHERE playlist_id = ?1",
        params![id],
    )
    .context("failed to clear playlist songs")?;

    insert_song_refs(&tx, id, song_ids)?;
    tx.commit().context("failed to commit playlist update")?;
    Ok(())
}

/// Remove a playlist. The database schema cascades to `playlist_songs`, so we
/// do not have to delete the join table rows manually.
pub fn delete_playlist(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM playlists WHERE id = ?1", params![id])
        .context("failed to delete playlist")?;

    if deleted == 0 {
        Err(DomainError::NotFound { entity: "Playlist" }.into())
    } else {
        Ok(())
    }
}

/// Write the ordered reference list. Positions are just the array indexes,
/// so whatever order the caller curated is exactly what a later fetch
/// replays.
fn insert_song_refs(conn: &Connection, playlist_id: i64, song_ids: &[i64]) -> Result<()> {
    let mut stmt = conn
        .prepare("INSERT INTO playlist_songs (playlist_id, song_id, position) VALUES (?1, ?2, ?3)")
        .context("failed to prepare song reference insert")?;

    for (position, song_id) in song_ids.iter().enumerate() {
        stmt.execute(params![playlist_id, song_id, position as i64])
            .context("failed to link song to playlist")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::artists::create_artist;
    use crate::db::connection::open_in_memory;
    use crate::db::songs::{create_song, delete_song};

    fn seed_songs(conn: &Connection, titles: &[&str]) -> Vec<i64> {
        let artist = create_artist(conn, "Marcos").unwrap();
        titles
            .iter()
            .map(|title| create_song(conn, title, artist.id, "la", None, None).unwrap().id)
            .collect()
    }

    #[test]
    fn song_order_survives_a_create_fetch_round_trip() {
        let conn = open_in_memory().unwrap();
        let ids = seed_songs(&conn, &["Uno", "Dos", "Tres"]);
        // Deliberately not insertion order.
        let curated = vec![ids[2], ids[0], ids[1]];

        let date: NaiveDate = "2025-06-01".parse().unwrap();
        let playlist = create_playlist(&conn, "Shabat", date, true, &curated).unwrap();
        assert_eq!(playlist.song_count, 3);

        let fetched: Vec<i64> = fetch_songs_for_playlist(&conn, playlist.id)
            .unwrap()
            .iter()
            .map(|song| song.id)
            .collect();
        assert_eq!(fetched, curated);
    }

    #[test]
    fn update_replaces_the_order_wholesale() {
        let conn = open_in_memory().unwrap();
        let ids = seed_songs(&conn, &["Uno", "Dos", "Tres"]);
        let date: NaiveDate = "2025-06-01".parse().unwrap();
        let playlist = create_playlist(&conn, "Shabat", date, true, &ids).unwrap();

        let reordered = vec![ids[1], ids[2]];
        update_playlist(&conn, playlist.id, "Shabat", date, false, &reordered).unwrap();

        let fetched: Vec<i64> = fetch_songs_for_playlist(&conn, playlist.id)
            .unwrap()
            .iter()
            .map(|song| song.id)
            .collect();
        assert_eq!(fetched, reordered);
        assert!(!fetch_playlist(&conn, playlist.id).unwrap().is_active);
    }

    #[test]
    fn deleting_a_song_drops_it_from_playlists() {
        let conn = open_in_memory().unwrap();
        let ids = seed_songs(&conn, &["Uno", "Dos"]);
        let date: NaiveDate = "2025-06-01".parse().unwrap();
        let playlist = create_playlist(&conn, "Shabat", date, true, &ids).unwrap();

        delete_song(&conn, ids[0]).unwrap();
        let remaining: Vec<i64> = fetch_songs_for_playlist(&conn, playlist.id)
            .unwrap()
            .iter()
            .map(|song| song.id)
            .collect();
        assert_eq!(remaining, vec![ids[1]]);
    }

    #[test]
    fn active_fetch_only_returns_active_playlists() {
        let conn = open_in_memory().unwrap();
        let date: NaiveDate = "2025-06-01".parse().unwrap();
        create_playlist(&conn, "Visible", date, true, &[]).unwrap();
        create_playlist(&conn, "Draft", date, false, &[]).unwrap();

        let active = fetch_active_playlists(&conn).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "Visible");
    }

    #[test]
    fn missing_playlist_surfaces_not_found() {
        let conn = open_in_memory().unwrap();
        let err = fetch_playlist(&conn, 42).unwrap_err();
        assert_eq!(
            err.chain().last().unwrap().to_string(),
            "Playlist not found."
        );
        assert!(delete_playlist(&conn, 42).is_err());
    }
}
