use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, Error as SqlError, ErrorCode, OptionalExtension};

use crate::error::DomainError;
use crate::models::Artist;

/// Retrieve every artist with its current song count, ordered
/// case-insensitively. The count feeds both the manager screen and the
/// refusal message when a delete is attempted.
pub fn fetch_artists(conn: &Connection) -> Result<Vec<Artist>> {
    let mut stmt = conn
        .prepare(
            "SELECT a.id, a.name, COUNT(s.id)
             FROM artists a
             LEFT JOIN songs s ON s.artist_id = a.id
             GROUP BY a.id, a.name
             ORDER BY LOWER(a.name), a.name",
        )
        .context("failed to prepare artist query")?;

    let artists = stmt
        .query_map([], |row| {
            Ok(Artist {
                id: row.get(0)?,
                name: row.get(1)?,
                song_count: row.get(2)?,
            })
        })
        .context("failed to load artists")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect artists")?;

    Ok(artists)
}

/// Retrieve distinct artist names for the auto-complete widget in the song
/// form. The ordering sorts by lowercase first but falls back to the original
/// text to keep accents and capitalization intact.
pub fn fetch_artist_names(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT name FROM artists ORDER BY LOWER(name), name")
        .context("failed to prepare artist name query")?;

    let mut rows = stmt.query([]).context("failed to execute artist name query")?;

    let mut names = Vec::new();
    while let Some(row) = rows.next().context("failed to fetch artist name row")? {
        let name: String = row.get(0).context("failed to read artist name")?;
        names.push(name);
    }

    Ok(names)
}

/// Insert a new artist row, returning the hydrated struct so the caller can
/// push it straight into the in-memory list.
pub fn create_artist(conn: &Connection, name: &str) -> Result<Artist> {
    conn.execute(
        "INSERT INTO artists (name, created_at) VALUES (?1, ?2)",
        params![name, Utc::now()],
    )
    .map_err(|err| map_unique_constraint(err, name))
    .context("failed to insert artist")?;

    let id = conn.last_insert_rowid();
    log::debug!("created artist {id} ({name})");
    Ok(Artist {
        id,
        name: name.to_string(),
        song_count: 0,
    })
}

/// Rename an existing artist. We surface a custom error when nothing was
/// updated so the UI can show a friendly message instead of silently
/// continuing.
pub fn update_artist(conn: &Connection, id: i64, name: &str) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE artists SET name = ?1 WHERE id = ?2",
            params![name, id],
        )
        .map_err(|err| map_unique_constraint(err, name))
        .context("failed to update artist")?;

    if updated == 0 {
        Err(DomainError::NotFound { entity: "Artist" }.into())
    } else {
        Ok(())
    }
}

/// Remove an artist row. The delete is refused while any song still
/// references the artist; the error carries the exact count so the operator
/// knows how much reassigning is left.
pub fn delete_artist(conn: &Connection, id: i64) -> Result<()> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM songs WHERE artist_id = ?1",
            params![id],
            |row| row.get(0),
        )
        .context("failed to count linked songs")?;

    if count > 0 {
        return Err(DomainError::ArtistInUse { count }.into());
    }

    let deleted = conn
        .execute("DELETE FROM artists WHERE id = ?1", params![id])
        .context("failed to delete artist")?;

    if deleted == 0 {
        Err(DomainError::NotFound { entity: "Artist" }.into())
    } else {
        Ok(())
    }
}

/// Resolve an artist name typed into the song form, creating the row when it
/// does not exist yet. Lookup is case-insensitive so "marcos" and "Marcos"
/// do not fork into two artists.
pub fn find_or_create_artist(conn: &Connection, name: &str) -> Result<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM artists WHERE LOWER(name) = LOWER(?1)",
            params![name],
            |row| row.get(0),
        )
        .optional()
        .context("failed to look up artist by name")?;

    if let Some(id) = existing {
        return Ok(id);
    }

    Ok(create_artist(conn, name)?.id)
}

/// Coerce SQLite constraint errors into human-readable messages. The only
/// constraint on this table is the uniqueness of names.
fn map_unique_constraint(err: SqlError, name: &str) -> anyhow::Error {
    if matches!(err.sqlite_error_code(), Some(ErrorCode::ConstraintViolation)) {
        DomainError::Validation(format!("Artist \"{name}\" already exists.")).into()
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::open_in_memory;
    use crate::db::songs::create_song;
    use crate::error::DomainError;

    #[test]
    fn duplicate_artist_name_is_rejected_with_a_friendly_message() {
        let conn = open_in_memory().unwrap();
        create_artist(&conn, "Marcos").unwrap();
        let err = create_artist(&conn, "Marcos").unwrap_err();
        assert!(err.chain().last().unwrap().to_string().contains("already exists"));
    }

    #[test]
    fn delete_is_refused_while_songs_reference_the_artist() {
        let conn = open_in_memory().unwrap();
        let artist = create_artist(&conn, "Marcos").unwrap();
        create_song(&conn, "Uno", artist.id, "[G]la", None, None).unwrap();
        create_song(&conn, "Dos", artist.id, "[C]la", None, None).unwrap();

        let err = delete_artist(&conn, artist.id).unwrap_err();
        let root = err.chain().last().unwrap().to_string();
        assert_eq!(root, "Artist is still referenced by 2 song(s).");
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::ArtistInUse { count: 2 })
        ));
    }

    #[test]
    fn delete_succeeds_once_no_songs_remain() {
        let conn = open_in_memory().unwrap();
        let artist = create_artist(&conn, "Marcos").unwrap();
        delete_artist(&conn, artist.id).unwrap();
        assert!(fetch_artists(&conn).unwrap().is_empty());
    }

    #[test]
    fn find_or_create_reuses_rows_case_insensitively() {
        let conn = open_in_memory().unwrap();
        let first = find_or_create_artist(&conn, "Marcos").unwrap();
        let second = find_or_create_artist(&conn, "marcos").unwrap();
        assert_eq!(first, second);
        assert_eq!(fetch_artists(&conn).unwrap().len(), 1);
    }

    #[test]
    fn fetch_artists_reports_song_counts() {
        let conn = open_in_memory().unwrap();
        let with_songs = create_artist(&conn, "Ana").unwrap();
        create_artist(&conn, "Beto").unwrap();
        create_song(&conn, "Uno", with_songs.id, "la", None, None).unwrap();

        let artists = fetch_artists(&conn).unwrap();
        assert_eq!(artists.len(), 2);
        assert_eq!(artists[0].name, "Ana");
        assert_eq!(artists[0].song_count, 1);
        assert_eq!(artists[1].song_count, 0);
    }
}
