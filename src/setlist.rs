//! The ordered-song model behind the playlist editor, plus the temporal
//! ordering used on the public landing screen. Both are pure in-memory
//! transformations; persistence happens elsewhere by projecting the sequence
//! to ids.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::models::{Playlist, Song};

/// A user-curated, manually reorderable sequence of songs. Order is
/// performance order, not insertion order, and is authoritative: the id list
/// projected by [`SongOrder::to_id_list`] is persisted exactly as-is.
#[derive(Debug, Default)]
pub struct SongOrder {
    songs: Vec<Song>,
}

impl SongOrder {
    /// Build the sequence from songs already in their persisted order.
    pub fn new(songs: Vec<Song>) -> Self {
        Self { songs }
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Whether a song id is already part of the sequence.
    pub fn contains(&self, song_id: i64) -> bool {
        self.songs.iter().any(|song| song.id == song_id)
    }

    /// Append a song to the end. Duplicate ids are rejected as a no-op so
    /// adding is idempotent; the return value tells the caller whether
    /// anything changed.
    pub fn add(&mut self, song: Song) -> bool {
        if self.contains(song.id) {
            return false;
        }
        self.songs.push(song);
        true
    }

    /// Remove the entry with the given id, compacting the sequence while
    /// preserving the relative order of everything else. Removing an id that
    /// is not present is a no-op, never an error.
    pub fn remove(&mut self, song_id: i64) -> bool {
        match self.songs.iter().position(|song| song.id == song_id) {
            Some(index) => {
                self.songs.remove(index);
                true
            }
            None => false,
        }
    }

    /// Swap the entry at `index` with the one above it. The top entry stays
    /// put; the sequence never wraps.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.songs.len() {
            return false;
        }
        self.songs.swap(index, index - 1);
        true
    }

    /// Swap the entry at `index` with the one below it. The bottom entry
    /// stays put; the sequence never wraps.
    pub fn move_down(&mut self, index: usize) -> bool {
        if self.songs.is_empty() || index >= self.songs.len() - 1 {
            return false;
        }
        self.songs.swap(index, index + 1);
        true
    }

    /// Project the sequence to persisted ids in current order, ready for
    /// storage.
    pub fn to_id_list(&self) -> Vec<i64> {
        self.songs.iter().map(|song| song.id).collect()
    }
}

/// Order active playlists for the public landing screen: everything dated
/// today or later comes first, soonest first, followed by past dates, most
/// recent first. Comparison is calendar-day granularity; `today` is computed
/// once per refresh and passed in. The sort is stable, so playlists sharing a
/// date keep their incoming relative order.
pub fn order_for_display(playlists: &mut [Playlist], today: NaiveDate) {
    playlists.sort_by(|a, b| {
        let a_upcoming = a.date >= today;
        let b_upcoming = b.date >= today;
        match (a_upcoming, b_upcoming) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (true, true) => a.date.cmp(&b.date),
            (false, false) => b.date.cmp(&a.date),
        }
    });
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn song(id: i64) -> Song {
        Song {
            id,
            title: format!("Song {id}"),
            artist_id: 1,
            artist: "Artist".to_string(),
            lyrics: String::new(),
            tone: None,
            url: None,
            created_at: Utc::now(),
        }
    }

    fn playlist(id: i64, date: &str) -> Playlist {
        Playlist {
            id,
            title: format!("Playlist {id}"),
            date: date.parse().unwrap(),
            is_active: true,
            song_count: 0,
        }
    }

    #[test]
    fn add_appends_and_rejects_duplicates() {
        let mut order = SongOrder::default();
        assert!(order.add(song(1)));
        assert!(order.add(song(2)));
        assert!(!order.add(song(1)));
        assert_eq!(order.to_id_list(), vec![1, 2]);
    }

    #[test]
    fn remove_compacts_and_preserves_relative_order() {
        let mut order = SongOrder::new(vec![song(1), song(2), song(3)]);
        assert!(order.remove(2));
        assert_eq!(order.to_id_list(), vec![1, 3]);
        assert!(!order.remove(2));
        assert_eq!(order.to_id_list(), vec![1, 3]);
    }

    #[test]
    fn moves_stop_at_the_boundaries() {
        let mut order = SongOrder::new(vec![song(1), song(2), song(3)]);
        assert!(!order.move_up(0));
        assert!(!order.move_down(2));
        assert_eq!(order.to_id_list(), vec![1, 2, 3]);

        assert!(order.move_up(2));
        assert_eq!(order.to_id_list(), vec![1, 3, 2]);
        assert!(order.move_down(0));
        assert_eq!(order.to_id_list(), vec![3, 1, 2]);
    }

    #[test]
    fn moves_on_an_empty_sequence_are_no_ops() {
        let mut order = SongOrder::default();
        assert!(!order.move_up(0));
        assert!(!order.move_down(0));
        assert!(!order.remove(7));
    }

    #[test]
    fn id_list_round_trips() {
        let order = SongOrder::new(vec![song(4), song(1), song(9)]);
        let ids = order.to_id_list();
        let rebuilt = SongOrder::new(ids.iter().map(|id| song(*id)).collect());
        assert_eq!(rebuilt.to_id_list(), order.to_id_list());
    }

    #[test]
    fn upcoming_playlists_precede_past_ones() {
        let today: NaiveDate = "2025-01-01".parse().unwrap();
        let mut playlists = vec![
            playlist(1, "2024-01-10"),
            playlist(2, "2025-06-01"),
            playlist(3, "2025-06-01"),
        ];
        order_for_display(&mut playlists, today);
        let ids: Vec<i64> = playlists.iter().map(|p| p.id).collect();
        // Duplicate future dates keep their incoming relative order.
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn future_sorts_ascending_and_past_descending() {
        let today: NaiveDate = "2025-01-01".parse().unwrap();
        let mut playlists = vec![
            playlist(1, "2025-03-01"),
            playlist(2, "2024-12-25"),
            playlist(3, "2025-01-01"),
            playlist(4, "2024-06-01"),
        ];
        order_for_display(&mut playlists, today);
        let ids: Vec<i64> = playlists.iter().map(|p| p.id).collect();
        // Today counts as upcoming; past dates follow, most recent first.
        assert_eq!(ids, vec![3, 1, 2, 4]);
    }
}
