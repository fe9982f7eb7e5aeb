use anyhow::Result;
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;

use crate::db::{fetch_active_playlists, fetch_all_songs, fetch_songs_for_playlist};
use crate::models::{Artist, Playlist, Song, User};
use crate::setlist::{order_for_display, SongOrder};
use crate::ui::forms::parse_date;

/// Public landing state: the active playlists in temporal display order.
pub(crate) struct HomeScreen {
    pub(crate) playlists: Vec<Playlist>,
    pub(crate) selected: usize,
}

impl HomeScreen {
    /// Load the active playlists and apply the display ordering. "Today" is
    /// evaluated once here, so one refresh sees one consistent boundary
    /// between upcoming and past.
    pub(crate) fn load(conn: &Connection) -> Result<Self> {
        let mut playlists = fetch_active_playlists(conn)?;
        order_for_display(&mut playlists, Utc::now().date_naive());
        Ok(Self {
            playlists,
            selected: 0,
        })
    }

    pub(crate) fn current_playlist(&self) -> Option<&Playlist> {
        self.playlists.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        move_within(&mut self.selected, self.playlists.len(), offset);
    }
}

/// Public view of one playlist's songs in performance order.
pub(crate) struct PlaylistViewScreen {
    pub(crate) playlist: Playlist,
    pub(crate) songs: Vec<Song>,
    pub(crate) selected: usize,
}

impl PlaylistViewScreen {
    pub(crate) fn load(conn: &Connection, playlist: Playlist) -> Result<Self> {
        let songs = fetch_songs_for_playlist(conn, playlist.id)?;
        Ok(Self {
            playlist,
            songs,
            selected: 0,
        })
    }

    pub(crate) fn current_song(&self) -> Option<&Song> {
        self.songs.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        move_within(&mut self.selected, self.songs.len(), offset);
    }

    pub(crate) fn select_first(&mut self) {
        if !self.songs.is_empty() {
            self.selected = 0;
        }
    }

    pub(crate) fn select_last(&mut self) {
        if !self.songs.is_empty() {
            self.selected = self.songs.len() - 1;
        }
    }
}

/// Where the lyric screen was opened from, which decides where Esc returns.
pub(crate) enum LyricOrigin {
    /// Opened from a playlist; prev/next walk the performance order.
    Playlist(Playlist),
    /// Opened as a preview from the song manager.
    Manager,
}

/// The reading screen: one song, optional chord overlay, scrollable.
pub(crate) struct LyricScreen {
    pub(crate) origin: LyricOrigin,
    /// The song plus its neighbours in the order being browsed. A manager
    /// preview carries a single-element list.
    pub(crate) songs: Vec<Song>,
    pub(crate) index: usize,
    pub(crate) show_chords: bool,
    pub(crate) scroll: u16,
}

impl LyricScreen {
    pub(crate) fn new(origin: LyricOrigin, songs: Vec<Song>, index: usize) -> Self {
        let index = index.min(songs.len().saturating_sub(1));
        Self {
            origin,
            songs,
            index,
            show_chords: false,
            scroll: 0,
        }
    }

    pub(crate) fn current_song(&self) -> Option<&Song> {
        self.songs.get(self.index)
    }

    pub(crate) fn toggle_chords(&mut self) {
        self.show_chords = !self.show_chords;
        self.scroll = 0;
    }

    /// Step to a neighbouring song in the playlist order. Stops at the ends
    /// rather than wrapping, mirroring the prev/next controls of the reading
    /// page.
    pub(crate) fn step(&mut self, offset: isize) -> bool {
        let len = self.songs.len() as isize;
        let target = self.index as isize + offset;
        if target < 0 || target >= len {
            return false;
        }
        self.index = target as usize;
        self.scroll = 0;
        true
    }

    pub(crate) fn scroll_by(&mut self, delta: isize) {
        let line_count = self
            .current_song()
            .map(|song| crate::ui::helpers::lyric_lines(&song.lyrics, self.show_chords).len())
            .unwrap_or(0);
        let max = line_count.saturating_sub(1) as u16;
        let current = self.scroll as isize + delta;
        self.scroll = current.clamp(0, max as isize) as u16;
    }
}

/// Wrapper around the global song list used by the manager screen.
pub(crate) struct SongManagerScreen {
    pub(crate) songs: Vec<Song>,
    pub(crate) filtered_songs: Vec<Song>,
    pub(crate) filter: Option<String>,
    pub(crate) selected: usize,
}

impl SongManagerScreen {
    pub(crate) fn new(songs: Vec<Song>) -> Self {
        let mut screen = Self {
            filtered_songs: Vec::new(),
            songs,
            filter: None,
            selected: 0,
        };
        screen.apply_filter();
        screen
    }

    pub(crate) fn load(conn: &Connection) -> Result<Self> {
        Ok(Self::new(fetch_all_songs(conn)?))
    }

    /// Substring match on title or artist, case-insensitive. Nothing fancier
    /// than that on purpose.
    fn apply_filter(&mut self) {
        let base: Vec<Song> = if let Some(q) = &self.filter {
            let ql = q.to_lowercase();
            if ql.trim().is_empty() {
                self.songs.clone()
            } else {
                self.songs
                    .iter()
                    .filter(|s| {
                        s.title.to_lowercase().contains(&ql)
                            || s.artist.to_lowercase().contains(&ql)
                    })
                    .cloned()
                    .collect()
            }
        } else {
            self.songs.clone()
        };

        self.filtered_songs = base;
        if self.filtered_songs.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.filtered_songs.len() {
            self.selected = self.filtered_songs.len() - 1;
        }
    }

    pub(crate) fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter;
        self.apply_filter();
    }

    pub(crate) fn set_songs(&mut self, songs: Vec<Song>) {
        self.songs = songs;
        self.apply_filter();
    }

    pub(crate) fn current_song(&self) -> Option<&Song> {
        self.filtered_songs.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        move_within(&mut self.selected, self.filtered_songs.len(), offset);
    }

    pub(crate) fn select_first(&mut self) {
        if !self.filtered_songs.is_empty() {
            self.selected = 0;
        }
    }

    pub(crate) fn select_last(&mut self) {
        if !self.filtered_songs.is_empty() {
            self.selected = self.filtered_songs.len() - 1;
        }
    }
}

/// Backing state for the artist manager.
pub(crate) struct ArtistManagerScreen {
    pub(crate) artists: Vec<Artist>,
    pub(crate) selected: usize,
}

impl ArtistManagerScreen {
    pub(crate) fn new(artists: Vec<Artist>) -> Self {
        Self {
            artists,
            selected: 0,
        }
    }

    pub(crate) fn current_artist(&self) -> Option<&Artist> {
        self.artists.get(self.selected)
    }

    pub(crate) fn set_artists(&mut self, artists: Vec<Artist>) {
        self.artists = artists;
        if self.artists.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.artists.len() {
            self.selected = self.artists.len() - 1;
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        move_within(&mut self.selected, self.artists.len(), offset);
    }
}

/// Backing state for the admin playlist list.
pub(crate) struct PlaylistAdminScreen {
    pub(crate) playlists: Vec<Playlist>,
    pub(crate) selected: usize,
}

impl PlaylistAdminScreen {
    pub(crate) fn new(playlists: Vec<Playlist>) -> Self {
        Self {
            playlists,
            selected: 0,
        }
    }

    pub(crate) fn current_playlist(&self) -> Option<&Playlist> {
        self.playlists.get(self.selected)
    }

    pub(crate) fn set_playlists(&mut self, playlists: Vec<Playlist>) {
        self.playlists = playlists;
        if self.playlists.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.playlists.len() {
            self.selected = self.playlists.len() - 1;
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        move_within(&mut self.selected, self.playlists.len(), offset);
    }
}

/// Which part of the playlist editor has keyboard focus.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum EditorField {
    Title,
    Date,
    Active,
    Songs,
}

/// Full-screen editor for creating or reworking one repertoire: the header
/// fields plus the manually ordered song list.
pub(crate) struct PlaylistEditorScreen {
    /// `None` while creating; `Some` when editing an existing playlist.
    pub(crate) playlist_id: Option<i64>,
    pub(crate) title: String,
    pub(crate) date: String,
    pub(crate) is_active: bool,
    pub(crate) field: EditorField,
    pub(crate) order: SongOrder,
    pub(crate) selected_song: usize,
    pub(crate) dirty: bool,
    pub(crate) error: Option<String>,
}

impl PlaylistEditorScreen {
    /// Start a blank repertoire dated today, matching the defaults the form
    /// has always offered.
    pub(crate) fn new_blank(today: NaiveDate) -> Self {
        Self {
            playlist_id: None,
            title: String::new(),
            date: today.format("%Y-%m-%d").to_string(),
            is_active: true,
            field: EditorField::Title,
            order: SongOrder::default(),
            selected_song: 0,
            dirty: false,
            error: None,
        }
    }

    /// Open an existing playlist with its persisted song order.
    pub(crate) fn load(conn: &Connection, playlist: &Playlist) -> Result<Self> {
        let songs = fetch_songs_for_playlist(conn, playlist.id)?;
        Ok(Self {
            playlist_id: Some(playlist.id),
            title: playlist.title.clone(),
            date: playlist.date.format("%Y-%m-%d").to_string(),
            is_active: playlist.is_active,
            field: EditorField::Title,
            order: SongOrder::new(songs),
            selected_song: 0,
            dirty: false,
            error: None,
        })
    }

    pub(crate) fn next_field(&mut self) {
        self.field = match self.field {
            EditorField::Title => EditorField::Date,
            EditorField::Date => EditorField::Active,
            EditorField::Active => EditorField::Songs,
            EditorField::Songs => EditorField::Title,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.field = match self.field {
            EditorField::Title => EditorField::Songs,
            EditorField::Date => EditorField::Title,
            EditorField::Active => EditorField::Date,
            EditorField::Songs => EditorField::Active,
        };
    }

    /// Type into whichever text field is focused.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.field {
            EditorField::Title => self.title.push(ch),
            EditorField::Date => self.date.push(ch),
            EditorField::Active | EditorField::Songs => return false,
        }
        self.dirty = true;
        self.error = None;
        true
    }

    pub(crate) fn backspace(&mut self) {
        let popped = match self.field {
            EditorField::Title => self.title.pop(),
            EditorField::Date => self.date.pop(),
            EditorField::Active | EditorField::Songs => None,
        };
        if popped.is_some() {
            self.dirty = true;
        }
    }

    pub(crate) fn toggle_active(&mut self) -> bool {
        if self.field != EditorField::Active {
            return false;
        }
        self.is_active = !self.is_active;
        self.dirty = true;
        true
    }

    /// Validate the header fields and project the curated order for saving.
    pub(crate) fn parse_inputs(&self) -> Result<(String, NaiveDate, bool, Vec<i64>)> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow::anyhow!("Playlist title is required."));
        }
        let date = parse_date(&self.date)?;
        Ok((
            title.to_string(),
            date,
            self.is_active,
            self.order.to_id_list(),
        ))
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        move_within(&mut self.selected_song, self.order.len(), offset);
    }

    /// Reorder: swap the selected song with its upper neighbour and keep the
    /// cursor on it.
    pub(crate) fn move_song_up(&mut self) -> bool {
        if self.order.move_up(self.selected_song) {
            self.selected_song -= 1;
            self.dirty = true;
            true
        } else {
            false
        }
    }

    /// Reorder: swap the selected song with its lower neighbour and keep the
    /// cursor on it.
    pub(crate) fn move_song_down(&mut self) -> bool {
        if self.order.move_down(self.selected_song) {
            self.selected_song += 1;
            self.dirty = true;
            true
        } else {
            false
        }
    }

    /// Append a song picked from the search palette.
    pub(crate) fn add_song(&mut self, song: Song) -> bool {
        let added = self.order.add(song);
        if added {
            self.dirty = true;
            self.selected_song = self.order.len() - 1;
        }
        added
    }

    /// Drop the selected song from the order.
    pub(crate) fn remove_selected(&mut self) -> Option<String> {
        let song = self.order.songs().get(self.selected_song)?.clone();
        self.order.remove(song.id);
        if self.selected_song >= self.order.len() && self.selected_song > 0 {
            self.selected_song -= 1;
        }
        self.dirty = true;
        Some(song.display_title())
    }

    pub(crate) fn has_pending_changes(&self) -> bool {
        self.dirty
    }
}

/// Backing state for the song picker palette inside the playlist editor:
/// search by title or artist, pick to append.
pub(crate) struct SongPickerState {
    songs: Vec<Song>,
    pub(crate) filtered_songs: Vec<Song>,
    pub(crate) query: String,
    pub(crate) selected: usize,
}

impl SongPickerState {
    /// Offer every catalog song that is not already part of the order.
    pub(crate) fn load(conn: &Connection, exclude: &SongOrder) -> Result<Self> {
        let songs: Vec<Song> = fetch_all_songs(conn)?
            .into_iter()
            .filter(|song| !exclude.contains(song.id))
            .collect();
        let mut state = Self {
            filtered_songs: Vec::new(),
            songs,
            query: String::new(),
            selected: 0,
        };
        state.apply_filter();
        Ok(state)
    }

    fn apply_filter(&mut self) {
        let ql = self.query.to_lowercase();
        if ql.trim().is_empty() {
            self.filtered_songs = self.songs.clone();
        } else {
            self.filtered_songs = self
                .songs
                .iter()
                .filter(|s| {
                    s.title.to_lowercase().contains(&ql) || s.artist.to_lowercase().contains(&ql)
                })
                .cloned()
                .collect();
        }
        if self.filtered_songs.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.filtered_songs.len() {
            self.selected = self.filtered_songs.len() - 1;
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) {
        if !ch.is_control() {
            self.query.push(ch);
            self.apply_filter();
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.query.pop();
        self.apply_filter();
    }

    pub(crate) fn current_song(&self) -> Option<&Song> {
        self.filtered_songs.get(self.selected)
    }

    /// Take the selected song out of the candidate pool so it cannot be
    /// offered twice in the same session.
    pub(crate) fn take_current(&mut self) -> Option<Song> {
        let song = self.filtered_songs.get(self.selected)?.clone();
        self.songs.retain(|candidate| candidate.id != song.id);
        self.apply_filter();
        Some(song)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        move_within(&mut self.selected, self.filtered_songs.len(), offset);
    }
}

/// Backing state for the superadmin's user manager.
pub(crate) struct UserManagerScreen {
    pub(crate) users: Vec<User>,
    pub(crate) selected: usize,
}

impl UserManagerScreen {
    pub(crate) fn new(users: Vec<User>) -> Self {
        Self { users, selected: 0 }
    }

    pub(crate) fn current_user(&self) -> Option<&User> {
        self.users.get(self.selected)
    }

    pub(crate) fn set_users(&mut self, users: Vec<User>) {
        self.users = users;
        if self.users.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.users.len() {
            self.selected = self.users.len() - 1;
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        move_within(&mut self.selected, self.users.len(), offset);
    }
}

/// Clamp-style selection movement shared by every list screen.
fn move_within(selected: &mut usize, len: usize, offset: isize) {
    if len == 0 {
        *selected = 0;
        return;
    }
    let max = len as isize - 1;
    let next = (*selected as isize + offset).clamp(0, max);
    *selected = next as usize;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn song(id: i64, title: &str, artist: &str) -> Song {
        Song {
            id,
            title: title.to_string(),
            artist_id: 1,
            artist: artist.to_string(),
            lyrics: "la".to_string(),
            tone: None,
            url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn manager_filter_matches_title_or_artist() {
        let mut screen = SongManagerScreen::new(vec![
            song(1, "Bendice a Israel", "Marcos"),
            song(2, "Aleluya", "Ana"),
        ]);
        screen.set_filter(Some("marc".to_string()));
        assert_eq!(screen.filtered_songs.len(), 1);
        assert_eq!(screen.filtered_songs[0].id, 1);

        screen.set_filter(Some("aleluya".to_string()));
        assert_eq!(screen.filtered_songs.len(), 1);
        assert_eq!(screen.filtered_songs[0].id, 2);

        screen.set_filter(None);
        assert_eq!(screen.filtered_songs.len(), 2);
    }

    #[test]
    fn editor_reorder_keeps_cursor_on_the_moved_song() {
        let today: NaiveDate = "2025-06-01".parse().unwrap();
        let mut editor = PlaylistEditorScreen::new_blank(today);
        editor.add_song(song(1, "Uno", "A"));
        editor.add_song(song(2, "Dos", "A"));
        editor.add_song(song(3, "Tres", "A"));

        editor.selected_song = 2;
        assert!(editor.move_song_up());
        assert_eq!(editor.selected_song, 1);
        assert_eq!(editor.order.to_id_list(), vec![1, 3, 2]);

        editor.selected_song = 0;
        assert!(!editor.move_song_up());
        editor.selected_song = 2;
        assert!(!editor.move_song_down());
    }

    #[test]
    fn editor_tracks_pending_changes() {
        let today: NaiveDate = "2025-06-01".parse().unwrap();
        let mut editor = PlaylistEditorScreen::new_blank(today);
        assert!(!editor.has_pending_changes());
        editor.add_song(song(1, "Uno", "A"));
        assert!(editor.has_pending_changes());
    }

    #[test]
    fn editor_add_is_idempotent_per_song() {
        let today: NaiveDate = "2025-06-01".parse().unwrap();
        let mut editor = PlaylistEditorScreen::new_blank(today);
        assert!(editor.add_song(song(1, "Uno", "A")));
        assert!(!editor.add_song(song(1, "Uno", "A")));
        assert_eq!(editor.order.len(), 1);
    }

    #[test]
    fn lyric_screen_steps_stop_at_the_ends() {
        let songs = vec![song(1, "Uno", "A"), song(2, "Dos", "A")];
        let mut screen = LyricScreen::new(LyricOrigin::Manager, songs, 0);
        assert!(!screen.step(-1));
        assert!(screen.step(1));
        assert!(!screen.step(1));
        assert_eq!(screen.current_song().unwrap().id, 2);
    }
}
