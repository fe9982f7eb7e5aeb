use std::mem;

use anyhow::Result;
use chrono::Utc;
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use rusqlite::Connection;

use crate::auth::{permits, Action};
use crate::db::{
    authenticate, create_artist, create_playlist, create_song, create_user, delete_artist,
    delete_playlist, delete_song, delete_user, fetch_active_playlists, fetch_artist_names,
    fetch_artists, fetch_playlists, find_or_create_artist, update_artist, update_playlist,
    update_profile, update_song,
};
use crate::models::{Playlist, Song, User};
use crate::setlist::order_for_display;

use super::forms::{
    ConfirmArtistDelete, ConfirmEditorExit, ConfirmExitChoice, ConfirmPlaylistDelete,
    ConfirmSongDelete, ConfirmUserDelete, ArtistForm, LoginField, LoginForm, ProfileForm,
    SongField, SongForm, UserField, UserForm,
};
use super::helpers::{centered_rect, format_date, lyric_lines, surface_error};
use super::screens::{
    ArtistManagerScreen, EditorField, HomeScreen, LyricOrigin, LyricScreen, PlaylistAdminScreen,
    PlaylistEditorScreen, PlaylistViewScreen, SongManagerScreen, SongPickerState,
    UserManagerScreen,
};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height allocation per song card in list-style views.
const SONG_CARD_HEIGHT: u16 = 5;

/// High-level navigation states. Keeping this explicit makes it easy to reason
/// about which rendering path runs and what keyboard shortcuts should do.
enum Screen {
    /// Public landing: active repertoires in temporal order.
    Home(HomeScreen),
    /// Public view of one repertoire's songs.
    PlaylistView(PlaylistViewScreen),
    /// Reading screen with the chord overlay toggle.
    Lyrics(LyricScreen),
    /// Admin: the whole song catalog.
    Songs(SongManagerScreen),
    /// Admin: artist list with reference counts.
    Artists(ArtistManagerScreen),
    /// Admin: every repertoire, drafts included.
    Playlists(PlaylistAdminScreen),
    /// Admin: one repertoire's header fields and ordered song list.
    PlaylistEditor(PlaylistEditorScreen),
    /// Superadmin: account management.
    Users(UserManagerScreen),
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    LoggingIn(LoginForm),
    AddingSong(SongForm),
    EditingSong {
        song_id: i64,
        form: SongForm,
    },
    ConfirmSongDelete(ConfirmSongDelete),
    AddingArtist(ArtistForm),
    EditingArtist {
        artist_id: i64,
        form: ArtistForm,
    },
    ConfirmArtistDelete(ConfirmArtistDelete),
    ConfirmPlaylistDelete(ConfirmPlaylistDelete),
    PickingSong(SongPickerState),
    ConfirmEditorExit(ConfirmEditorExit),
    AddingUser(UserForm),
    ConfirmUserDelete(ConfirmUserDelete),
    EditingProfile(ProfileForm),
    Searching(SearchState),
}

/// State for an active inline search over the song manager.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    conn: Connection,
    current_user: Option<User>,
    artist_names: Vec<String>,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    saved_search: Option<SearchState>,
}

impl App {
    /// Build the initial state on the public landing screen. A login banner
    /// message (for example about freshly seeded credentials) can be shown
    /// right away via `notice`.
    pub fn new(conn: Connection, artist_names: Vec<String>, notice: Option<String>) -> Result<Self> {
        let home = HomeScreen::load(&conn)?;
        let status = notice.map(|text| StatusMessage {
            text,
            kind: StatusKind::Info,
        });
        Ok(Self {
            conn,
            current_user: None,
            artist_names,
            screen: Screen::Home(home),
            mode: Mode::Normal,
            status,
            saved_search: None,
        })
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::LoggingIn(form) => self.handle_login(code, form)?,
            Mode::AddingSong(form) => self.handle_song_form(code, None, form)?,
            Mode::EditingSong { song_id, form } => {
                self.handle_song_form(code, Some(song_id), form)?
            }
            Mode::ConfirmSongDelete(confirm) => self.handle_confirm_song_delete(code, confirm)?,
            Mode::AddingArtist(form) => self.handle_artist_form(code, None, form)?,
            Mode::EditingArtist { artist_id, form } => {
                self.handle_artist_form(code, Some(artist_id), form)?
            }
            Mode::ConfirmArtistDelete(confirm) => {
                self.handle_confirm_artist_delete(code, confirm)?
            }
            Mode::ConfirmPlaylistDelete(confirm) => {
                self.handle_confirm_playlist_delete(code, confirm)?
            }
            Mode::PickingSong(state) => self.handle_pick_song(code, state)?,
            Mode::ConfirmEditorExit(confirm) => {
                self.handle_confirm_editor_exit(code, confirm, &mut exit)?
            }
            Mode::AddingUser(form) => self.handle_user_form(code, form)?,
            Mode::ConfirmUserDelete(confirm) => self.handle_confirm_user_delete(code, confirm)?,
            Mode::EditingProfile(form) => self.handle_profile_form(code, form)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Home(ref mut home) => {
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        *exit = true;
                    }
                    KeyCode::Up => home.move_selection(-1),
                    KeyCode::Down => home.move_selection(1),
                    KeyCode::PageUp => home.move_selection(-5),
                    KeyCode::PageDown => home.move_selection(5),
                    KeyCode::Enter => {
                        if let Some(playlist) = home.current_playlist().cloned() {
                            self.clear_status();
                            self.open_playlist_view(playlist)?;
                        } else {
                            self.set_status("No repertoire selected.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('a') | KeyCode::Char('A') => {
                        self.clear_status();
                        if self.current_user.is_some() {
                            self.open_song_manager()?;
                        } else {
                            return Ok(Mode::LoggingIn(LoginForm::default()));
                        }
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::PlaylistView(ref mut view) => {
                match code {
                    KeyCode::Char('q') => {
                        *exit = true;
                    }
                    KeyCode::Esc => {
                        self.clear_status();
                        self.go_home()?;
                    }
                    KeyCode::Up => view.move_selection(-1),
                    KeyCode::Down => view.move_selection(1),
                    KeyCode::PageUp => view.move_selection(-5),
                    KeyCode::PageDown => view.move_selection(5),
                    KeyCode::Home => view.select_first(),
                    KeyCode::End => view.select_last(),
                    KeyCode::Tab => {
                        self.clear_status();
                        self.open_relative_playlist(1)?;
                    }
                    KeyCode::BackTab => {
                        self.clear_status();
                        self.open_relative_playlist(-1)?;
                    }
                    KeyCode::Enter => {
                        if view.current_song().is_some() {
                            let playlist = view.playlist.clone();
                            let songs = view.songs.clone();
                            let index = view.selected;
                            self.clear_status();
                            self.screen = Screen::Lyrics(LyricScreen::new(
                                LyricOrigin::Playlist(playlist),
                                songs,
                                index,
                            ));
                        } else {
                            self.set_status("No song selected.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('o') | KeyCode::Char('O') => {
                        let song = view.current_song().cloned();
                        self.open_song_url(song.as_ref());
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::Lyrics(ref mut lyric) => {
                match code {
                    KeyCode::Char('q') => {
                        *exit = true;
                    }
                    KeyCode::Esc => {
                        self.clear_status();
                        self.close_lyrics()?;
                    }
                    KeyCode::Char('c') | KeyCode::Char('C') => {
                        lyric.toggle_chords();
                    }
                    KeyCode::Left => {
                        if !lyric.step(-1) {
                            self.set_status("Already at the first song.", StatusKind::Info);
                        }
                    }
                    KeyCode::Right => {
                        if !lyric.step(1) {
                            self.set_status("Already at the last song.", StatusKind::Info);
                        }
                    }
                    KeyCode::Up => lyric.scroll_by(-1),
                    KeyCode::Down => lyric.scroll_by(1),
                    KeyCode::PageUp => lyric.scroll_by(-10),
                    KeyCode::PageDown => lyric.scroll_by(10),
                    KeyCode::Char('o') | KeyCode::Char('O') => {
                        let song = lyric.current_song().cloned();
                        self.open_song_url(song.as_ref());
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::Songs(ref mut manager) => {
                match code {
                    KeyCode::Char('q') => {
                        *exit = true;
                    }
                    KeyCode::Esc => {
                        self.clear_status();
                        self.go_home()?;
                    }
                    KeyCode::Up => manager.move_selection(-1),
                    KeyCode::Down => manager.move_selection(1),
                    KeyCode::PageUp => manager.move_selection(-5),
                    KeyCode::PageDown => manager.move_selection(5),
                    KeyCode::Home => manager.select_first(),
                    KeyCode::End => manager.select_last(),
                    KeyCode::Char('f') => {
                        return Ok(Mode::Searching(SearchState {
                            query: String::new(),
                        }));
                    }
                    KeyCode::Enter => {
                        if let Some(song) = manager.current_song().cloned() {
                            self.clear_status();
                            self.screen = Screen::Lyrics(LyricScreen::new(
                                LyricOrigin::Manager,
                                vec![song],
                                0,
                            ));
                        } else {
                            self.set_status("No song selected.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('o') | KeyCode::Char('O') => {
                        let song = manager.current_song().cloned();
                        self.open_song_url(song.as_ref());
                    }
                    KeyCode::Char('+') => {
                        self.clear_status();
                        return Ok(Mode::AddingSong(SongForm::default()));
                    }
                    KeyCode::Char('-') => {
                        if let Some(song) = manager.current_song().cloned() {
                            self.clear_status();
                            return Ok(Mode::ConfirmSongDelete(ConfirmSongDelete { song }));
                        } else {
                            self.set_status("No song selected to delete.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('e') | KeyCode::Char('E') => {
                        if let Some(song) = manager.current_song().cloned() {
                            self.clear_status();
                            return Ok(Mode::EditingSong {
                                song_id: song.id,
                                form: SongForm::from_song(&song),
                            });
                        } else {
                            self.set_status("No song selected to edit.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        self.clear_status();
                        self.open_playlist_admin()?;
                    }
                    KeyCode::Char('a') | KeyCode::Char('A') => {
                        self.clear_status();
                        self.open_artist_manager()?;
                    }
                    KeyCode::Char('u') | KeyCode::Char('U') => {
                        self.clear_status();
                        self.open_user_manager()?;
                    }
                    KeyCode::Char('p') | KeyCode::Char('P') => {
                        return Ok(self.open_profile());
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::Artists(ref mut artists) => {
                match code {
                    KeyCode::Char('q') => {
                        *exit = true;
                    }
                    KeyCode::Esc => {
                        self.clear_status();
                        self.go_home()?;
                    }
                    KeyCode::Up => artists.move_selection(-1),
                    KeyCode::Down => artists.move_selection(1),
                    KeyCode::PageUp => artists.move_selection(-5),
                    KeyCode::PageDown => artists.move_selection(5),
                    KeyCode::Char('+') => {
                        self.clear_status();
                        return Ok(Mode::AddingArtist(ArtistForm::default()));
                    }
                    KeyCode::Char('-') => {
                        if let Some(artist) = artists.current_artist().cloned() {
                            self.clear_status();
                            return Ok(Mode::ConfirmArtistDelete(ConfirmArtistDelete { artist }));
                        } else {
                            self.set_status("No artist selected to delete.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('e') | KeyCode::Char('E') => {
                        if let Some(artist) = artists.current_artist().cloned() {
                            self.clear_status();
                            return Ok(Mode::EditingArtist {
                                artist_id: artist.id,
                                form: ArtistForm::from_artist(&artist),
                            });
                        } else {
                            self.set_status("No artist selected to edit.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('s') | KeyCode::Char('S') => {
                        self.clear_status();
                        self.open_song_manager()?;
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        self.clear_status();
                        self.open_playlist_admin()?;
                    }
                    KeyCode::Char('u') | KeyCode::Char('U') => {
                        self.clear_status();
                        self.open_user_manager()?;
                    }
                    KeyCode::Char('p') | KeyCode::Char('P') => {
                        return Ok(self.open_profile());
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::Playlists(ref mut playlists) => {
                match code {
                    KeyCode::Char('q') => {
                        *exit = true;
                    }
                    KeyCode::Esc => {
                        self.clear_status();
                        self.go_home()?;
                    }
                    KeyCode::Up => playlists.move_selection(-1),
                    KeyCode::Down => playlists.move_selection(1),
                    KeyCode::PageUp => playlists.move_selection(-5),
                    KeyCode::PageDown => playlists.move_selection(5),
                    KeyCode::Char('+') => {
                        self.clear_status();
                        self.screen = Screen::PlaylistEditor(PlaylistEditorScreen::new_blank(
                            Utc::now().date_naive(),
                        ));
                    }
                    KeyCode::Enter | KeyCode::Char('e') | KeyCode::Char('E') => {
                        if let Some(playlist) = playlists.current_playlist().cloned() {
                            self.clear_status();
                            let editor = PlaylistEditorScreen::load(&self.conn, &playlist)?;
                            self.screen = Screen::PlaylistEditor(editor);
                        } else {
                            self.set_status("No repertoire selected.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('-') => {
                        if let Some(playlist) = playlists.current_playlist().cloned() {
                            self.clear_status();
                            return Ok(Mode::ConfirmPlaylistDelete(ConfirmPlaylistDelete {
                                playlist,
                            }));
                        } else {
                            self.set_status("No repertoire selected to delete.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('s') | KeyCode::Char('S') => {
                        self.clear_status();
                        self.open_song_manager()?;
                    }
                    KeyCode::Char('a') | KeyCode::Char('A') => {
                        self.clear_status();
                        self.open_artist_manager()?;
                    }
                    KeyCode::Char('u') | KeyCode::Char('U') => {
                        self.clear_status();
                        self.open_user_manager()?;
                    }
                    KeyCode::Char('p') | KeyCode::Char('P') => {
                        return Ok(self.open_profile());
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::PlaylistEditor(ref mut editor) => {
                if editor.field == EditorField::Songs {
                    match code {
                        KeyCode::Char('q') => {
                            if editor.has_pending_changes() {
                                return Ok(Mode::ConfirmEditorExit(ConfirmEditorExit::new(true)));
                            }
                            *exit = true;
                        }
                        KeyCode::Esc => {
                            if editor.has_pending_changes() {
                                return Ok(Mode::ConfirmEditorExit(ConfirmEditorExit::new(false)));
                            }
                            self.clear_status();
                            self.open_playlist_admin()?;
                        }
                        KeyCode::Tab => editor.next_field(),
                        KeyCode::BackTab => editor.previous_field(),
                        KeyCode::Up => editor.move_selection(-1),
                        KeyCode::Down => editor.move_selection(1),
                        KeyCode::PageUp => editor.move_selection(-5),
                        KeyCode::PageDown => editor.move_selection(5),
                        KeyCode::Char('u') | KeyCode::Char('U') => {
                            editor.move_song_up();
                        }
                        KeyCode::Char('d') | KeyCode::Char('D') => {
                            editor.move_song_down();
                        }
                        KeyCode::Char('+') => {
                            let picker = SongPickerState::load(&self.conn, &editor.order)?;
                            self.clear_status();
                            return Ok(Mode::PickingSong(picker));
                        }
                        KeyCode::Char('-') => {
                            if let Some(title) = editor.remove_selected() {
                                self.set_status(
                                    format!("Removed {title} from the repertoire."),
                                    StatusKind::Info,
                                );
                            } else {
                                self.set_status("No song selected to remove.", StatusKind::Error);
                            }
                        }
                        KeyCode::Enter => return self.save_editor(),
                        _ => {}
                    }
                } else {
                    match code {
                        KeyCode::Esc => {
                            if editor.has_pending_changes() {
                                return Ok(Mode::ConfirmEditorExit(ConfirmEditorExit::new(false)));
                            }
                            self.clear_status();
                            self.open_playlist_admin()?;
                        }
                        KeyCode::Tab => editor.next_field(),
                        KeyCode::BackTab => editor.previous_field(),
                        KeyCode::Backspace => editor.backspace(),
                        KeyCode::Enter => return self.save_editor(),
                        KeyCode::Left | KeyCode::Right => {
                            editor.toggle_active();
                        }
                        KeyCode::Char(' ') if editor.field == EditorField::Active => {
                            editor.toggle_active();
                        }
                        KeyCode::Char(ch) => {
                            editor.push_char(ch);
                        }
                        _ => {}
                    }
                }
                Ok(Mode::Normal)
            }
            Screen::Users(ref mut users) => {
                match code {
                    KeyCode::Char('q') => {
                        *exit = true;
                    }
                    KeyCode::Esc => {
                        self.clear_status();
                        self.go_home()?;
                    }
                    KeyCode::Up => users.move_selection(-1),
                    KeyCode::Down => users.move_selection(1),
                    KeyCode::PageUp => users.move_selection(-5),
                    KeyCode::PageDown => users.move_selection(5),
                    KeyCode::Char('+') => {
                        self.clear_status();
                        return Ok(Mode::AddingUser(UserForm::default()));
                    }
                    KeyCode::Char('-') => {
                        if let Some(user) = users.current_user().cloned() {
                            self.clear_status();
                            return Ok(Mode::ConfirmUserDelete(ConfirmUserDelete { user }));
                        } else {
                            self.set_status("No account selected to delete.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('s') | KeyCode::Char('S') => {
                        self.clear_status();
                        self.open_song_manager()?;
                    }
                    KeyCode::Char('a') | KeyCode::Char('A') => {
                        self.clear_status();
                        self.open_artist_manager()?;
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        self.clear_status();
                        self.open_playlist_admin()?;
                    }
                    KeyCode::Char('p') | KeyCode::Char('P') => {
                        return Ok(self.open_profile());
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
        }
    }

    fn handle_login(&mut self, code: KeyCode, mut form: LoginForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Login cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Tab | KeyCode::BackTab => {
                form.toggle_field();
                Ok(Mode::LoggingIn(form))
            }
            KeyCode::Backspace => {
                form.backspace();
                Ok(Mode::LoggingIn(form))
            }
            KeyCode::Enter => match form
                .parse_inputs()
                .and_then(|(email, password)| authenticate(&self.conn, &email, &password))
            {
                Ok(user) => {
                    let email = user.email.clone();
                    self.current_user = Some(user);
                    self.open_song_manager()?;
                    self.set_status(format!("Signed in as {email}."), StatusKind::Info);
                    Ok(Mode::Normal)
                }
                Err(err) => {
                    form.error = Some(surface_error(&err));
                    Ok(Mode::LoggingIn(form))
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
                Ok(Mode::LoggingIn(form))
            }
            _ => Ok(Mode::LoggingIn(form)),
        }
    }

    /// Shared handler for the create and edit variants of the song form.
    /// Enter inserts a line break while the lyrics field is focused; the form
    /// is saved with Enter on any other field, or Ctrl+S anywhere.
    fn handle_song_form(
        &mut self,
        code: KeyCode,
        song_id: Option<i64>,
        mut form: SongForm,
    ) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                if !form.cancel_autocomplete() {
                    self.set_status(
                        if song_id.is_some() {
                            "Edit cancelled."
                        } else {
                            "Add song cancelled."
                        },
                        StatusKind::Info,
                    );
                    keep_open = false;
                }
            }
            KeyCode::Tab => {
                let consumed = form.has_active_suggestion() && form.accept_suggestion();
                if !consumed {
                    form.toggle_field();
                }
                form.update_suggestion(&self.artist_names);
            }
            KeyCode::BackTab => {
                form.toggle_field();
                form.update_suggestion(&self.artist_names);
            }
            KeyCode::Backspace => {
                form.backspace();
                form.update_suggestion(&self.artist_names);
            }
            KeyCode::Enter => {
                if !form.push_newline() {
                    match self.save_song(song_id, &form) {
                        Ok(_) => keep_open = false,
                        Err(err) => {
                            let message = surface_error(&err);
                            form.error = Some(message.clone());
                            self.set_status(message, StatusKind::Error);
                        }
                    }
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                    form.update_suggestion(&self.artist_names);
                }
            }
            _ => {}
        }

        if keep_open {
            match song_id {
                Some(song_id) => Ok(Mode::EditingSong { song_id, form }),
                None => Ok(Mode::AddingSong(form)),
            }
        } else if let Some(state) = self.saved_search.take() {
            Ok(Mode::Searching(state))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_song_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmSongDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match delete_song(&self.conn, confirm.song.id) {
                    Ok(_) => {
                        self.refresh_song_manager()?;
                        self.set_status("Song deleted.", StatusKind::Info);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        let message = surface_error(&err);
                        self.set_status(message, StatusKind::Error);
                        Ok(Mode::ConfirmSongDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmSongDelete(confirm)),
        }
    }

    /// Shared handler for the create and rename variants of the artist form.
    fn handle_artist_form(
        &mut self,
        code: KeyCode,
        artist_id: Option<i64>,
        mut form: ArtistForm,
    ) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status(
                    if artist_id.is_some() {
                        "Rename cancelled."
                    } else {
                        "Add artist cancelled."
                    },
                    StatusKind::Info,
                );
                keep_open = false;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let saved = form.parse_inputs().and_then(|name| match artist_id {
                    Some(id) => update_artist(&self.conn, id, &name).map(|_| name),
                    None => create_artist(&self.conn, &name).map(|artist| artist.name),
                });
                match saved {
                    Ok(name) => {
                        self.refresh_artist_manager()?;
                        self.refresh_artist_names()?;
                        self.refresh_song_manager()?;
                        self.set_status(format!("Saved artist {name}."), StatusKind::Info);
                        keep_open = false;
                    }
                    Err(err) => {
                        let message = surface_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            match artist_id {
                Some(artist_id) => Ok(Mode::EditingArtist { artist_id, form }),
                None => Ok(Mode::AddingArtist(form)),
            }
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_artist_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmArtistDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match delete_artist(&self.conn, confirm.artist.id) {
                    Ok(_) => {
                        self.refresh_artist_manager()?;
                        self.refresh_artist_names()?;
                        self.set_status("Artist deleted.", StatusKind::Info);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        // Typically the referential-integrity refusal with
                        // the linked-song count.
                        let message = surface_error(&err);
                        self.set_status(message, StatusKind::Error);
                        Ok(Mode::ConfirmArtistDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmArtistDelete(confirm)),
        }
    }

    fn handle_confirm_playlist_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmPlaylistDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match delete_playlist(&self.conn, confirm.playlist.id) {
                    Ok(_) => {
                        self.refresh_playlist_admin()?;
                        self.set_status("Repertoire deleted.", StatusKind::Info);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        let message = surface_error(&err);
                        self.set_status(message, StatusKind::Error);
                        Ok(Mode::ConfirmPlaylistDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmPlaylistDelete(confirm)),
        }
    }

    /// Search-and-add palette inside the playlist editor. Enter appends the
    /// highlighted song and keeps the palette open so several songs can be
    /// added in a row.
    fn handle_pick_song(&mut self, code: KeyCode, mut state: SongPickerState) -> Result<Mode> {
        match code {
            KeyCode::Esc => Ok(Mode::Normal),
            KeyCode::Up => {
                state.move_selection(-1);
                Ok(Mode::PickingSong(state))
            }
            KeyCode::Down => {
                state.move_selection(1);
                Ok(Mode::PickingSong(state))
            }
            KeyCode::PageUp => {
                state.move_selection(-5);
                Ok(Mode::PickingSong(state))
            }
            KeyCode::PageDown => {
                state.move_selection(5);
                Ok(Mode::PickingSong(state))
            }
            KeyCode::Backspace => {
                state.backspace();
                Ok(Mode::PickingSong(state))
            }
            KeyCode::Enter => {
                if let Some(song) = state.take_current() {
                    let title = song.display_title();
                    let added = match &mut self.screen {
                        Screen::PlaylistEditor(editor) => editor.add_song(song),
                        _ => false,
                    };
                    if added {
                        self.set_status(format!("Added {title}."), StatusKind::Info);
                    } else {
                        self.set_status(
                            "Song is already in this repertoire.",
                            StatusKind::Error,
                        );
                    }
                }
                Ok(Mode::PickingSong(state))
            }
            KeyCode::Char(ch) => {
                state.push_char(ch);
                Ok(Mode::PickingSong(state))
            }
            _ => Ok(Mode::PickingSong(state)),
        }
    }

    fn handle_confirm_editor_exit(
        &mut self,
        code: KeyCode,
        mut confirm: ConfirmEditorExit,
        exit: &mut bool,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc => Ok(Mode::Normal),
            KeyCode::Left => {
                confirm.previous();
                Ok(Mode::ConfirmEditorExit(confirm))
            }
            KeyCode::Right | KeyCode::Tab => {
                confirm.next();
                Ok(Mode::ConfirmEditorExit(confirm))
            }
            KeyCode::Enter => match confirm.selection {
                ConfirmExitChoice::Save => {
                    let mode = self.save_editor()?;
                    // A failed save leaves the editor on screen with the
                    // error; only a successful one may quit the app.
                    if confirm.exit_app && matches!(self.screen, Screen::Playlists(_)) {
                        *exit = true;
                    }
                    Ok(mode)
                }
                ConfirmExitChoice::Discard => {
                    if confirm.exit_app {
                        *exit = true;
                    } else {
                        self.open_playlist_admin()?;
                        self.set_status("Changes discarded.", StatusKind::Info);
                    }
                    Ok(Mode::Normal)
                }
                ConfirmExitChoice::Cancel => Ok(Mode::Normal),
            },
            _ => Ok(Mode::ConfirmEditorExit(confirm)),
        }
    }

    fn handle_user_form(&mut self, code: KeyCode, mut form: UserForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add account cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Left | KeyCode::Right => {
                form.toggle_role();
            }
            KeyCode::Enter => {
                let saved = form.parse_inputs().and_then(|(email, password, role)| {
                    create_user(&self.conn, &email, &password, role)
                });
                match saved {
                    Ok(user) => {
                        self.refresh_user_manager()?;
                        self.set_status(
                            format!("Created {} account for {}.", user.role, user.email),
                            StatusKind::Info,
                        );
                        keep_open = false;
                    }
                    Err(err) => {
                        let message = surface_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            KeyCode::Char(' ') if form.active == UserField::Role => {
                form.toggle_role();
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingUser(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_user_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmUserDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let current_id = self.current_user.as_ref().map(|user| user.id).unwrap_or(0);
                match delete_user(&self.conn, current_id, confirm.user.id) {
                    Ok(_) => {
                        self.refresh_user_manager()?;
                        self.set_status(
                            format!("Deleted account {}.", confirm.user.email),
                            StatusKind::Info,
                        );
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        let message = surface_error(&err);
                        self.set_status(message, StatusKind::Error);
                        Ok(Mode::ConfirmUserDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmUserDelete(confirm)),
        }
    }

    fn handle_profile_form(&mut self, code: KeyCode, mut form: ProfileForm) -> Result<Mode> {
        let current = match &self.current_user {
            Some(user) => user.clone(),
            None => return Ok(Mode::Normal),
        };

        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Profile unchanged.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let saved = form.parse_inputs(&current.email).and_then(|(email, password)| {
                    update_profile(&self.conn, current.id, email.as_deref(), password.as_deref())
                });
                match saved {
                    Ok(user) => {
                        self.set_status(
                            format!("Profile updated for {}.", user.email),
                            StatusKind::Info,
                        );
                        self.current_user = Some(user);
                        keep_open = false;
                    }
                    Err(err) => {
                        let message = surface_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::EditingProfile(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        let manager = match &mut self.screen {
            Screen::Songs(manager) => manager,
            _ => return Ok(Mode::Normal),
        };

        match code {
            KeyCode::Esc => {
                manager.set_filter(None);
                return Ok(Mode::Normal);
            }
            KeyCode::Up => {
                manager.move_selection(-1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Down => {
                manager.move_selection(1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::PageUp => {
                manager.move_selection(-5);
                return Ok(Mode::Searching(state));
            }
            KeyCode::PageDown => {
                manager.move_selection(5);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Home => {
                manager.select_first();
                return Ok(Mode::Searching(state));
            }
            KeyCode::End => {
                manager.select_last();
                return Ok(Mode::Searching(state));
            }
            KeyCode::Enter => {
                if let Some(song) = manager.current_song().cloned() {
                    manager.set_filter(None);
                    self.clear_status();
                    self.screen =
                        Screen::Lyrics(LyricScreen::new(LyricOrigin::Manager, vec![song], 0));
                    return Ok(Mode::Normal);
                }
                return Ok(Mode::Searching(state));
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) => {
                if ch.is_control() {
                    // Ctrl+E arrives as a control character on some
                    // terminals; treat it like the dedicated handler.
                    if ch == '\u{5}' {
                        if let Some(song) = manager.current_song().cloned() {
                            self.saved_search = Some(state);
                            return Ok(Mode::EditingSong {
                                song_id: song.id,
                                form: SongForm::from_song(&song),
                            });
                        }
                        self.set_status("No song selected to edit.", StatusKind::Error);
                        return Ok(Mode::Searching(state));
                    }
                } else {
                    state.query.push(ch);
                }
            }
            _ => {}
        }

        let manager = match &mut self.screen {
            Screen::Songs(manager) => manager,
            _ => return Ok(Mode::Normal),
        };
        if state.query.trim().is_empty() {
            manager.set_filter(None);
        } else {
            manager.set_filter(Some(state.query.clone()));
        }

        Ok(Mode::Searching(state))
    }

    /// Ctrl+S saves whichever form is open: the song form, or the playlist
    /// editor when no modal is in the way.
    pub(crate) fn handle_ctrl_s(&mut self) -> Result<()> {
        let mode = mem::replace(&mut self.mode, Mode::Normal);
        self.mode = match mode {
            Mode::AddingSong(mut form) => match self.save_song(None, &form) {
                Ok(_) => Mode::Normal,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                    Mode::AddingSong(form)
                }
            },
            Mode::EditingSong { song_id, mut form } => {
                match self.save_song(Some(song_id), &form) {
                    Ok(_) => Mode::Normal,
                    Err(err) => {
                        let message = surface_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                        Mode::EditingSong { song_id, form }
                    }
                }
            }
            Mode::Normal if matches!(self.screen, Screen::PlaylistEditor(_)) => {
                self.save_editor()?
            }
            other => other,
        };
        Ok(())
    }

    /// Ctrl+E edits the selected song without leaving an active search; the
    /// search state is restored once the form closes.
    pub(crate) fn handle_ctrl_e(&mut self) -> Result<()> {
        if !matches!(self.mode, Mode::Searching(_)) {
            return Ok(());
        }

        let previous = mem::replace(&mut self.mode, Mode::Normal);
        if let Mode::Searching(state) = previous {
            self.saved_search = Some(state);
        }

        if let Screen::Songs(manager) = &mut self.screen {
            if let Some(song) = manager.current_song().cloned() {
                self.mode = Mode::EditingSong {
                    song_id: song.id,
                    form: SongForm::from_song(&song),
                };
            } else {
                self.set_status("No song selected to edit.", StatusKind::Error);
            }
        }

        Ok(())
    }

    // ---- shared actions -------------------------------------------------

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn go_home(&mut self) -> Result<()> {
        self.screen = Screen::Home(HomeScreen::load(&self.conn)?);
        Ok(())
    }

    fn open_playlist_view(&mut self, playlist: Playlist) -> Result<()> {
        self.screen = Screen::PlaylistView(PlaylistViewScreen::load(&self.conn, playlist)?);
        Ok(())
    }

    /// Step to the neighbouring active repertoire in display order, wrapping
    /// at the ends.
    fn open_relative_playlist(&mut self, offset: isize) -> Result<()> {
        let current_id = match &self.screen {
            Screen::PlaylistView(view) => view.playlist.id,
            _ => return Ok(()),
        };

        let mut ordered = fetch_active_playlists(&self.conn)?;
        order_for_display(&mut ordered, Utc::now().date_naive());
        if ordered.is_empty() {
            return self.go_home();
        }

        let len = ordered.len() as isize;
        let current_pos = ordered
            .iter()
            .position(|playlist| playlist.id == current_id)
            .unwrap_or(0);
        let new_pos = ((current_pos as isize + offset).rem_euclid(len)) as usize;
        let target = ordered[new_pos].clone();
        self.open_playlist_view(target)
    }

    /// Esc from the reading screen returns to wherever it was opened from.
    fn close_lyrics(&mut self) -> Result<()> {
        let origin = match &mut self.screen {
            Screen::Lyrics(lyric) => mem::replace(&mut lyric.origin, LyricOrigin::Manager),
            _ => return Ok(()),
        };
        match origin {
            LyricOrigin::Playlist(playlist) => self.open_playlist_view(playlist),
            LyricOrigin::Manager => self.open_song_manager(),
        }
    }

    /// Enter the admin area. The login gate itself is a mode the handlers
    /// return; these helpers only refuse quietly when somehow reached while
    /// signed out.
    fn open_song_manager(&mut self) -> Result<()> {
        if self.current_user.is_none() {
            self.set_status("Sign in first.", StatusKind::Error);
            return Ok(());
        }
        self.screen = Screen::Songs(SongManagerScreen::load(&self.conn)?);
        Ok(())
    }

    fn open_artist_manager(&mut self) -> Result<()> {
        if self.current_user.is_none() {
            self.set_status("Sign in first.", StatusKind::Error);
            return Ok(());
        }
        self.screen = Screen::Artists(ArtistManagerScreen::new(fetch_artists(&self.conn)?));
        Ok(())
    }

    fn open_playlist_admin(&mut self) -> Result<()> {
        if self.current_user.is_none() {
            self.set_status("Sign in first.", StatusKind::Error);
            return Ok(());
        }
        self.screen = Screen::Playlists(PlaylistAdminScreen::new(fetch_playlists(&self.conn)?));
        Ok(())
    }

    /// Account management is the superadmin's alone; everyone else gets a
    /// footer refusal instead of the screen.
    fn open_user_manager(&mut self) -> Result<()> {
        let role = match &self.current_user {
            Some(user) => user.role,
            None => {
                self.set_status("Sign in first.", StatusKind::Error);
                return Ok(());
            }
        };
        if !permits(role, Action::ManageUsers) {
            self.set_status(
                "Only a superadmin can manage accounts.",
                StatusKind::Error,
            );
            return Ok(());
        }
        self.screen = Screen::Users(UserManagerScreen::new(crate::db::fetch_users(&self.conn)?));
        Ok(())
    }

    fn open_profile(&mut self) -> Mode {
        let form = self
            .current_user
            .as_ref()
            .map(ProfileForm::from_user);
        match form {
            Some(form) => {
                self.clear_status();
                Mode::EditingProfile(form)
            }
            None => Mode::LoggingIn(LoginForm::default()),
        }
    }

    fn open_song_url(&mut self, song: Option<&Song>) {
        let Some(song) = song else {
            self.set_status("No song selected.", StatusKind::Error);
            return;
        };
        match song.url.as_deref().map(str::trim) {
            None | Some("") => {
                self.set_status("This song does not have a link.", StatusKind::Error);
            }
            Some(url) => {
                if let Err(err) = open_link(url) {
                    self.set_status(format!("Failed to open link: {err}"), StatusKind::Error);
                } else {
                    self.set_status(
                        format!("Opened {}.", song.display_title()),
                        StatusKind::Info,
                    );
                }
            }
        }
    }

    /// Persist the song form, resolving the typed artist name to a row on
    /// the way (creating it inline when it is new).
    fn save_song(&mut self, song_id: Option<i64>, form: &SongForm) -> Result<()> {
        let input = form.parse_inputs()?;
        let artist_id = find_or_create_artist(&self.conn, &input.artist)?;

        match song_id {
            Some(id) => {
                update_song(
                    &self.conn,
                    id,
                    &input.title,
                    artist_id,
                    &input.lyrics,
                    input.tone.as_deref(),
                    input.url.as_deref(),
                )?;
                self.set_status(format!("Updated {}.", input.title), StatusKind::Info);
            }
            None => {
                create_song(
                    &self.conn,
                    &input.title,
                    artist_id,
                    &input.lyrics,
                    input.tone.as_deref(),
                    input.url.as_deref(),
                )?;
                self.set_status(format!("Added {}.", input.title), StatusKind::Info);
            }
        }

        self.refresh_song_manager()?;
        self.refresh_artist_names()?;
        Ok(())
    }

    /// Persist the playlist editor: header fields plus the curated order in
    /// one save. On success the admin list comes back; on failure the editor
    /// stays up with the error inline.
    fn save_editor(&mut self) -> Result<Mode> {
        let (playlist_id, parsed) = match &self.screen {
            Screen::PlaylistEditor(editor) => (editor.playlist_id, editor.parse_inputs()),
            _ => return Ok(Mode::Normal),
        };

        match parsed {
            Ok((title, date, is_active, song_ids)) => {
                let saved = match playlist_id {
                    Some(id) => {
                        update_playlist(&self.conn, id, &title, date, is_active, &song_ids)
                    }
                    None => create_playlist(&self.conn, &title, date, is_active, &song_ids)
                        .map(|_| ()),
                };
                match saved {
                    Ok(()) => {
                        self.open_playlist_admin()?;
                        self.set_status(format!("Saved repertoire {title}."), StatusKind::Info);
                    }
                    Err(err) => {
                        let message = surface_error(&err);
                        self.set_editor_error(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            Err(err) => {
                let message = surface_error(&err);
                self.set_editor_error(message.clone());
                self.set_status(message, StatusKind::Error);
            }
        }
        Ok(Mode::Normal)
    }

    fn set_editor_error(&mut self, message: String) {
        if let Screen::PlaylistEditor(editor) = &mut self.screen {
            editor.error = Some(message);
        }
    }

    fn refresh_song_manager(&mut self) -> Result<()> {
        if let Screen::Songs(manager) = &mut self.screen {
            manager.set_songs(crate::db::fetch_all_songs(&self.conn)?);
        }
        Ok(())
    }

    fn refresh_artist_manager(&mut self) -> Result<()> {
        if let Screen::Artists(artists) = &mut self.screen {
            artists.set_artists(fetch_artists(&self.conn)?);
        }
        Ok(())
    }

    fn refresh_playlist_admin(&mut self) -> Result<()> {
        if let Screen::Playlists(playlists) = &mut self.screen {
            playlists.set_playlists(fetch_playlists(&self.conn)?);
        }
        Ok(())
    }

    fn refresh_user_manager(&mut self) -> Result<()> {
        if let Screen::Users(users) = &mut self.screen {
            users.set_users(crate::db::fetch_users(&self.conn)?);
        }
        Ok(())
    }

    fn refresh_artist_names(&mut self) -> Result<()> {
        self.artist_names = fetch_artist_names(&self.conn)?;
        Ok(())
    }

    // ---- drawing --------------------------------------------------------

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Home(home) => self.draw_home(frame, content_area, home),
            Screen::PlaylistView(view) => self.draw_playlist_view(frame, content_area, view),
            Screen::Lyrics(lyric) => self.draw_lyrics(frame, content_area, lyric),
            Screen::Songs(manager) => self.draw_song_manager(frame, content_area, manager),
            Screen::Artists(artists) => self.draw_artist_manager(frame, content_area, artists),
            Screen::Playlists(playlists) => {
                self.draw_playlist_admin(frame, content_area, playlists)
            }
            Screen::PlaylistEditor(editor) => {
                self.draw_playlist_editor(frame, content_area, editor)
            }
            Screen::Users(users) => self.draw_user_manager(frame, content_area, users),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::LoggingIn(form) => self.draw_login(frame, area, form),
            Mode::AddingSong(form) => self.draw_song_form(frame, area, "Add Song", form),
            Mode::EditingSong { form, .. } => self.draw_song_form(frame, area, "Edit Song", form),
            Mode::ConfirmSongDelete(confirm) => self.draw_confirm_song_delete(frame, area, confirm),
            Mode::AddingArtist(form) => self.draw_artist_form(frame, area, "Add Artist", form),
            Mode::EditingArtist { form, .. } => {
                self.draw_artist_form(frame, area, "Rename Artist", form)
            }
            Mode::ConfirmArtistDelete(confirm) => {
                self.draw_confirm_artist_delete(frame, area, confirm)
            }
            Mode::ConfirmPlaylistDelete(confirm) => {
                self.draw_confirm_playlist_delete(frame, area, confirm)
            }
            Mode::PickingSong(state) => self.draw_song_picker(frame, area, state),
            Mode::ConfirmEditorExit(confirm) => {
                self.draw_confirm_editor_exit(frame, area, confirm)
            }
            Mode::AddingUser(form) => self.draw_user_form(frame, area, form),
            Mode::ConfirmUserDelete(confirm) => self.draw_confirm_user_delete(frame, area, confirm),
            Mode::EditingProfile(form) => self.draw_profile_form(frame, area, form),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::Normal => {}
        }
    }

    fn draw_home(&self, frame: &mut Frame, area: Rect, home: &HomeScreen) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Repertoires");

        if home.playlists.is_empty() {
            let message = Paragraph::new("No active repertoires right now.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = home
            .playlists
            .iter()
            .map(|playlist| {
                let songs_label = if playlist.song_count == 1 {
                    "1 song".to_string()
                } else {
                    format!("{} songs", playlist.song_count)
                };
                ListItem::new(format!(
                    "{}  •  {}  •  {}",
                    format_date(playlist.date),
                    playlist.title,
                    songs_label
                ))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(home.selected));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn draw_playlist_view(&self, frame: &mut Frame, area: Rect, view: &PlaylistViewScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(1)])
            .split(area);

        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                view.playlist.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!(
                "{}  •  {} songs",
                format_date(view.playlist.date),
                view.songs.len()
            )),
        ])
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::ALL).title("Repertoire"));
        frame.render_widget(header, chunks[0]);

        if view.songs.is_empty() {
            let message = Paragraph::new("This repertoire has no songs yet.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, chunks[1]);
            return;
        }

        self.render_song_cards(frame, chunks[1], &view.songs, view.selected, true);
    }

    fn draw_lyrics(&self, frame: &mut Frame, area: Rect, lyric: &LyricScreen) {
        let Some(song) = lyric.current_song() else {
            let message = Paragraph::new("Song not found.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(1)])
            .split(area);

        let mut meta = vec![Span::raw(song.artist.clone())];
        if let Some(tone) = song.tone.as_deref() {
            meta.push(Span::raw("  •  Key: "));
            meta.push(Span::styled(
                tone.to_string(),
                Style::default().fg(Color::Cyan),
            ));
        }
        if let LyricOrigin::Playlist(_) = lyric.origin {
            meta.push(Span::raw(format!(
                "  •  {}/{}",
                lyric.index + 1,
                lyric.songs.len()
            )));
        }

        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                song.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(meta),
        ])
        .block(Block::default().borders(Borders::ALL).title("Lyrics"));
        frame.render_widget(header, chunks[0]);

        let title = if lyric.show_chords {
            "Chords shown"
        } else {
            "Chords hidden"
        };
        let body = Paragraph::new(lyric_lines(&song.lyrics, lyric.show_chords))
            .block(Block::default().borders(Borders::ALL).title(title))
            .scroll((lyric.scroll, 0));
        frame.render_widget(body, chunks[1]);
    }

    fn draw_song_manager(&self, frame: &mut Frame, area: Rect, manager: &SongManagerScreen) {
        if manager.songs.is_empty() {
            let message = Paragraph::new("No songs yet. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("All Songs"));
            frame.render_widget(message, area);
            return;
        }

        if manager.filtered_songs.is_empty() {
            let message = Paragraph::new("No songs match the current search.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("All Songs"));
            frame.render_widget(message, area);
            return;
        }

        self.render_song_cards(frame, area, &manager.filtered_songs, manager.selected, false);
    }

    fn draw_artist_manager(&self, frame: &mut Frame, area: Rect, artists: &ArtistManagerScreen) {
        let block = Block::default().borders(Borders::ALL).title("Artists");

        if artists.artists.is_empty() {
            let message = Paragraph::new("No artists yet. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = artists
            .artists
            .iter()
            .map(|artist| {
                let songs_label = if artist.song_count == 1 {
                    "1 song".to_string()
                } else {
                    format!("{} songs", artist.song_count)
                };
                ListItem::new(format!("{}  ({songs_label})", artist.name))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(artists.selected));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn draw_playlist_admin(&self, frame: &mut Frame, area: Rect, playlists: &PlaylistAdminScreen) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("All Repertoires");

        if playlists.playlists.is_empty() {
            let message = Paragraph::new("No repertoires yet. Press '+' to create one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = playlists
            .playlists
            .iter()
            .map(|playlist| {
                let visibility = if playlist.is_active { "active" } else { "draft" };
                ListItem::new(format!(
                    "{}  •  {}  •  {} songs  •  {visibility}",
                    format_date(playlist.date),
                    playlist.title,
                    playlist.song_count
                ))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(playlists.selected));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn draw_playlist_editor(&self, frame: &mut Frame, area: Rect, editor: &PlaylistEditorScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(1)])
            .split(area);

        let field_style = |field: EditorField, empty: bool| {
            if editor.field == field {
                Style::default().fg(Color::Yellow)
            } else if empty {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            }
        };

        let title_display = if editor.title.is_empty() {
            "<required>".to_string()
        } else {
            editor.title.clone()
        };
        let active_display = if editor.is_active {
            "[x] visible on the landing screen"
        } else {
            "[ ] hidden draft"
        };

        let mut form_lines = vec![
            Line::from(vec![
                Span::raw("Title: "),
                Span::styled(title_display, field_style(EditorField::Title, editor.title.is_empty())),
            ]),
            Line::from(vec![
                Span::raw("Date: "),
                Span::styled(
                    editor.date.clone(),
                    field_style(EditorField::Date, editor.date.is_empty()),
                ),
            ]),
            Line::from(vec![
                Span::raw("Active: "),
                Span::styled(active_display, field_style(EditorField::Active, false)),
            ]),
        ];
        if let Some(error) = &editor.error {
            form_lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        let form_title = if editor.playlist_id.is_some() {
            "Edit Repertoire"
        } else {
            "New Repertoire"
        };
        let form = Paragraph::new(form_lines)
            .block(Block::default().borders(Borders::ALL).title(form_title));
        frame.render_widget(form, chunks[0]);

        let songs_focused = editor.field == EditorField::Songs;
        let songs_block = Block::default()
            .borders(Borders::ALL)
            .title("Songs (performance order)")
            .style(if songs_focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            });

        if editor.order.is_empty() {
            let message = Paragraph::new("No songs yet. Focus this list with Tab, then press '+'.")
                .alignment(Alignment::Center)
                .block(songs_block);
            frame.render_widget(message, chunks[1]);
        } else {
            let items: Vec<ListItem> = editor
                .order
                .songs()
                .iter()
                .enumerate()
                .map(|(idx, song)| {
                    ListItem::new(format!("{:02}. {}", idx + 1, song.display_title()))
                })
                .collect();

            let list = List::new(items)
                .block(songs_block)
                .highlight_style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol(if songs_focused { "▶ " } else { "  " });

            let mut list_state = ListState::default();
            list_state.select(Some(editor.selected_song));
            frame.render_stateful_widget(list, chunks[1], &mut list_state);
        }

        // Keep the terminal cursor on the focused text field.
        let inner = Block::default().borders(Borders::ALL).inner(chunks[0]);
        match editor.field {
            EditorField::Title => {
                let x = inner.x + "Title: ".len() as u16 + editor.title.chars().count() as u16;
                frame.set_cursor_position((x, inner.y));
            }
            EditorField::Date => {
                let x = inner.x + "Date: ".len() as u16 + editor.date.chars().count() as u16;
                frame.set_cursor_position((x, inner.y + 1));
            }
            EditorField::Active | EditorField::Songs => {}
        }
    }

    fn draw_user_manager(&self, frame: &mut Frame, area: Rect, users: &UserManagerScreen) {
        let block = Block::default().borders(Borders::ALL).title("Accounts");

        if users.users.is_empty() {
            let message = Paragraph::new("No accounts yet. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let current_id = self.current_user.as_ref().map(|user| user.id);
        let items: Vec<ListItem> = users
            .users
            .iter()
            .map(|user| {
                let marker = if Some(user.id) == current_id {
                    "  (you)"
                } else {
                    ""
                };
                ListItem::new(format!("{}  —  {}{marker}", user.email, user.role))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(users.selected));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    /// Scrolling card list shared by the playlist view and the song manager.
    /// The playlist view numbers its cards because the order is the point.
    fn render_song_cards(
        &self,
        frame: &mut Frame,
        area: Rect,
        songs: &[Song],
        selected: usize,
        numbered: bool,
    ) {
        if songs.is_empty() || area.height == 0 {
            return;
        }

        let card_height = SONG_CARD_HEIGHT as usize;
        let capacity = ((area.height as usize) / card_height).max(1);
        let len = songs.len();
        let mut start = if selected >= capacity {
            selected + 1 - capacity
        } else {
            0
        };
        if start + capacity > len {
            start = len.saturating_sub(capacity);
        }
        let end = (start + capacity).min(len);
        let visible_len = end.saturating_sub(start);
        if visible_len == 0 {
            return;
        }

        let constraints: Vec<Constraint> = (0..visible_len)
            .map(|_| Constraint::Length(SONG_CARD_HEIGHT))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (idx, chunk) in rows.iter().enumerate() {
            if chunk.height == 0 {
                continue;
            }

            let song_index = start + idx;
            if song_index >= len {
                break;
            }

            let song = &songs[song_index];
            let mut block = Block::default().borders(Borders::ALL);
            let mut paragraph_style = Style::default();
            if song_index == selected {
                block = block.style(Style::default().fg(Color::Yellow));
                paragraph_style = Style::default().fg(Color::Yellow);
            }

            let mut lines = Vec::new();
            let pointer = if song_index == selected { "▶ " } else { "" };
            let title = if numbered {
                format!("{pointer}{:02}. {}", song_index + 1, song.title)
            } else {
                format!("{pointer}{}", song.title)
            };
            lines.push(Line::from(Span::styled(
                title,
                Style::default().add_modifier(Modifier::BOLD),
            )));

            let artist_text = if song.artist.trim().is_empty() {
                "Unknown artist".to_string()
            } else {
                song.artist.trim().to_string()
            };
            lines.push(Line::from(Span::styled(
                artist_text,
                Style::default().fg(Color::Gray),
            )));

            let mut extras: Vec<Span> = Vec::new();
            if let Some(tone) = song.tone.as_deref() {
                extras.push(Span::styled(
                    format!("Key: {tone}"),
                    Style::default().fg(Color::Cyan),
                ));
            }
            if let Some(url) = song.url.as_deref() {
                if !url.trim().is_empty() {
                    if !extras.is_empty() {
                        extras.push(Span::raw("  "));
                    }
                    extras.push(Span::styled(
                        url.trim().to_string(),
                        Style::default().fg(Color::Cyan),
                    ));
                }
            }
            if !extras.is_empty() {
                lines.push(Line::from(extras));
            }

            let paragraph = Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Left)
                .style(paragraph_style);

            frame.render_widget(paragraph, *chunk);
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let pairs: Vec<(&str, &str)> = match (&self.screen, &self.mode) {
            (_, Mode::LoggingIn(_)) => vec![
                ("[Tab]", " Switch   "),
                ("[Enter]", " Sign In   "),
                ("[Esc]", " Cancel"),
            ],
            (_, Mode::AddingSong(_) | Mode::EditingSong { .. }) => vec![
                ("[Tab]", " Accept/Switch   "),
                ("[Enter]", " Save / New Line in Lyrics   "),
                ("[Ctrl+S]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            (_, Mode::PickingSong(_)) => vec![
                ("[Type]", " Search   "),
                ("[↑↓]", " Navigate   "),
                ("[Enter]", " Add Song   "),
                ("[Esc]", " Done"),
            ],
            (_, Mode::Searching(_)) => vec![
                ("[Type]", " Filter   "),
                ("[↑↓]", " Navigate   "),
                ("[Enter]", " Read Lyrics   "),
                ("[Ctrl+E]", " Edit   "),
                ("[Esc]", " Clear"),
            ],
            (_, Mode::ConfirmEditorExit(_)) => vec![
                ("[←→]", " Choose   "),
                ("[Enter]", " Confirm   "),
                ("[Esc]", " Cancel"),
            ],
            (
                _,
                Mode::ConfirmSongDelete(_)
                | Mode::ConfirmArtistDelete(_)
                | Mode::ConfirmPlaylistDelete(_)
                | Mode::ConfirmUserDelete(_),
            ) => vec![("[y]", " Confirm   "), ("[n/Esc]", " Cancel")],
            (_, Mode::AddingUser(_) | Mode::EditingProfile(_)) => vec![
                ("[Tab]", " Switch   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            (Screen::Home(_), _) => vec![
                ("[↑↓]", " Select   "),
                ("[Enter]", " Open   "),
                ("[a]", " Admin   "),
                ("[q]", " Quit"),
            ],
            (Screen::PlaylistView(_), _) => vec![
                ("[↑↓]", " Select   "),
                ("[Enter]", " Read Lyrics   "),
                ("[Tab]", " Next Repertoire   "),
                ("[o]", " Open Link   "),
                ("[Esc]", " Back   "),
                ("[q]", " Quit"),
            ],
            (Screen::Lyrics(_), _) => vec![
                ("[c]", " Chords   "),
                ("[←→]", " Prev/Next   "),
                ("[↑↓]", " Scroll   "),
                ("[o]", " Open Link   "),
                ("[Esc]", " Back   "),
                ("[q]", " Quit"),
            ],
            (Screen::Songs(_), _) => vec![
                ("[↑↓]", " Select   "),
                ("[Enter]", " Read   "),
                ("[f]", " Search   "),
                ("[+]", " Add   "),
                ("[-]", " Delete   "),
                ("[e]", " Edit   "),
                ("[r]", " Repertoires   "),
                ("[a]", " Artists   "),
                ("[u]", " Accounts   "),
                ("[p]", " Profile   "),
                ("[Esc]", " Public View   "),
                ("[q]", " Quit"),
            ],
            (Screen::Artists(_), _) => vec![
                ("[↑↓]", " Select   "),
                ("[+]", " Add   "),
                ("[-]", " Delete   "),
                ("[e]", " Rename   "),
                ("[s]", " Songs   "),
                ("[r]", " Repertoires   "),
                ("[Esc]", " Public View   "),
                ("[q]", " Quit"),
            ],
            (Screen::Playlists(_), _) => vec![
                ("[↑↓]", " Select   "),
                ("[+]", " New   "),
                ("[Enter]", " Edit   "),
                ("[-]", " Delete   "),
                ("[s]", " Songs   "),
                ("[a]", " Artists   "),
                ("[Esc]", " Public View   "),
                ("[q]", " Quit"),
            ],
            (Screen::PlaylistEditor(_), _) => vec![
                ("[Tab]", " Next Field   "),
                ("[+]", " Add Song   "),
                ("[-]", " Remove   "),
                ("[u/d]", " Reorder   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Back"),
            ],
            (Screen::Users(_), _) => vec![
                ("[↑↓]", " Select   "),
                ("[+]", " Add   "),
                ("[-]", " Delete   "),
                ("[s]", " Songs   "),
                ("[Esc]", " Public View   "),
                ("[q]", " Quit"),
            ],
        };

        let mut spans = Vec::with_capacity(pairs.len() * 2);
        for (key, label) in pairs {
            spans.push(Span::styled(key, key_style));
            spans.push(Span::raw(label));
        }
        Line::from(spans)
    }

    fn draw_login(&self, frame: &mut Frame, area: Rect, form: &LoginForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Admin Login").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("Email", LoginField::Email),
            form.build_line("Password", LoginField::Password),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to sign in • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (cursor_x, cursor_y) = match form.active {
            LoginField::Email => (
                inner.x + "Email: ".len() as u16 + form.value_len(LoginField::Email) as u16,
                inner.y,
            ),
            LoginField::Password => (
                inner.x + "Password: ".len() as u16 + form.value_len(LoginField::Password) as u16,
                inner.y + 1,
            ),
        };
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn draw_song_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &SongForm) {
        let popup_area = centered_rect(80, 80, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(1)])
            .split(inner);

        let mut head_lines = vec![
            form.build_line("Title", SongField::Title),
            form.build_line("Artist", SongField::Artist),
            form.build_line("Key", SongField::Tone),
            form.build_line("Link", SongField::Url),
        ];
        if let Some(error) = &form.error {
            head_lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            head_lines.push(Line::from(Span::styled(
                "Enter saves (or adds a line in Lyrics) • Ctrl+S saves • Esc cancels",
                Style::default().fg(Color::Gray),
            )));
        }
        frame.render_widget(Paragraph::new(head_lines), chunks[0]);

        let lyrics_focused = form.active == SongField::Lyrics;
        let lyrics_block = Block::default()
            .borders(Borders::ALL)
            .title("Lyrics ([G]chord markers inline)")
            .style(if lyrics_focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            });
        let lyrics_inner = lyrics_block.inner(chunks[1]);

        // Show the tail of the buffer so the cursor line stays visible while
        // typing long songs.
        let line_count = form.lyrics.lines().count().max(1);
        let visible = lyrics_inner.height.max(1) as usize;
        let skip = line_count.saturating_sub(visible);
        let shown: Vec<Line> = form
            .lyrics
            .lines()
            .skip(skip)
            .map(|line| Line::from(line.to_string()))
            .collect();
        let lyrics_paragraph = Paragraph::new(shown).block(lyrics_block);
        frame.render_widget(lyrics_paragraph, chunks[1]);

        if lyrics_focused {
            let last_line_len = form
                .lyrics
                .rsplit('\n')
                .next()
                .map(|line| line.chars().count())
                .unwrap_or(0);
            let row_in_view = (line_count - skip).saturating_sub(1) as u16;
            let cursor_x = lyrics_inner.x + (last_line_len as u16).min(lyrics_inner.width.saturating_sub(1));
            let cursor_y = lyrics_inner.y + row_in_view.min(lyrics_inner.height.saturating_sub(1));
            frame.set_cursor_position((cursor_x, cursor_y));
        } else {
            let (prefix, field, row) = match form.active {
                SongField::Title => ("Title: ", SongField::Title, 0),
                SongField::Artist => ("Artist: ", SongField::Artist, 1),
                SongField::Tone => ("Key: ", SongField::Tone, 2),
                SongField::Url => ("Link: ", SongField::Url, 3),
                SongField::Lyrics => ("", SongField::Lyrics, 0),
            };
            let cursor_x = chunks[0].x + prefix.len() as u16 + form.value_len(field) as u16;
            frame.set_cursor_position((cursor_x, chunks[0].y + row));
        }
    }

    fn draw_artist_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &ArtistForm) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let display = if form.name.is_empty() {
            Span::styled("<required>", Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(form.name.clone(), Style::default().fg(Color::Yellow))
        };

        let mut lines = vec![
            Line::from(vec![Span::raw("Name: "), display]),
            Line::from(""),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let cursor_x = inner.x + "Name: ".len() as u16 + form.name.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_user_form(&self, frame: &mut Frame, area: Rect, form: &UserForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Account").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("Email", UserField::Email),
            form.build_line("Password", UserField::Password),
            form.build_line("Role", UserField::Role),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Space toggles role • Esc cancels",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (cursor_x, cursor_y) = match form.active {
            UserField::Email => (
                inner.x + "Email: ".len() as u16 + form.value_len(UserField::Email) as u16,
                inner.y,
            ),
            UserField::Password => (
                inner.x + "Password: ".len() as u16 + form.value_len(UserField::Password) as u16,
                inner.y + 1,
            ),
            UserField::Role => (inner.x + "Role: ".len() as u16, inner.y + 2),
        };
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn draw_profile_form(&self, frame: &mut Frame, area: Rect, form: &ProfileForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("My Profile").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("Email", LoginField::Email),
            form.build_line("New Password", LoginField::Password),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (cursor_x, cursor_y) = match form.active {
            LoginField::Email => (
                inner.x + "Email: ".len() as u16 + form.value_len(LoginField::Email) as u16,
                inner.y,
            ),
            LoginField::Password => (
                inner.x
                    + "New Password: ".len() as u16
                    + form.value_len(LoginField::Password) as u16,
                inner.y + 1,
            ),
        };
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn draw_confirm_song_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmSongDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Song").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Delete '{}' permanently?",
                confirm.song.display_title()
            )),
            Line::from("This will remove the song from every repertoire."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm_artist_delete(
        &self,
        frame: &mut Frame,
        area: Rect,
        confirm: &ConfirmArtistDelete,
    ) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Artist").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let warning = if confirm.artist.song_count > 0 {
            format!(
                "{} song(s) still reference this artist; the delete will be refused.",
                confirm.artist.song_count
            )
        } else {
            "No songs reference this artist.".to_string()
        };

        let lines = vec![
            Line::from(format!("Delete artist '{}'?", confirm.artist.name)),
            Line::from(warning),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm_playlist_delete(
        &self,
        frame: &mut Frame,
        area: Rect,
        confirm: &ConfirmPlaylistDelete,
    ) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Delete Repertoire")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Delete '{}' ({})?",
                confirm.playlist.title,
                format_date(confirm.playlist.date)
            )),
            Line::from("The songs themselves stay in the catalog."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm_user_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmUserDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Delete Account")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Delete the {} account '{}'?",
                confirm.user.role, confirm.user.email
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm_editor_exit(
        &self,
        frame: &mut Frame,
        area: Rect,
        confirm: &ConfirmEditorExit,
    ) {
        let popup_area = centered_rect(70, 40, area);
        frame.render_widget(Clear, popup_area);

        let title = if confirm.exit_app {
            "Exit Application"
        } else {
            "Leave Editor"
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let message = if confirm.exit_app {
            "This repertoire has unsaved changes. Save them before quitting?"
        } else {
            "This repertoire has unsaved changes. Save them before leaving?"
        };

        let mut option_spans = Vec::new();
        for (idx, label) in confirm.labels().iter().enumerate() {
            if idx > 0 {
                option_spans.push(Span::raw("   "));
            }
            let style = if confirm.selected_index() == idx {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            option_spans.push(Span::styled(*label, style));
        }

        let lines = vec![
            Line::from(message),
            Line::from(""),
            Line::from(option_spans),
            Line::from(""),
            Line::from(Span::styled(
                "Use ←/→ to choose • Enter to confirm • Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_song_picker(&self, frame: &mut Frame, area: Rect, state: &SongPickerState) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Add Song to Repertoire")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(inner);

        let search_line = Paragraph::new(Line::from(vec![
            Span::raw("Search: "),
            Span::styled(state.query.clone(), Style::default().fg(Color::Yellow)),
        ]));
        frame.render_widget(search_line, chunks[0]);

        if state.filtered_songs.is_empty() {
            let message = Paragraph::new("No matching songs.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(message, chunks[1]);
        } else {
            let items: Vec<ListItem> = state
                .filtered_songs
                .iter()
                .map(|song| ListItem::new(song.display_title()))
                .collect();

            let list = List::new(items)
                .highlight_style(Style::default().fg(Color::Yellow))
                .highlight_symbol("▶ ");

            let mut list_state = ListState::default();
            list_state.select(Some(state.selected));
            frame.render_stateful_widget(list, chunks[1], &mut list_state);
        }

        let cursor_x = chunks[0].x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, chunks[0].y));
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        let cursor_y = inner.y;
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}
