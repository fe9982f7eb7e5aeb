use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Artist, Playlist, Role, Song, User};

/// Everything the song form validates and hands to the persistence layer.
pub(crate) struct SongInput {
    pub(crate) title: String,
    pub(crate) artist: String,
    pub(crate) lyrics: String,
    pub(crate) tone: Option<String>,
    pub(crate) url: Option<String>,
}

/// Form state for song creation/editing, including artist autocomplete
/// tracking and the multi-line lyrics buffer.
#[derive(Default, Clone)]
pub(crate) struct SongForm {
    pub(crate) title: String,
    pub(crate) artist: String,
    pub(crate) tone: String,
    pub(crate) url: String,
    pub(crate) lyrics: String,
    pub(crate) active: SongField,
    pub(crate) error: Option<String>,
    pub(crate) suggestion: Option<String>,
    pub(crate) autocomplete_disabled: bool,
}

/// Enumerates the fields within the song form to drive focus management.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum SongField {
    Title,
    Artist,
    Tone,
    Url,
    Lyrics,
}

impl Default for SongField {
    fn default() -> Self {
        SongField::Title
    }
}

impl SongForm {
    /// Populate the form from an existing song when entering edit mode.
    pub(crate) fn from_song(song: &Song) -> Self {
        Self {
            title: song.title.clone(),
            artist: song.artist.clone(),
            tone: song.tone.clone().unwrap_or_default(),
            url: song.url.clone().unwrap_or_default(),
            lyrics: song.lyrics.clone(),
            active: SongField::Title,
            error: None,
            suggestion: None,
            autocomplete_disabled: false,
        }
    }

    /// Cycle focus across the five song fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            SongField::Title => SongField::Artist,
            SongField::Artist => SongField::Tone,
            SongField::Tone => SongField::Url,
            SongField::Url => SongField::Lyrics,
            SongField::Lyrics => SongField::Title,
        };
        if self.active != SongField::Artist {
            self.clear_suggestion();
        }
    }

    /// Insert a character into the active field.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            SongField::Title => self.title.push(ch),
            SongField::Artist => {
                self.autocomplete_disabled = false;
                self.artist.push(ch);
            }
            SongField::Tone => self.tone.push(ch),
            SongField::Url => self.url.push(ch),
            SongField::Lyrics => self.lyrics.push(ch),
        }
        true
    }

    /// Append a line break to the lyrics buffer. Only meaningful while the
    /// lyrics field is focused; Enter elsewhere means "save".
    pub(crate) fn push_newline(&mut self) -> bool {
        if self.active == SongField::Lyrics {
            self.lyrics.push('\n');
            true
        } else {
            false
        }
    }

    /// Remove a character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            SongField::Title => {
                self.title.pop();
            }
            SongField::Artist => {
                self.artist.pop();
                self.autocomplete_disabled = false;
            }
            SongField::Tone => {
                self.tone.pop();
            }
            SongField::Url => {
                self.url.pop();
            }
            SongField::Lyrics => {
                self.lyrics.pop();
            }
        }
    }

    /// Validate and normalize form inputs before they are written to the
    /// database. A blank artist falls back to the catch-all name the catalog
    /// has always used for anonymous songs.
    pub(crate) fn parse_inputs(&self) -> Result<SongInput> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("Song title is required."));
        }
        let lyrics = self.lyrics.trim_end();
        if lyrics.trim().is_empty() {
            return Err(anyhow!("Lyrics are required."));
        }
        let artist = self.artist.trim();
        let artist = if artist.is_empty() { "Desconocido" } else { artist };
        let tone = self.tone.trim();
        let url = self.url.trim();
        Ok(SongInput {
            title: title.to_string(),
            artist: artist.to_string(),
            lyrics: lyrics.to_string(),
            tone: (!tone.is_empty()).then(|| tone.to_string()),
            url: (!url.is_empty()).then(|| url.to_string()),
        })
    }

    /// Update the artist autocomplete suggestion based on current input.
    pub(crate) fn update_suggestion(&mut self, artists: &[String]) {
        if self.active != SongField::Artist {
            self.clear_suggestion();
            return;
        }

        if self.autocomplete_disabled || self.artist.chars().count() < 2 {
            self.clear_suggestion();
            return;
        }

        let current_lower = self.artist.to_lowercase();
        let maybe_match = artists
            .iter()
            .find(|candidate| candidate.to_lowercase().starts_with(&current_lower));

        if let Some(candidate) = maybe_match {
            if candidate.chars().count() == self.artist.chars().count()
                && candidate.to_lowercase() == current_lower
            {
                self.suggestion = None;
            } else {
                self.suggestion = Some(candidate.clone());
            }
        } else {
            self.suggestion = None;
        }
    }

    /// Apply the suggested artist, marking autocomplete as satisfied.
    pub(crate) fn accept_suggestion(&mut self) -> bool {
        if self.suggestion_suffix().is_some() {
            if let Some(candidate) = self.suggestion.clone() {
                self.artist = candidate;
                self.autocomplete_disabled = true;
                self.suggestion = None;
                return true;
            }
        }
        false
    }

    /// Explicitly disable autocomplete for the rest of this interaction.
    pub(crate) fn cancel_autocomplete(&mut self) -> bool {
        if self.active == SongField::Artist && self.suggestion.is_some() {
            self.autocomplete_disabled = true;
            self.suggestion = None;
            return true;
        }
        false
    }

    /// Drop the current suggestion.
    fn clear_suggestion(&mut self) {
        self.suggestion = None;
    }

    /// Return the remaining characters to display as a ghosted autocomplete
    /// hint.
    pub(crate) fn suggestion_suffix(&self) -> Option<String> {
        let candidate = self.suggestion.as_ref()?;
        let current_len = self.artist.chars().count();
        let mut chars = candidate.chars();
        for _ in 0..current_len {
            chars.next()?;
        }
        let suffix: String = chars.collect();
        if suffix.is_empty() {
            None
        } else {
            Some(suffix)
        }
    }

    /// Whether we currently have a suggestion to show for the artist field.
    pub(crate) fn has_active_suggestion(&self) -> bool {
        self.active == SongField::Artist && self.suggestion.is_some()
    }

    /// Render a styled line for the modal form, optionally appending the
    /// autocomplete suffix. The lyrics field is drawn as its own block by the
    /// caller, so it never goes through here.
    pub(crate) fn build_line(&self, field_name: &str, field: SongField) -> Line<'static> {
        let (value, is_active) = match field {
            SongField::Title => (&self.title, self.active == SongField::Title),
            SongField::Artist => (&self.artist, self.active == SongField::Artist),
            SongField::Tone => (&self.tone, self.active == SongField::Tone),
            SongField::Url => (&self.url, self.active == SongField::Url),
            SongField::Lyrics => (&self.lyrics, false),
        };

        let placeholder = match field {
            SongField::Title => "<required>",
            _ => "<optional>",
        };

        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let mut spans = vec![Span::raw(format!("{field_name}: "))];

        if field == SongField::Artist && is_active && !value.is_empty() {
            spans.push(Span::styled(value.clone(), style));
            if let Some(suffix) = self.suggestion_suffix() {
                spans.push(Span::styled(suffix, Style::default().fg(Color::DarkGray)));
            }
        } else {
            spans.push(Span::styled(display, style));
            if field == SongField::Artist && is_active {
                if let Some(suffix) = self.suggestion_suffix() {
                    spans.push(Span::styled(suffix, Style::default().fg(Color::DarkGray)));
                }
            }
        }

        Line::from(spans)
    }

    /// Character length of the requested field.
    pub(crate) fn value_len(&self, field: SongField) -> usize {
        match field {
            SongField::Title => self.title.chars().count(),
            SongField::Artist => self.artist.chars().count(),
            SongField::Tone => self.tone.chars().count(),
            SongField::Url => self.url.chars().count(),
            SongField::Lyrics => self.lyrics.chars().count(),
        }
    }
}

/// Single-field form for creating or renaming an artist.
#[derive(Default, Clone)]
pub(crate) struct ArtistForm {
    pub(crate) name: String,
    pub(crate) error: Option<String>,
}

impl ArtistForm {
    pub(crate) fn from_artist(artist: &Artist) -> Self {
        Self {
            name: artist.name.clone(),
            error: None,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.name.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.name.pop();
    }

    pub(crate) fn parse_inputs(&self) -> Result<String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Artist name is required."));
        }
        Ok(name.to_string())
    }
}

/// Login credentials being typed at the admin gate.
#[derive(Default, Clone)]
pub(crate) struct LoginForm {
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) active: LoginField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum LoginField {
    Email,
    Password,
}

impl Default for LoginField {
    fn default() -> Self {
        LoginField::Email
    }
}

impl LoginForm {
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            LoginField::Email => self.email.push(ch),
            LoginField::Password => self.password.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            LoginField::Email => {
                self.email.pop();
            }
            LoginField::Password => {
                self.password.pop();
            }
        }
    }

    pub(crate) fn parse_inputs(&self) -> Result<(String, String)> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(anyhow!("Email is required."));
        }
        if self.password.is_empty() {
            return Err(anyhow!("Password is required."));
        }
        Ok((email.to_string(), self.password.clone()))
    }

    /// Render one credential line; the password renders as bullets.
    pub(crate) fn build_line(&self, field_name: &str, field: LoginField) -> Line<'static> {
        let (value, is_active, mask) = match field {
            LoginField::Email => (&self.email, self.active == LoginField::Email, false),
            LoginField::Password => (&self.password, self.active == LoginField::Password, true),
        };

        let display = if value.is_empty() {
            "<required>".to_string()
        } else if mask {
            "•".repeat(value.chars().count())
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn value_len(&self, field: LoginField) -> usize {
        match field {
            LoginField::Email => self.email.chars().count(),
            LoginField::Password => self.password.chars().count(),
        }
    }
}

/// Form for registering another administrator (superadmin only).
#[derive(Clone)]
pub(crate) struct UserForm {
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) role: Role,
    pub(crate) active: UserField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum UserField {
    Email,
    Password,
    Role,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            role: Role::Admin,
            active: UserField::Email,
            error: None,
        }
    }
}

impl UserForm {
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            UserField::Email => UserField::Password,
            UserField::Password => UserField::Role,
            UserField::Role => UserField::Email,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            UserField::Email => self.email.push(ch),
            UserField::Password => self.password.push(ch),
            // The role is toggled, not typed.
            UserField::Role => return false,
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            UserField::Email => {
                self.email.pop();
            }
            UserField::Password => {
                self.password.pop();
            }
            UserField::Role => {}
        }
    }

    /// Flip between the two roles while the role field is focused.
    pub(crate) fn toggle_role(&mut self) -> bool {
        if self.active != UserField::Role {
            return false;
        }
        self.role = match self.role {
            Role::Admin => Role::Superadmin,
            Role::Superadmin => Role::Admin,
        };
        true
    }

    pub(crate) fn parse_inputs(&self) -> Result<(String, String, Role)> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(anyhow!("Email is required."));
        }
        if self.password.is_empty() {
            return Err(anyhow!("Password is required."));
        }
        Ok((email.to_string(), self.password.clone(), self.role))
    }

    pub(crate) fn build_line(&self, field_name: &str, field: UserField) -> Line<'static> {
        let (display, is_active, is_empty) = match field {
            UserField::Email => (
                if self.email.is_empty() {
                    "<required>".to_string()
                } else {
                    self.email.clone()
                },
                self.active == UserField::Email,
                self.email.is_empty(),
            ),
            UserField::Password => (
                if self.password.is_empty() {
                    "<required>".to_string()
                } else {
                    "•".repeat(self.password.chars().count())
                },
                self.active == UserField::Password,
                self.password.is_empty(),
            ),
            UserField::Role => (
                format!("{} (Space to switch)", self.role),
                self.active == UserField::Role,
                false,
            ),
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if is_empty {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn value_len(&self, field: UserField) -> usize {
        match field {
            UserField::Email => self.email.chars().count(),
            UserField::Password => self.password.chars().count(),
            UserField::Role => 0,
        }
    }
}

/// Form for updating the signed-in account's own credentials. An empty
/// password means "keep the current one".
#[derive(Default, Clone)]
pub(crate) struct ProfileForm {
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) active: LoginField,
    pub(crate) error: Option<String>,
}

impl ProfileForm {
    pub(crate) fn from_user(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            password: String::new(),
            active: LoginField::Email,
            error: None,
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            LoginField::Email => self.email.push(ch),
            LoginField::Password => self.password.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            LoginField::Email => {
                self.email.pop();
            }
            LoginField::Password => {
                self.password.pop();
            }
        }
    }

    /// Work out what actually changed. Returns (email, password) options the
    /// way the persistence layer expects them.
    pub(crate) fn parse_inputs(
        &self,
        current_email: &str,
    ) -> Result<(Option<String>, Option<String>)> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(anyhow!("Email is required."));
        }
        let new_email = (email != current_email).then(|| email.to_string());
        let new_password = (!self.password.is_empty()).then(|| self.password.clone());
        if new_email.is_none() && new_password.is_none() {
            return Err(anyhow!("Nothing to update."));
        }
        Ok((new_email, new_password))
    }

    pub(crate) fn build_line(&self, field_name: &str, field: LoginField) -> Line<'static> {
        let (value, is_active, mask, placeholder) = match field {
            LoginField::Email => (
                &self.email,
                self.active == LoginField::Email,
                false,
                "<required>",
            ),
            LoginField::Password => (
                &self.password,
                self.active == LoginField::Password,
                true,
                "<unchanged>",
            ),
        };

        let display = if value.is_empty() {
            placeholder.to_string()
        } else if mask {
            "•".repeat(value.chars().count())
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn value_len(&self, field: LoginField) -> usize {
        match field {
            LoginField::Email => self.email.chars().count(),
            LoginField::Password => self.password.chars().count(),
        }
    }
}

/// State for confirming permanent song deletion.
pub(crate) struct ConfirmSongDelete {
    pub(crate) song: Song,
}

/// State for confirming artist deletion. The persistence layer still refuses
/// the delete while songs reference the artist; the dialog is only the first
/// gate.
pub(crate) struct ConfirmArtistDelete {
    pub(crate) artist: Artist,
}

/// State for confirming playlist deletion.
pub(crate) struct ConfirmPlaylistDelete {
    pub(crate) playlist: Playlist,
}

/// State for confirming account deletion.
pub(crate) struct ConfirmUserDelete {
    pub(crate) user: User,
}

/// Tracks the user's choice when leaving the playlist editor with unsaved
/// changes.
pub(crate) struct ConfirmEditorExit {
    pub(crate) exit_app: bool,
    pub(crate) selection: ConfirmExitChoice,
}

impl ConfirmEditorExit {
    /// Create a confirmation dialog with the initial selection on "Save".
    pub(crate) fn new(exit_app: bool) -> Self {
        Self {
            exit_app,
            selection: ConfirmExitChoice::Save,
        }
    }

    /// Move the selection forward (Save → Discard → Cancel).
    pub(crate) fn next(&mut self) {
        self.selection = match self.selection {
            ConfirmExitChoice::Save => ConfirmExitChoice::Discard,
            ConfirmExitChoice::Discard => ConfirmExitChoice::Cancel,
            ConfirmExitChoice::Cancel => ConfirmExitChoice::Save,
        };
    }

    /// Move the selection backward (Save ← Discard ← Cancel).
    pub(crate) fn previous(&mut self) {
        self.selection = match self.selection {
            ConfirmExitChoice::Save => ConfirmExitChoice::Cancel,
            ConfirmExitChoice::Discard => ConfirmExitChoice::Save,
            ConfirmExitChoice::Cancel => ConfirmExitChoice::Discard,
        };
    }

    /// Labels rendered on the dialog buttons.
    pub(crate) fn labels(&self) -> [&'static str; 3] {
        if self.exit_app {
            ["Save & Quit", "Discard & Quit", "Cancel"]
        } else {
            ["Save & Leave", "Discard & Leave", "Cancel"]
        }
    }

    /// Index of the currently highlighted choice.
    pub(crate) fn selected_index(&self) -> usize {
        match self.selection {
            ConfirmExitChoice::Save => 0,
            ConfirmExitChoice::Discard => 1,
            ConfirmExitChoice::Cancel => 2,
        }
    }
}

/// Options presented in the editor exit confirmation dialog.
#[derive(Copy, Clone)]
pub(crate) enum ConfirmExitChoice {
    Save,
    Discard,
    Cancel,
}

/// Validate a date typed as `YYYY-MM-DD`. Shared by the playlist editor.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| anyhow!("Date must look like 2025-06-01."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn song_form_requires_title_and_lyrics() {
        let mut form = SongForm::default();
        assert!(form.parse_inputs().is_err());
        form.title = "Bendice".to_string();
        assert!(form.parse_inputs().is_err());
        form.lyrics = "[G]la".to_string();
        let input = form.parse_inputs().unwrap();
        assert_eq!(input.artist, "Desconocido");
        assert!(input.tone.is_none());
    }

    #[test]
    fn artist_suggestion_completes_prefixes() {
        let names = vec!["Marcos Witt".to_string(), "Miel San Marcos".to_string()];
        let mut form = SongForm {
            active: SongField::Artist,
            artist: "ma".to_string(),
            ..SongForm::default()
        };
        form.update_suggestion(&names);
        assert_eq!(form.suggestion.as_deref(), Some("Marcos Witt"));
        assert!(form.accept_suggestion());
        assert_eq!(form.artist, "Marcos Witt");
    }

    #[test]
    fn profile_form_detects_no_change() {
        let form = ProfileForm {
            email: "ana@example.org".to_string(),
            ..ProfileForm::default()
        };
        assert!(form.parse_inputs("ana@example.org").is_err());

        let form = ProfileForm {
            email: "ana@example.org".to_string(),
            password: "nueva".to_string(),
            ..ProfileForm::default()
        };
        let (email, password) = form.parse_inputs("ana@example.org").unwrap();
        assert!(email.is_none());
        assert_eq!(password.as_deref(), Some("nueva"));
    }

    #[test]
    fn date_parser_accepts_iso_days_only() {
        assert!(parse_date("2025-06-01").is_ok());
        assert!(parse_date("junio 1").is_err());
        assert!(parse_date("2025-13-01").is_err());
    }
}
