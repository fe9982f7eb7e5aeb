use anyhow::Error;
use chrono::NaiveDate;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::lyrics::{clean, tokenize, Row};

/// Render a calendar date the way every screen shows it, weekday included so
/// the operator can sanity-check a service date at a glance.
pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d (%a)").to_string()
}

/// Build the lyric body for the reading screen. With chords hidden the raw
/// text is cleaned of markers; with chords shown every annotated row becomes
/// two terminal lines, the chord labels stacked above the syllable they
/// belong to.
pub(crate) fn lyric_lines(lyrics: &str, show_chords: bool) -> Vec<Line<'static>> {
    if !show_chords {
        return clean(lyrics)
            .lines()
            .map(|line| Line::from(line.to_string()))
            .collect();
    }

    let mut lines = Vec::new();
    for row in tokenize(lyrics) {
        if row.iter().all(|chunk| chunk.chord.is_empty()) {
            let text: String = row.iter().map(|chunk| chunk.text.as_str()).collect();
            lines.push(Line::from(text));
            continue;
        }

        let (chord_line, text_line) = stack_row(&row);
        lines.push(Line::from(Span::styled(
            chord_line,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(text_line));
    }
    lines
}

/// Pad each chunk so its chord and its text occupy the same columns on the
/// two stacked lines. A chord wider than its text pushes the following text
/// right by one separating space, which keeps adjacent chords readable.
fn stack_row(row: &Row) -> (String, String) {
    let mut chord_line = String::new();
    let mut text_line = String::new();

    for chunk in row {
        let chord_width = chunk.chord.chars().count();
        let text_width = chunk.text.chars().count();
        let min_chord = if chord_width > 0 { chord_width + 1 } else { 0 };
        let width = text_width.max(min_chord);

        chord_line.push_str(&chunk.chord);
        for _ in chord_width..width {
            chord_line.push(' ');
        }
        text_line.push_str(&chunk.text);
        for _ in text_width..width {
            text_line.push(' ');
        }
    }

    (chord_line, text_line)
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chords_stack_above_their_syllable() {
        let lines = lyric_lines("[G]Bendice a [C]Israel", true);
        assert_eq!(lines.len(), 2);
        let chord_line: String = lines[0].spans.iter().map(|s| s.content.clone()).collect();
        let text_line: String = lines[1].spans.iter().map(|s| s.content.clone()).collect();
        assert!(chord_line.starts_with('G'));
        assert_eq!(text_line.trim_end(), "Bendice a Israel");
        // "C" sits exactly where "Israel" begins.
        let c_col = chord_line.find('C').unwrap();
        let israel_col = text_line.find("Israel").unwrap();
        assert_eq!(c_col, israel_col);
    }

    #[test]
    fn hidden_chords_render_clean_text() {
        let lines = lyric_lines("[G]Bendice a [C]Israel\n\ncoro", false);
        assert_eq!(lines.len(), 3);
        let first: String = lines[0].spans.iter().map(|s| s.content.clone()).collect();
        assert_eq!(first, "Bendice a Israel");
    }

    #[test]
    fn unannotated_rows_stay_single_lines_even_with_chords_shown() {
        let lines = lyric_lines("sin acordes\n[G]con acordes", true);
        // One plain line plus a chord/text pair.
        assert_eq!(lines.len(), 3);
    }
}
