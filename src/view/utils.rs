//! Utility functions for rendering UI components

use ratatui::{
    style::{Color, Modifier, Style},
    widgets::ListItem,
};

use crate::model::Song;

pub fn format_duration(seconds: u32) -> String {
    let minutes = seconds / 60;
    let seconds = seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}

/// Calculate width needed for index column (log10(n) + padding)
pub fn calculate_num_width(item_count: usize) -> usize {
    if item_count == 0 {
        2
    } else {
        let digits = (item_count as f64).log10().floor() as usize + 1;
        digits + 1
    }
}

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_width)
    } else {
        format!("{:<width$}", s, width = max_width)
    }
}

pub fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    }
}

/// Header plus one row per song. `highlighted` marks the row that is playing.
pub fn song_rows(
    songs: &[(usize, &Song)],
    selected_index: usize,
    is_focused: bool,
    highlighted: Option<usize>,
    content_width: usize,
) -> Vec<ListItem<'static>> {
    let num_width = calculate_num_width(songs.len());
    // " {num}   {title}   {artist}   {album}"
    let fixed_width = 1 + num_width + 3 + 3 + 3;
    let remaining_width = content_width.saturating_sub(fixed_width);
    let title_width = (remaining_width * 45) / 100;
    let artist_width = (remaining_width * 30) / 100;
    let album_width = remaining_width.saturating_sub(title_width + artist_width);

    let mut items: Vec<ListItem<'static>> = vec![
        ListItem::new(format!(
            " {:<num_width$}   {:<title_width$}   {:<artist_width$}   {}",
            "#", "Title", "Artist", "Album",
        ))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    ];

    items.extend(songs.iter().enumerate().map(|(i, (number, song))| {
        let is_playing = highlighted == Some(i);
        let style = if i == selected_index && is_focused {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else if is_playing {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else if i == selected_index {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let marker = if is_playing { "▶" } else { " " };
        ListItem::new(format!(
            "{}{:<num_width$}   {}   {}   {}",
            marker,
            number,
            truncate_string(&song.title, title_width),
            truncate_string(&song.artist, artist_width),
            truncate_string(&song.album, album_width),
        ))
        .style(style)
    }));

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_are_minutes_and_seconds() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(125), "2:05");
        assert_eq!(format_duration(3600), "60:00");
    }

    #[test]
    fn long_strings_get_ellipsis() {
        assert_eq!(truncate_string("Bohemian Rhapsody", 10), "Bohemia...");
        assert_eq!(truncate_string("Abba", 6), "Abba  ");
    }

    #[test]
    fn header_row_comes_first() {
        let song = Song {
            id: 3,
            title: "Intro".to_string(),
            ..Song::default()
        };
        let rows = song_rows(&[(1, &song)], 0, true, None, 80);
        assert_eq!(rows.len(), 2);
    }
}
