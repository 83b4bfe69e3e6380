//! Main content area rendering (play queue and result lists)

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, List, ListState, Padding, Paragraph},
    Frame,
};

use crate::model::{ActiveSection, PlayerState, ResultSource, SearchSnapshot, UiState};
use super::utils::{border_style, song_rows};

pub fn render_playlist(frame: &mut Frame, area: Rect, state: &PlayerState, ui_state: &UiState) {
    let is_focused = ui_state.active_section == ActiveSection::Playlist;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Playlist ({}) ", state.playlist.len()))
        .padding(Padding::horizontal(1))
        .border_style(border_style(is_focused));

    if state.playlist.is_empty() {
        let empty = Paragraph::new("The play queue is empty\n\nSearch with / or browse the library with B")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let playing = state.now_playing().map(|entry| entry.position);
    let songs: Vec<_> = state
        .playlist
        .iter()
        .map(|entry| (entry.position + 1, &entry.song))
        .collect();
    let highlighted = playing.and_then(|pos| state.playlist.iter().position(|e| e.position == pos));

    let content_width = area.width.saturating_sub(4) as usize;
    let items = song_rows(&songs, ui_state.playlist_selected, is_focused, highlighted, content_width);

    let list = List::new(items).block(block).highlight_style(Style::default());
    let mut list_state = ListState::default();
    list_state.select(Some(ui_state.playlist_selected + 1)); // +1 for header

    frame.render_stateful_widget(list, area, &mut list_state);
}

pub fn render_results(frame: &mut Frame, area: Rect, search: &SearchSnapshot, ui_state: &UiState) {
    let is_focused = ui_state.active_section == ActiveSection::Results;
    let block = |title: String| {
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .padding(Padding::horizontal(1))
            .border_style(border_style(is_focused))
    };

    if let Some(pending) = &search.pending {
        let label = match pending {
            ResultSource::Search(query) => format!("Searching for \"{}\"...", query),
            ResultSource::Library { page } => format!("Loading library page {}...", page),
        };
        let loading = Paragraph::new(label)
            .style(Style::default().fg(Color::Yellow))
            .block(block(" Results ".to_string()));
        frame.render_widget(loading, area);
        return;
    }

    let Some(results) = &search.results else {
        let hint = Paragraph::new("Type in search and press Enter to find songs\n\nUse Tab to move between sections\nPress Enter on a result to queue it")
            .style(Style::default().fg(Color::DarkGray))
            .block(block(" Results ".to_string()));
        frame.render_widget(hint, area);
        return;
    };

    if results.songs.is_empty() {
        let empty = Paragraph::new("No songs found")
            .style(Style::default().fg(Color::DarkGray))
            .block(block(results.title()));
        frame.render_widget(empty, area);
        return;
    }

    let songs: Vec<_> = results.songs.iter().enumerate().map(|(i, song)| (i + 1, song)).collect();
    let content_width = area.width.saturating_sub(4) as usize;
    let items = song_rows(&songs, ui_state.results_selected, is_focused, None, content_width);

    let list = List::new(items).block(block(results.title())).highlight_style(Style::default());
    let mut list_state = ListState::default();
    list_state.select(Some(ui_state.results_selected + 1));

    frame.render_stateful_widget(list, area, &mut list_state);
}
