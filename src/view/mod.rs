//! View module - UI rendering
//!
//! Renders snapshots published by the sync engine and the search controller
//! with ratatui. Nothing here talks to the daemon.
//!
//! - `utils`: Shared helpers (formatting, song rows)
//! - `layout`: Top bar with the search box and sync indicator
//! - `content`: Play queue and result lists
//! - `progress`: Now-playing gauge
//! - `overlays`: Error banner and help popup

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{SearchSnapshot, SyncSnapshot, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, sync: &SyncSnapshot, search: &SearchSnapshot, ui_state: &UiState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + sync indicator
                Constraint::Min(0),    // Playlist + results
                Constraint::Length(3), // Progress bar
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], ui_state, sync);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        content::render_playlist(frame, main_chunks[0], &sync.state, ui_state);
        content::render_results(frame, main_chunks[1], search, ui_state);

        progress::render_progress_bar(frame, chunks[2], &sync.state);

        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }

        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::model::{
        PlaybackState, PlayerState, PlayerStatus, PlaylistEntry, ResultSource, SearchResults, Song,
    };

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn renders_now_playing_and_results() {
        let song = Song {
            id: 7,
            title: "Heroes".to_string(),
            artist: "Bowie".to_string(),
            ..Song::default()
        };
        let sync = SyncSnapshot {
            state: Arc::new(PlayerState {
                status: PlayerStatus {
                    state: PlaybackState::Playing,
                    elapsed: 30,
                    duration: 371,
                    current_song_id: 7,
                },
                playlist: vec![PlaylistEntry { position: 0, song: song.clone() }],
                ..PlayerState::default()
            }),
            ..SyncSnapshot::default()
        };
        let search = SearchSnapshot {
            results: Some(Arc::new(SearchResults {
                source: ResultSource::Library { page: 2 },
                songs: vec![song],
            })),
            pending: None,
        };

        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal
            .draw(|frame| AppView::render(frame, &sync, &search, &UiState::default()))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Heroes"));
        assert!(text.contains("Library (page 2)"));
        assert!(text.contains("0:30 / 6:11"));
    }
}
