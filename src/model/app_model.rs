//! View-side application state
//!
//! Player state is owned by the sync engine and search results by the search
//! controller; this model only holds what the UI itself decides: focus, the
//! query being typed, list selections and the error banner.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::types::{ActiveSection, UiState};

const ERROR_DISPLAY_TIME: Duration = Duration::from_secs(5);

pub struct AppModel {
    ui_state: Arc<Mutex<UiState>>,
    should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            ui_state: Arc::new(Mutex::new(UiState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    // ========================================================================
    // Focus & selection
    // ========================================================================

    pub async fn cycle_section_forward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
    }

    pub async fn cycle_section_backward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.prev();
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        let mut state = self.ui_state.lock().await;
        state.active_section = section;
    }

    pub async fn move_selection_up(&self) {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Playlist => state.playlist_selected = state.playlist_selected.saturating_sub(1),
            ActiveSection::Results => state.results_selected = state.results_selected.saturating_sub(1),
            ActiveSection::Search => {}
        }
    }

    /// Move down within a list of `len` items.
    pub async fn move_selection_down(&self, len: usize) {
        let mut state = self.ui_state.lock().await;
        let last = len.saturating_sub(1);
        match state.active_section {
            ActiveSection::Playlist => state.playlist_selected = (state.playlist_selected + 1).min(last),
            ActiveSection::Results => state.results_selected = (state.results_selected + 1).min(last),
            ActiveSection::Search => {}
        }
    }

    /// Keep selections inside lists that shrank after a refresh.
    pub async fn clamp_selections(&self, playlist_len: usize, results_len: usize) {
        let mut state = self.ui_state.lock().await;
        state.playlist_selected = state.playlist_selected.min(playlist_len.saturating_sub(1));
        state.results_selected = state.results_selected.min(results_len.saturating_sub(1));
    }

    pub async fn reset_results_selection(&self) {
        self.ui_state.lock().await.results_selected = 0;
    }

    // ========================================================================
    // Search input
    // ========================================================================

    pub async fn update_search_query(&self, query: String) {
        let mut state = self.ui_state.lock().await;
        state.search_query = query;
    }

    pub async fn append_to_search(&self, c: char) {
        let mut state = self.ui_state.lock().await;
        state.search_query.push(c);
    }

    pub async fn backspace_search(&self) {
        let mut state = self.ui_state.lock().await;
        state.search_query.pop();
    }

    // ========================================================================
    // Overlays
    // ========================================================================

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed() > ERROR_DISPLAY_TIME {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }

    pub async fn toggle_help_popup(&self) {
        let mut state = self.ui_state.lock().await;
        state.show_help_popup = !state.show_help_popup;
    }

    pub async fn hide_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new()
    }
}
