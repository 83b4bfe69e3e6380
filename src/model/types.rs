//! Core type definitions for the application

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local};

/// Daemon-assigned song identifier
pub type SongId = i64;

/// Reserved id meaning "no song"
pub const NO_SONG: SongId = -1;

/// Placeholder for any text field the daemon left out
pub const UNKNOWN: &str = "unknown";

/// A song as reported by the daemon. Rebuilt on every refresh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
}

impl Default for Song {
    fn default() -> Self {
        Self {
            id: NO_SONG,
            title: UNKNOWN.to_string(),
            artist: UNKNOWN.to_string(),
            album: UNKNOWN.to_string(),
            genre: UNKNOWN.to_string(),
        }
    }
}

impl Song {
    pub fn is_known(&self) -> bool {
        self.id != NO_SONG
    }
}

/// Transport state of the remote player
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    Playing,
    Paused,
    #[default]
    Stopped,
}

impl PlaybackState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
        }
    }
}

/// Transport status. `elapsed` only means something while not stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerStatus {
    pub state: PlaybackState,
    pub elapsed: u32,
    pub duration: u32,
    pub current_song_id: SongId,
}

impl Default for PlayerStatus {
    fn default() -> Self {
        Self {
            state: PlaybackState::Stopped,
            elapsed: 0,
            duration: 0,
            current_song_id: NO_SONG,
        }
    }
}

/// One slot of the daemon's play queue. `position` is the 0-based server order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub position: usize,
    pub song: Song,
}

/// Local snapshot of remote truth. Replaced wholesale, never patched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerState {
    pub status: PlayerStatus,
    pub playlist: Vec<PlaylistEntry>,
    pub last_synced_at: Option<Instant>,
    pub synced_at_wall: Option<DateTime<Local>>,
}

impl PlayerState {
    /// Looks up the current song in the playlist. `None` when the two
    /// fetches that produced them disagree, or nothing is loaded.
    pub fn now_playing(&self) -> Option<&PlaylistEntry> {
        if self.status.current_song_id == NO_SONG {
            return None;
        }
        self.playlist
            .iter()
            .find(|entry| entry.song.id == self.status.current_song_id)
    }

    /// Elapsed seconds advanced by wall time since the last sync while playing.
    pub fn estimated_elapsed(&self, now: Instant) -> u32 {
        let status = &self.status;
        match (status.state, self.last_synced_at) {
            (PlaybackState::Playing, Some(synced)) => {
                let drift = now.saturating_duration_since(synced).as_secs() as u32;
                status.elapsed.saturating_add(drift).min(status.duration)
            }
            (PlaybackState::Stopped, _) => 0,
            _ => status.elapsed,
        }
    }
}

/// Where a result list came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResultSource {
    Search(String),
    Library { page: u32 },
}

/// Songs returned by a search or a library page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResults {
    pub source: ResultSource,
    pub songs: Vec<Song>,
}

impl SearchResults {
    pub fn title(&self) -> String {
        match &self.source {
            ResultSource::Search(query) => format!(" Results for \"{}\" ", query),
            ResultSource::Library { page } => format!(" Library (page {}) ", page),
        }
    }
}

/// What subscribers of the search controller observe
#[derive(Clone, Debug, Default)]
pub struct SearchSnapshot {
    pub results: Option<Arc<SearchResults>>,
    pub pending: Option<ResultSource>,
}

/// Refresh state machine phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    Refreshing,
    Faulted,
}

/// What subscribers of the sync engine observe
#[derive(Clone, Debug, Default)]
pub struct SyncSnapshot {
    pub state: Arc<PlayerState>,
    pub phase: SyncPhase,
    pub applied_seq: u64,
    pub last_fault: Option<String>,
}

/// Which section of the UI is currently active/focused
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ActiveSection {
    Search,
    #[default]
    Playlist,
    Results,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Playlist,
            ActiveSection::Playlist => ActiveSection::Results,
            ActiveSection::Results => ActiveSection::Search,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Results,
            ActiveSection::Playlist => ActiveSection::Search,
            ActiveSection::Results => ActiveSection::Playlist,
        }
    }
}

/// UI state for the application
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub search_query: String,
    pub playlist_selected: usize,
    pub results_selected: usize,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub show_help_popup: bool,
}
