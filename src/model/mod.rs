//! Model module - Application state and data types
//!
//! - `types`: Core type definitions (songs, player status, snapshots, UI state)
//! - `status`: Parsing of raw daemon payloads
//! - `player_client`: Gateway to the daemon's REST API
//! - `app_model`: View-side state shared between the controller and the render loop

mod types;
mod status;
mod player_client;
mod app_model;
#[cfg(test)]
mod fake_gateway;

pub use types::{
    ActiveSection, PlaybackState, PlayerState, ResultSource, SearchResults, SearchSnapshot,
    Song, SongId, SyncPhase, SyncSnapshot, UiState,
};

#[cfg(test)]
pub use types::{PlayerStatus, PlaylistEntry};

pub use status::{parse_songs, parse_status};

pub use player_client::{HttpPlayerClient, PlayerGateway, validate_seek, validate_song_id};

pub use app_model::AppModel;

#[cfg(test)]
pub use fake_gateway::FakeGateway;
