//! Translation of raw daemon payloads into the player model
//!
//! The daemon relays MPD, so numeric fields show up either as JSON numbers or
//! as numeric strings (`"42.318"`). Missing fields fall back to the documented
//! sentinels; a field that is present but cannot be read is a
//! [`ClientError::MalformedResponse`].

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ClientError, Result};
use super::types::{NO_SONG, PlaybackState, PlayerState, PlayerStatus, PlaylistEntry, Song, SongId, UNKNOWN};

#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Numeric {
    fn to_i64(&self, field: &str) -> Result<i64> {
        match self {
            Numeric::Int(value) => Ok(*value),
            Numeric::Float(value) => float_to_i64(*value, field),
            Numeric::Text(text) => {
                let text = text.trim();
                match text.parse::<i64>() {
                    Ok(value) => Ok(value),
                    Err(_) => {
                        let value = text.parse::<f64>().map_err(|_| {
                            ClientError::MalformedResponse(format!("{} is not numeric: {:?}", field, text))
                        })?;
                        float_to_i64(value, field)
                    }
                }
            }
        }
    }
}

fn float_to_i64(value: f64, field: &str) -> Result<i64> {
    if value.is_finite() {
        Ok(value.trunc() as i64)
    } else {
        Err(ClientError::MalformedResponse(format!("{} is not finite", field)))
    }
}

fn seconds(value: &Numeric, field: &str) -> Result<u32> {
    let raw = value.to_i64(field)?;
    u32::try_from(raw)
        .map_err(|_| ClientError::MalformedResponse(format!("{} out of range: {}", field, raw)))
}

fn song_id(value: Option<&Numeric>, field: &str) -> Result<SongId> {
    match value {
        Some(value) => Ok(value.to_i64(field)?.max(NO_SONG)),
        None => Ok(NO_SONG),
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawSong {
    id: Option<Numeric>,
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    genre: Option<String>,
}

impl RawSong {
    fn into_song(self) -> Result<Song> {
        let text = |value: Option<String>| value.unwrap_or_else(|| UNKNOWN.to_string());
        Ok(Song {
            id: song_id(self.id.as_ref(), "id")?,
            title: text(self.title),
            artist: text(self.artist),
            album: text(self.album),
            genre: text(self.genre),
        })
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawStatus {
    state: Option<String>,
    elapsed: Option<Numeric>,
    duration: Option<Numeric>,
    time: Option<Numeric>,
    songid: Option<Numeric>,
    playlist: Option<Vec<RawSong>>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawSongList {
    songs: Option<Vec<RawSong>>,
}

fn playback_state(value: Option<&str>) -> Result<PlaybackState> {
    match value.map(str::trim) {
        None => Ok(PlaybackState::Stopped),
        Some("play") | Some("playing") => Ok(PlaybackState::Playing),
        Some("pause") | Some("paused") => Ok(PlaybackState::Paused),
        Some("stop") | Some("stopped") => Ok(PlaybackState::Stopped),
        Some(other) => Err(ClientError::MalformedResponse(format!("unknown player state {:?}", other))),
    }
}

/// MPD's `time` is `"elapsed:total"`; a plain number is taken as the total.
fn duration_from_time(value: &Numeric) -> Result<u32> {
    if let Numeric::Text(text) = value {
        if let Some((_, total)) = text.split_once(':') {
            return seconds(&Numeric::Text(total.to_string()), "time");
        }
    }
    seconds(value, "time")
}

fn decode<T: for<'de> Deserialize<'de>>(raw: Value, what: &str) -> Result<T> {
    serde_json::from_value(raw)
        .map_err(|e| ClientError::MalformedResponse(format!("{} payload: {}", what, e)))
}

/// Parse a `/api/player/status` payload. The result is unstamped:
/// `last_synced_at` is set by whoever applies it.
pub fn parse_status(raw: Value) -> Result<PlayerState> {
    let raw: RawStatus = decode(raw, "status")?;

    let state = playback_state(raw.state.as_deref())?;
    let elapsed = raw.elapsed.as_ref().map(|v| seconds(v, "elapsed")).transpose()?;
    let duration = match (&raw.duration, &raw.time) {
        (Some(duration), _) => Some(seconds(duration, "duration")?),
        (None, Some(time)) => Some(duration_from_time(time)?),
        (None, None) => None,
    };

    let elapsed = elapsed.unwrap_or(0);
    // an unreported total never reads as shorter than what already played
    let duration = duration.unwrap_or(elapsed);
    let elapsed = match state {
        PlaybackState::Stopped => 0,
        _ => elapsed.min(duration),
    };

    let playlist = raw
        .playlist
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(position, song)| -> Result<PlaylistEntry> {
            Ok(PlaylistEntry { position, song: song.into_song()? })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PlayerState {
        status: PlayerStatus {
            state,
            elapsed,
            duration,
            current_song_id: song_id(raw.songid.as_ref(), "songid")?,
        },
        playlist,
        last_synced_at: None,
        synced_at_wall: None,
    })
}

/// Parse the `songs` array shared by `/api/search` and `/api/songs`.
pub fn parse_songs(raw: Value) -> Result<Vec<Song>> {
    let raw: RawSongList = decode(raw, "song list")?;
    raw.songs
        .unwrap_or_default()
        .into_iter()
        .map(RawSong::into_song)
        .collect()
}
