//! Transport commands and their dispatch
//!
//! A command runs to completion against the daemon before exactly one
//! refresh is requested, whether the command worked or not. The view then
//! shows what the daemon reports rather than what we assume happened.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::error::{ClientError, Result};
use crate::model::{PlayerGateway, SongId, validate_seek, validate_song_id};
use super::sync::{RefreshOutcome, SyncEngine};

/// The closed set of transport commands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Play,
    Pause,
    Stop,
    Next,
    Previous,
    Seek(u32),
    Queue(SongId),
}

impl Command {
    pub const NAMES: [&'static str; 7] = ["play", "pause", "stop", "next", "previous", "seek", "queue"];

    /// Resolve a command name and its optional argument. Unknown names and
    /// bad arguments are rejected here, before anything is sent.
    pub fn parse(name: &str, argument: Option<&str>) -> Result<Self> {
        let command = match name.trim().to_ascii_lowercase().as_str() {
            "play" => Command::Play,
            "pause" => Command::Pause,
            "stop" => Command::Stop,
            "next" => Command::Next,
            "previous" => Command::Previous,
            "seek" => {
                let seconds = integer_argument("seek", argument)?;
                Command::Seek(validate_seek(seconds)?)
            }
            "queue" => {
                let song_id = integer_argument("queue", argument)?;
                Command::Queue(validate_song_id(song_id)?)
            }
            _ => return Err(ClientError::UnknownCommand(name.to_string())),
        };
        Ok(command)
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::Play => "play",
            Command::Pause => "pause",
            Command::Stop => "stop",
            Command::Next => "next",
            Command::Previous => "previous",
            Command::Seek(_) => "seek",
            Command::Queue(_) => "queue",
        }
    }

    fn validate(self) -> Result<Self> {
        if let Command::Queue(song_id) = self {
            validate_song_id(song_id)?;
        }
        Ok(self)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Seek(seconds) => write!(f, "seek {}s", seconds),
            Command::Queue(song_id) => write!(f, "queue song {}", song_id),
            other => f.write_str(other.name()),
        }
    }
}

fn integer_argument(command: &str, argument: Option<&str>) -> Result<i64> {
    let raw = argument
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| ClientError::InvalidArgument(format!("{} needs an argument", command)))?;
    raw.parse::<i64>()
        .map_err(|_| ClientError::InvalidArgument(format!("{} expects an integer, got {:?}", command, raw)))
}

/// A command that reached the daemon, plus the refresh it triggered
pub struct Dispatched {
    pub command: Command,
    pub result: Result<()>,
    pub refresh: JoinHandle<RefreshOutcome>,
}

pub struct CommandDispatcher {
    gateway: Arc<dyn PlayerGateway>,
    engine: Arc<SyncEngine>,
}

impl CommandDispatcher {
    pub fn new(gateway: Arc<dyn PlayerGateway>, engine: Arc<SyncEngine>) -> Self {
        Self { gateway, engine }
    }

    /// Dispatch by name, e.g. `dispatch("seek", Some("90"))`.
    pub async fn dispatch(&self, name: &str, argument: Option<&str>) -> Result<Dispatched> {
        let command = Command::parse(name, argument).inspect_err(|e| {
            tracing::warn!(command = name, known = ?Command::NAMES, error = %e, "Command rejected");
        })?;
        self.execute(command).await
    }

    /// Run a typed command, then request one refresh.
    pub async fn execute(&self, command: Command) -> Result<Dispatched> {
        let command = command.validate()?;
        tracing::debug!(%command, "Dispatching command");

        let result = match command {
            Command::Play => self.gateway.play().await,
            Command::Pause => self.gateway.pause().await,
            Command::Stop => self.gateway.stop().await,
            Command::Next => self.gateway.next().await,
            Command::Previous => self.gateway.previous().await,
            Command::Seek(seconds) => self.gateway.seek(i64::from(seconds)).await,
            Command::Queue(song_id) => self.gateway.queue(song_id).await,
        };

        match &result {
            Ok(()) => tracing::info!(%command, "Command completed"),
            Err(e) => tracing::error!(%command, error = %e, "Command failed"),
        }

        let refresh = self.engine.request_refresh();
        Ok(Dispatched { command, result, refresh })
    }
}
