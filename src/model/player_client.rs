//! HTTP gateway to the Juicebox daemon
//!
//! One request per operation, no retries and no caching. Commands report
//! success or failure only; reads hand back the raw JSON for the parser.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::{log_api_request, log_api_result};
use super::types::SongId;

/// Remote operations the client depends on. Every command is a remote
/// mutation; idempotence is up to the daemon.
#[async_trait]
pub trait PlayerGateway: Send + Sync {
    async fn play(&self) -> Result<()>;
    async fn pause(&self) -> Result<()>;
    async fn stop(&self) -> Result<()>;
    async fn next(&self) -> Result<()>;
    async fn previous(&self) -> Result<()>;
    async fn seek(&self, position_seconds: i64) -> Result<()>;
    async fn queue(&self, song_id: SongId) -> Result<()>;

    /// Raw status + playlist payload
    async fn fetch_status(&self) -> Result<Value>;

    /// Raw `{songs: [...]}` payload for a catalog query
    async fn search(&self, query: &str) -> Result<Value>;

    /// Raw `{page, songs: [...]}` payload for one library page (1-based)
    async fn library_page(&self, page: u32) -> Result<Value>;
}

/// Reject seek targets the daemon cannot take.
pub fn validate_seek(position_seconds: i64) -> Result<u32> {
    u32::try_from(position_seconds).map_err(|_| {
        ClientError::InvalidArgument(format!("seek position must be a non-negative second count, got {}", position_seconds))
    })
}

/// Reject the "no song" sentinel and other negative ids.
pub fn validate_song_id(song_id: SongId) -> Result<SongId> {
    if song_id < 0 {
        return Err(ClientError::InvalidArgument(format!("cannot queue song id {}", song_id)));
    }
    Ok(song_id)
}

/// reqwest-backed gateway
#[derive(Clone)]
pub struct HttpPlayerClient {
    http: Client,
    base_url: String,
}

impl HttpPlayerClient {
    /// Build a client for `config.server_url`, which must already be validated.
    pub fn new(config: &Config) -> Result<Self> {
        let host = hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .unwrap_or_else(|| "unknown-host".to_string());

        let timeout = config.request_timeout();
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(std::time::Duration::from_secs(5)))
            .user_agent(format!("juicebox-rs/{} ({})", env!("CARGO_PKG_VERSION"), host))
            .build()?;

        Ok(Self {
            http,
            base_url: config.server_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        log_api_request!(path, query = ?query);

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Transport(format!("HTTP {} from {}", status.as_u16(), path)));
        }
        Ok(response)
    }

    async fn command(&self, path: &str, query: &[(&str, String)]) -> Result<()> {
        let result = self.get(path, query).await.map(|_| ());
        log_api_result!(path, result);
        result
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let result = match self.get(path, query).await {
            Ok(response) => response.json::<Value>().await.map_err(ClientError::from),
            Err(e) => Err(e),
        };
        // the caller decides how loud a failed read is
        if let Err(e) = &result {
            tracing::debug!(path, error = %e, "API read failed");
        }
        result
    }
}

#[async_trait]
impl PlayerGateway for HttpPlayerClient {
    async fn play(&self) -> Result<()> {
        self.command("/api/player/play", &[]).await
    }

    async fn pause(&self) -> Result<()> {
        self.command("/api/player/pause", &[]).await
    }

    async fn stop(&self) -> Result<()> {
        self.command("/api/player/stop", &[]).await
    }

    async fn next(&self) -> Result<()> {
        self.command("/api/player/next", &[]).await
    }

    async fn previous(&self) -> Result<()> {
        self.command("/api/player/previous", &[]).await
    }

    async fn seek(&self, position_seconds: i64) -> Result<()> {
        let seconds = validate_seek(position_seconds)?;
        self.command("/api/player/seek", &[("ts", seconds.to_string())]).await
    }

    async fn queue(&self, song_id: SongId) -> Result<()> {
        let song_id = validate_song_id(song_id)?;
        self.command("/api/player/queue/song", &[("song", song_id.to_string())]).await
    }

    async fn fetch_status(&self) -> Result<Value> {
        self.get_json("/api/player/status", &[]).await
    }

    async fn search(&self, query: &str) -> Result<Value> {
        self.get_json("/api/search", &[("query", query.to_string())]).await
    }

    async fn library_page(&self, page: u32) -> Result<Value> {
        self.get_json("/api/songs", &[("page", page.to_string())]).await
    }
}
