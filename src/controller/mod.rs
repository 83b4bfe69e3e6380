//! Controller module - Application logic and event handling
//!
//! - `sync`: Sequence-numbered refresh of the player state
//! - `dispatch`: Transport commands and the post-command refresh
//! - `search`: Catalog search and library browsing
//! - `input`: Key event handling

mod sync;
mod dispatch;
mod search;
mod input;

use std::sync::Arc;
use std::time::Instant;

pub use dispatch::CommandDispatcher;
use dispatch::Dispatched;
pub use search::{SearchController, SearchOutcome};
pub use sync::{RefreshOutcome, SyncEngine};

use crate::error::{ClientError, Result};
use crate::model::{ActiveSection, AppModel, ResultSource, Song};

/// Glue between key presses and the core. Every remote call runs in its own
/// task so the render loop never waits on the network.
#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<AppModel>,
    pub(crate) engine: Arc<SyncEngine>,
    pub(crate) dispatcher: Arc<CommandDispatcher>,
    pub(crate) search: Arc<SearchController>,
    seek_step: u32,
}

impl AppController {
    pub fn new(
        model: Arc<AppModel>,
        engine: Arc<SyncEngine>,
        dispatcher: Arc<CommandDispatcher>,
        search: Arc<SearchController>,
        seek_step: u32,
    ) -> Self {
        Self {
            model,
            engine,
            dispatcher,
            search,
            seek_step,
        }
    }

    /// Send a named transport command in the background.
    pub fn run_command(&self, name: &'static str, argument: Option<String>) {
        let dispatcher = self.dispatcher.clone();
        let model = self.model.clone();
        tokio::spawn(async move {
            let dispatched = dispatcher.dispatch(name, argument.as_deref()).await;
            Self::settle(&model, name, dispatched).await;
        });
    }

    /// Seek relative to the interpolated position. Clamped at the start of
    /// the song.
    pub fn seek_relative(&self, forward: bool) {
        let state = self.engine.state();
        let elapsed = i64::from(state.estimated_elapsed(Instant::now()));
        let step = i64::from(self.seek_step);
        let target = if forward { elapsed + step } else { (elapsed - step).max(0) };
        self.run_command("seek", Some(target.to_string()));
    }

    /// Refresh on request. Unlike a poll, a failure here is shown.
    pub fn refresh_now(&self) {
        tracing::debug!(phase = ?self.engine.phase(), "Manual refresh requested");
        let refresh = self.engine.request_refresh();
        let model = self.model.clone();
        tokio::spawn(async move {
            let Ok(outcome) = refresh.await else {
                return;
            };
            tracing::debug!(seq = outcome.seq(), "Manual refresh finished");
            if let RefreshOutcome::Faulted { error, .. } = outcome {
                model.set_error(Self::format_error(&error)).await;
            }
        });
    }

    pub fn perform_search(&self, query: String) {
        let search = self.search.clone();
        let model = self.model.clone();
        tokio::spawn(async move {
            let outcome = search.search(&query).await;
            Self::show_results(&model, outcome).await;
        });
    }

    pub fn browse(&self, page: u32) {
        let search = self.search.clone();
        let model = self.model.clone();
        tokio::spawn(async move {
            let outcome = search.browse(page).await;
            Self::show_results(&model, outcome).await;
        });
    }

    /// Step through library pages from whatever page is shown.
    pub fn browse_relative(&self, forward: bool) {
        let current = match self.search.snapshot().results.as_deref().map(|r| &r.source) {
            Some(ResultSource::Library { page }) => *page,
            _ => 0,
        };
        let page = if forward { current + 1 } else { current.saturating_sub(1).max(1) };
        self.browse(page);
    }

    async fn show_results(model: &AppModel, outcome: Result<SearchOutcome>) {
        match outcome {
            Ok(SearchOutcome::Applied { .. }) => {
                model.reset_results_selection().await;
                model.set_active_section(ActiveSection::Results).await;
            }
            Ok(SearchOutcome::Superseded { .. }) => {}
            Err(e) => model.set_error(Self::format_error(&e)).await,
        }
    }

    pub async fn queue_selected_result(&self) {
        let selected = self.model.get_ui_state().await.results_selected;
        let song = self
            .search
            .snapshot()
            .results
            .and_then(|results| results.songs.get(selected).cloned())
            .filter(Song::is_known);

        let Some(song) = song else {
            return;
        };

        let search = self.search.clone();
        let model = self.model.clone();
        tokio::spawn(async move {
            tracing::debug!(song_id = song.id, title = %song.title, "Queueing search result");
            let dispatched = search.queue_result(song.id).await;
            Self::settle(&model, "queue", dispatched).await;
        });
    }

    /// Surface a failed command, otherwise wait for the refresh it triggered.
    async fn settle(model: &AppModel, name: &str, dispatched: Result<Dispatched>) {
        let Dispatched { command, result, refresh } = match dispatched {
            Ok(dispatched) => dispatched,
            Err(e) => return Self::report(model, name, &e).await,
        };
        if let Err(e) = result {
            Self::report(model, command.name(), &e).await;
        }
        if let Ok(outcome) = refresh.await {
            tracing::trace!(%command, seq = outcome.seq(), "Post-command refresh finished");
        }
    }

    async fn report(model: &AppModel, command: &str, error: &ClientError) {
        if error.is_remote() {
            tracing::warn!(command, error = %error, "Command failed at the daemon");
        } else {
            tracing::debug!(command, error = %error, "Command rejected locally");
        }
        model.set_error(Self::format_error(error)).await;
    }

    pub(crate) fn format_error(error: &ClientError) -> String {
        match error {
            ClientError::Transport(msg) if msg.contains("404") => {
                "The daemon does not know that action (404).".to_string()
            }
            ClientError::Transport(msg) if msg.to_lowercase().contains("connect") => {
                "Cannot reach the Juicebox daemon. Is it running?".to_string()
            }
            ClientError::Transport(msg) => format!("Request failed: {}", msg),
            ClientError::MalformedResponse(msg) => format!("Unexpected reply from daemon: {}", msg),
            ClientError::InvalidArgument(msg) => format!("Not sent: {}", msg),
            ClientError::UnknownCommand(name) => format!("Unknown command \"{}\"", name),
        }
    }
}
