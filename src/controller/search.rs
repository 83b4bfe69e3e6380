//! Catalog search and library browsing
//!
//! Searches and library pages share one sequence space, separate from the
//! refresh sequence. Only the most recently issued request may land: starting
//! a new one clears the shown results, and anything older is dropped when it
//! arrives.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use crate::error::{ClientError, Result};
use crate::model::{PlayerGateway, ResultSource, SearchResults, SearchSnapshot, Song, SongId, parse_songs};
use super::dispatch::{Command, CommandDispatcher, Dispatched};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Applied { seq: u64, count: usize },
    Superseded { seq: u64 },
}

pub struct SearchController {
    gateway: Arc<dyn PlayerGateway>,
    dispatcher: Arc<CommandDispatcher>,
    issued: AtomicU64,
    snapshot: watch::Sender<SearchSnapshot>,
}

impl SearchController {
    pub fn new(gateway: Arc<dyn PlayerGateway>, dispatcher: Arc<CommandDispatcher>) -> Self {
        let (snapshot, _) = watch::channel(SearchSnapshot::default());
        Self {
            gateway,
            dispatcher,
            issued: AtomicU64::new(0),
            snapshot,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Query the catalog. Blank queries are rejected without a request.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ClientError::InvalidArgument("search query cannot be empty".to_string()));
        }

        let source = ResultSource::Search(query.to_string());
        let seq = self.begin(source.clone());
        tracing::debug!(seq, query, "Search started");

        let result = self.gateway.search(query).await.and_then(parse_songs);
        self.complete(seq, source, result)
    }

    /// Load one page (1-based) of the daemon's song library.
    pub async fn browse(&self, page: u32) -> Result<SearchOutcome> {
        if page == 0 {
            return Err(ClientError::InvalidArgument("library pages start at 1".to_string()));
        }

        let source = ResultSource::Library { page };
        let seq = self.begin(source.clone());
        tracing::debug!(seq, page, "Library page requested");

        let result = self.gateway.library_page(page).await.and_then(parse_songs);
        self.complete(seq, source, result)
    }

    /// Drop the shown results and anything still in flight.
    pub fn dismiss(&self) {
        self.issued.fetch_add(1, Ordering::SeqCst);
        self.snapshot.send_if_modified(|snap| {
            let changed = snap.results.is_some() || snap.pending.is_some();
            snap.results = None;
            snap.pending = None;
            changed
        });
    }

    /// Queue a result through the regular command path.
    pub async fn queue_result(&self, song_id: SongId) -> Result<Dispatched> {
        self.dispatcher.execute(Command::Queue(song_id)).await
    }

    fn begin(&self, source: ResultSource) -> u64 {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.snapshot.send_modify(|snap| {
            snap.results = None;
            snap.pending = Some(source);
        });
        seq
    }

    fn complete(&self, seq: u64, source: ResultSource, result: Result<Vec<Song>>) -> Result<SearchOutcome> {
        let mut outcome = SearchOutcome::Superseded { seq };
        let mut failure = None;

        self.snapshot.send_if_modified(|snap| {
            if seq != self.issued.load(Ordering::SeqCst) {
                return false;
            }
            snap.pending = None;
            match result {
                Ok(songs) => {
                    outcome = SearchOutcome::Applied { seq, count: songs.len() };
                    snap.results = Some(Arc::new(SearchResults { source, songs }));
                }
                Err(error) => failure = Some(error),
            }
            true
        });

        if let Some(error) = failure {
            tracing::warn!(seq, error = %error, "Search failed");
            return Err(error);
        }
        match &outcome {
            SearchOutcome::Applied { seq, count } => tracing::info!(seq, count, "Search results received"),
            SearchOutcome::Superseded { seq } => tracing::debug!(seq, "Search superseded, result dropped"),
        }
        Ok(outcome)
    }
}
