//! Keeps the local [`PlayerState`] in step with the daemon
//!
//! Every trigger (startup, poll tick, post-command, explicit request) goes
//! through [`SyncEngine::begin_refresh`], which hands out a sequence number at
//! initiation time. A completion is applied only if its number is higher than
//! the last applied one, so a slow poll can never overwrite the state fetched
//! by a faster, later refresh. Superseded completions are dropped silently.
//!
//! The current [`SyncSnapshot`] lives in a `watch` channel: applying a result
//! is a single whole-value swap, and subscribers see either the old snapshot
//! or the new one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::Local;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::{ClientError, Result};
use crate::model::{PlayerGateway, PlayerState, SyncPhase, SyncSnapshot, parse_status};

/// How a single refresh attempt ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Result became the current state
    Applied { seq: u64 },
    /// A later-initiated refresh was already applied
    Superseded { seq: u64 },
    /// Fetch or parse failed; state kept at its last good value
    Faulted { seq: u64, error: ClientError },
}

impl RefreshOutcome {
    pub fn seq(&self) -> u64 {
        match self {
            Self::Applied { seq } | Self::Superseded { seq } | Self::Faulted { seq, .. } => *seq,
        }
    }
}

pub struct SyncEngine {
    gateway: Arc<dyn PlayerGateway>,
    issued: AtomicU64,
    /// Highest sequence that has come back, applied, faulted or dropped
    completed: AtomicU64,
    snapshot: watch::Sender<SyncSnapshot>,
}

impl SyncEngine {
    pub fn new(gateway: Arc<dyn PlayerGateway>) -> Arc<Self> {
        let (snapshot, _) = watch::channel(SyncSnapshot::default());
        Arc::new(Self {
            gateway,
            issued: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            snapshot,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot> {
        self.snapshot.subscribe()
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> SyncSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn state(&self) -> Arc<PlayerState> {
        self.snapshot.borrow().state.clone()
    }

    pub fn phase(&self) -> SyncPhase {
        self.snapshot.borrow().phase
    }

    /// Highest sequence number handed out so far
    pub fn latest_issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Allocate the next sequence number and mark the engine busy.
    ///
    /// A faulted engine stays faulted until a refresh succeeds.
    pub fn begin_refresh(&self) -> u64 {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.snapshot.send_if_modified(|snap| {
            if snap.phase == SyncPhase::Idle {
                snap.phase = SyncPhase::Refreshing;
                true
            } else {
                false
            }
        });
        tracing::trace!(seq, "Refresh started");
        seq
    }

    /// Apply or drop the result of refresh `seq`.
    ///
    /// A success settles to Idle once nothing newer than every completed
    /// refresh is still out, even if a newer refresh failed first.
    pub fn complete_refresh(&self, seq: u64, result: Result<PlayerState>) -> RefreshOutcome {
        let mut outcome = RefreshOutcome::Superseded { seq };

        self.snapshot.send_if_modified(|snap| {
            // read under the channel lock so a concurrent begin_refresh is seen
            let latest = self.latest_issued();
            let completed = self.completed.fetch_max(seq, Ordering::SeqCst).max(seq);
            if seq <= snap.applied_seq {
                return false;
            }
            match result {
                Ok(mut state) => {
                    state.last_synced_at = Some(Instant::now());
                    state.synced_at_wall = Some(Local::now());
                    snap.state = Arc::new(state);
                    snap.applied_seq = seq;
                    snap.last_fault = None;
                    snap.phase = if completed >= latest {
                        SyncPhase::Idle
                    } else {
                        SyncPhase::Refreshing
                    };
                    outcome = RefreshOutcome::Applied { seq };
                }
                Err(error) => {
                    snap.phase = SyncPhase::Faulted;
                    snap.last_fault = Some(error.to_string());
                    outcome = RefreshOutcome::Faulted { seq, error };
                }
            }
            true
        });

        match &outcome {
            RefreshOutcome::Applied { seq } => tracing::trace!(seq, "Refresh applied"),
            RefreshOutcome::Superseded { seq } => tracing::debug!(seq, "Refresh superseded, result dropped"),
            RefreshOutcome::Faulted { seq, error } => {
                tracing::warn!(seq, error = %error, "Refresh failed, keeping last known state")
            }
        }
        outcome
    }

    async fn run_refresh(&self, seq: u64) -> RefreshOutcome {
        let result = match self.gateway.fetch_status().await {
            Ok(raw) => parse_status(raw),
            Err(e) => Err(e),
        };
        self.complete_refresh(seq, result)
    }

    /// Refresh and wait for the outcome.
    pub async fn refresh(&self) -> RefreshOutcome {
        let seq = self.begin_refresh();
        self.run_refresh(seq).await
    }

    /// First refresh at startup. Callers await it before drawing anything.
    pub async fn bootstrap(&self) -> RefreshOutcome {
        tracing::info!("Bootstrapping player state");
        let outcome = self.refresh().await;
        if let RefreshOutcome::Applied { .. } = outcome {
            let state = self.state();
            tracing::info!(
                state = state.status.state.label(),
                playlist_len = state.playlist.len(),
                "Initial player state loaded"
            );
        }
        outcome
    }

    /// Start a refresh without waiting for it. The sequence number is taken
    /// now, so ordering follows the order of requests, not of completions.
    pub fn request_refresh(self: &Arc<Self>) -> JoinHandle<RefreshOutcome> {
        let seq = self.begin_refresh();
        let engine = Arc::clone(self);
        tokio::spawn(async move { engine.run_refresh(seq).await })
    }

    /// Request a refresh every `period`. Each tick spawns its own refresh, so
    /// one stuck request never delays the next tick.
    pub fn spawn_poller(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // the first tick fires immediately and bootstrap already covered it
            ticker.tick().await;
            tracing::debug!(period_ms = period.as_millis() as u64, "Status poller started");
            loop {
                ticker.tick().await;
                drop(engine.request_refresh());
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FakeGateway, PlaybackState};
    use serde_json::json;

    fn engine_with(gateway: &Arc<FakeGateway>) -> Arc<SyncEngine> {
        let gateway: Arc<dyn PlayerGateway> = gateway.clone();
        SyncEngine::new(gateway)
    }

    fn state_with_elapsed(elapsed: u32) -> PlayerState {
        let mut state = PlayerState::default();
        state.status.state = PlaybackState::Playing;
        state.status.elapsed = elapsed;
        state.status.duration = 1000;
        state
    }

    fn payload(song_id: i64) -> serde_json::Value {
        json!({"state": "play", "elapsed": 1, "duration": 100, "songid": song_id})
    }

    async fn settle(gateway: &FakeGateway, reads: usize) {
        while gateway.count("status") < reads {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn later_initiated_refresh_wins_when_it_lands_first() {
        let engine = engine_with(&FakeGateway::new());

        let first = engine.begin_refresh();
        let second = engine.begin_refresh();
        assert_eq!((first, second), (1, 2));

        assert_eq!(
            engine.complete_refresh(second, Ok(state_with_elapsed(2))),
            RefreshOutcome::Applied { seq: 2 }
        );
        assert_eq!(
            engine.complete_refresh(first, Ok(state_with_elapsed(1))),
            RefreshOutcome::Superseded { seq: 1 }
        );

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.applied_seq, 2);
        assert_eq!(snapshot.state.status.elapsed, 2);
        assert_eq!(snapshot.phase, SyncPhase::Idle);
    }

    #[test]
    fn in_order_completions_all_apply() {
        let engine = engine_with(&FakeGateway::new());

        let first = engine.begin_refresh();
        let second = engine.begin_refresh();

        assert_eq!(
            engine.complete_refresh(first, Ok(state_with_elapsed(1))),
            RefreshOutcome::Applied { seq: 1 }
        );
        // a newer refresh is still out
        assert_eq!(engine.phase(), SyncPhase::Refreshing);

        assert_eq!(
            engine.complete_refresh(second, Ok(state_with_elapsed(2))),
            RefreshOutcome::Applied { seq: 2 }
        );
        assert_eq!(engine.phase(), SyncPhase::Idle);
        assert_eq!(engine.state().status.elapsed, 2);
    }

    fn permutations(items: Vec<u64>) -> Vec<Vec<u64>> {
        if items.len() <= 1 {
            return vec![items];
        }
        let mut out = Vec::new();
        for i in 0..items.len() {
            let mut rest = items.clone();
            let head = rest.remove(i);
            for mut tail in permutations(rest) {
                tail.insert(0, head);
                out.push(tail);
            }
        }
        out
    }

    #[test]
    fn applied_state_always_tracks_highest_completed_seq() {
        for order in permutations(vec![1, 2, 3, 4, 5]) {
            let engine = engine_with(&FakeGateway::new());
            for _ in 0..5 {
                engine.begin_refresh();
            }

            let mut highest = 0;
            for seq in order.iter().copied() {
                engine.complete_refresh(seq, Ok(state_with_elapsed(seq as u32)));
                highest = highest.max(seq);

                let snapshot = engine.snapshot();
                assert_eq!(snapshot.applied_seq, highest, "order {:?}", order);
                assert_eq!(snapshot.state.status.elapsed, highest as u32, "order {:?}", order);
            }
            assert_eq!(engine.phase(), SyncPhase::Idle);
        }
    }

    #[test]
    fn failure_keeps_state_and_heals_on_next_success() {
        let engine = engine_with(&FakeGateway::new());

        let seq = engine.begin_refresh();
        engine.complete_refresh(seq, Ok(state_with_elapsed(5)));
        let before = engine.state();

        let seq = engine.begin_refresh();
        let outcome = engine.complete_refresh(
            seq,
            Err(ClientError::MalformedResponse("elapsed is not numeric".into())),
        );
        assert!(matches!(outcome, RefreshOutcome::Faulted { seq: 2, .. }));

        let snapshot = engine.snapshot();
        assert!(Arc::ptr_eq(&before, &snapshot.state));
        assert_eq!(snapshot.phase, SyncPhase::Faulted);
        assert!(snapshot.last_fault.is_some());

        // still faulted while the next attempt is in flight
        let seq = engine.begin_refresh();
        assert_eq!(engine.phase(), SyncPhase::Faulted);

        engine.complete_refresh(seq, Ok(state_with_elapsed(6)));
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.phase, SyncPhase::Idle);
        assert!(snapshot.last_fault.is_none());
        assert_eq!(snapshot.state.status.elapsed, 6);
    }

    #[test]
    fn superseded_failure_is_dropped_silently() {
        let engine = engine_with(&FakeGateway::new());

        let stale = engine.begin_refresh();
        let fresh = engine.begin_refresh();
        engine.complete_refresh(fresh, Ok(state_with_elapsed(2)));

        let outcome = engine.complete_refresh(stale, Err(ClientError::Transport("timed out".into())));
        assert_eq!(outcome, RefreshOutcome::Superseded { seq: 1 });
        assert_eq!(engine.phase(), SyncPhase::Idle);
        assert!(engine.snapshot().last_fault.is_none());
    }

    #[test]
    fn older_success_after_newer_failure_settles_idle() {
        let engine = engine_with(&FakeGateway::new());

        let older = engine.begin_refresh();
        let newer = engine.begin_refresh();
        engine.complete_refresh(newer, Err(ClientError::Transport("connection reset".into())));
        assert_eq!(engine.phase(), SyncPhase::Faulted);

        let outcome = engine.complete_refresh(older, Ok(state_with_elapsed(5)));
        assert_eq!(outcome, RefreshOutcome::Applied { seq: 1 });
        assert_eq!(engine.phase(), SyncPhase::Idle);
        assert!(engine.snapshot().last_fault.is_none());
        assert_eq!(engine.state().status.elapsed, 5);
    }

    #[test]
    fn older_success_stays_busy_while_newer_is_out() {
        let engine = engine_with(&FakeGateway::new());

        let first = engine.begin_refresh();
        let second = engine.begin_refresh();
        let _third = engine.begin_refresh();
        engine.complete_refresh(second, Err(ClientError::Transport("timed out".into())));

        engine.complete_refresh(first, Ok(state_with_elapsed(1)));
        assert_eq!(engine.phase(), SyncPhase::Refreshing);
    }

    #[test]
    fn applied_state_is_stamped() {
        let engine = engine_with(&FakeGateway::new());
        assert!(engine.state().last_synced_at.is_none());

        let seq = engine.begin_refresh();
        engine.complete_refresh(seq, Ok(PlayerState::default()));

        let state = engine.state();
        assert!(state.last_synced_at.is_some());
        assert!(state.synced_at_wall.is_some());
    }

    #[tokio::test]
    async fn bootstrap_loads_state_before_returning() {
        let gateway = FakeGateway::new();
        gateway.push_status(Ok(json!({
            "state": "play",
            "elapsed": 42,
            "songid": 7,
            "playlist": [{"id": 7, "title": "A"}, {"id": 9, "title": "B"}]
        })));
        let engine = engine_with(&gateway);

        assert_eq!(engine.bootstrap().await, RefreshOutcome::Applied { seq: 1 });

        let state = engine.state();
        assert_eq!(state.status.current_song_id, 7);
        assert_eq!(state.playlist.len(), 2);
        assert_eq!(state.now_playing().map(|e| e.song.title.as_str()), Some("A"));
    }

    #[tokio::test]
    async fn bootstrap_failure_is_not_fatal() {
        let gateway = FakeGateway::new();
        gateway.push_status(Err(ClientError::Transport("connection refused".into())));
        let engine = engine_with(&gateway);

        let outcome = engine.bootstrap().await;
        assert!(matches!(outcome, RefreshOutcome::Faulted { .. }));
        assert_eq!(*engine.state(), PlayerState::default());
        assert_eq!(engine.phase(), SyncPhase::Faulted);
    }

    #[tokio::test]
    async fn slow_refresh_cannot_clobber_faster_later_one() {
        let gateway = FakeGateway::new();
        let release_first = gateway.push_gated_status(Ok(payload(1)));
        let release_second = gateway.push_gated_status(Ok(payload(2)));
        let engine = engine_with(&gateway);

        let first = engine.request_refresh();
        settle(&gateway, 1).await;
        let second = engine.request_refresh();
        settle(&gateway, 2).await;

        release_second.send(()).unwrap();
        assert_eq!(second.await.unwrap(), RefreshOutcome::Applied { seq: 2 });

        release_first.send(()).unwrap();
        assert_eq!(first.await.unwrap(), RefreshOutcome::Superseded { seq: 1 });

        assert_eq!(engine.state().status.current_song_id, 2);
    }

    #[tokio::test]
    async fn stuck_refresh_does_not_block_new_ones() {
        let gateway = FakeGateway::new();
        let _never = gateway.push_gated_status(Ok(payload(1)));
        gateway.push_status(Ok(payload(2)));
        let engine = engine_with(&gateway);

        let stuck = engine.request_refresh();
        settle(&gateway, 1).await;

        assert_eq!(engine.refresh().await, RefreshOutcome::Applied { seq: 2 });
        assert_eq!(engine.phase(), SyncPhase::Idle);
        assert!(!stuck.is_finished());
        stuck.abort();
    }

    #[tokio::test]
    async fn subscribers_see_applied_snapshots() {
        let gateway = FakeGateway::new();
        gateway.push_status(Ok(payload(3)));
        let engine = engine_with(&gateway);
        let mut rx = engine.subscribe();

        engine.request_refresh().await.unwrap();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().state.status.current_song_id, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn poller_survives_malformed_tick() {
        let gateway = FakeGateway::new();
        gateway.push_status(Ok(payload(1)));
        gateway.push_status(Ok(json!({"state": "play", "elapsed": "forty"})));
        gateway.push_status(Ok(payload(2)));
        let engine = engine_with(&gateway);

        let poller = engine.spawn_poller(Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let after_first = engine.state();
        assert_eq!(after_first.status.current_song_id, 1);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(Arc::ptr_eq(&after_first, &engine.state()));
        assert_eq!(engine.phase(), SyncPhase::Faulted);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(engine.state().status.current_song_id, 2);
        assert_eq!(engine.phase(), SyncPhase::Idle);
        assert_eq!(gateway.count("status"), 3);

        poller.abort();
    }
}
