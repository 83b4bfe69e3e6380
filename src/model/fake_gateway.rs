//! Scripted in-memory gateway for tests
//!
//! Commands are recorded when they return, reads when they start, so the
//! call log shows whether a read began before a command finished.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::oneshot;

use crate::error::{ClientError, Result};
use super::player_client::{PlayerGateway, validate_seek, validate_song_id};
use super::types::SongId;

struct Reply {
    gate: Option<oneshot::Receiver<()>>,
    result: Result<Value>,
}

#[derive(Default)]
pub struct FakeGateway {
    calls: Mutex<Vec<String>>,
    status_replies: Mutex<VecDeque<Reply>>,
    search_replies: Mutex<VecDeque<Reply>>,
    command_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    command_error: Mutex<Option<ClientError>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|call| call.as_str() == name).count()
    }

    pub fn push_status(&self, result: Result<Value>) {
        self.status_replies.lock().unwrap().push_back(Reply { gate: None, result });
    }

    /// Queue a status reply that is held until the returned sender fires.
    pub fn push_gated_status(&self, result: Result<Value>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.status_replies.lock().unwrap().push_back(Reply { gate: Some(rx), result });
        tx
    }

    pub fn push_search(&self, result: Result<Value>) {
        self.search_replies.lock().unwrap().push_back(Reply { gate: None, result });
    }

    pub fn push_gated_search(&self, result: Result<Value>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.search_replies.lock().unwrap().push_back(Reply { gate: Some(rx), result });
        tx
    }

    /// Hold the next command until the returned sender fires.
    pub fn gate_next_command(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.command_gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn fail_commands(&self, error: ClientError) {
        *self.command_error.lock().unwrap() = Some(error);
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    async fn command(&self, call: String) -> Result<()> {
        let gate = self.command_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.record(call);
        match self.command_error.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn read(&self, call: String, replies: &Mutex<VecDeque<Reply>>) -> Result<Value> {
        self.record(call);
        let reply = replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply { gate, result }) => {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                result
            }
            None => Ok(json!({})),
        }
    }
}

#[async_trait]
impl PlayerGateway for FakeGateway {
    async fn play(&self) -> Result<()> {
        self.command("play".to_string()).await
    }

    async fn pause(&self) -> Result<()> {
        self.command("pause".to_string()).await
    }

    async fn stop(&self) -> Result<()> {
        self.command("stop".to_string()).await
    }

    async fn next(&self) -> Result<()> {
        self.command("next".to_string()).await
    }

    async fn previous(&self) -> Result<()> {
        self.command("previous".to_string()).await
    }

    async fn seek(&self, position_seconds: i64) -> Result<()> {
        let seconds = validate_seek(position_seconds)?;
        self.command(format!("seek:{}", seconds)).await
    }

    async fn queue(&self, song_id: SongId) -> Result<()> {
        let song_id = validate_song_id(song_id)?;
        self.command(format!("queue:{}", song_id)).await
    }

    async fn fetch_status(&self) -> Result<Value> {
        self.read("status".to_string(), &self.status_replies).await
    }

    async fn search(&self, query: &str) -> Result<Value> {
        self.read(format!("search:{}", query), &self.search_replies).await
    }

    async fn library_page(&self, page: u32) -> Result<Value> {
        self.read(format!("library:{}", page), &self.search_replies).await
    }
}
