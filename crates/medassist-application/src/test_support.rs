//! Stub sessions for view-model and surface tests.

use async_trait::async_trait;
use medassist_core::SessionError;
use medassist_core::session::GenerativeSession;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, Notify};

/// Replies from a fixed script and records every submitted text.
pub struct ScriptedSession {
    script: Mutex<VecDeque<Result<String, SessionError>>>,
    calls: Mutex<Vec<String>>,
    resets: AtomicUsize,
}

impl ScriptedSession {
    pub fn new(script: Vec<Result<String, SessionError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            resets: AtomicUsize::new(0),
        }
    }

    pub fn replying<'a>(replies: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(replies.into_iter().map(|r| Ok(r.to_string())).collect())
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    /// How many times the context was reset.
    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeSession for ScriptedSession {
    async fn submit(&self, text: &str) -> Result<String, SessionError> {
        self.calls.lock().await.push(text.to_string());
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(SessionError::backend("script exhausted")))
    }

    async fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

/// Holds every request until [`release`](Self::release) is called.
pub struct GatedSession {
    reply: String,
    started: Notify,
    gate: Notify,
}

impl GatedSession {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            started: Notify::new(),
            gate: Notify::new(),
        }
    }

    /// Resolves once a request has reached the session.
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl GenerativeSession for GatedSession {
    async fn submit(&self, _text: &str) -> Result<String, SessionError> {
        self.started.notify_one();
        self.gate.notified().await;
        Ok(self.reply.clone())
    }
}
