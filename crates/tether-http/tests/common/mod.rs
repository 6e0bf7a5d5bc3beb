//! Shared test doubles.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::time::Instant;

use tether_core::{OutgoingRequest, RawResponse, SessionListener, Transport, TransportError};

type Outcome = Result<RawResponse, TransportError>;

/// A transport that answers from per-URL scripts and records every request.
///
/// Each URL suffix has a queue of outcomes. The last outcome in a queue
/// repeats once the others are used up.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Outcome>>>,
    sent: Mutex<Vec<(OutgoingRequest, Instant)>>,
    sessions_cleared: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, path: &str, outcomes: Vec<Outcome>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(path.to_string(), outcomes.into());
        self
    }

    pub fn sent(&self) -> Vec<(OutgoingRequest, Instant)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(req, _)| req.url.ends_with(path))
            .count()
    }

    pub fn sessions_cleared(&self) -> usize {
        self.sessions_cleared.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push((request.clone(), Instant::now()));

        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts
            .iter_mut()
            .find(|(path, _)| request.url.ends_with(path.as_str()))
            .map(|(_, queue)| queue)
            .unwrap_or_else(|| panic!("no script for {}", request.url));

        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap()
        }
    }

    fn clear_session(&self) {
        self.sessions_cleared.fetch_add(1, Ordering::SeqCst);
    }
}

/// Counts session-expired notifications.
#[derive(Default)]
pub struct CountingListener(AtomicUsize);

impl CountingListener {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl SessionListener for CountingListener {
    fn on_session_expired(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}
