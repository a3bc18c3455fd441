//! Threaded HTTP transport.
//!
//! Each request runs on its own worker thread so the UI thread never blocks
//! on the network. Workers post their outcome on a channel; the host drains
//! it through `LifecycleController::pump`, which calls `poll`.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use celledit_config::EditorOptions;
use celledit_engine::{Completion, RequestId, Transport, TransportError};
use celledit_protocol::PersistRequest;

use crate::client::EditClient;

/// `Transport` backed by blocking reqwest calls on worker threads.
pub struct HttpTransport {
    client: EditClient,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    next_id: u64,
    in_flight: usize,
}

impl HttpTransport {
    /// Transport with the timeout configured in `options`.
    pub fn from_options(options: &EditorOptions) -> Result<Self, TransportError> {
        Self::new(options.timeout())
    }

    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        Ok(Self::with_client(EditClient::new(timeout)?))
    }

    pub fn with_client(client: EditClient) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            client,
            tx,
            rx,
            next_id: 0,
            in_flight: 0,
        }
    }

    /// Requests sent whose completion has not been handed out yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Block until at least one completion arrives or `timeout` elapses,
    /// then return everything available. For hosts without an event loop.
    pub fn wait(&mut self, timeout: Duration) -> Vec<Completion> {
        if self.in_flight == 0 {
            return Vec::new();
        }

        let mut completions = match self.rx.recv_timeout(timeout) {
            Ok(completion) => vec![completion],
            // Disconnected cannot happen while we hold `tx`
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                return Vec::new()
            }
        };
        completions.extend(self.rx.try_iter());
        self.in_flight = self.in_flight.saturating_sub(completions.len());
        completions
    }
}

impl Transport for HttpTransport {
    fn send(&mut self, request: PersistRequest) -> RequestId {
        self.next_id += 1;
        let id = RequestId(self.next_id);
        self.in_flight += 1;

        let client = self.client.clone();
        let tx = self.tx.clone();
        log::debug!("{} {} {}", id, request.method, request.endpoint);

        thread::spawn(move || {
            let result = client.persist(&request);
            // The receiver is gone only when the transport was dropped
            let _ = tx.send(Completion { id, result });
        });
        id
    }

    fn poll(&mut self) -> Vec<Completion> {
        let completions: Vec<Completion> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(completions.len());
        completions
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("next_id", &self.next_id)
            .field("in_flight", &self.in_flight)
            .finish()
    }
}
