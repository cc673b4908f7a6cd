use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::oneshot;

use crate::{backend::RetrievalBackend, config::AppConfig, session::GraphSession};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub session: Arc<Mutex<GraphSession>>,
    pub backend: Arc<dyn RetrievalBackend>,
    pub status: Arc<Mutex<Status>>,
    pub shutdown_sender: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Status {
    /// Backend requests currently awaiting a response.
    pub in_flight: usize,
    pub message: String,
}

impl AppState {
    pub fn new(config: AppConfig, backend: Arc<dyn RetrievalBackend>) -> Self {
        Self {
            config,
            session: Arc::new(Mutex::new(GraphSession::new())),
            backend,
            status: Arc::new(Mutex::new(Status {
                in_flight: 0,
                message: "Ready.".to_string(),
            })),
            shutdown_sender: Arc::new(Mutex::new(None)),
        }
    }

    /// Locked once per operation and never held across an `.await`, so each
    /// merge is applied atomically.
    pub fn session(&self) -> MutexGuard<'_, GraphSession> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn status(&self) -> MutexGuard<'_, Status> {
        self.status.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn begin_request(&self, message: impl Into<String>) {
        let mut status = self.status();
        status.in_flight += 1;
        status.message = message.into();
    }

    pub fn end_request(&self, message: impl Into<String>) {
        let mut status = self.status();
        status.in_flight = status.in_flight.saturating_sub(1);
        status.message = message.into();
    }
}
