//! services/api/src/web/state.rs
//!
//! Defines the application's shared and session-specific states.

use crate::config::Config;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::{sync::Mutex, time::Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use wellness_plan_core::{ports::PlanGenerator, session::SessionController};

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub plan_generator: Arc<dyn PlanGenerator>,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(config: Arc<Config>, plan_generator: Arc<dyn PlanGenerator>) -> Self {
        Self {
            config,
            plan_generator,
            sessions: Arc::new(SessionRegistry::default()),
        }
    }
}

//=========================================================================================
// SessionRegistry (In-Memory, Process Lifetime)
//=========================================================================================

/// Every live session. Nothing is persisted; a session with no attached
/// connection is dropped by `evict_idle` once it has been idle long enough.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, Arc<Mutex<SessionState>>>>,
}

impl SessionRegistry {
    /// Creates a session sitting on the home screen and returns its id.
    pub async fn create(&self) -> Uuid {
        let session_id = Uuid::new_v4();
        let state = Arc::new(Mutex::new(SessionState::new(session_id)));
        self.sessions.lock().await.insert(session_id, state);
        session_id
    }

    pub async fn get(&self, session_id: Uuid) -> Option<Arc<Mutex<SessionState>>> {
        self.sessions.lock().await.get(&session_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Drops every session that has had no connection for at least `max_idle`
    /// and returns how many were removed. Sessions locked right now are in use
    /// and are kept.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, state| match state.try_lock() {
            Ok(state) => !state.is_idle_for(now, max_idle),
            Err(_) => true,
        });
        before - sessions.len()
    }
}

//=========================================================================================
// SessionState (One User Session)
//=========================================================================================

/// The state of one user session: the controller plus the running loading task, if any.
pub struct SessionState {
    pub session_id: Uuid,
    pub controller: SessionController,
    /// Cancels the loading-screen progress task. `None` when no task is running.
    /// Always a child of the token of the connection that started the task.
    pub loading_token: Option<CancellationToken>,
    connections: usize,
    idle_since: Option<Instant>,
}

impl SessionState {
    pub fn new(session_id: Uuid) -> Self {
        Self {
            session_id,
            controller: SessionController::new(),
            loading_token: None,
            connections: 0,
            idle_since: Some(Instant::now()),
        }
    }

    /// Records a newly attached connection.
    pub fn attach(&mut self) {
        self.connections += 1;
        self.idle_since = None;
    }

    /// Releases everything a closing connection owned. `connection` must
    /// already be cancelled, which stops any loading task it started; a task
    /// started by another connection keeps running.
    pub fn detach(&mut self, connection: &CancellationToken) {
        debug_assert!(connection.is_cancelled());
        if self
            .loading_token
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            self.loading_token = None;
        }
        self.connections = self.connections.saturating_sub(1);
        if self.connections == 0 {
            self.idle_since = Some(Instant::now());
        }
    }

    fn is_idle_for(&self, now: Instant, max_idle: Duration) -> bool {
        self.idle_since
            .is_some_and(|since| now.saturating_duration_since(since) >= max_idle)
    }

    /// Stops the loading task, if one is running.
    pub fn cancel_loading(&mut self) {
        if let Some(token) = self.loading_token.take() {
            token.cancel();
        }
    }

    /// Replaces any running loading task's token with a fresh child of
    /// `connection` and returns it.
    pub fn begin_loading(&mut self, connection: &CancellationToken) -> CancellationToken {
        self.cancel_loading();
        let token = connection.child_token();
        self.loading_token = Some(token.clone());
        token
    }
}
