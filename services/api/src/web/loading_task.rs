//! services/api/src/web/loading_task.rs
//!
//! This module contains the asynchronous "worker" responsible for the
//! simulated plan generation shown on the Loading screen.

use crate::web::{
    protocol::{ServerMessage, SessionView},
    publish::{publish_plan_content, send, Outbound},
    state::{AppState, SessionState},
};
use std::sync::Arc;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{interval_at, sleep, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use wellness_plan_core::{
    ports::PortResult,
    progress::{LoadingProgress, TickOutcome},
};

/// Starts the loading task in the background. It stops on its own once the
/// plan is shown, or as soon as `cancellation_token` is cancelled.
pub fn spawn_loading_task(
    app_state: Arc<AppState>,
    session_state_lock: Arc<Mutex<SessionState>>,
    outbound: Outbound,
    cancellation_token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) =
            loading_process(app_state, session_state_lock, outbound, cancellation_token).await
        {
            error!("Loading process failed: {:?}", e);
        }
    })
}

/// Advances the progress bar once per tick until it reaches 100%, waits the
/// completion delay and then moves the session on to the Plan screen.
///
/// Every suspension point races against `cancellation_token`, and the final
/// transition re-checks it under the session lock, so a task that was cancelled
/// never completes the loading screen.
pub async fn loading_process(
    app_state: Arc<AppState>,
    session_state_lock: Arc<Mutex<SessionState>>,
    outbound: Outbound,
    cancellation_token: CancellationToken,
) -> PortResult<()> {
    info!("Loading process started.");

    let tick = app_state.config.loading_tick;
    let mut ticker = interval_at(Instant::now() + tick, tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut progress = LoadingProgress::new();

    send(&outbound, ServerMessage::loading_progress(0, 0)).await?;

    while !progress.is_finished() {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                info!(progress = progress.value(), "Loading process cancelled.");
                return Ok(());
            }
            _ = ticker.tick() => {}
        }

        match progress.tick() {
            TickOutcome::Advanced { value, stage } => {
                send(&outbound, ServerMessage::loading_progress(value, stage)).await?;
            }
            TickOutcome::Finished => {
                let message = ServerMessage::loading_progress(progress.value(), progress.stage());
                send(&outbound, message).await?;
            }
            TickOutcome::Idle => {}
        }
    }

    tokio::select! {
        _ = cancellation_token.cancelled() => {
            info!("Loading process cancelled before completion.");
            return Ok(());
        }
        _ = sleep(app_state.config.loading_completion_delay) => {}
    }

    let (view, answers) = {
        let mut session = session_state_lock.lock().await;
        if cancellation_token.is_cancelled() || !session.controller.loading_complete() {
            info!("Loading screen already left; discarding completion.");
            return Ok(());
        }
        session.loading_token = None;
        (
            SessionView::from(&session.controller),
            session.controller.plan_answers().cloned(),
        )
    };

    info!("Loading finished; showing the plan.");
    send(&outbound, ServerMessage::State { view }).await?;
    publish_plan_content(&app_state, answers, &outbound).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{adapters::StaticPlanGenerator, config::Config, web::publish::OUTBOUND_CAPACITY};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use wellness_plan_core::{domain::Screen, form::QuestionnaireDraft};

    fn app_state() -> Arc<AppState> {
        Arc::new(AppState::new(
            Arc::new(Config::default()),
            Arc::new(StaticPlanGenerator::new()),
        ))
    }

    /// A session that has just submitted a valid questionnaire.
    fn loading_session() -> (Arc<Mutex<SessionState>>, CancellationToken) {
        let mut state = SessionState::new(uuid::Uuid::new_v4());
        state.controller.start_plan_creation();
        state
            .controller
            .submit_form(&QuestionnaireDraft {
                goal: "weight-loss".to_string(),
                fitness_level: "beginner".to_string(),
                workouts_per_week: "3".to_string(),
                ..Default::default()
            })
            .unwrap();
        let token = state.begin_loading(&CancellationToken::new());
        (Arc::new(Mutex::new(state)), token)
    }

    #[tokio::test(start_paused = true)]
    async fn completes_exactly_once_after_reaching_one_hundred() {
        let (session, token) = loading_session();
        let (tx, mut rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let handle = spawn_loading_task(app_state(), session.clone(), tx, token);

        let mut messages = Vec::new();
        while let Some(message) = rx.recv().await {
            messages.push(message);
        }
        handle.await.unwrap();

        let progress: Vec<u8> = messages
            .iter()
            .filter_map(|m| match m {
                ServerMessage::LoadingProgress { progress, .. } => Some(*progress),
                _ => None,
            })
            .collect();
        assert_eq!(progress.len(), 101);
        assert_eq!(progress.first(), Some(&0));
        assert_eq!(progress.last(), Some(&100));
        assert!(progress.windows(2).all(|w| w[0] < w[1]));

        let states: Vec<usize> = messages
            .iter()
            .enumerate()
            .filter(|(_, m)| matches!(m, ServerMessage::State { .. }))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(states.len(), 1, "completion must fire exactly once");
        assert!(messages[states[0]..]
            .iter()
            .all(|m| !matches!(m, ServerMessage::LoadingProgress { .. })));
        assert!(matches!(messages.last(), Some(ServerMessage::PlanContent { .. })));

        let session = session.lock().await;
        assert_eq!(session.controller.screen(), Screen::Plan);
        assert!(session.loading_token.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn leaving_the_screen_cancels_the_task() {
        let (session, token) = loading_session();
        let (tx, mut rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let handle = spawn_loading_task(app_state(), session.clone(), tx, token);

        // Let roughly a third of the ticks elapse.
        sleep(Duration::from_millis(1_660)).await;
        {
            let mut session = session.lock().await;
            session.controller.back_to_home();
            session.cancel_loading();
        }
        handle.await.unwrap();

        let mut messages = Vec::new();
        while let Some(message) = rx.recv().await {
            messages.push(message);
        }
        assert!(!messages.is_empty());
        assert!(messages
            .iter()
            .all(|m| matches!(m, ServerMessage::LoadingProgress { progress, .. } if *progress < 100)));

        let session = session.lock().await;
        assert_eq!(session.controller.screen(), Screen::Home);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_completion_delay_is_honoured() {
        let (session, token) = loading_session();
        let (tx, mut rx) = mpsc::channel(OUTBOUND_CAPACITY);
        let handle = spawn_loading_task(app_state(), session.clone(), tx, token.clone());

        // 100 ticks of 50ms, then halfway into the 500ms delay.
        sleep(Duration::from_millis(5_250)).await;
        token.cancel();
        handle.await.unwrap();

        let mut saw_state = false;
        while let Some(message) = rx.recv().await {
            saw_state |= matches!(message, ServerMessage::State { .. });
        }
        assert!(!saw_state);
        assert_eq!(session.lock().await.controller.screen(), Screen::Loading);
    }
}
