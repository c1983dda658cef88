//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! It feeds client gestures into the session controller and publishes the
//! resulting state back to the client.

use crate::{
    error::ApiError,
    web::{
        loading_task::spawn_loading_task,
        protocol::{ClientMessage, FieldErrorView, ServerMessage, SessionView},
        publish::{publish_plan_content, send, Outbound, OUTBOUND_CAPACITY},
        state::{AppState, SessionState},
    },
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use wellness_plan_core::{
    domain::Screen,
    form::QuestionnaireDraft,
    ports::{PortError, PortResult},
};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New WebSocket connection established.");

    let (sender, mut receiver) = socket.split();
    let (outbound, outbound_rx) = mpsc::channel::<ServerMessage>(OUTBOUND_CAPACITY);
    // Parent of every loading task this connection starts.
    let connection = CancellationToken::new();

    // The writer owns the socket sink; everything else talks to it through `outbound`.
    let writer = tokio::spawn(async move {
        if let Err(e) = write_outbound(sender, outbound_rx).await {
            error!("Failed to send message to client: {}", e);
        }
    });

    // --- 1. Initialization Phase ---
    let session_state_lock = match receiver.next().await {
        Some(Ok(Message::Text(init_json))) => {
            match attach_session(&init_json, &app_state, &outbound, &connection).await {
                Ok(lock) => lock,
                Err(message) => {
                    error!("Failed to attach session: {}", message);
                    let _ = outbound.send(ServerMessage::error(message)).await;
                    drop(outbound);
                    let _ = writer.await;
                    return;
                }
            }
        }
        _ => {
            error!("Client disconnected before sending Init message.");
            writer.abort();
            return;
        }
    };

    // --- 2. Main Message Loop ---
    if let Err(e) = read_inbound(
        &mut receiver,
        &app_state,
        &session_state_lock,
        &outbound,
        &connection,
    )
    .await
    {
        error!("WebSocket session ended with an error: {}", e);
    }

    // --- 3. Cleanup ---
    // The session outlives the connection; only this connection's loading task goes with it.
    detach_session(&session_state_lock, &connection).await;
    writer.abort();
    info!("WebSocket connection closed.");
}

/// Drains the outbound queue onto the socket until the queue closes.
async fn write_outbound(
    mut sender: SplitSink<WebSocket, Message>,
    mut outbound_rx: mpsc::Receiver<ServerMessage>,
) -> Result<(), ApiError> {
    while let Some(message) = outbound_rx.recv().await {
        let json = serde_json::to_string(&message)?;
        sender.send(Message::Text(json.into())).await?;
    }
    Ok(())
}

/// Applies client messages until the client closes the socket.
async fn read_inbound(
    receiver: &mut SplitStream<WebSocket>,
    app_state: &Arc<AppState>,
    session_state_lock: &Arc<Mutex<SessionState>>,
    outbound: &Outbound,
    connection: &CancellationToken,
) -> Result<(), ApiError> {
    while let Some(msg) = receiver.next().await {
        match msg? {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => {
                    handle_client_message(
                        client_msg,
                        app_state,
                        session_state_lock,
                        outbound,
                        connection,
                    )
                    .await?;
                }
                Err(e) => {
                    warn!("Failed to deserialize client message: {}", e);
                    send(outbound, ServerMessage::error("Malformed message.")).await?;
                }
            },
            Message::Close(_) => {
                info!("Client sent close message.");
                break;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Resolves the `Init` message to a registered session and sends the initial
/// frames. Returns the message to show the client when the session cannot be attached.
async fn attach_session(
    init_json: &str,
    app_state: &Arc<AppState>,
    outbound: &Outbound,
    connection: &CancellationToken,
) -> Result<Arc<Mutex<SessionState>>, String> {
    let session_id = match serde_json::from_str::<ClientMessage>(init_json) {
        Ok(ClientMessage::Init { session_id }) => session_id,
        _ => return Err("The first message must be an init message.".to_string()),
    };

    let Some(session_state_lock) = app_state.sessions.get(session_id).await else {
        return Err(format!("Unknown session {session_id}."));
    };
    info!("Initializing session with ID: {}", session_id);

    let (view, plan_answers, loading_token) = {
        let mut session = session_state_lock.lock().await;
        session.attach();

        let view = SessionView::from(&session.controller);
        let screen = session.controller.screen();
        let plan_answers =
            (screen == Screen::Plan).then(|| session.controller.plan_answers().cloned());
        // A reconnect during Loading restarts the simulation from zero.
        let loading_token =
            (screen == Screen::Loading).then(|| session.begin_loading(connection));
        (view, plan_answers, loading_token)
    };

    let frames = async move {
        send(outbound, ServerMessage::SessionInitialized { session_id }).await?;
        send(outbound, ServerMessage::State { view }).await?;
        if let Some(answers) = plan_answers {
            publish_plan_content(app_state, answers, outbound).await?;
        }
        Ok::<(), PortError>(())
    };
    if let Err(e) = frames.await {
        detach_session(&session_state_lock, connection).await;
        return Err(e.to_string());
    }

    if let Some(token) = loading_token {
        spawn_loading_task(
            app_state.clone(),
            session_state_lock.clone(),
            outbound.clone(),
            token,
        );
    }

    Ok(session_state_lock)
}

/// Stops whatever this connection started and marks the session as detached.
async fn detach_session(
    session_state_lock: &Arc<Mutex<SessionState>>,
    connection: &CancellationToken,
) {
    connection.cancel();
    session_state_lock.lock().await.detach(connection);
}

/// What applying one client message produced, besides the state change itself.
#[derive(Default)]
struct Applied {
    replies: Vec<ServerMessage>,
    start_loading: bool,
}

/// Applies one client message to the session and publishes the outcome:
/// any replies, the new state, plan content when the Plan screen was entered,
/// and a fresh loading task after a successful submission.
///
/// Only a closed outbound queue is reported as an error.
pub async fn handle_client_message(
    client_msg: ClientMessage,
    app_state: &Arc<AppState>,
    session_state_lock: &Arc<Mutex<SessionState>>,
    outbound: &Outbound,
    connection: &CancellationToken,
) -> PortResult<()> {
    if let ClientMessage::Init { .. } = client_msg {
        warn!("Received subsequent Init message, which is ignored.");
        return Ok(());
    }

    let (applied, view, plan_answers, loading_token) = {
        let mut session = session_state_lock.lock().await;
        let screen_before = session.controller.screen();
        let source_before = session.controller.plan_source();

        let applied = apply(&mut session, client_msg);

        let controller = &session.controller;
        let entered_plan = controller.screen() == Screen::Plan
            && (screen_before != Screen::Plan || source_before != controller.plan_source());
        let plan_answers = entered_plan.then(|| controller.plan_answers().cloned());
        let view = SessionView::from(controller);

        let loading_token = if applied.start_loading {
            Some(session.begin_loading(connection))
        } else {
            if session.controller.screen() != Screen::Loading {
                session.cancel_loading();
            }
            None
        };
        (applied, view, plan_answers, loading_token)
    };

    for reply in applied.replies {
        send(outbound, reply).await?;
    }
    send(outbound, ServerMessage::State { view }).await?;
    if let Some(answers) = plan_answers {
        publish_plan_content(app_state, answers, outbound).await?;
    }
    if let Some(token) = loading_token {
        spawn_loading_task(
            app_state.clone(),
            session_state_lock.clone(),
            outbound.clone(),
            token,
        );
    }
    Ok(())
}

fn apply(session: &mut SessionState, client_msg: ClientMessage) -> Applied {
    let mut applied = Applied::default();
    let controller = &mut session.controller;

    match client_msg {
        ClientMessage::Init { .. } => {}
        ClientMessage::SelectTab { tab } => controller.select_tab(tab.into()),
        ClientMessage::StartPlanCreation => controller.start_plan_creation(),
        ClientMessage::SubmitForm { answers } => match QuestionnaireDraft::try_from(answers) {
            Ok(draft) => match controller.submit_form(&draft) {
                Ok(()) => {
                    info!("Questionnaire accepted; starting plan generation.");
                    applied.start_loading = true;
                }
                Err(errors) => {
                    info!(fields = errors.fields().count(), "Questionnaire rejected.");
                    applied.replies.push(ServerMessage::ValidationFailed {
                        errors: FieldErrorView::from_errors(&errors),
                    });
                }
            },
            Err(reason) => {
                warn!("Rejected malformed questionnaire: {}", reason);
                applied.replies.push(ServerMessage::error(reason));
            }
        },
        ClientMessage::QuickViewSavedPlan => controller.quick_view_saved_plan(),
        ClientMessage::OpenSavedPlan { plan_id } => {
            if controller.open_saved_plan(plan_id).is_none() {
                warn!(%plan_id, "Open requested for an unknown plan; ignoring.");
            }
        }
        ClientMessage::SavePlan => match controller.save_current_plan() {
            Some(plan) => {
                info!(plan_id = %plan.id, "Plan saved.");
                applied
                    .replies
                    .push(ServerMessage::toast("Plan saved to your profile"));
            }
            None => warn!("Save requested without questionnaire answers; ignoring."),
        },
        ClientMessage::DownloadPlan => {
            applied
                .replies
                .push(ServerMessage::toast("PDF file will be downloaded"));
        }
        ClientMessage::DeletePlan { plan_id } => match controller.delete_plan(plan_id) {
            Some(_) => {
                info!(%plan_id, "Plan deleted.");
                applied.replies.push(ServerMessage::toast("Plan deleted"));
            }
            None => warn!(%plan_id, "Delete requested for an unknown plan; ignoring."),
        },
        ClientMessage::CreateNewPlan => controller.start_new_plan_cycle(),
        ClientMessage::BackToHome => controller.back_to_home(),
        ClientMessage::BackToProfile => controller.back_to_profile(),
        ClientMessage::ViewProfile => controller.view_profile_from_plan(),
    }

    applied
}
