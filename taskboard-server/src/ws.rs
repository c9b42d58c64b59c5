//! Real-time channel: relays board change signals to WebSocket clients

use crate::state::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use taskboard_kanban::{ChangeSubscription, TASKS_CHANGED};

/// GET /ws
pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    // Subscribe before the handshake completes so no signal falls in between
    let subscription = state.notifier().subscribe();
    ws.on_upgrade(move |socket| relay(socket, subscription))
}

/// Forward every change signal as a `task-updated` text frame until either
/// side goes away. Anything the client sends is ignored.
async fn relay(mut socket: WebSocket, mut subscription: ChangeSubscription) {
    tracing::debug!("observer connected");
    loop {
        tokio::select! {
            signal = subscription.changed() => {
                let Some(_) = signal else { break };
                if let Err(e) = socket.send(Message::Text(TASKS_CHANGED.to_string())).await {
                    tracing::debug!(error = %e, "observer went away mid-send");
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    tracing::debug!("observer disconnected");
}
