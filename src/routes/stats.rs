//! Stats routes: snapshot pull and the dashboard push channel.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    Json,
};

use crate::errors::AppError;
use crate::models::stats::{ClientEvent, StatsSnapshot};
use crate::services::broadcast::StatsSubscription;
use crate::services::stats;
use crate::AppState;

/// GET /api/stats: freshly computed statistics snapshot.
pub async fn snapshot(State(state): State<AppState>) -> Result<Json<StatsSnapshot>, AppError> {
    let snapshot = stats::compute_snapshot(&state.db).await?;
    Ok(Json(snapshot))
}

/// GET /ws/stats: live dashboard channel.
pub async fn live(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| dashboard_session(socket, state))
}

/// Relay hub frames to one dashboard and answer its `requestStats` pulls
/// until either side goes away.
async fn dashboard_session(mut socket: WebSocket, state: AppState) {
    let StatsSubscription { id, mut frames } = state.hub.connect().await;

    loop {
        tokio::select! {
            frame = frames.recv() => {
                let Some(frame) = frame else {
                    // Hub dropped the registration (shutdown).
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                };
                if let Err(e) = socket.send(Message::Text(frame.to_string().into())).await {
                    tracing::debug!(client_id = %id, error = %e, "Push to dashboard failed");
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => match ClientEvent::parse(text.as_str()) {
                    Some(ClientEvent::RequestStats) => {
                        state.hub.request_stats(&state.db, id).await;
                    }
                    None => tracing::debug!(client_id = %id, "Ignored unknown dashboard frame"),
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(client_id = %id, error = %e, "Dashboard socket error");
                    break;
                }
            },
        }
    }

    state.hub.disconnect(id).await;
}
