use crate::RelayService;
use axum::Router;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::any;
use futures::{SinkExt, StreamExt};
use streamcast_core::{SignalEnvelope, StreamId};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// The relay's routes over a shared [`RelayService`].
pub fn router(service: RelayService) -> Router {
    Router::new()
        .route("/ws/stream/{stream_id}", any(ws_handler))
        .with_state(service)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(stream_id): Path<String>,
    State(service): State<RelayService>,
) -> impl IntoResponse {
    let stream_id = StreamId::from(stream_id);

    ws.on_upgrade(move |socket| handle_socket(socket, stream_id, service))
}

async fn handle_socket(socket: WebSocket, stream_id: StreamId, service: RelayService) {
    info!("New WebSocket connection for stream {}", stream_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let participant_id = service.join(&stream_id, tx);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();
        let stream_id = stream_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => {
                        // Validate before forwarding; the frame itself is
                        // relayed untouched.
                        if let Err(e) = serde_json::from_str::<SignalEnvelope>(&text) {
                            warn!(
                                "Invalid envelope from {} on stream {}: {}",
                                participant_id, stream_id, e
                            );
                            continue;
                        }
                        service.fan_out(&stream_id, participant_id, Message::Text(text));
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    service.leave(&stream_id, participant_id);
    info!(
        "WebSocket disconnected: participant {} of stream {}",
        participant_id, stream_id
    );
}
