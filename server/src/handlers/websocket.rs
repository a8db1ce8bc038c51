//! WebSocket bridge onto the internal event bus.
//!
//! A client connects, sends a single subscribe frame naming the topics it
//! wants, and from then on receives every matching [`BusEvent`] as a JSON
//! text frame until it disconnects.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::state::AppState;

/// The client's first frame: the topics to subscribe to.
#[derive(Debug, Deserialize)]
struct Subscribe {
    topics: Vec<String>,
}

/// `GET /ws`.
pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let topics = match receiver.next().await {
        Some(Ok(Message::Text(text))) => match serde_json::from_str::<Subscribe>(&text) {
            Ok(subscribe) => subscribe.topics,
            Err(err) => {
                let _ = sender
                    .send(Message::Text(format!(r#"{{"error":"invalid subscribe frame: {err}"}}"#)))
                    .await;
                return;
            }
        },
        _ => {
            let _ = sender.send(Message::Text(r#"{"error":"expected a subscribe frame first"}"#.to_string())).await;
            return;
        }
    };

    let topic_refs: Vec<&str> = topics.iter().map(String::as_str).collect();
    let mut events = match state.event_bus.subscribe(&topic_refs).await {
        Ok(stream) => stream,
        Err(err) => {
            let _ = sender.send(Message::Text(format!(r#"{{"error":"subscribe failed: {err}"}}"#))).await;
            return;
        }
    };

    let mut forward_task = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match event {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        if sender.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => tracing::warn!(error = %err, "failed to serialize bus event for websocket frame"),
                },
                Err(err) => {
                    tracing::warn!(error = %err, "event bus subscription error");
                    break;
                }
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(message) = receiver.next().await {
            match message {
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
    });

    tokio::select! {
        _ = &mut forward_task => recv_task.abort(),
        _ = &mut recv_task => forward_task.abort(),
    }
}
