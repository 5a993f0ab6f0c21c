//! WebSocket connection handler.
//!
//! Each upgraded connection runs as two tasks: a read loop that decodes
//! inbound frames and dispatches them, and a pusher that drains the
//! connection's outbound channel into the socket.

use std::{fmt, ops::ControlFlow, sync::Arc, time::Duration};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde_json::Value;
use tokio::sync::{mpsc, watch};

use crate::{
    domain::{ClientId, DeliveryError, OutboundChannel},
    infrastructure::dto::websocket::{Envelope, decode_frame, encode_signal, parse_signal_payload},
    ui::state::AppState,
};

/// Why a connection's read loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopExit {
    ClosedByClient,
    TransportError,
    DecodeError,
    IdleTimeout,
    Shutdown,
    /// The outbound side failed first
    WriterClosed,
}

impl fmt::Display for LoopExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            LoopExit::ClosedByClient => "closed by client",
            LoopExit::TransportError => "transport error",
            LoopExit::DecodeError => "malformed frame",
            LoopExit::IdleTimeout => "idle timeout",
            LoopExit::Shutdown => "server shutdown",
            LoopExit::WriterClosed => "outbound transport closed",
        };
        f.write_str(reason)
    }
}

enum ReadOutcome {
    Frame(Message),
    Closed,
    Error(axum::Error),
    IdleTimeout,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that drains `rx` into the WebSocket sink.
///
/// The task ends when every sender of the channel is dropped or a write
/// fails, and then closes the transport. This is the only place the sink is
/// closed.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
    client_id: ClientId,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = sender.send(Message::Text(msg.into())).await {
                tracing::warn!("Failed to write to client '{}': {}", client_id, e);
                break;
            }
        }
        if let Err(e) = sender.close().await {
            tracing::debug!("Closing transport of '{}' failed: {}", client_id, e);
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, receiver) = socket.split();

    // Create a channel for this client to receive messages
    let (tx, rx) = mpsc::unbounded_channel();
    let client_id = state.connect_client_usecase.execute(tx.clone()).await;
    tracing::info!("Client '{}' connected and registered", client_id);

    let mut send_task = pusher_loop(rx, sender, client_id.clone());
    let mut recv_task = tokio::spawn(read_loop(receiver, state.clone(), client_id.clone(), tx));

    let (exit, writer_done) = tokio::select! {
        result = &mut recv_task => (result.unwrap_or(LoopExit::TransportError), false),
        _ = &mut send_task => {
            recv_task.abort();
            (LoopExit::WriterClosed, true)
        }
    };

    // Unregister before the transport is closed so nobody writes to it afterwards
    state.disconnect_client_usecase.execute(&client_id).await;
    tracing::info!(
        "Client '{}' disconnected and removed from registry ({})",
        client_id,
        exit
    );

    // The pusher flushes what is queued, then closes the transport
    if !writer_done && let Err(e) = send_task.await {
        tracing::warn!("Pusher task of '{}' failed: {}", client_id, e);
    }
}

async fn read_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    client_id: ClientId,
    reply: OutboundChannel,
) -> LoopExit {
    let shutdown = wait_for_shutdown(state.shutdown.clone());
    tokio::pin!(shutdown);

    loop {
        let outcome = tokio::select! {
            outcome = read_frame(&mut receiver, state.idle_timeout) => outcome,
            _ = &mut shutdown => return LoopExit::Shutdown,
        };

        let msg = match outcome {
            ReadOutcome::Frame(msg) => msg,
            ReadOutcome::Closed => return LoopExit::ClosedByClient,
            ReadOutcome::IdleTimeout => return LoopExit::IdleTimeout,
            ReadOutcome::Error(e) => {
                tracing::warn!("WebSocket error from '{}': {}", client_id, e);
                return LoopExit::TransportError;
            }
        };

        let text = match msg {
            Message::Text(text) => text.as_str().to_owned(),
            Message::Binary(bytes) => match String::from_utf8(bytes.to_vec()) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Binary frame from '{}' is not UTF-8: {}", client_id, e);
                    return LoopExit::DecodeError;
                }
            },
            Message::Close(_) => {
                tracing::info!("Client '{}' requested close", client_id);
                return LoopExit::ClosedByClient;
            }
            // Ping/pong is handled automatically by the WebSocket protocol
            Message::Ping(_) | Message::Pong(_) => continue,
        };

        if let ControlFlow::Break(exit) = handle_frame(&state, &client_id, &reply, &text).await {
            return exit;
        }
    }
}

async fn read_frame(
    receiver: &mut SplitStream<WebSocket>,
    idle_timeout: Option<Duration>,
) -> ReadOutcome {
    let next = match idle_timeout {
        Some(limit) => match tokio::time::timeout(limit, receiver.next()).await {
            Ok(next) => next,
            Err(_) => return ReadOutcome::IdleTimeout,
        },
        None => receiver.next().await,
    };
    match next {
        Some(Ok(msg)) => ReadOutcome::Frame(msg),
        Some(Err(e)) => ReadOutcome::Error(e),
        None => ReadOutcome::Closed,
    }
}

/// Resolves once shutdown is requested or the server side of the channel is gone.
async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// Decode one frame and dispatch it.
///
/// Only a decode failure stops the loop; chat and signaling errors are
/// reported and the connection stays open.
async fn handle_frame(
    state: &AppState,
    client_id: &ClientId,
    reply: &OutboundChannel,
    text: &str,
) -> ControlFlow<LoopExit> {
    let envelope = match decode_frame(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!("Dropping connection '{}': {}", client_id, e);
            return ControlFlow::Break(LoopExit::DecodeError);
        }
    };

    match envelope {
        Envelope::Chat(payload) => {
            tracing::debug!("Received chat from '{}'", client_id);
            if let Err(e) = state
                .broadcast_chat_usecase
                .execute(Some(client_id), &payload)
                .await
            {
                tracing::warn!("Dropped chat message from '{}': {}", client_id, e);
            }
        }
        Envelope::Signal(payload) => handle_signal(state, client_id, reply, &payload).await,
        Envelope::Unknown(kind) => {
            tracing::debug!("Ignoring envelope of unknown type {} from '{}'", kind, client_id);
        }
    }

    ControlFlow::Continue(())
}

async fn handle_signal(
    state: &AppState,
    client_id: &ClientId,
    reply: &OutboundChannel,
    payload: &Value,
) {
    let message = match parse_signal_payload(payload) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Rejected signaling message from '{}': {}", client_id, e);
            return;
        }
    };
    tracing::info!("Received {} from '{}'", message.sdp_type, client_id);

    // The negotiation lock is held only inside `apply`
    let answer = match state.negotiation_engine.apply(message).await {
        Ok(Some(answer)) => answer,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!("Negotiation for '{}' failed: {}", client_id, e);
            return;
        }
    };

    match encode_signal(&answer) {
        Ok(frame) => {
            if reply.send(frame).is_err() {
                let error = DeliveryError::ChannelClosed(client_id.clone());
                tracing::warn!("Failed to deliver answer: {}", error);
            }
        }
        Err(e) => tracing::error!("Failed to encode answer for '{}': {}", client_id, e),
    }
}
