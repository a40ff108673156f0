//! WebSocket endpoints.
//!
//! Each socket is split into a reader task that decodes requests and a single
//! writer task that drains the session's outbound queue, so only one task ever
//! writes to the socket.

use super::state::AppState;
use crate::providers::Translator;
use crate::session::{SessionConfig, SessionController};
use crate::source::translate_or_placeholder;
use crate::stream::{ClientRequest, Outgoing, ServerMessage, Strategy};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Bound on queued outbound messages per session
const OUTBOUND_CAPACITY: usize = 64;

/// Bound on queued inbound requests per session
const INBOUND_CAPACITY: usize = 16;

/// How outbound items are put on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Raw caption text and JSON notifications
    Envelope,
    /// Raw caption text only; notifications are dropped
    Plain,
}

/// Encode one outbound item, or `None` if this framing does not carry it
pub fn encode(item: Outgoing, framing: Framing) -> Option<Message> {
    match (item, framing) {
        (Outgoing::Text(text), _) => Some(Message::Text(text)),
        (Outgoing::Event(msg), Framing::Envelope) => match serde_json::to_string(&msg) {
            Ok(json) => Some(Message::Text(json)),
            Err(e) => {
                error!("Failed to encode {:?}: {}", msg, e);
                None
            }
        },
        (Outgoing::Event(msg), Framing::Plain) => {
            debug!("Plain framing drops {:?}", msg);
            None
        }
    }
}

/// Decode a plain-mode control message; only stop is understood
fn decode_plain(text: &str) -> Option<ClientRequest> {
    match text.trim() {
        "stop" | "stop_processing" => Some(ClientRequest::StopProcessing),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
pub struct CaptionParams {
    #[serde(default = "default_caption_strategy")]
    pub strategy: Strategy,
    pub delay: Option<f64>,
}

fn default_caption_strategy() -> Strategy {
    Strategy::Transcript
}

/// GET /ws
/// JSON request/notification session
pub async fn session_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| run_session(socket, state, Framing::Envelope, None))
}

/// GET /ws/captions?strategy=transcript&delay=0.8
/// Streams raw captions as soon as the socket opens
pub async fn caption_socket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<CaptionParams>,
) -> Response {
    let strategy = match params.strategy {
        Strategy::Pipeline => Strategy::Transcript,
        other => other,
    };
    ws.on_upgrade(move |socket| {
        run_session(socket, state, Framing::Plain, Some((strategy, params.delay)))
    })
}

/// GET /ws/translate
/// Translates each received text message and sends the translation back
pub async fn translate_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let translator = state.providers.translator.clone();
    ws.on_upgrade(move |socket| run_translate(socket, translator))
}

async fn run_session(
    socket: WebSocket,
    state: AppState,
    framing: Framing,
    autostart: Option<(Strategy, Option<f64>)>,
) {
    let (mut sink, mut stream) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<Outgoing>(OUTBOUND_CAPACITY);
    let (in_tx, in_rx) = mpsc::channel::<ClientRequest>(INBOUND_CAPACITY);

    let config = SessionConfig::from_config(&state.config);
    let session_id = config.session_id.clone();
    let mut controller = SessionController::new(config, state.providers.clone(), out_tx.clone());

    let writer = tokio::spawn(async move {
        while let Some(item) = out_rx.recv().await {
            let Some(message) = encode(item, framing) else {
                continue;
            };
            if let Err(e) = sink.send(message).await {
                debug!("Socket write failed: {}", e);
                break;
            }
        }
        let _ = sink.close().await;
    });

    let reader_session = session_id.clone();
    let reader = tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            let text = match frame {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    debug!("[{}] Socket read failed: {}", reader_session, e);
                    break;
                }
            };

            let request = match framing {
                Framing::Plain => decode_plain(&text),
                Framing::Envelope => match serde_json::from_str::<ClientRequest>(&text) {
                    Ok(request) => Some(request),
                    Err(e) => {
                        warn!("[{}] Invalid request: {}", reader_session, e);
                        let reply = ServerMessage::error(format!("Invalid request: {}", e));
                        if out_tx.send(reply.into()).await.is_err() {
                            break;
                        }
                        None
                    }
                },
            };

            if let Some(request) = request {
                if in_tx.send(request).await.is_err() {
                    break;
                }
            }
        }
    });

    if let Some((strategy, delay)) = autostart {
        if controller.autostart(strategy, delay).await.is_err() {
            warn!("[{}] Client gone before stream started", session_id);
        }
    }

    let stats = controller.serve(in_rx).await;
    debug!("[{}] Final stats: {:?}", session_id, stats);

    reader.abort();
    if let Err(e) = writer.await {
        error!("[{}] Writer task panicked: {}", session_id, e);
    }
    info!("[{}] Socket closed", session_id);
}

async fn run_translate(socket: WebSocket, translator: Option<Arc<dyn Translator>>) {
    let (mut sink, mut stream) = socket.split();

    while let Some(Ok(frame)) = stream.next().await {
        let text = match frame {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        info!("Received text to translate: {}", text);

        let translated = match &translator {
            Some(translator) => translate_or_placeholder(translator.as_ref(), &text).await,
            None => format!("Translation unavailable: {}", text),
        };

        if let Err(e) = sink.send(Message::Text(translated)).await {
            info!("Connection closed: {}", e);
            break;
        }
    }
}
