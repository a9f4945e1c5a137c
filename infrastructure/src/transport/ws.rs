//! axum WebSocket server
//!
//! Each socket is split into a writer task, which drains the connection's
//! message channel onto the wire, and a reader task, which decodes intents
//! and dispatches them to the session hub. Whichever finishes first ends the
//! connection; the registry is always told to detach, which closes the
//! session once its last connection is gone.

use super::codec::{decode_intent, encode_message};
use super::error::TransportError;
use axum::{
    Router,
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use futures::{SinkExt, StreamExt};
use poker_application::{
    ConnectionId, ServerMessage, SessionHub, SessionRegistry, SyncError,
};
use poker_domain::{Intent, JobCategory, ParticipantProfile, SessionError, SessionId};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

#[derive(Clone)]
struct AppState {
    registry: Arc<SessionRegistry>,
}

/// Identity a client presents in the connect URL's query string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    #[serde(alias = "userId")]
    pub participant_id: String,
    #[serde(alias = "name")]
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default, alias = "jobRole")]
    pub job_category: Option<String>,
}

impl Handshake {
    pub fn into_profile(self) -> Result<ParticipantProfile, SessionError> {
        let participant_id = self.participant_id.trim();
        if participant_id.is_empty() {
            return Err(SessionError::malformed("participant id cannot be empty"));
        }
        if self.display_name.trim().is_empty() {
            return Err(SessionError::malformed("display name cannot be empty"));
        }

        let mut profile = ParticipantProfile::new(participant_id, self.display_name);
        if let Some(category) = &self.job_category {
            profile = profile.with_job_category(JobCategory::parse_lenient(category));
        }
        if let Some(avatar_url) = self.avatar_url.filter(|url| !url.trim().is_empty()) {
            profile = profile.with_avatar(avatar_url);
        }
        Ok(profile)
    }
}

pub fn build_router(registry: Arc<SessionRegistry>, allowed_origins: &[String]) -> Router {
    let cors = if allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/ws/{session_id}", get(ws_handler))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { registry })
}

/// Bind `address` and serve until `shutdown` is cancelled.
pub async fn serve(
    address: &str,
    router: Router,
    shutdown: CancellationToken,
) -> Result<(), TransportError> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| TransportError::Bind {
            address: address.to_string(),
            source,
        })?;
    serve_listener(listener, router, shutdown).await
}

/// Serve on an already bound listener until `shutdown` is cancelled.
pub async fn serve_listener(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
) -> Result<(), TransportError> {
    if let Ok(address) = listener.local_addr() {
        info!(%address, "Listening for WebSocket connections");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(TransportError::Serve)
}

async fn health() -> &'static str {
    "ok"
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    Query(handshake): Query<Handshake>,
    State(state): State<AppState>,
) -> Response {
    let profile = match handshake.into_profile() {
        Ok(profile) => profile,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    let session_id = SessionId::new(session_id);
    ws.on_upgrade(move |socket| handle_socket(socket, state.registry, session_id, profile))
}

async fn handle_socket(
    socket: WebSocket,
    registry: Arc<SessionRegistry>,
    session_id: SessionId,
    profile: ParticipantProfile,
) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let participant_id = profile.id.clone();

    let (hub, connection) = match registry.attach(&session_id, profile, Arc::new(tx)).await {
        Ok(attached) => attached,
        Err(e) => {
            warn!(session = %session_id, participant = %participant_id, "Attach refused: {}", e);
            if let Some(error) = e.as_session_error()
                && let Ok(text) = encode_message(&ServerMessage::rejected(error, Some("join")))
            {
                let _ = sender.send(Message::Text(text.into())).await;
            }
            let _ = sender.close().await;
            return;
        }
    };

    let mut writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match encode_message(&message) {
                Ok(text) => text,
                Err(e) => {
                    error!("Dropping unencodable message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    });

    let reader_hub = hub.clone();
    let mut reader = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            match message {
                Message::Text(text) => {
                    if !handle_text(&reader_hub, connection, text.as_str()).await {
                        break;
                    }
                }
                Message::Close(_) => break,
                // Pings are answered by axum; binary frames are not part of the protocol
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => {}
    }
    registry.detach(&hub, connection).await;
    debug!(session = %session_id, participant = %participant_id, %connection, "Socket closed");
}

/// Decode and dispatch one text frame.
///
/// Returns `false` once the connection is no longer attached to the hub,
/// which happens after its participant left or was kicked.
async fn handle_text(hub: &SessionHub, connection: ConnectionId, text: &str) -> bool {
    match decode_intent(text) {
        Ok(intent) => {
            let leaving = matches!(intent, Intent::Leave);
            // Rejections have already been sent to the client by the hub
            let result = hub.dispatch(connection, intent).await;
            !leaving && !matches!(result, Err(SyncError::NotAttached(_)))
        }
        Err(error) => hub.reject(connection, &error).await.is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poker_application::{ManualClock, MessageSink, SessionDefaults, SyncOptions};
    use poker_domain::{ErrorKind, ParticipantId};
    use serde_json::json;

    fn registry() -> Arc<SessionRegistry> {
        Arc::new(SessionRegistry::new(
            SessionDefaults::default(),
            SyncOptions::default(),
            Arc::new(ManualClock::new(0)),
        ))
    }

    fn handshake(value: serde_json::Value) -> Result<Handshake, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_handshake_accepts_legacy_names() {
        let profile = handshake(json!({
            "userId": "u1",
            "name": "Ada",
            "jobRole": "QA",
            "avatarUrl": "http://a/1.png"
        }))
        .unwrap()
        .into_profile()
        .unwrap();
        assert_eq!(profile.id, ParticipantId::new("u1"));
        assert_eq!(profile.display_name, "Ada");
        assert_eq!(profile.job_category, JobCategory::Qa);
        assert_eq!(profile.avatar_url.as_deref(), Some("http://a/1.png"));
    }

    #[test]
    fn test_handshake_requires_identity() {
        assert!(handshake(json!({"displayName": "Ada"})).is_err());

        let err = handshake(json!({"participantId": " ", "displayName": "Ada"}))
            .unwrap()
            .into_profile()
            .unwrap_err();
        assert!(matches!(err, SessionError::MalformedIntent(_)));

        let err = handshake(json!({"participantId": "u1", "displayName": ""}))
            .unwrap()
            .into_profile()
            .unwrap_err();
        assert!(matches!(err, SessionError::MalformedIntent(_)));
    }

    #[tokio::test]
    async fn test_handle_text_dispatches_and_rejects() {
        let registry = registry();
        let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
        let sink: Arc<dyn MessageSink> = Arc::new(tx);
        let (hub, connection) = registry
            .attach(&SessionId::new("room"), ParticipantProfile::new("m", "Mia"), sink)
            .await
            .unwrap();
        while rx.try_recv().is_ok() {}

        assert!(
            handle_text(
                &hub,
                connection,
                r#"{"type":"add_work_item","payload":{"title":"Login"}}"#
            )
            .await
        );
        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.as_snapshot().unwrap().session.work_items().len(), 1);

        assert!(handle_text(&hub, connection, "{oops").await);
        match rx.recv().await.unwrap() {
            ServerMessage::Rejected(rejection) => {
                assert_eq!(rejection.kind, ErrorKind::MalformedIntentError);
                assert!(rejection.intent.is_none());
            }
            other => panic!("unexpected message: {:?}", other),
        }

        assert!(!handle_text(&hub, connection, r#"{"type":"leave"}"#).await);
        assert_eq!(hub.connection_count().await, 0);
        assert!(!handle_text(&hub, connection, r#"{"type":"reveal_votes"}"#).await);

        assert!(!registry.detach(&hub, connection).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let shutdown = CancellationToken::new();
        let server = tokio::spawn(serve_listener(
            listener,
            build_router(registry(), &[]),
            shutdown.clone(),
        ));

        let body = reqwest::get(format!("http://{}/health", address))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "ok");

        let status = reqwest::get(format!("http://{}/ws/room", address))
            .await
            .unwrap()
            .status();
        assert!(status.is_client_error());

        shutdown.cancel();
        server.await.unwrap().unwrap();
    }
}
