//! End-to-end chat tests over real WebSockets.
//!
//! Boots the engine router on an ephemeral port with stubbed collaborator
//! ports and drives it with tokio-tungstenite clients.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use fablechain_engine::api;
use fablechain_engine::app::AppState;
use fablechain_engine::infrastructure::ports::{
    BlockchainError, BlockchainPort, IntentVerdict, LlmError, LlmPort, VerdictKind,
};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);
const QUIET_TIMEOUT: Duration = Duration::from_millis(300);

/// LLM stub with a fixed answer (or a fixed failure)
struct StubLlm {
    reply: Result<String, LlmError>,
}

impl StubLlm {
    fn answering(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
        }
    }

    fn failing() -> Self {
        Self {
            reply: Err(LlmError::Unavailable("connection refused".to_string())),
        }
    }
}

#[async_trait]
impl LlmPort for StubLlm {
    async fn generate(&self, _system_prompt: &str, _input: &str) -> Result<String, LlmError> {
        self.reply.clone()
    }
}

/// Blockchain stub that always declines
struct QuietChain;

#[async_trait]
impl BlockchainPort for QuietChain {
    async fn handle_intent(
        &self,
        _message: &str,
        _location_id: &str,
    ) -> Result<IntentVerdict, BlockchainError> {
        Ok(IntentVerdict {
            content: String::new(),
            should_respond: false,
            kind: VerdictKind::Message,
        })
    }
}

/// Boot the engine on an ephemeral port and return its address.
async fn start_server(llm: StubLlm) -> SocketAddr {
    let state = Arc::new(AppState::new(Arc::new(llm), Arc::new(QuietChain)));
    let router = api::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    addr
}

async fn connect(addr: SocketAddr) -> WsClient {
    let (ws, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("websocket connect");
    ws
}

async fn send_frame(ws: &mut WsClient, frame: Value) {
    ws.send(Message::Text(frame.to_string()))
        .await
        .expect("send frame");
}

/// Receive the next text frame as JSON, panicking after RECV_TIMEOUT.
async fn recv_envelope(ws: &mut WsClient) -> Value {
    let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        let frame = tokio::time::timeout(remaining, ws.next())
            .await
            .expect("timed out waiting for envelope")
            .expect("connection closed")
            .expect("websocket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).expect("envelope is JSON");
        }
    }
}

/// Assert no text frame arrives within QUIET_TIMEOUT.
async fn expect_silence(ws: &mut WsClient) {
    let outcome = tokio::time::timeout(QUIET_TIMEOUT, ws.next()).await;
    match outcome {
        Err(_) => {}
        Ok(Some(Ok(Message::Text(text)))) => panic!("unexpected envelope: {text}"),
        Ok(other) => panic!("unexpected frame: {other:?}"),
    }
}

async fn join(ws: &mut WsClient, name: &str, location: &str) {
    send_frame(ws, json!({"type": "join", "name": name, "locationId": location})).await;
}

#[tokio::test]
async fn two_clients_share_a_location_log() {
    let addr = start_server(StubLlm::failing()).await;

    let mut aria = connect(addr).await;
    join(&mut aria, "Aria", "dark-forest").await;
    let joined = recv_envelope(&mut aria).await;
    assert_eq!(joined["type"], "join");
    assert_eq!(joined["content"], "Aria has joined the chat");

    let mut boro = connect(addr).await;
    join(&mut boro, "Boro", "dark-forest").await;
    // Both clients, Boro included, see the same join event
    assert_eq!(recv_envelope(&mut aria).await["sender"], "Boro");
    assert_eq!(recv_envelope(&mut boro).await["sender"], "Boro");

    send_frame(
        &mut aria,
        json!({"type": "message", "content": "I search the clearing", "isAction": true}),
    )
    .await;

    for ws in [&mut aria, &mut boro] {
        let envelope = recv_envelope(ws).await;
        assert_eq!(envelope["type"], "message");
        assert_eq!(envelope["sender"], "Aria");
        assert_eq!(envelope["content"], "I search the clearing");
        assert_eq!(envelope["isAction"], true);
        assert_eq!(envelope["locationId"], "dark-forest");
    }

    // "search" triggers no responder, so the log stays quiet
    expect_silence(&mut aria).await;
    expect_silence(&mut boro).await;
}

#[tokio::test]
async fn messages_stay_inside_their_location() {
    let addr = start_server(StubLlm::failing()).await;

    let mut aria = connect(addr).await;
    join(&mut aria, "Aria", "dark-forest").await;
    recv_envelope(&mut aria).await;

    let mut cale = connect(addr).await;
    join(&mut cale, "Cale", "mountain-pass").await;
    recv_envelope(&mut cale).await;

    send_frame(
        &mut aria,
        json!({"type": "message", "content": "the path forks here"}),
    )
    .await;

    assert_eq!(recv_envelope(&mut aria).await["sender"], "Aria");
    expect_silence(&mut cale).await;
}

#[tokio::test]
async fn message_before_join_is_dropped_and_connection_survives() {
    let addr = start_server(StubLlm::failing()).await;

    let mut ws = connect(addr).await;
    send_frame(&mut ws, json!({"type": "message", "content": "anyone?"})).await;
    expect_silence(&mut ws).await;

    // The connection is still usable
    join(&mut ws, "Aria", "dark-forest").await;
    assert_eq!(recv_envelope(&mut ws).await["type"], "join");
}

#[tokio::test]
async fn malformed_frame_keeps_the_connection_open() {
    let addr = start_server(StubLlm::failing()).await;

    let mut ws = connect(addr).await;
    ws.send(Message::Text("{not json".to_string()))
        .await
        .expect("send garbage");
    send_frame(&mut ws, json!({"type": "teleport", "to": "moon"})).await;
    expect_silence(&mut ws).await;

    join(&mut ws, "Aria", "dark-forest").await;
    assert_eq!(recv_envelope(&mut ws).await["type"], "join");
}

#[tokio::test]
async fn disconnect_announces_leave_to_remaining_members() {
    let addr = start_server(StubLlm::failing()).await;

    let mut aria = connect(addr).await;
    join(&mut aria, "Aria", "dark-forest").await;
    recv_envelope(&mut aria).await;

    let mut boro = connect(addr).await;
    join(&mut boro, "Boro", "dark-forest").await;
    recv_envelope(&mut aria).await;
    recv_envelope(&mut boro).await;

    aria.close(None).await.expect("close");

    let leave = recv_envelope(&mut boro).await;
    assert_eq!(leave["type"], "leave");
    assert_eq!(leave["sender"], "Aria");
    assert_eq!(leave["content"], "Aria has left the chat");
    // Exactly one leave event
    expect_silence(&mut boro).await;
}

#[tokio::test]
async fn agent_verdict_arrives_as_follow_up_broadcast() {
    let addr = start_server(StubLlm::answering("The goblin falls.")).await;

    let mut aria = connect(addr).await;
    join(&mut aria, "Aria", "dark-forest").await;
    recv_envelope(&mut aria).await;

    send_frame(
        &mut aria,
        json!({"type": "message", "content": "I attack the goblin"}),
    )
    .await;

    // Own message first, the adjudication afterwards
    let own = recv_envelope(&mut aria).await;
    assert_eq!(own["sender"], "Aria");

    let verdict = recv_envelope(&mut aria).await;
    assert_eq!(verdict["sender"], "Game Master");
    assert_eq!(verdict["senderId"], "gm");
    assert_eq!(verdict["type"], "message");
    assert_eq!(verdict["isAction"], true);
    assert_eq!(verdict["content"], "The goblin falls.");
}

#[tokio::test]
async fn failed_llm_means_no_follow_up() {
    let addr = start_server(StubLlm::failing()).await;

    let mut aria = connect(addr).await;
    join(&mut aria, "Aria", "dark-forest").await;
    recv_envelope(&mut aria).await;

    send_frame(
        &mut aria,
        json!({"type": "message", "content": "I attack the goblin"}),
    )
    .await;

    assert_eq!(recv_envelope(&mut aria).await["sender"], "Aria");
    expect_silence(&mut aria).await;
}

#[tokio::test]
async fn nameless_join_gets_a_generated_username() {
    let addr = start_server(StubLlm::failing()).await;

    let mut ws = connect(addr).await;
    send_frame(&mut ws, json!({"type": "join", "locationId": "dark-forest"})).await;

    let joined = recv_envelope(&mut ws).await;
    let name = joined["sender"].as_str().expect("sender is a string");
    assert!((4..=7).contains(&name.len()), "unexpected name: {name}");
    assert!(name.chars().next().expect("non-empty").is_ascii_uppercase());
    assert_eq!(
        joined["content"],
        format!("{name} has joined the chat")
    );
}

#[tokio::test]
async fn gm_http_broadcast_reaches_the_room() {
    let addr = start_server(StubLlm::failing()).await;

    let mut aria = connect(addr).await;
    join(&mut aria, "Aria", "dark-forest").await;
    recv_envelope(&mut aria).await;

    let mut cale = connect(addr).await;
    join(&mut cale, "Cale", "mountain-pass").await;
    recv_envelope(&mut cale).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/gm/broadcast"))
        .json(&json!({"content": "A storm rolls in.", "locationId": "dark-forest"}))
        .send()
        .await
        .expect("gm broadcast request");
    assert!(response.status().is_success());

    let beat = recv_envelope(&mut aria).await;
    assert_eq!(beat["sender"], "GM");
    assert_eq!(beat["senderId"], "gm");
    assert_eq!(beat["content"], "A storm rolls in.");
    expect_silence(&mut cale).await;
}
