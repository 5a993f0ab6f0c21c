//! End-to-end tests of the relay over real sockets.
//!
//! The server runs in-process on an ephemeral port with a scripted media
//! engine, and clients talk to it with tokio-tungstenite.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use kakehashi_server::{
    domain::{ConnectionRegistry, MediaEngine, MediaEngineError, SdpType, SessionDescription},
    infrastructure::registry::InMemoryConnectionRegistry,
    ui::{RelayConfig, Server},
    usecase::{
        BroadcastChatUseCase, ConnectClientUseCase, DisconnectClientUseCase, ListClientsUseCase,
        NegotiationEngine,
    },
};
use kakehashi_shared::time::SystemClock;
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::oneshot};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Client = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Media engine that answers every offer with a fixed SDP
struct ScriptedMediaEngine;

#[async_trait]
impl MediaEngine for ScriptedMediaEngine {
    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), MediaEngineError> {
        if description.sdp.is_empty() {
            return Err(MediaEngineError::InvalidDescription("empty sdp".to_string()));
        }
        Ok(())
    }

    async fn create_answer(&self) -> Result<SessionDescription, MediaEngineError> {
        Ok(SessionDescription::answer("scripted-answer"))
    }

    async fn set_local_description(
        &self,
        _description: SessionDescription,
    ) -> Result<(), MediaEngineError> {
        Ok(())
    }
}

/// Helper struct to manage an in-process server
struct TestServer {
    addr: std::net::SocketAddr,
    registry: Arc<InMemoryConnectionRegistry>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    async fn start(config: RelayConfig) -> Self {
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let server = Server::new(
            Arc::new(ConnectClientUseCase::new(
                registry.clone(),
                Arc::new(SystemClock),
            )),
            Arc::new(DisconnectClientUseCase::new(registry.clone())),
            Arc::new(BroadcastChatUseCase::new(
                registry.clone(),
                config.exclude_sender,
            )),
            Arc::new(ListClientsUseCase::new(registry.clone())),
            Arc::new(NegotiationEngine::new(Arc::new(ScriptedMediaEngine))),
            config.idle_timeout,
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve(listener, async move {
            let _ = shutdown_rx.await;
        }));

        TestServer {
            addr,
            registry,
            shutdown: Some(shutdown_tx),
            handle,
        }
    }

    fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Connect a client and wait until the server has registered it
    async fn connect(&self) -> Client {
        let before = self.registry.count().await;
        let (client, _) = connect_async(self.ws_url()).await.unwrap();
        self.wait_for_count(before + 1).await;
        client
    }

    async fn wait_for_count(&self, expected: usize) {
        for _ in 0..100 {
            if self.registry.count().await == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "registry never reached {} clients (has {})",
            expected,
            self.registry.count().await
        );
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = tokio::time::timeout(Duration::from_secs(5), self.handle).await;
    }
}

async fn send_json(client: &mut Client, value: Value) {
    client
        .send(Message::Text(value.to_string().into()))
        .await
        .unwrap();
}

/// Next text frame, or `None` if nothing arrives in time
async fn recv_text(client: &mut Client, wait: Duration) -> Option<String> {
    loop {
        match tokio::time::timeout(wait, client.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => return Some(text.as_str().to_owned()),
            Ok(Some(Ok(Message::Ping(_) | Message::Pong(_)))) => continue,
            _ => return None,
        }
    }
}

/// Whether the server closes the connection within `wait`
async fn is_closed_by_server(client: &mut Client, wait: Duration) -> bool {
    loop {
        match tokio::time::timeout(wait, client.next()).await {
            Ok(None) | Ok(Some(Err(_))) | Ok(Some(Ok(Message::Close(_)))) => return true,
            Ok(Some(Ok(_))) => continue,
            Err(_) => return false,
        }
    }
}

async fn get_json(server: &TestServer, path: &str) -> Value {
    reqwest::get(server.http_url(path))
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

fn chat(sender: &str, message: &str) -> Value {
    json!({"type": 0, "payload": {"sender": sender, "message": message, "timestamp": "12:00"}})
}

const SHORT: Duration = Duration::from_millis(200);
const LONG: Duration = Duration::from_secs(2);

#[tokio::test]
async fn test_chat_is_relayed_to_other_clients_only() {
    // テスト項目: チャットが送信者以外の全クライアントに届く
    // given (前提条件):
    let server = TestServer::start(RelayConfig::default()).await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    let mut charlie = server.connect().await;

    // when (操作):
    send_json(&mut alice, chat("alice", "Hello!")).await;

    // then (期待する結果):
    let expected = r#"{"sender":"alice","message":"Hello!","timestamp":"12:00"}"#;
    assert_eq!(recv_text(&mut bob, LONG).await.as_deref(), Some(expected));
    assert_eq!(recv_text(&mut charlie, LONG).await.as_deref(), Some(expected));
    assert_eq!(recv_text(&mut alice, SHORT).await, None);

    server.stop().await;
}

#[tokio::test]
async fn test_chat_echoes_to_sender_when_exclusion_disabled() {
    // テスト項目: 送信者除外を無効にすると送信者にもチャットが届く
    // given (前提条件):
    let config = RelayConfig {
        exclude_sender: false,
        ..RelayConfig::default()
    };
    let server = TestServer::start(config).await;
    let mut alice = server.connect().await;

    // when (操作):
    send_json(&mut alice, chat("alice", "echo")).await;

    // then (期待する結果):
    let received = recv_text(&mut alice, LONG).await.unwrap();
    let value: Value = serde_json::from_str(&received).unwrap();
    assert_eq!(value["message"], "echo");

    server.stop().await;
}

#[tokio::test]
async fn test_invalid_chat_is_dropped_and_connection_kept() {
    // テスト項目: 不正なチャットは配信されず、送信者の接続は維持される
    // given (前提条件):
    let server = TestServer::start(RelayConfig::default()).await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;

    // when (操作): message フィールドのないチャット
    send_json(
        &mut alice,
        json!({"type": 0, "payload": {"sender": "alice", "timestamp": "12:00"}}),
    )
    .await;

    // then (期待する結果):
    assert_eq!(recv_text(&mut bob, SHORT).await, None);
    assert_eq!(server.registry.count().await, 2);

    // 続けて送った正しいチャットは届く
    send_json(&mut alice, chat("alice", "still here")).await;
    assert!(recv_text(&mut bob, LONG).await.is_some());

    server.stop().await;
}

#[tokio::test]
async fn test_offer_is_answered_to_requester() {
    // テスト項目: オファーを送ったクライアントにだけアンサーが返る
    // given (前提条件):
    let server = TestServer::start(RelayConfig::default()).await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;

    // when (操作):
    send_json(
        &mut alice,
        json!({"type": 1, "payload": {"type": "offer", "sdp": "v=0"}}),
    )
    .await;

    // then (期待する結果):
    let answer: Value = serde_json::from_str(&recv_text(&mut alice, LONG).await.unwrap()).unwrap();
    assert_eq!(
        answer,
        json!({"type": 1, "payload": {"type": "answer", "sdp": "scripted-answer"}})
    );
    assert_eq!(recv_text(&mut bob, SHORT).await, None);

    // ネゴシエーション状態がデバッグエンドポイントに反映される
    let state: Value = get_json(&server, "/debug/negotiation").await;
    assert_eq!(state["remote_description"]["sdp"], "v=0");
    assert_eq!(state["local_description"]["type"], SdpType::Answer.as_str());

    server.stop().await;
}

#[tokio::test]
async fn test_signaling_errors_keep_connection_open() {
    // テスト項目: 未対応ロールや拒否された SDP でも接続は維持され、ネゴシエーション状態は変わらない
    // given (前提条件):
    let server = TestServer::start(RelayConfig::default()).await;
    let mut alice = server.connect().await;
    let before = get_json(&server, "/debug/negotiation").await;

    // when (操作):
    send_json(
        &mut alice,
        json!({"type": 1, "payload": {"type": "rollback", "sdp": ""}}),
    )
    .await;
    send_json(
        &mut alice,
        json!({"type": 1, "payload": {"type": "offer", "sdp": ""}}),
    )
    .await;
    send_json(&mut alice, json!({"type": 9, "payload": {}})).await;

    // then (期待する結果):
    assert!(!is_closed_by_server(&mut alice, SHORT).await);
    assert_eq!(server.registry.count().await, 1);

    let after = get_json(&server, "/debug/negotiation").await;
    assert_eq!(after, before);
    assert_eq!(
        after,
        json!({"local_description": null, "remote_description": null})
    );

    server.stop().await;
}

#[tokio::test]
async fn test_malformed_frame_closes_only_that_connection() {
    // テスト項目: 不正なフレームを送った接続だけが閉じられ、Registry から削除される
    // given (前提条件):
    let server = TestServer::start(RelayConfig::default()).await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;

    // when (操作):
    alice
        .send(Message::Text("this is not json".into()))
        .await
        .unwrap();

    // then (期待する結果):
    assert!(is_closed_by_server(&mut alice, LONG).await);
    server.wait_for_count(1).await;

    // 残ったクライアントは影響を受けない
    let mut carol = server.connect().await;
    send_json(&mut carol, chat("carol", "hi bob")).await;
    assert!(recv_text(&mut bob, LONG).await.is_some());

    server.stop().await;
}

#[tokio::test]
async fn test_idle_connection_is_closed() {
    // テスト項目: アイドルタイムアウトを超えた接続は閉じられる
    // given (前提条件):
    let config = RelayConfig {
        idle_timeout: Some(Duration::from_millis(100)),
        ..RelayConfig::default()
    };
    let server = TestServer::start(config).await;
    let mut alice = server.connect().await;

    // when (操作): 何も送らずに待つ

    // then (期待する結果):
    assert!(is_closed_by_server(&mut alice, LONG).await);
    server.wait_for_count(0).await;

    server.stop().await;
}

#[tokio::test]
async fn test_http_endpoints() {
    // テスト項目: ヘルスチェックと接続一覧のエンドポイントが応答する
    // given (前提条件):
    let server = TestServer::start(RelayConfig::default()).await;
    let _alice = server.connect().await;

    // when (操作):
    let health: Value = get_json(&server, "/api/health").await;
    let clients: Value = get_json(&server, "/api/clients").await;

    // then (期待する結果):
    assert_eq!(health, json!({"status": "ok"}));
    let clients = clients.as_array().unwrap();
    assert_eq!(clients.len(), 1);
    assert!(clients[0]["connected_at"].as_str().unwrap().ends_with("+09:00"));

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_closes_connections() {
    // テスト項目: サーバー停止時に全ての接続が閉じられる
    // given (前提条件):
    let server = TestServer::start(RelayConfig::default()).await;
    let mut alice = server.connect().await;
    let registry = server.registry.clone();

    // when (操作):
    server.stop().await;

    // then (期待する結果):
    assert!(is_closed_by_server(&mut alice, LONG).await);
    for _ in 0..100 {
        if registry.count().await == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(registry.count().await, 0);
}
