//! インメモリ ConnectionRegistry 実装
//!
//! ## 責務
//!
//! - 接続中クライアントの `OutboundChannel` を管理
//! - 配信用のスナップショットを提供
//!
//! ## 設計ノート
//!
//! WebSocket の生成と送信タスクは UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `OutboundChannel` を保持するだけで、送信そのものは
//! スナップショットを受け取った UseCase 層がロックの外で行います。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ClientConnection, ClientId, ConnectionRegistry};

/// インメモリ ConnectionRegistry 実装
///
/// ## フィールド
///
/// - `connections`: ClientId と ClientConnection のマップ
#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    connections: Mutex<HashMap<ClientId, ClientConnection>>,
}

impl InMemoryConnectionRegistry {
    /// 新しい InMemoryConnectionRegistry を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn add(&self, connection: ClientConnection) {
        let mut connections = self.connections.lock().await;
        let client_id = connection.id.clone();
        if connections.insert(client_id.clone(), connection).is_some() {
            tracing::warn!("Client '{}' was already registered, entry replaced", client_id);
        } else {
            tracing::debug!("Client '{}' registered", client_id);
        }
    }

    async fn remove(&self, client_id: &ClientId) -> bool {
        let mut connections = self.connections.lock().await;
        let removed = connections.remove(client_id).is_some();
        if removed {
            tracing::debug!("Client '{}' unregistered", client_id);
        }
        removed
    }

    async fn snapshot(&self) -> Vec<ClientConnection> {
        let connections = self.connections.lock().await;
        connections.values().cloned().collect()
    }

    async fn contains(&self, client_id: &ClientId) -> bool {
        let connections = self.connections.lock().await;
        connections.contains_key(client_id)
    }

    async fn count(&self) -> usize {
        let connections = self.connections.lock().await;
        connections.len()
    }
}
