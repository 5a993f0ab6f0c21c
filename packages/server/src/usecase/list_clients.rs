//! UseCase: 接続中クライアント一覧の取得

use std::sync::Arc;

use crate::domain::{ClientId, ConnectionRegistry, Timestamp};

/// 接続中クライアント一覧取得のユースケース
pub struct ListClientsUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl ListClientsUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 接続時刻順（同時刻は ID 順）のクライアント一覧
    pub async fn execute(&self) -> Vec<(ClientId, Timestamp)> {
        let mut clients: Vec<(ClientId, Timestamp)> = self
            .registry
            .snapshot()
            .await
            .into_iter()
            .map(|connection| (connection.id, connection.connected_at))
            .collect();
        clients.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        clients
    }
}
