//! UseCase: クライアント接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectClientUseCase::execute() メソッド
//! - ID の採番と Registry への登録
//!
//! ### なぜこのテストが必要か
//! - ID はサーバー側で一意に生成しなければならない（クライアント入力は使わない）
//! - 読み取りループ開始前に Registry へ登録されていることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続の登録
//! - エッジケース：同時に複数接続しても ID が衝突しない

use std::sync::Arc;

use kakehashi_shared::time::Clock;

use crate::domain::{
    ClientConnection, ClientId, ClientIdFactory, ConnectionRegistry, OutboundChannel, Timestamp,
};

/// クライアント接続のユースケース
pub struct ConnectClientUseCase {
    /// Registry（接続管理の抽象化）
    registry: Arc<dyn ConnectionRegistry>,
    /// 接続時刻の取得元
    clock: Arc<dyn Clock>,
}

impl ConnectClientUseCase {
    /// 新しい ConnectClientUseCase を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// クライアント接続を実行
    ///
    /// # Arguments
    ///
    /// * `sender` - クライアントへのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// 採番されたクライアント ID（Domain Model）
    pub async fn execute(&self, sender: OutboundChannel) -> ClientId {
        let client_id = ClientIdFactory::generate();
        let connected_at = Timestamp::new(self.clock.now_millis());

        self.registry
            .add(ClientConnection::new(client_id.clone(), sender, connected_at))
            .await;

        client_id
    }
}
