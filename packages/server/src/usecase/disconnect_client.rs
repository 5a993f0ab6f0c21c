//! UseCase: クライアント切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectClientUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 読み取りループ終了と同時に Registry から削除されないと、
//!   閉じた接続へ配信が試みられてしまう
//!
//! ### どのような状況を想定しているか
//! - 正常系：登録済みクライアントの切断
//! - エッジケース：既に削除済みのクライアントの切断（何もしない）

use std::sync::Arc;

use crate::domain::{ClientId, ConnectionRegistry};

/// クライアント切断のユースケース
pub struct DisconnectClientUseCase {
    /// Registry（接続管理の抽象化）
    registry: Arc<dyn ConnectionRegistry>,
}

impl DisconnectClientUseCase {
    /// 新しい DisconnectClientUseCase を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// クライアント切断を実行
    ///
    /// # Returns
    ///
    /// 登録されていた場合は `true`、既に存在しなかった場合は `false`
    pub async fn execute(&self, client_id: &ClientId) -> bool {
        let removed = self.registry.remove(client_id).await;
        if !removed {
            tracing::debug!("Client '{}' was not registered", client_id);
        }
        removed
    }
}
