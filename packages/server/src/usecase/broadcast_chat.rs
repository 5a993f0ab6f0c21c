//! UseCase: チャット配信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - BroadcastChatUseCase::execute() メソッド
//! - ペイロード検証、送信者除外、宛先ごとの独立した配信
//!
//! ### なぜこのテストが必要か
//! - 不正なペイロードは誰にも配信されてはならない
//! - 一部の宛先への配信失敗が他の宛先や送信者の接続に影響してはならない
//! - 全ての宛先が同一のバイト列を受け取ることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：N 人接続時に N-1 人（送信者除外）または N 人へ配信
//! - 異常系：message フィールドの欠落
//! - エッジケース：受信側が既に閉じている宛先を含む配信

use std::sync::Arc;

use serde_json::Value;

use crate::{
    domain::{ClientId, ConnectionRegistry, DeliveryError},
    infrastructure::dto::websocket::{encode_chat, parse_chat_payload},
};

use super::error::BroadcastError;

/// 配信結果
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// 配信に成功した宛先
    pub delivered: Vec<ClientId>,
    /// 宛先ごとの配信失敗
    pub failed: Vec<DeliveryError>,
}

/// チャット配信のユースケース
pub struct BroadcastChatUseCase {
    /// Registry（接続管理の抽象化）
    registry: Arc<dyn ConnectionRegistry>,
    /// 送信者自身には配信しない
    exclude_sender: bool,
}

impl BroadcastChatUseCase {
    /// 新しい BroadcastChatUseCase を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>, exclude_sender: bool) -> Self {
        Self {
            registry,
            exclude_sender,
        }
    }

    /// チャット配信を実行
    ///
    /// # Arguments
    ///
    /// * `sender` - 送信者のクライアント ID（不明な場合は `None`）
    /// * `payload` - エンベロープから取り出したチャットペイロード
    ///
    /// # Returns
    ///
    /// * `Ok(BroadcastReport)` - 宛先ごとの配信結果
    /// * `Err(BroadcastError)` - ペイロード不正など、誰にも配信されなかった
    pub async fn execute(
        &self,
        sender: Option<&ClientId>,
        payload: &Value,
    ) -> Result<BroadcastReport, BroadcastError> {
        // 1. 検証とエンコード（1 回だけ）
        let message = parse_chat_payload(payload)?;
        let encoded = encode_chat(&message)?;

        // 2. スナップショットを取得（ロックはここで解放される）
        let connections = self.registry.snapshot().await;

        // 3. 宛先ごとに独立して配信
        let mut report = BroadcastReport::default();
        for connection in connections {
            if self.exclude_sender && sender == Some(&connection.id) {
                continue;
            }
            match connection.sender.send(encoded.clone()) {
                Ok(()) => report.delivered.push(connection.id),
                Err(_) => {
                    let error = DeliveryError::ChannelClosed(connection.id);
                    tracing::warn!("Failed to deliver chat message: {}", error);
                    report.failed.push(error);
                }
            }
        }

        tracing::debug!(
            "Chat from '{}' delivered to {} client(s), {} failure(s)",
            message.sender,
            report.delivered.len(),
            report.failed.len()
        );

        Ok(report)
    }
}
