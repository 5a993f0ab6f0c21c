//! UseCase: SDP ネゴシエーション
//!
//! 全クライアントで 1 つのネゴシエーション状態（1 つのピア接続）を共有する。
//! そのため、オファー/アンサーの適用は排他ロックで完全に直列化され、
//! 同時に進行できるネゴシエーションは常に 1 つだけである。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - NegotiationEngine::apply() の状態遷移
//!
//! ### なぜこのテストが必要か
//! - Offer は remote → local(answer)、Answer は remote のみを更新する
//! - 失敗時はそこまでに適用された状態が残る（ロールバックしない）
//! - 異なる接続からの同時オファーが直列化されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：Offer の後に Answer
//! - 異常系：Offer 前の Answer、コラボレーターによる拒否
//! - エッジケース：2 つの接続からの同時 Offer

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{MediaEngine, NegotiationState, SdpType, SessionDescription, SignalingMessage};

use super::error::{NegotiationError, NegotiationStep};

/// プロセス全体で共有されるネゴシエーションエンジン
pub struct NegotiationEngine {
    /// メディアエンジン（外部コラボレーター）
    media_engine: Arc<dyn MediaEngine>,
    /// 共有ネゴシエーション状態（このロックが全ネゴシエーションを直列化する）
    state: Mutex<NegotiationState>,
}

impl NegotiationEngine {
    /// 新しい NegotiationEngine を作成
    pub fn new(media_engine: Arc<dyn MediaEngine>) -> Self {
        Self {
            media_engine,
            state: Mutex::new(NegotiationState::default()),
        }
    }

    /// シグナリングメッセージを適用
    ///
    /// ロックはオファー/アンサー 1 件の適用が終わるまで保持され、
    /// どの終了経路でも解放される。結果のアンサーを送り返すのは呼び出し側の責務。
    ///
    /// # Returns
    ///
    /// * `Ok(Some(answer))` - オファーに対して生成されたアンサー
    /// * `Ok(None)` - アンサーを適用した（送り返すものはない）
    /// * `Err(NegotiationError)` - メディアエンジンが拒否した
    pub async fn apply(
        &self,
        message: SignalingMessage,
    ) -> Result<Option<SessionDescription>, NegotiationError> {
        let mut state = self.state.lock().await;

        match message.sdp_type {
            SdpType::Offer => {
                self.media_engine
                    .set_remote_description(message.clone())
                    .await
                    .map_err(|e| NegotiationError::new(NegotiationStep::SetRemoteDescription, e))?;
                state.remote_description = Some(message);

                let answer = self
                    .media_engine
                    .create_answer()
                    .await
                    .map_err(|e| NegotiationError::new(NegotiationStep::CreateAnswer, e))?;

                self.media_engine
                    .set_local_description(answer.clone())
                    .await
                    .map_err(|e| NegotiationError::new(NegotiationStep::SetLocalDescription, e))?;
                state.local_description = Some(answer.clone());

                tracing::info!("Applied remote offer, local answer set");
                Ok(Some(answer))
            }
            SdpType::Answer => {
                self.media_engine
                    .set_remote_description(message.clone())
                    .await
                    .map_err(|e| NegotiationError::new(NegotiationStep::SetRemoteDescription, e))?;
                state.remote_description = Some(message);

                tracing::info!("Applied remote answer");
                Ok(None)
            }
        }
    }

    /// 現在のネゴシエーション状態のコピー
    pub async fn state(&self) -> NegotiationState {
        self.state.lock().await.clone()
    }
}
