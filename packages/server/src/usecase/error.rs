//! UseCase 層のエラー定義

use thiserror::Error;

use crate::{
    domain::MediaEngineError,
    infrastructure::dto::websocket::{ChatPayloadError, EncodeError},
};

/// チャット配信のエラー
#[derive(Debug, Error)]
pub enum BroadcastError {
    /// 必須フィールドの欠落または型違い（メッセージは破棄、接続は維持）
    #[error(transparent)]
    InvalidChatPayload(#[from] ChatPayloadError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// ネゴシエーションのどの段階で失敗したか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationStep {
    SetRemoteDescription,
    CreateAnswer,
    SetLocalDescription,
}

impl std::fmt::Display for NegotiationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NegotiationStep::SetRemoteDescription => "set remote description",
            NegotiationStep::CreateAnswer => "create answer",
            NegotiationStep::SetLocalDescription => "set local description",
        };
        f.write_str(name)
    }
}

/// メディアエンジンが SDP を拒否した
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("negotiation failed at {step}: {source}")]
pub struct NegotiationError {
    pub step: NegotiationStep,
    #[source]
    pub source: MediaEngineError,
}

impl NegotiationError {
    pub fn new(step: NegotiationStep, source: MediaEngineError) -> Self {
        Self { step, source }
    }
}
