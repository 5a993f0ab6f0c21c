//! MediaEngine trait 定義
//!
//! WebRTC のセッション記述（SDP）を適用する外部コラボレーターの抽象化。
//! 実装は `infrastructure::media_engine` にある。

use async_trait::async_trait;

use super::{MediaEngineError, SessionDescription};

/// Media engine collaborator driving one peer connection.
///
/// Implementations enforce the offer/answer signaling discipline: a remote
/// answer is only acceptable while a local offer is pending.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Apply a description received from the remote side.
    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), MediaEngineError>;

    /// Produce an answer to the currently applied remote offer.
    async fn create_answer(&self) -> Result<SessionDescription, MediaEngineError>;

    /// Apply a description produced locally.
    async fn set_local_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), MediaEngineError>;
}
