//! MediaEngine backed by a single webrtc-rs peer connection.

use std::sync::Arc;

use async_trait::async_trait;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine as RtcMediaEngine;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

use crate::domain::{MediaEngine, MediaEngineError, SdpType, SessionDescription};

/// STUN server used when none is configured
pub const DEFAULT_ICE_SERVER: &str = "stun:stun.l.google.com:19302";

/// WebRTC media engine shared by every client of the relay
pub struct WebRtcMediaEngine {
    peer_connection: Arc<RTCPeerConnection>,
}

impl WebRtcMediaEngine {
    /// Build a peer connection with default codecs and interceptors.
    ///
    /// # Arguments
    ///
    /// * `ice_servers` - STUN/TURN urls; an empty list disables ICE servers
    pub async fn new(ice_servers: &[String]) -> Result<Self, MediaEngineError> {
        let mut media_engine = RtcMediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(|e| MediaEngineError::Engine(format!("Failed to register codecs: {}", e)))?;

        let interceptor_registry =
            register_default_interceptors(Default::default(), &mut media_engine).map_err(|e| {
                MediaEngineError::Engine(format!("Failed to register interceptors: {}", e))
            })?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(interceptor_registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|url| RTCIceServer {
                    urls: vec![url.clone()],
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = api.new_peer_connection(rtc_config).await.map_err(|e| {
            MediaEngineError::Engine(format!("Failed to create peer connection: {}", e))
        })?;
        tracing::info!(
            "WebRTC peer connection created (ice servers: {:?})",
            ice_servers
        );

        Ok(Self {
            peer_connection: Arc::new(peer_connection),
        })
    }
}

fn to_rtc(description: SessionDescription) -> Result<RTCSessionDescription, MediaEngineError> {
    let parsed = match description.sdp_type {
        SdpType::Offer => RTCSessionDescription::offer(description.sdp),
        SdpType::Answer => RTCSessionDescription::answer(description.sdp),
    };
    parsed.map_err(|e| MediaEngineError::InvalidDescription(e.to_string()))
}

fn from_rtc(description: RTCSessionDescription) -> Result<SessionDescription, MediaEngineError> {
    let sdp_type = match description.sdp_type {
        RTCSdpType::Offer => SdpType::Offer,
        RTCSdpType::Answer => SdpType::Answer,
        other => {
            return Err(MediaEngineError::Engine(format!(
                "unexpected description type: {}",
                other
            )));
        }
    };
    Ok(SessionDescription {
        sdp_type,
        sdp: description.sdp,
    })
}

#[async_trait]
impl MediaEngine for WebRtcMediaEngine {
    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), MediaEngineError> {
        let description = to_rtc(description)?;
        self.peer_connection
            .set_remote_description(description)
            .await
            .map_err(|e| MediaEngineError::InvalidState(e.to_string()))
    }

    async fn create_answer(&self) -> Result<SessionDescription, MediaEngineError> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(|e| MediaEngineError::Engine(format!("Failed to create answer: {}", e)))?;
        from_rtc(answer)
    }

    async fn set_local_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), MediaEngineError> {
        let description = to_rtc(description)?;
        self.peer_connection
            .set_local_description(description)
            .await
            .map_err(|e| MediaEngineError::InvalidState(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SESSION_ONLY_SDP: &str = "v=0\r\no=- 0 0 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\n";

    #[test]
    fn test_to_rtc_keeps_type_and_sdp() {
        // テスト項目: ドメインの SessionDescription が同じ種別・SDP の RTC 型に変換される
        // given (前提条件):
        let offer = SessionDescription::offer(SESSION_ONLY_SDP);

        // when (操作):
        let rtc = to_rtc(offer).unwrap();

        // then (期待する結果):
        assert_eq!(rtc.sdp_type, RTCSdpType::Offer);
        assert_eq!(rtc.sdp, SESSION_ONLY_SDP);
    }

    #[test]
    fn test_to_rtc_rejects_unparsable_sdp() {
        // テスト項目: 構文として不正な SDP は InvalidDescription になる
        // given (前提条件):
        let inputs = [
            SessionDescription::offer("garbage"),
            SessionDescription::answer("v=0\r\n"),
        ];

        // when (操作):
        let results: Vec<_> = inputs.into_iter().map(to_rtc).collect();

        // then (期待する結果):
        for result in results {
            assert!(
                matches!(result, Err(MediaEngineError::InvalidDescription(_))),
                "unexpected result: {:?}",
                result.map(|rtc| rtc.sdp)
            );
        }
    }

    #[test]
    fn test_from_rtc_rejects_rollback() {
        // テスト項目: rollback 種別の RTC 記述はドメインに変換できない
        // given (前提条件):
        let mut rtc = RTCSessionDescription::default();
        rtc.sdp_type = RTCSdpType::Rollback;

        // when (操作):
        let result = from_rtc(rtc);

        // then (期待する結果):
        assert!(matches!(result, Err(MediaEngineError::Engine(_))));
    }

    #[tokio::test]
    async fn test_answer_before_offer_is_rejected_by_peer_connection() {
        // テスト項目: オファー前にアンサーを適用すると webrtc-rs が状態エラーで拒否する
        // given (前提条件): ICE サーバーなしのピア接続
        let engine = WebRtcMediaEngine::new(&[]).await.unwrap();

        // when (操作):
        let result = engine
            .set_remote_description(SessionDescription::answer(SESSION_ONLY_SDP))
            .await;

        // then (期待する結果): SDP は正しく解析され、stable 状態でのリモートアンサーは不正な状態遷移
        assert!(
            matches!(result, Err(MediaEngineError::InvalidState(_))),
            "unexpected result: {:?}",
            result
        );
    }
}
