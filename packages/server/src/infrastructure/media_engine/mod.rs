//! MediaEngine の実装
//!
//! - `webrtc`: webrtc-rs の `RTCPeerConnection` を使った実装

pub mod webrtc;

pub use self::webrtc::{DEFAULT_ICE_SERVER, WebRtcMediaEngine};
