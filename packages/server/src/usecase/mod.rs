//! UseCase 層
//!
//! Domain の trait（ConnectionRegistry, MediaEngine）にのみ依存し、
//! 接続・切断・チャット配信・SDP ネゴシエーションのビジネスロジックを提供する。

mod broadcast_chat;
mod connect_client;
mod disconnect_client;
mod error;
mod list_clients;
mod negotiate;

pub use broadcast_chat::{BroadcastChatUseCase, BroadcastReport};
pub use connect_client::ConnectClientUseCase;
pub use disconnect_client::DisconnectClientUseCase;
pub use error::{BroadcastError, NegotiationError, NegotiationStep};
pub use list_clients::ListClientsUseCase;
pub use negotiate::NegotiationEngine;
