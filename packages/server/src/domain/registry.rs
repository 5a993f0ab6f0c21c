//! ConnectionRegistry trait 定義
//!
//! 接続中クライアントと送信チャンネルの対応を管理するインターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ClientConnection, ClientId};

/// Outbound channel of one connection; its receiver is drained into the socket.
pub type OutboundChannel = mpsc::UnboundedSender<String>;

/// Connection Registry trait
///
/// 全ての操作は単一の排他ロックの下で行われる。`snapshot` はコピーを返すため、
/// 呼び出し側はロックを保持せずに配信できる。
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// 接続を登録（同じ ID が既に存在する場合は上書き）
    async fn add(&self, connection: ClientConnection);

    /// 接続を削除（存在しない場合は何もしない）
    ///
    /// 削除した場合は `true` を返す
    async fn remove(&self, client_id: &ClientId) -> bool;

    /// 現在の接続一覧のスナップショットを取得
    async fn snapshot(&self) -> Vec<ClientConnection>;

    /// 指定した ID が登録済みかどうか
    async fn contains(&self, client_id: &ClientId) -> bool;

    /// 接続中のクライアント数を取得
    async fn count(&self) -> usize;
}
