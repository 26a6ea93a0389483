//! UseCase: ユーザー切断処理

use std::sync::Arc;

use crate::domain::{ClientId, ConnectionId, ConnectionRegistry};

/// ユーザー切断のユースケース
pub struct DisconnectUserUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl DisconnectUserUseCase {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 終了した接続をレジストリから削除する
    ///
    /// 既に別の接続に置き換えられている場合は何もしない。
    ///
    /// # Returns
    ///
    /// エントリを削除した場合は `true`
    pub async fn execute(&self, client_id: &ClientId, connection_id: ConnectionId) -> bool {
        self.registry
            .deregister_connection(client_id, connection_id)
            .await
    }

    /// 接続中のユーザー数
    pub async fn count_remaining(&self) -> usize {
        self.registry.connected_count().await
    }
}
