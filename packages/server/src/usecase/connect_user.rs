//! UseCase: ユーザー接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectUserUseCase::resolve_identity() / execute() メソッド
//! - 接続時の識別子解決（クエリパラメータ / トークン）とレジストリ登録
//!
//! ### どのような状況を想定しているか
//! - 正常系：クエリパラメータ・トークンによる接続
//! - 異常系：パラメータ欠落、不正なトークン
//! - エッジケース：同一ユーザーの再接続（古い接続は close される）

use std::sync::Arc;

use crate::{
    config::IdentityMode,
    domain::{ClientId, ConnectionHandle, ConnectionRegistry, TokenVerifier},
};

use super::error::ConnectError;

/// ユーザー接続のユースケース
pub struct ConnectUserUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    token_verifier: Arc<dyn TokenVerifier>,
}

impl ConnectUserUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        token_verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            registry,
            token_verifier,
        }
    }

    /// Decide which client id an upgrade request connects as.
    ///
    /// # Arguments
    ///
    /// * `mode` - configured identity mode
    /// * `user_id` - raw `userID` query parameter, if any
    /// * `token` - raw `token` query parameter, if any
    pub fn resolve_identity(
        &self,
        mode: IdentityMode,
        user_id: Option<String>,
        token: Option<String>,
    ) -> Result<ClientId, ConnectError> {
        match mode {
            IdentityMode::QueryParam => {
                let raw = user_id
                    .filter(|value| !value.is_empty())
                    .ok_or(ConnectError::MissingUserId)?;
                Ok(ClientId::new(raw)?)
            }
            IdentityMode::Token => {
                let token = token
                    .filter(|value| !value.is_empty())
                    .ok_or(ConnectError::MissingToken)?;
                let user = self.token_verifier.verify(&token)?;
                Ok(ClientId::from(user.user_id))
            }
        }
    }

    /// 接続をレジストリに登録する
    ///
    /// 同じ client id の既存の接続は close され、置き換えられる。
    ///
    /// # Returns
    ///
    /// 置き換えられた古い接続のハンドル（存在した場合）
    pub async fn execute(
        &self,
        client_id: ClientId,
        handle: ConnectionHandle,
    ) -> Option<ConnectionHandle> {
        self.registry.register(client_id, handle).await
    }
}
