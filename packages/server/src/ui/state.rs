//! Shared application state.

use std::sync::Arc;

use crate::{
    config::RelaySettings,
    domain::TokenVerifier,
    usecase::{ConnectUserUseCase, ConversationUseCase, DisconnectUserUseCase, RelayMessageUseCase},
};

/// Shared application state
pub struct AppState {
    /// ConnectUserUseCase（接続・識別子解決のユースケース）
    pub connect_user_usecase: Arc<ConnectUserUseCase>,
    /// DisconnectUserUseCase（切断のユースケース）
    pub disconnect_user_usecase: Arc<DisconnectUserUseCase>,
    /// RelayMessageUseCase（メッセージ中継のユースケース）
    pub relay_message_usecase: Arc<RelayMessageUseCase>,
    /// ConversationUseCase（会話履歴のユースケース）
    pub conversation_usecase: Arc<ConversationUseCase>,
    /// REST の Bearer トークン検証
    pub token_verifier: Arc<dyn TokenVerifier>,
    /// 接続ポリシー
    pub settings: RelaySettings,
}
