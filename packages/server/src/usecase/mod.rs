//! UseCase 層
//!
//! UI 層（WebSocket / HTTP ハンドラ）から呼ばれるアプリケーションロジック。
//! ドメイン層の trait にのみ依存します。

mod connect_user;
mod conversation;
mod disconnect_user;
mod error;
mod relay_message;

pub use connect_user::ConnectUserUseCase;
pub use conversation::ConversationUseCase;
pub use disconnect_user::DisconnectUserUseCase;
pub use error::{ConnectError, ConversationError, RelayError};
pub use relay_message::{RelayMessageUseCase, RelayOutcome};
