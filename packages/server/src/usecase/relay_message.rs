//! UseCase: メッセージ中継処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayMessageUseCase::handle_frame() / execute() メソッド
//! - 受信フレームの検証、永続化、受信者・送信者への配信
//!
//! ### なぜこのテストが必要か
//! - 配信は「永続化に成功した正規形」だけを対象にすることを保証する
//! - オフラインの相手への配信はエラーにせずスキップすることを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：受信者・送信者の両方が接続中
//! - エッジケース：受信者がオフライン、自分宛てのメッセージ
//! - 異常系：不正な JSON、数値でない ID、永続化の失敗

use std::sync::Arc;

use crate::{
    domain::{
        ClientId, ConnectionRegistry, MessageRepository, NewMessage, StoredMessage, UserId,
    },
    infrastructure::dto::websocket::{InboundChatFrame, StoredMessageDto},
};

use super::error::RelayError;

/// Result of relaying one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    /// Canonical stored message that was pushed
    pub message: StoredMessage,
    /// Whether the receiver had a live connection that accepted the push
    pub delivered_to_receiver: bool,
    /// Whether the sender's own connection accepted the echo
    pub echoed_to_sender: bool,
}

/// メッセージ中継のユースケース
///
/// Delivery is live-only and at most once per connected endpoint: an offline
/// receiver gets nothing pushed and reads the message later from the
/// conversation history.
pub struct RelayMessageUseCase {
    repository: Arc<dyn MessageRepository>,
    registry: Arc<dyn ConnectionRegistry>,
}

impl RelayMessageUseCase {
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        registry: Arc<dyn ConnectionRegistry>,
    ) -> Self {
        Self {
            repository,
            registry,
        }
    }

    /// Decode a raw JSON frame received from `sender` and relay it.
    pub async fn handle_frame(
        &self,
        sender: &ClientId,
        raw: &[u8],
    ) -> Result<RelayOutcome, RelayError> {
        let frame: InboundChatFrame =
            serde_json::from_slice(raw).map_err(|e| RelayError::MalformedFrame(e.to_string()))?;
        self.execute(sender, frame).await
    }

    /// メッセージ中継を実行
    ///
    /// # Arguments
    ///
    /// * `sender` - フレームを受信した接続の client id
    /// * `frame` - 受信フレーム
    ///
    /// # Returns
    ///
    /// * `Ok(RelayOutcome)` - 永続化に成功（配信はベストエフォート）
    /// * `Err(RelayError)` - 検証または永続化に失敗（誰にも配信されない）
    pub async fn execute(
        &self,
        sender: &ClientId,
        frame: InboundChatFrame,
    ) -> Result<RelayOutcome, RelayError> {
        // 1. 受信者・送信者の ID を数値として解析
        let receiver_id = UserId::parse(&frame.to).map_err(RelayError::InvalidReceiver)?;
        let sender_id = sender.to_user_id().map_err(RelayError::InvalidSender)?;

        tracing::info!(
            user_id = %sender,
            receiver_id = %receiver_id,
            "Relaying message"
        );

        // 2. 永続化（正規形を取得）
        let message = self
            .repository
            .save_message(NewMessage::new(sender_id, receiver_id, frame.content))
            .await?;

        let payload = serde_json::to_string(&StoredMessageDto::from(message.clone()))
            .map_err(|e| RelayError::EncodeFailed(e.to_string()))?;

        // 3. 受信者へ配信
        let receiver = ClientId::from(receiver_id);
        let delivered_to_receiver = self.push(&receiver, &payload, &message).await;

        // 4. 送信者へエコー（自分宛ての場合は 1 回だけ配信）
        let echoed_to_sender = if &receiver == sender {
            delivered_to_receiver
        } else {
            self.push(sender, &payload, &message).await
        };

        Ok(RelayOutcome {
            message,
            delivered_to_receiver,
            echoed_to_sender,
        })
    }

    /// Push `payload` to `client_id` if it is connected.
    async fn push(&self, client_id: &ClientId, payload: &str, message: &StoredMessage) -> bool {
        let Some(handle) = self.registry.lookup(client_id).await else {
            tracing::debug!(
                user_id = %client_id,
                message_id = message.id.value(),
                "Peer offline, live delivery skipped"
            );
            return false;
        };

        match handle.send(payload.to_string()) {
            Ok(()) => {
                tracing::debug!(
                    user_id = %client_id,
                    connection_id = %handle.id(),
                    message_id = message.id.value(),
                    "Message delivered"
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %client_id,
                    connection_id = %handle.id(),
                    message_id = message.id.value(),
                    "Failed to deliver message: {}",
                    e
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            ConnectionHandle, MessageId, MockMessageRepository, Outbound, Principal,
            RepositoryError, Timestamp,
        },
        infrastructure::{
            registry::WebSocketConnectionRegistry,
            repository::{InMemoryMessageRepository, InMemoryUserRepository},
        },
    };
    use flexin_shared::time::FixedClock;
    use tokio::sync::mpsc;

    const NOW: i64 = 1_700_000_000_000;

    fn client(id: &str) -> ClientId {
        ClientId::new(id.to_string()).unwrap()
    }

    fn frame(to: &str, content: &str) -> InboundChatFrame {
        InboundChatFrame {
            to: to.to_string(),
            content: content.to_string(),
        }
    }

    fn create_in_memory_repository() -> Arc<InMemoryMessageRepository> {
        let users = Arc::new(InMemoryUserRepository::with_users([
            Principal::new(UserId::new(5), "alice", "Alice Doe", "alice@example.com"),
            Principal::new(UserId::new(9), "bob", "Bob Roe", "bob@example.com"),
        ]));
        Arc::new(InMemoryMessageRepository::new(
            users,
            Arc::new(FixedClock::new(NOW)),
        ))
    }

    async fn connect(
        registry: &WebSocketConnectionRegistry,
        id: &str,
    ) -> mpsc::UnboundedReceiver<Outbound> {
        let (handle, rx) = ConnectionHandle::channel();
        registry.register(client(id), handle).await;
        rx
    }

    fn delivered(rx: &mut mpsc::UnboundedReceiver<Outbound>) -> Vec<StoredMessageDto> {
        let mut messages = Vec::new();
        while let Ok(outbound) = rx.try_recv() {
            if let Outbound::Deliver(json) = outbound {
                messages.push(serde_json::from_str(&json).unwrap());
            }
        }
        messages
    }

    #[tokio::test]
    async fn test_relay_delivers_to_receiver_and_echoes_to_sender() {
        // テスト項目: 5 → 9 のメッセージが 9 に 1 回、5 に 1 回、同じ正規形で配信される
        // given (前提条件):
        let registry = Arc::new(WebSocketConnectionRegistry::new());
        let usecase = RelayMessageUseCase::new(create_in_memory_repository(), registry.clone());
        let mut alice_rx = connect(&registry, "5").await;
        let mut bob_rx = connect(&registry, "9").await;

        // when (操作):
        let outcome = usecase
            .execute(&client("5"), frame("9", "hello"))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(outcome.delivered_to_receiver);
        assert!(outcome.echoed_to_sender);
        let to_bob = delivered(&mut bob_rx);
        let to_alice = delivered(&mut alice_rx);
        assert_eq!(to_bob.len(), 1);
        assert_eq!(to_alice.len(), 1);
        assert_eq!(to_bob[0], to_alice[0]);
        assert_eq!(to_bob[0].id, outcome.message.id.value());
        assert_eq!(to_bob[0].content, "hello");
        assert_eq!(to_bob[0].sender.id, 5);
        assert_eq!(to_bob[0].receiver.id, 9);
    }

    #[tokio::test]
    async fn test_relay_skips_offline_receiver() {
        // テスト項目: 受信者がオフラインでも保存され、送信者へのエコーは行われる
        // given (前提条件):
        let repository = create_in_memory_repository();
        let registry = Arc::new(WebSocketConnectionRegistry::new());
        let usecase = RelayMessageUseCase::new(repository.clone(), registry.clone());
        let mut alice_rx = connect(&registry, "5").await;

        // when (操作):
        let outcome = usecase
            .execute(&client("5"), frame("9", "are you there?"))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(!outcome.delivered_to_receiver);
        assert!(outcome.echoed_to_sender);
        assert_eq!(delivered(&mut alice_rx).len(), 1);
        let history = repository
            .get_conversation_messages(UserId::new(9), UserId::new(5))
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "are you there?");
    }

    #[tokio::test]
    async fn test_relay_reaches_receiver_registered_with_zero_padded_id() {
        // テスト項目: "09" で接続した受信者にも、"09" 宛て・"9" 宛てのどちらのフレームも届く
        // given (前提条件):
        let registry = Arc::new(WebSocketConnectionRegistry::new());
        let usecase = RelayMessageUseCase::new(create_in_memory_repository(), registry.clone());
        let mut alice_rx = connect(&registry, "5").await;
        let mut bob_rx = connect(&registry, "09").await;

        // when (操作):
        let padded = usecase
            .execute(&client("5"), frame("09", "hi"))
            .await
            .unwrap();
        let canonical = usecase
            .execute(&client("5"), frame("9", "hi again"))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(padded.delivered_to_receiver);
        assert!(canonical.delivered_to_receiver);
        assert_eq!(delivered(&mut bob_rx).len(), 2);
        assert_eq!(delivered(&mut alice_rx).len(), 2);
    }

    #[tokio::test]
    async fn test_relay_to_self_with_padded_id_delivers_once() {
        // テスト項目: 表記が違っても自分宛てのメッセージは 1 回だけ配信される
        // given (前提条件):
        let registry = Arc::new(WebSocketConnectionRegistry::new());
        let usecase = RelayMessageUseCase::new(create_in_memory_repository(), registry.clone());
        let mut alice_rx = connect(&registry, "5").await;

        // when (操作):
        let outcome = usecase
            .execute(&client("05"), frame("005", "note to self"))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(outcome.delivered_to_receiver);
        assert_eq!(delivered(&mut alice_rx).len(), 1);
    }

    #[tokio::test]
    async fn test_relay_to_self_delivers_once() {
        // テスト項目: 自分宛てのメッセージは自分の接続に 1 回だけ配信される
        // given (前提条件):
        let registry = Arc::new(WebSocketConnectionRegistry::new());
        let usecase = RelayMessageUseCase::new(create_in_memory_repository(), registry.clone());
        let mut alice_rx = connect(&registry, "5").await;

        // when (操作):
        let outcome = usecase
            .execute(&client("5"), frame("5", "note to self"))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(outcome.delivered_to_receiver);
        assert!(outcome.echoed_to_sender);
        assert_eq!(delivered(&mut alice_rx).len(), 1);
    }

    #[tokio::test]
    async fn test_relay_calls_gateway_once_with_parsed_ids() {
        // テスト項目: SaveMessage(5, 9, "hello") がちょうど 1 回呼ばれ、その戻り値が配信される
        // given (前提条件):
        let mut repository = MockMessageRepository::new();
        let canned = StoredMessage {
            id: MessageId::new(42),
            content: "hello".to_string(),
            created_at: Timestamp::new(NOW),
            is_read: false,
            sender: Principal::new(UserId::new(5), "alice", "Alice Doe", "alice@example.com"),
            receiver: Principal::new(UserId::new(9), "bob", "Bob Roe", "bob@example.com"),
        };
        let returned = canned.clone();
        repository
            .expect_save_message()
            .withf(|message| {
                *message
                    == NewMessage::new(UserId::new(5), UserId::new(9), "hello".to_string())
            })
            .times(1)
            .returning(move |_| Ok(returned.clone()));
        let registry = Arc::new(WebSocketConnectionRegistry::new());
        let usecase = RelayMessageUseCase::new(Arc::new(repository), registry.clone());
        let mut bob_rx = connect(&registry, "9").await;

        // when (操作):
        let outcome = usecase
            .execute(&client("5"), frame("9", "hello"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(outcome.message, canned);
        // 送信者は未接続なのでエコーなし
        assert!(!outcome.echoed_to_sender);
        let to_bob = delivered(&mut bob_rx);
        assert_eq!(to_bob.len(), 1);
        assert_eq!(to_bob[0].id, 42);
    }

    #[tokio::test]
    async fn test_relay_persistence_failure_delivers_nothing() {
        // テスト項目: 永続化に失敗した場合、誰にも配信されずエラーが返される
        // given (前提条件):
        let mut repository = MockMessageRepository::new();
        repository
            .expect_save_message()
            .times(1)
            .returning(|_| Err(RepositoryError::Unavailable("connection refused".to_string())));
        let registry = Arc::new(WebSocketConnectionRegistry::new());
        let usecase = RelayMessageUseCase::new(Arc::new(repository), registry.clone());
        let mut alice_rx = connect(&registry, "5").await;
        let mut bob_rx = connect(&registry, "9").await;

        // when (操作):
        let result = usecase.execute(&client("5"), frame("9", "hello")).await;

        // then (期待する結果):
        let error = result.unwrap_err();
        assert!(matches!(error, RelayError::PersistenceFailed(_)));
        assert!(error.is_transient());
        assert!(delivered(&mut alice_rx).is_empty());
        assert!(delivered(&mut bob_rx).is_empty());
    }

    #[tokio::test]
    async fn test_relay_rejects_non_numeric_receiver_without_persisting() {
        // テスト項目: to が数値でない場合は永続化せずに InvalidReceiver を返す
        // given (前提条件):
        let mut repository = MockMessageRepository::new();
        repository.expect_save_message().times(0);
        let usecase = RelayMessageUseCase::new(
            Arc::new(repository),
            Arc::new(WebSocketConnectionRegistry::new()),
        );

        // when (操作):
        let result = usecase
            .execute(&client("5"), frame("not-a-number", "hello"))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(RelayError::InvalidReceiver(_))));
    }

    #[tokio::test]
    async fn test_relay_rejects_non_numeric_sender() {
        // テスト項目: 接続の client id が数値でない場合は InvalidSender を返す
        // given (前提条件):
        let mut repository = MockMessageRepository::new();
        repository.expect_save_message().times(0);
        let usecase = RelayMessageUseCase::new(
            Arc::new(repository),
            Arc::new(WebSocketConnectionRegistry::new()),
        );

        // when (操作):
        let result = usecase.execute(&client("alice"), frame("9", "hello")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RelayError::InvalidSender(_))));
    }

    #[tokio::test]
    async fn test_handle_frame_rejects_malformed_json() {
        // テスト項目: JSON として解析できないフレーム、文字列でない to は MalformedFrame になる
        // given (前提条件):
        let usecase = RelayMessageUseCase::new(
            create_in_memory_repository(),
            Arc::new(WebSocketConnectionRegistry::new()),
        );

        // when (操作):
        let not_json = usecase.handle_frame(&client("5"), b"hello").await;
        let numeric_to = usecase
            .handle_frame(&client("5"), br#"{"to": 9, "content": "hi"}"#)
            .await;

        // then (期待する結果):
        assert!(matches!(not_json, Err(RelayError::MalformedFrame(_))));
        assert!(matches!(numeric_to, Err(RelayError::MalformedFrame(_))));
    }

    #[tokio::test]
    async fn test_relay_push_failure_is_not_an_error() {
        // テスト項目: 受信者の接続が既に閉じていても中継自体は成功する
        // given (前提条件):
        let registry = Arc::new(WebSocketConnectionRegistry::new());
        let usecase = RelayMessageUseCase::new(create_in_memory_repository(), registry.clone());
        let bob_rx = connect(&registry, "9").await;
        drop(bob_rx);

        // when (操作):
        let outcome = usecase
            .execute(&client("5"), frame("9", "hello"))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(!outcome.delivered_to_receiver);
    }
}
