//! UseCase: 会話履歴の取得・既読化
//!
//! リアルタイム配信を受け取れなかったメッセージは、ここから取得される。

use std::sync::Arc;

use crate::domain::{ConversationSummary, MessageRepository, StoredMessage, UserId};

use super::error::ConversationError;

/// 会話履歴のユースケース
pub struct ConversationUseCase {
    repository: Arc<dyn MessageRepository>,
}

impl ConversationUseCase {
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self { repository }
    }

    /// 会話一覧（相手ごとに最新メッセージと未読数）
    pub async fn list_conversations(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ConversationSummary>, ConversationError> {
        Ok(self.repository.get_user_conversations(user_id).await?)
    }

    /// 相手との全メッセージ（古い順）
    pub async fn get_messages(
        &self,
        user_id: UserId,
        peer_id: UserId,
    ) -> Result<Vec<StoredMessage>, ConversationError> {
        Ok(self
            .repository
            .get_conversation_messages(user_id, peer_id)
            .await?)
    }

    /// 相手から届いたメッセージを既読にする
    pub async fn mark_read(&self, user_id: UserId, peer_id: UserId) -> Result<(), ConversationError> {
        Ok(self
            .repository
            .mark_conversation_read(user_id, peer_id)
            .await?)
    }

    /// 相手から届いた未読メッセージ数
    pub async fn count_unread(
        &self,
        user_id: UserId,
        peer_id: UserId,
    ) -> Result<usize, ConversationError> {
        Ok(self.repository.count_unread(user_id, peer_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockMessageRepository, RepositoryError};

    #[tokio::test]
    async fn test_repository_errors_are_mapped() {
        // テスト項目: リポジトリのエラーが UseCase のエラーに変換される
        // given (前提条件):
        let mut repository = MockMessageRepository::new();
        repository
            .expect_get_user_conversations()
            .returning(|user_id| Err(RepositoryError::UserNotFound(user_id)));
        repository
            .expect_count_unread()
            .returning(|_, _| Err(RepositoryError::Unavailable("timeout".to_string())));
        let usecase = ConversationUseCase::new(Arc::new(repository));

        // when (操作):
        let list = usecase.list_conversations(UserId::new(5)).await;
        let unread = usecase.count_unread(UserId::new(5), UserId::new(9)).await;

        // then (期待する結果):
        assert_eq!(list, Err(ConversationError::UserNotFound(UserId::new(5))));
        assert!(matches!(unread, Err(ConversationError::RepositoryError(_))));
    }

    #[tokio::test]
    async fn test_mark_read_delegates_with_reader_first() {
        // テスト項目: 既読化は (読む人, 相手) の順でリポジトリに渡される
        // given (前提条件):
        let mut repository = MockMessageRepository::new();
        repository
            .expect_mark_conversation_read()
            .withf(|reader, peer| *reader == UserId::new(9) && *peer == UserId::new(5))
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase = ConversationUseCase::new(Arc::new(repository));

        // when (操作):
        let result = usecase.mark_read(UserId::new(9), UserId::new(5)).await;

        // then (期待する結果):
        assert_eq!(result, Ok(()));
    }
}
