//! InMemory Message Repository 実装
//!
//! ドメイン層が定義する MessageRepository trait の具体的な実装。
//! メッセージは送信者・受信者の ID だけを保持し、読み出し時に
//! UserRepository から Principal を解決します（RDB の JOIN に相当）。

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use flexin_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    ConversationSummary, MessageId, MessageRepository, NewMessage, RepositoryError,
    StoredMessage, Timestamp, UserId, UserRepository,
};

/// Stored row, principals not yet resolved.
#[derive(Debug, Clone)]
struct MessageRecord {
    id: MessageId,
    sender_id: UserId,
    receiver_id: UserId,
    content: String,
    created_at: Timestamp,
    is_read: bool,
}

impl MessageRecord {
    fn between(&self, a: UserId, b: UserId) -> bool {
        (self.sender_id == a && self.receiver_id == b)
            || (self.sender_id == b && self.receiver_id == a)
    }

    fn is_unread_for(&self, reader_id: UserId, peer_id: UserId) -> bool {
        !self.is_read && self.receiver_id == reader_id && self.sender_id == peer_id
    }
}

#[derive(Default)]
struct MessageTable {
    next_id: i64,
    rows: Vec<MessageRecord>,
}

/// インメモリ Message Repository 実装
pub struct InMemoryMessageRepository {
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
    table: Mutex<MessageTable>,
}

impl InMemoryMessageRepository {
    pub fn new(users: Arc<dyn UserRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            clock,
            table: Mutex::new(MessageTable {
                next_id: 1,
                rows: Vec::new(),
            }),
        }
    }

    async fn hydrate(&self, record: MessageRecord) -> Result<StoredMessage, RepositoryError> {
        let sender = self.users.get_user(record.sender_id).await?;
        let receiver = self.users.get_user(record.receiver_id).await?;
        Ok(StoredMessage {
            id: record.id,
            content: record.content,
            created_at: record.created_at,
            is_read: record.is_read,
            sender,
            receiver,
        })
    }

    async fn hydrate_all(
        &self,
        records: Vec<MessageRecord>,
    ) -> Result<Vec<StoredMessage>, RepositoryError> {
        let mut messages = Vec::with_capacity(records.len());
        for record in records {
            messages.push(self.hydrate(record).await?);
        }
        Ok(messages)
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn save_message(&self, message: NewMessage) -> Result<StoredMessage, RepositoryError> {
        // Resolve both parties first so a failure stores nothing.
        let sender = self.users.get_user(message.sender_id).await?;
        let receiver = self.users.get_user(message.receiver_id).await?;

        let record = {
            let mut table = self.table.lock().await;
            let record = MessageRecord {
                id: MessageId::new(table.next_id),
                sender_id: message.sender_id,
                receiver_id: message.receiver_id,
                content: message.content,
                created_at: Timestamp::new(self.clock.now_millis()),
                is_read: false,
            };
            table.next_id += 1;
            table.rows.push(record.clone());
            record
        };

        tracing::debug!(
            message_id = record.id.value(),
            sender_id = %record.sender_id,
            receiver_id = %record.receiver_id,
            "Message stored"
        );

        Ok(StoredMessage {
            id: record.id,
            content: record.content,
            created_at: record.created_at,
            is_read: record.is_read,
            sender,
            receiver,
        })
    }

    async fn get_conversation_messages(
        &self,
        user_id: UserId,
        peer_id: UserId,
    ) -> Result<Vec<StoredMessage>, RepositoryError> {
        let records: Vec<MessageRecord> = {
            let table = self.table.lock().await;
            table
                .rows
                .iter()
                .filter(|row| row.between(user_id, peer_id))
                .cloned()
                .collect()
        };
        self.hydrate_all(records).await
    }

    async fn mark_conversation_read(
        &self,
        reader_id: UserId,
        peer_id: UserId,
    ) -> Result<(), RepositoryError> {
        let mut table = self.table.lock().await;
        let mut marked = 0usize;
        for row in table
            .rows
            .iter_mut()
            .filter(|row| row.is_unread_for(reader_id, peer_id))
        {
            row.is_read = true;
            marked += 1;
        }
        tracing::debug!(%reader_id, %peer_id, marked, "Conversation marked as read");
        Ok(())
    }

    async fn count_unread(
        &self,
        reader_id: UserId,
        peer_id: UserId,
    ) -> Result<usize, RepositoryError> {
        let table = self.table.lock().await;
        Ok(table
            .rows
            .iter()
            .filter(|row| row.is_unread_for(reader_id, peer_id))
            .count())
    }

    async fn get_user_conversations(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ConversationSummary>, RepositoryError> {
        // peer -> (last record, unread count)
        let grouped: BTreeMap<UserId, (MessageRecord, usize)> = {
            let table = self.table.lock().await;
            let mut grouped: BTreeMap<UserId, (MessageRecord, usize)> = BTreeMap::new();
            for row in &table.rows {
                let peer_id = if row.sender_id == user_id {
                    row.receiver_id
                } else if row.receiver_id == user_id {
                    row.sender_id
                } else {
                    continue;
                };
                let unread = usize::from(row.is_unread_for(user_id, peer_id));
                grouped
                    .entry(peer_id)
                    .and_modify(|(last, count)| {
                        *last = row.clone();
                        *count += unread;
                    })
                    .or_insert_with(|| (row.clone(), unread));
            }
            grouped
        };

        let mut conversations = Vec::with_capacity(grouped.len());
        for (peer_id, (last, unread_count)) in grouped {
            let peer = self.users.get_user(peer_id).await?;
            let last_message = self.hydrate(last).await?;
            conversations.push(ConversationSummary {
                peer,
                last_message,
                unread_count,
            });
        }
        conversations.sort_by(|a, b| b.last_message.id.cmp(&a.last_message.id));

        Ok(conversations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::Principal, infrastructure::repository::InMemoryUserRepository};
    use flexin_shared::time::FixedClock;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - save_message が ID・作成時刻・既読フラグ・Principal を含む正規形を返すこと
    // - 存在しないユーザー宛ての保存が失敗し、何も保存されないこと（原子性）
    // - 会話履歴・未読数・既読化・会話一覧が保存内容と整合すること
    // ========================================

    const NOW: i64 = 1_700_000_000_000;

    fn create_test_repository() -> InMemoryMessageRepository {
        let users = Arc::new(InMemoryUserRepository::with_users([
            Principal::new(UserId::new(5), "alice", "Alice Doe", "alice@example.com"),
            Principal::new(UserId::new(9), "bob", "Bob Roe", "bob@example.com"),
            Principal::new(UserId::new(12), "carol", "Carol Poe", "carol@example.com"),
        ]));
        InMemoryMessageRepository::new(users, Arc::new(FixedClock::new(NOW)))
    }

    fn new_message(from: i64, to: i64, content: &str) -> NewMessage {
        NewMessage::new(UserId::new(from), UserId::new(to), content.to_string())
    }

    #[tokio::test]
    async fn test_save_message_returns_canonical_form() {
        // テスト項目: 保存したメッセージがサーバー採番の ID と時刻を持つ正規形で返される
        // given (前提条件):
        let repository = create_test_repository();

        // when (操作):
        let first = repository
            .save_message(new_message(5, 9, "hello"))
            .await
            .unwrap();
        let second = repository
            .save_message(new_message(9, 5, "hi"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(first.id, MessageId::new(1));
        assert_eq!(second.id, MessageId::new(2));
        assert_eq!(first.content, "hello");
        assert_eq!(first.created_at, Timestamp::new(NOW));
        assert!(!first.is_read);
        assert_eq!(first.sender.user_name, "alice");
        assert_eq!(first.receiver.user_name, "bob");
    }

    #[tokio::test]
    async fn test_save_message_stamps_current_clock_time() {
        // テスト項目: 作成時刻は保存した時点の Clock の値になる
        // given (前提条件):
        let users = Arc::new(InMemoryUserRepository::with_users([
            Principal::new(UserId::new(5), "alice", "Alice Doe", "alice@example.com"),
            Principal::new(UserId::new(9), "bob", "Bob Roe", "bob@example.com"),
        ]));
        let clock = Arc::new(FixedClock::new(NOW));
        let repository = InMemoryMessageRepository::new(users, clock.clone());

        // when (操作):
        let first = repository
            .save_message(new_message(5, 9, "first"))
            .await
            .unwrap();
        clock.advance(1_500);
        let second = repository
            .save_message(new_message(9, 5, "second"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(first.created_at, Timestamp::new(NOW));
        assert_eq!(second.created_at, Timestamp::new(NOW + 1_500));
    }

    #[tokio::test]
    async fn test_save_message_to_unknown_user_stores_nothing() {
        // テスト項目: 存在しないユーザー宛ての保存は失敗し、履歴に残らない
        // given (前提条件):
        let repository = create_test_repository();

        // when (操作):
        let result = repository.save_message(new_message(5, 404, "lost")).await;

        // then (期待する結果):
        assert_eq!(result, Err(RepositoryError::UserNotFound(UserId::new(404))));
        let next = repository
            .save_message(new_message(5, 9, "kept"))
            .await
            .unwrap();
        assert_eq!(next.id, MessageId::new(1));
    }

    #[tokio::test]
    async fn test_get_conversation_messages_only_between_pair() {
        // テスト項目: 会話履歴には当事者 2 人の間のメッセージだけが古い順に含まれる
        // given (前提条件):
        let repository = create_test_repository();
        repository.save_message(new_message(5, 9, "1")).await.unwrap();
        repository.save_message(new_message(5, 12, "x")).await.unwrap();
        repository.save_message(new_message(9, 5, "2")).await.unwrap();

        // when (操作):
        let messages = repository
            .get_conversation_messages(UserId::new(9), UserId::new(5))
            .await
            .unwrap();

        // then (期待する結果):
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_unread_count_and_mark_read() {
        // テスト項目: 未読数は相手から自分宛てのものだけを数え、既読化で 0 になる
        // given (前提条件):
        let repository = create_test_repository();
        repository.save_message(new_message(5, 9, "a")).await.unwrap();
        repository.save_message(new_message(5, 9, "b")).await.unwrap();
        repository.save_message(new_message(9, 5, "c")).await.unwrap();

        // when (操作):
        let unread_before = repository
            .count_unread(UserId::new(9), UserId::new(5))
            .await
            .unwrap();
        repository
            .mark_conversation_read(UserId::new(9), UserId::new(5))
            .await
            .unwrap();
        let unread_after = repository
            .count_unread(UserId::new(9), UserId::new(5))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(unread_before, 2);
        assert_eq!(unread_after, 0);
        // 逆方向のメッセージは既読になっていない
        assert_eq!(
            repository
                .count_unread(UserId::new(5), UserId::new(9))
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_get_user_conversations() {
        // テスト項目: 会話一覧は相手ごとに 1 件、最新の会話から順に並ぶ
        // given (前提条件):
        let repository = create_test_repository();
        repository.save_message(new_message(9, 5, "from bob")).await.unwrap();
        repository.save_message(new_message(12, 5, "from carol")).await.unwrap();
        repository.save_message(new_message(5, 9, "to bob")).await.unwrap();
        repository.save_message(new_message(9, 12, "unrelated")).await.unwrap();

        // when (操作):
        let conversations = repository
            .get_user_conversations(UserId::new(5))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(conversations.len(), 2);
        assert_eq!(conversations[0].peer.user_name, "bob");
        assert_eq!(conversations[0].last_message.content, "to bob");
        assert_eq!(conversations[0].unread_count, 1);
        assert_eq!(conversations[1].peer.user_name, "carol");
        assert_eq!(conversations[1].unread_count, 1);
    }
}
