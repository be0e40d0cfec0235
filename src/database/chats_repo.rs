// Conversation repository for chat-local
// Handles CRUD operations for saved conversations

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::models::{Conversation, Message, MessageStatus, Sender};
use super::DatabaseManager;

impl DatabaseManager {
    /// Save the given message sequence as a new named conversation
    pub fn save_conversation(&self, name: &str, messages: &[Message]) -> Result<String> {
        let conversation = Conversation::new(name, messages.to_vec());
        self.with_connection(|conn| {
            save_conversation_impl(conn, &conversation)
        })
    }

    /// Get all saved conversations with their messages (newest first)
    pub fn list_conversations(&self) -> Result<Vec<Conversation>> {
        self.with_connection(list_conversations_impl)
    }

    /// Get a single saved conversation by ID
    pub fn get_conversation(&self, chat_id: &str) -> Result<Option<Conversation>> {
        self.with_connection(|conn| {
            get_conversation_impl(conn, chat_id)
        })
    }

    /// Delete a saved conversation and all its messages
    pub fn delete_conversation(&self, chat_id: &str) -> Result<()> {
        self.with_connection(|conn| {
            delete_conversation_impl(conn, chat_id)
        })
    }
}

fn save_conversation_impl(conn: &Connection, conversation: &Conversation) -> Result<String> {
    conn.execute(
        r#"
        INSERT INTO chats (id, name, created_at)
        VALUES (?1, ?2, ?3)
        "#,
        params![conversation.id, conversation.name, conversation.created_at],
    ).context("Failed to create chat record")?;

    for (seq, message) in conversation.messages.iter().enumerate() {
        conn.execute(
            r#"
            INSERT INTO chat_messages (chat_id, seq, message_id, sender, content, created_at, status, error_message)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                conversation.id,
                seq as i64,
                message.id,
                message.sender.as_str(),
                message.text,
                message.created_at,
                message.status.as_str(),
                message.error,
            ],
        ).context("Failed to save chat message")?;
    }

    Ok(conversation.id.clone())
}

fn list_conversations_impl(conn: &Connection) -> Result<Vec<Conversation>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, name, created_at
        FROM chats
        ORDER BY created_at DESC
        "#
    ).context("Failed to prepare list_conversations query")?;

    let chats = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    }).context("Failed to query chats")?;

    let mut conversations = Vec::new();
    for chat in chats {
        let (id, name, created_at) = chat.context("Failed to read chat row")?;
        let messages = get_messages_impl(conn, &id)?;
        conversations.push(Conversation { id, name, messages, created_at });
    }

    Ok(conversations)
}

fn get_conversation_impl(conn: &Connection, chat_id: &str) -> Result<Option<Conversation>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, name, created_at
        FROM chats
        WHERE id = ?
        "#
    ).context("Failed to prepare get_conversation query")?;

    let result = stmt.query_row(params![chat_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    });

    match result {
        Ok((id, name, created_at)) => {
            let messages = get_messages_impl(conn, &id)?;
            Ok(Some(Conversation { id, name, messages, created_at }))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context("Failed to get conversation"),
    }
}

fn get_messages_impl(conn: &Connection, chat_id: &str) -> Result<Vec<Message>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT message_id, sender, content, created_at, status, error_message
        FROM chat_messages
        WHERE chat_id = ?
        ORDER BY seq ASC
        "#
    ).context("Failed to prepare get_messages query")?;

    let messages = stmt.query_map(params![chat_id], |row| {
        Ok(Message {
            id: row.get(0)?,
            sender: Sender::from_str(&row.get::<_, String>(1)?),
            text: row.get(2)?,
            created_at: row.get(3)?,
            status: MessageStatus::from_str(&row.get::<_, String>(4)?),
            error: row.get(5)?,
        })
    }).context("Failed to query chat messages")?;

    messages.collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to collect chat messages")
}

fn delete_conversation_impl(conn: &Connection, chat_id: &str) -> Result<()> {
    // Delete all messages in this conversation first
    conn.execute(
        "DELETE FROM chat_messages WHERE chat_id = ?",
        params![chat_id],
    ).context("Failed to delete chat messages")?;

    // Then delete the chat record
    conn.execute(
        "DELETE FROM chats WHERE id = ?",
        params![chat_id],
    ).context("Failed to delete chat")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_db() -> DatabaseManager {
        let dir = tempdir().unwrap().keep();
        let db_path = dir.join("test.db");
        DatabaseManager::new(db_path).unwrap()
    }

    fn sample_messages() -> Vec<Message> {
        vec![
            Message::user(1000, "Hello"),
            Message {
                id: 1001,
                sender: Sender::Assistant,
                text: "Hi there!".to_string(),
                created_at: 1001,
                status: MessageStatus::Complete,
                error: None,
            },
        ]
    }

    #[test]
    fn test_save_and_list_conversations() {
        let db = create_test_db();

        let id = db.save_conversation("First chat", &sample_messages()).unwrap();

        let conversations = db.list_conversations().unwrap();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].id, id);
        assert_eq!(conversations[0].name, "First chat");
        assert_eq!(conversations[0].messages.len(), 2);
        assert_eq!(conversations[0].messages[0].text, "Hello");
        assert_eq!(conversations[0].messages[1].sender, Sender::Assistant);
    }

    #[test]
    fn test_saving_twice_creates_distinct_records() {
        let db = create_test_db();

        let first = db.save_conversation("Chat", &sample_messages()).unwrap();
        let second = db.save_conversation("Chat", &sample_messages()).unwrap();

        assert_ne!(first, second);
        assert_eq!(db.list_conversations().unwrap().len(), 2);
    }

    #[test]
    fn test_messages_preserve_order_and_status() {
        let db = create_test_db();

        let mut messages = sample_messages();
        messages.push(Message {
            id: 1002,
            sender: Sender::Assistant,
            text: String::new(),
            created_at: 1002,
            status: MessageStatus::Failed,
            error: Some("Error: engine fault".to_string()),
        });

        let id = db.save_conversation("With failure", &messages).unwrap();
        let loaded = db.get_conversation(&id).unwrap().unwrap();

        let ids: Vec<i64> = loaded.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1000, 1001, 1002]);
        assert_eq!(loaded.messages[2].status, MessageStatus::Failed);
        assert_eq!(loaded.messages[2].error.as_deref(), Some("Error: engine fault"));
    }

    #[test]
    fn test_delete_conversation() {
        let db = create_test_db();

        let id = db.save_conversation("Doomed", &sample_messages()).unwrap();
        db.delete_conversation(&id).unwrap();

        assert!(db.get_conversation(&id).unwrap().is_none());
        assert!(db.list_conversations().unwrap().is_empty());

        // Messages must be gone as well
        db.with_connection(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM chat_messages WHERE chat_id = ?",
                params![id],
                |row| row.get(0),
            )?;
            assert_eq!(count, 0);
            Ok(())
        }).unwrap();
    }
}
