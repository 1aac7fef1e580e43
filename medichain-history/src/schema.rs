pub const CONVERSATIONS_TABLE: &str = "conversations";
pub const MESSAGES_TABLE: &str = "messages";
pub const SCHEMA_VERSION: u32 = 1;

/// Timestamps are RFC 3339 UTC text so both backends sort them the same way.
pub const CREATE_CONVERSATIONS_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS conversations (\
    id TEXT PRIMARY KEY,\
    title TEXT,\
    created_at TEXT NOT NULL,\
    updated_at TEXT NOT NULL\
)";

pub const CREATE_MESSAGES_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS messages (\
    id TEXT PRIMARY KEY,\
    conversation_id TEXT NOT NULL,\
    seq BIGINT NOT NULL,\
    content TEXT NOT NULL,\
    sender TEXT NOT NULL,\
    created_at TEXT NOT NULL,\
    updated_at TEXT NOT NULL\
)";

pub const CREATE_MESSAGES_INDEX_SQL: &str =
    "CREATE INDEX IF NOT EXISTS messages_conversation_seq ON messages (conversation_id, seq)";

pub const MIGRATION_STATEMENTS_SQL: [&str; 3] = [
    CREATE_CONVERSATIONS_TABLE_SQL,
    CREATE_MESSAGES_TABLE_SQL,
    CREATE_MESSAGES_INDEX_SQL,
];

pub const UPSERT_CONVERSATION_SQL: &str = "INSERT INTO conversations (id, title, created_at, updated_at) \
    VALUES ($1, $2, $3, $4) \
    ON CONFLICT (id) DO UPDATE SET \
    updated_at = excluded.updated_at, \
    title = COALESCE(conversations.title, excluded.title)";

pub const INSERT_MESSAGE_SQL: &str = "INSERT INTO messages \
    (id, conversation_id, seq, content, sender, created_at, updated_at) \
    VALUES ($1, $2, (SELECT COALESCE(MAX(seq), 0) + 1 FROM messages WHERE conversation_id = $3), $4, $5, $6, $7)";

pub const SELECT_MESSAGES_SQL: &str = "SELECT content, sender, created_at FROM messages \
    WHERE conversation_id = $1 ORDER BY seq ASC";

pub const SELECT_CONVERSATIONS_SQL: &str = "SELECT id, title, created_at, updated_at \
    FROM conversations ORDER BY updated_at DESC";

pub const DELETE_MESSAGES_SQL: &str = "DELETE FROM messages WHERE conversation_id = $1";

pub const DELETE_CONVERSATION_SQL: &str = "DELETE FROM conversations WHERE id = $1";
