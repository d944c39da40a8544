use std::{str::FromStr, sync::OnceLock};

use serde::Serialize;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Sqlite, SqlitePool,
};
use thiserror::Error;
use time::{OffsetDateTime, UtcOffset};
use uuid::Uuid;

/// Recipient meaning "everyone in the room".
pub const BROADCAST: &str = "Todos";

pub const ENTERED_TEXT: &str = "entra na sala...";
pub const DEPARTED_TEXT: &str = "sai da sala...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Message,
    PrivateMessage,
    Status,
}

#[derive(Debug, Error)]
#[error("unknown message kind {0:?}")]
pub struct UnknownKind(String);

impl MessageKind {
    /// Kinds a participant may post or edit; `status` is server-generated.
    pub const POSTABLE: [&'static str; 2] = ["message", "private_message"];

    pub fn as_str(&self) -> &'static str {
        use MessageKind::*;
        match self {
            Message => "message",
            PrivateMessage => "private_message",
            Status => "status",
        }
    }
}

impl FromStr for MessageKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use MessageKind::*;
        match s {
            "message" => Ok(Message),
            "private_message" => Ok(PrivateMessage),
            "status" => Ok(Status),
            other => Err(UnknownKind(other.to_owned())),
        }
    }
}

impl TryFrom<String> for MessageKind {
    type Error = UnknownKind;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Participant {
    pub name: String,
    /// Milliseconds since the Unix epoch of the last heartbeat.
    #[serde(rename = "lastStatus")]
    pub last_status: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Message {
    pub id: String,
    #[sqlx(rename = "from_name")]
    pub from: String,
    #[sqlx(rename = "to_name")]
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub kind: MessageKind,
    pub time: String,
}

pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

static LOCAL_OFFSET: OnceLock<UtcOffset> = OnceLock::new();

/// Pins the server's UTC offset for `clock`. The offset can only be read
/// soundly while the process is single-threaded, so call this before the
/// runtime starts. Without it, stamps are in UTC.
pub fn init_local_offset() -> UtcOffset {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    *LOCAL_OFFSET.get_or_init(|| offset)
}

/// Wall-clock stamp carried by every message, `HH:MM:SS` in server local time.
pub fn clock() -> String {
    let offset = LOCAL_OFFSET.get().copied().unwrap_or(UtcOffset::UTC);
    format_clock(OffsetDateTime::now_utc().to_offset(offset))
}

fn format_clock(at: OffsetDateTime) -> String {
    format!("{:02}:{:02}:{:02}", at.hour(), at.minute(), at.second())
}

/// Opens the pool and brings the schema up to date.
pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&db_pool).await?;
    Ok(db_pool)
}

pub async fn participant_exists<'e, E>(executor: E, name: &str) -> sqlx::Result<bool>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM participants WHERE name=?")
        .bind(name)
        .fetch_optional(executor)
        .await?;
    Ok(found.is_some())
}

pub async fn insert_message<'e, E>(
    executor: E,
    from: &str,
    to: &str,
    text: &str,
    kind: MessageKind,
) -> sqlx::Result<Uuid>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO messages (id,from_name,to_name,text,kind,time) VALUES (?,?,?,?,?,?)")
        .bind(id.to_string())
        .bind(from)
        .bind(to)
        .bind(text)
        .bind(kind.as_str())
        .bind(clock())
        .execute(executor)
        .await?;
    Ok(id)
}

pub async fn find_message(db_pool: &SqlitePool, id: &str) -> sqlx::Result<Option<Message>> {
    sqlx::query_as("SELECT id,from_name,to_name,text,kind,time FROM messages WHERE id=?")
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [MessageKind::Message, MessageKind::PrivateMessage, MessageKind::Status] {
            assert_eq!(kind.as_str().parse::<MessageKind>().unwrap(), kind);
        }
        assert!("shout".parse::<MessageKind>().is_err());
    }

    #[test]
    fn test_kind_serializes_as_type_name() {
        let json = serde_json::to_value(MessageKind::PrivateMessage).unwrap();
        assert_eq!(json, "private_message");
    }

    #[test]
    fn test_clock_format() {
        let stamp = clock();
        assert_eq!(stamp.len(), 8);
        assert_eq!(stamp.as_bytes()[2], b':');
        assert_eq!(stamp.as_bytes()[5], b':');
    }

    #[test]
    fn test_clock_follows_offset() {
        // 23:30:00 UTC
        let at = OffsetDateTime::from_unix_timestamp(84_600).unwrap();
        assert_eq!(format_clock(at), "23:30:00");

        let ahead = UtcOffset::from_hms(2, 0, 0).unwrap();
        assert_eq!(format_clock(at.to_offset(ahead)), "01:30:00");
    }

    #[test]
    fn test_message_serializes_with_wire_names() {
        let message = Message {
            id: "id".into(),
            from: "ana".into(),
            to: BROADCAST.into(),
            text: "oi".into(),
            kind: MessageKind::Message,
            time: "10:00:00".into(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["from"], "ana");
        assert_eq!(json["to"], "Todos");
        assert_eq!(json["type"], "message");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_insert_then_find_message(db_pool: SqlitePool) {
        let id = insert_message(&db_pool, "ana", BROADCAST, "oi", MessageKind::Message)
            .await
            .unwrap();

        let found = find_message(&db_pool, &id.to_string()).await.unwrap().unwrap();
        assert_eq!(found.from, "ana");
        assert_eq!(found.kind, MessageKind::Message);

        assert!(find_message(&db_pool, "missing").await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_participant_exists(db_pool: SqlitePool) {
        assert!(!participant_exists(&db_pool, "ana").await.unwrap());
        sqlx::query("INSERT INTO participants (name,last_status) VALUES ('ana',0)")
            .execute(&db_pool)
            .await
            .unwrap();
        assert!(participant_exists(&db_pool, "ana").await.unwrap());
    }
}
