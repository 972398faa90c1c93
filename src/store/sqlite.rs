use super::traits::{ConversationStore, ProfileStore, StoreFuture};
use super::types::{ConversationTurn, NewTurn, UserProfile};
use crate::error::StoreError;
use crate::pipeline::Sentiment;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use uuid::Uuid;

/// SQLite-backed conversation and profile store using an sqlx async pool.
pub struct SqliteStore {
    pool: SqlitePool,
}

const SCHEMA_META_TABLE: &str = "
CREATE TABLE IF NOT EXISTS mentalcare_schema_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";
const SCHEMA_VERSION_KEY: &str = "schema_version";
const SCHEMA_VERSION: u32 = 1;

fn migration_err(context: &str) -> impl FnOnce(sqlx::Error) -> StoreError + '_ {
    move |e| StoreError::Migration(format!("{context}: {e}"))
}

async fn ensure_schema_version(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(SCHEMA_META_TABLE)
        .execute(pool)
        .await
        .map_err(migration_err("create schema meta table"))?;

    let stored_version: Option<(String,)> =
        sqlx::query_as("SELECT value FROM mentalcare_schema_meta WHERE key = $1")
            .bind(SCHEMA_VERSION_KEY)
            .fetch_optional(pool)
            .await
            .map_err(migration_err("load schema version"))?;

    if let Some((value,)) = stored_version {
        let parsed = value.parse::<u32>().map_err(|_| {
            StoreError::Migration(format!("invalid schema version value: {value}"))
        })?;
        if parsed != SCHEMA_VERSION {
            return Err(StoreError::Migration(format!(
                "incompatible schema version: stored={parsed}, expected={SCHEMA_VERSION}"
            )));
        }
        return Ok(());
    }

    sqlx::query("INSERT INTO mentalcare_schema_meta (key, value) VALUES ($1, $2)")
        .bind(SCHEMA_VERSION_KEY)
        .bind(SCHEMA_VERSION.to_string())
        .execute(pool)
        .await
        .map_err(migration_err("persist schema version"))?;

    Ok(())
}

impl SqliteStore {
    /// Wrap an existing pool and create the schema if needed.
    pub async fn new(pool: SqlitePool) -> Result<Self, StoreError> {
        ensure_schema_version(&pool).await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS conversation_turns (
                 seq          INTEGER PRIMARY KEY AUTOINCREMENT,
                 id           TEXT NOT NULL UNIQUE,
                 user_id      TEXT NOT NULL,
                 user_message TEXT NOT NULL,
                 ai_message   TEXT NOT NULL DEFAULT '',
                 sentiment    TEXT NOT NULL,
                 timestamp_ms INTEGER NOT NULL
             )",
        )
        .execute(&pool)
        .await
        .map_err(migration_err("create conversation_turns table"))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_conversation_turns_user
                 ON conversation_turns(user_id, timestamp_ms, seq)",
        )
        .execute(&pool)
        .await
        .map_err(migration_err("create conversation_turns index"))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS user_profiles (
                 user_id       TEXT PRIMARY KEY,
                 full_name     TEXT NOT NULL,
                 date_of_birth TEXT NOT NULL,
                 phone         TEXT,
                 updated_at    TEXT NOT NULL
             )",
        )
        .execute(&pool)
        .await
        .map_err(migration_err("create user_profiles table"))?;

        Ok(Self { pool })
    }

    /// Access the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Round-trip a trivial query; used by the health check.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(())
    }
}

fn decode_err(e: impl std::fmt::Display) -> StoreError {
    StoreError::Decode(e.to_string())
}

fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StoreError::Decode(format!("timestamp out of range: {millis}")))
}

fn map_turn_row(row: &SqliteRow) -> Result<ConversationTurn, StoreError> {
    let sentiment_raw: String = row.try_get("sentiment").map_err(decode_err)?;
    let timestamp_ms: i64 = row.try_get("timestamp_ms").map_err(decode_err)?;

    Ok(ConversationTurn {
        id: row.try_get("id").map_err(decode_err)?,
        user_id: row.try_get("user_id").map_err(decode_err)?,
        user_message: row.try_get("user_message").map_err(decode_err)?,
        ai_message: row.try_get("ai_message").map_err(decode_err)?,
        sentiment: sentiment_raw.parse::<Sentiment>().map_err(StoreError::Decode)?,
        timestamp: millis_to_datetime(timestamp_ms)?,
    })
}

fn map_profile_row(row: &SqliteRow) -> Result<UserProfile, StoreError> {
    let dob_raw: String = row.try_get("date_of_birth").map_err(decode_err)?;
    let updated_raw: String = row.try_get("updated_at").map_err(decode_err)?;

    Ok(UserProfile {
        user_id: row.try_get("user_id").map_err(decode_err)?,
        full_name: row.try_get("full_name").map_err(decode_err)?,
        date_of_birth: NaiveDate::parse_from_str(&dob_raw, "%Y-%m-%d").map_err(decode_err)?,
        phone: row.try_get("phone").map_err(decode_err)?,
        updated_at: DateTime::parse_from_rfc3339(&updated_raw)
            .map_err(decode_err)?
            .with_timezone(&Utc),
    })
}

impl ConversationStore for SqliteStore {
    fn append_turn<'a>(&'a self, turn: NewTurn<'a>) -> StoreFuture<'a, ConversationTurn> {
        Box::pin(async move {
            let id = Uuid::new_v4().to_string();
            let now_ms = Utc::now().timestamp_millis();

            // Bumps past the newest stored timestamp so ordering never ties,
            // even for inserts within the same millisecond.
            let row = sqlx::query(
                "INSERT INTO conversation_turns
                     (id, user_id, user_message, ai_message, sentiment, timestamp_ms)
                 SELECT $1, $2, $3, $4, $5, MAX($6, COALESCE(MAX(timestamp_ms), 0) + 1)
                 FROM conversation_turns
                 RETURNING timestamp_ms",
            )
            .bind(&id)
            .bind(turn.user_id)
            .bind(turn.user_message)
            .bind(turn.ai_message)
            .bind(turn.sentiment.as_str())
            .bind(now_ms)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;

            let timestamp_ms: i64 = row.try_get("timestamp_ms").map_err(decode_err)?;

            Ok(ConversationTurn {
                id,
                user_id: turn.user_id.to_string(),
                user_message: turn.user_message.to_string(),
                ai_message: turn.ai_message.to_string(),
                sentiment: turn.sentiment,
                timestamp: millis_to_datetime(timestamp_ms)?,
            })
        })
    }

    fn turns_for_user<'a>(&'a self, user_id: &'a str) -> StoreFuture<'a, Vec<ConversationTurn>> {
        Box::pin(async move {
            let rows = sqlx::query(
                "SELECT id, user_id, user_message, ai_message, sentiment, timestamp_ms
                 FROM conversation_turns
                 WHERE user_id = $1
                 ORDER BY timestamp_ms ASC, seq ASC",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

            rows.iter().map(map_turn_row).collect()
        })
    }

    fn delete_user_turns<'a>(&'a self, user_id: &'a str) -> StoreFuture<'a, u64> {
        Box::pin(async move {
            let delete_err = |e: sqlx::Error| StoreError::Delete(e.to_string());

            let mut tx = self.pool.begin().await.map_err(delete_err)?;
            let result = sqlx::query("DELETE FROM conversation_turns WHERE user_id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(delete_err)?;
            tx.commit().await.map_err(delete_err)?;

            Ok(result.rows_affected())
        })
    }
}

impl ProfileStore for SqliteStore {
    fn upsert_profile<'a>(&'a self, profile: &'a UserProfile) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            sqlx::query(
                "INSERT INTO user_profiles (user_id, full_name, date_of_birth, phone, updated_at)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT(user_id) DO UPDATE SET
                     full_name = excluded.full_name,
                     date_of_birth = excluded.date_of_birth,
                     phone = excluded.phone,
                     updated_at = excluded.updated_at",
            )
            .bind(&profile.user_id)
            .bind(&profile.full_name)
            .bind(profile.date_of_birth.format("%Y-%m-%d").to_string())
            .bind(profile.phone.as_deref())
            .bind(profile.updated_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;
            Ok(())
        })
    }

    fn load_profile<'a>(&'a self, user_id: &'a str) -> StoreFuture<'a, Option<UserProfile>> {
        Box::pin(async move {
            let row = sqlx::query(
                "SELECT user_id, full_name, date_of_birth, phone, updated_at
                 FROM user_profiles
                 WHERE user_id = $1",
            )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

            row.map(|r| map_profile_row(&r)).transpose()
        })
    }
}
