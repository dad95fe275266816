//! Deck persistence.
//!
//! Generated decks are wrapped in a [`StoredDeck`] record carrying identity
//! and sharing metadata, then written through the [`DeckStore`] trait. The
//! server picks [`PostgresDeckStore`] when `DATABASE_URL` is set and falls
//! back to the process-local [`MemoryDeckStore`] otherwise.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use sha2::{Digest, Sha256};
use thiserror::Error;
use time::OffsetDateTime;
use tokio_postgres::{NoTls, Row};
use uuid::Uuid;

use articlebite_core::{Deck, Difficulty, QuestionType};

/// Errors surfaced by deck store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("deck store connection failed: {0}")]
    Connection(String),

    /// A query or row conversion failed.
    #[error("deck store operation failed: {0}")]
    Backend(String),
}

fn backend(err: impl fmt::Display) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// One persisted pipeline result.
#[derive(Debug, Clone)]
pub struct StoredDeck {
    pub id: Uuid,
    pub user_id: String,
    pub share_token: String,
    pub created_at: OffsetDateTime,
    pub deck: Deck,
}

impl StoredDeck {
    /// Wraps a freshly generated deck with a new id, creation instant, and
    /// share token.
    pub fn new(user_id: impl Into<String>, deck: Deck) -> Self {
        let id = Uuid::new_v4();
        let created_at = OffsetDateTime::now_utc();
        Self {
            id,
            user_id: user_id.into(),
            share_token: share_token_for(id, created_at),
            created_at,
            deck,
        }
    }
}

/// Derives the read-only sharing token for a deck: truncated SHA-256 over
/// the deck id and its creation instant, rendered as lowercase hex.
fn share_token_for(id: Uuid, created_at: OffsetDateTime) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    hasher.update(created_at.unix_timestamp_nanos().to_be_bytes());
    let digest = hasher.finalize();
    digest[..16].iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Persistence backend for generated decks.
#[async_trait]
pub trait DeckStore: Send + Sync {
    /// Writes a new deck record.
    async fn insert(&self, record: StoredDeck) -> Result<(), StoreError>;

    /// Looks a deck up by its id.
    async fn fetch(&self, id: Uuid) -> Result<Option<StoredDeck>, StoreError>;

    /// Looks a deck up by its share token.
    async fn fetch_shared(&self, token: &str) -> Result<Option<StoredDeck>, StoreError>;
}

/// In-memory deck store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryDeckStore {
    decks: RwLock<HashMap<Uuid, StoredDeck>>,
}

impl MemoryDeckStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeckStore for MemoryDeckStore {
    async fn insert(&self, record: StoredDeck) -> Result<(), StoreError> {
        let mut decks = self.decks.write().map_err(backend)?;
        decks.insert(record.id, record);
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<StoredDeck>, StoreError> {
        let decks = self.decks.read().map_err(backend)?;
        Ok(decks.get(&id).cloned())
    }

    async fn fetch_shared(&self, token: &str) -> Result<Option<StoredDeck>, StoreError> {
        let decks = self.decks.read().map_err(backend)?;
        Ok(decks.values().find(|record| record.share_token == token).cloned())
    }
}

/// Builds a connection pool for the given postgres URL.
pub fn connect_pool(database_url: &str) -> Result<Pool, StoreError> {
    let config = database_url
        .parse::<tokio_postgres::Config>()
        .map_err(|err| StoreError::Connection(err.to_string()))?;
    let manager = Manager::from_config(
        config,
        NoTls,
        ManagerConfig { recycling_method: RecyclingMethod::Fast },
    );
    Pool::builder(manager)
        .max_size(16)
        .build()
        .map_err(|err| StoreError::Connection(err.to_string()))
}

/// Postgres-backed deck store.
pub struct PostgresDeckStore {
    pool: Pool,
}

impl PostgresDeckStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Creates the decks table when it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let client = self.pool.get().await.map_err(|err| StoreError::Connection(err.to_string()))?;
        client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS decks (
                    id UUID PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    share_token TEXT NOT NULL UNIQUE,
                    created_at TIMESTAMPTZ NOT NULL,
                    source TEXT NOT NULL,
                    difficulty TEXT NOT NULL,
                    question_type TEXT NOT NULL,
                    cards JSONB NOT NULL
                )",
            )
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn fetch_one(
        &self,
        query: &str,
        param: &(dyn tokio_postgres::types::ToSql + Sync),
    ) -> Result<Option<StoredDeck>, StoreError> {
        let client = self.pool.get().await.map_err(|err| StoreError::Connection(err.to_string()))?;
        let row = client.query_opt(query, &[param]).await.map_err(backend)?;
        row.map(|row| row_to_record(&row)).transpose()
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, share_token, created_at, source, difficulty, question_type, cards \
     FROM decks";

#[async_trait]
impl DeckStore for PostgresDeckStore {
    async fn insert(&self, record: StoredDeck) -> Result<(), StoreError> {
        let cards = serde_json::to_value(&record.deck.cards).map_err(backend)?;
        let difficulty = record.deck.difficulty.as_str();
        let question_type = record.deck.question_type.as_str();

        let client = self.pool.get().await.map_err(|err| StoreError::Connection(err.to_string()))?;
        client
            .execute(
                "INSERT INTO decks \
                 (id, user_id, share_token, created_at, source, difficulty, question_type, cards) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
                &[
                    &record.id,
                    &record.user_id,
                    &record.share_token,
                    &record.created_at,
                    &record.deck.source,
                    &difficulty,
                    &question_type,
                    &cards,
                ],
            )
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<StoredDeck>, StoreError> {
        self.fetch_one(&format!("{SELECT_COLUMNS} WHERE id = $1"), &id).await
    }

    async fn fetch_shared(&self, token: &str) -> Result<Option<StoredDeck>, StoreError> {
        self.fetch_one(&format!("{SELECT_COLUMNS} WHERE share_token = $1"), &token).await
    }
}

fn row_to_record(row: &Row) -> Result<StoredDeck, StoreError> {
    let source: String = row.try_get("source").map_err(backend)?;
    let difficulty: String = row.try_get("difficulty").map_err(backend)?;
    let question_type: String = row.try_get("question_type").map_err(backend)?;
    let cards: serde_json::Value = row.try_get("cards").map_err(backend)?;

    let deck = Deck::new(
        source,
        difficulty.parse::<Difficulty>().map_err(backend)?,
        question_type.parse::<QuestionType>().map_err(backend)?,
        serde_json::from_value(cards).map_err(backend)?,
    );

    Ok(StoredDeck {
        id: row.try_get("id").map_err(backend)?,
        user_id: row.try_get("user_id").map_err(backend)?,
        share_token: row.try_get("share_token").map_err(backend)?,
        created_at: row.try_get("created_at").map_err(backend)?,
        deck,
    })
}
