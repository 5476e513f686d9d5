use async_trait::async_trait;
use mongodb::{Client, Collection, Database};
use std::error::Error;
use std::fmt;

use crate::models::{Note, NotePatch, Pairing, Task, User};

#[cfg(test)]
pub mod memory;
mod stores;

pub const USERS: &str = "users";
pub const PAIRINGS: &str = "pairings";
pub const NOTES: &str = "notes";
pub const USER_TASKS: &str = "user_tasks";

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = database_name_from_uri(uri);
        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { client, db };

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes queries rely on, including the uniqueness backstops
    /// for invite codes and pairings.
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::{doc, Document};
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        let unique = || IndexOptions::builder().unique(true).build();

        let indexes: Vec<(&str, Document, bool)> = vec![
            (USERS, doc! { "user_id": 1 }, true),
            (USERS, doc! { "code": 1 }, true),
            (PAIRINGS, doc! { "pair_key": 1 }, true),
            (PAIRINGS, doc! { "user_a": 1 }, false),
            (PAIRINGS, doc! { "user_b": 1 }, false),
            (NOTES, doc! { "id": 1 }, true),
            (NOTES, doc! { "userId": 1, "timestamp": -1 }, false),
            (USER_TASKS, doc! { "user_id": 1 }, true),
        ];

        for (collection, keys, is_unique) in indexes {
            let label = format!("{}({:?})", collection, keys.keys().collect::<Vec<_>>());
            let model = if is_unique {
                IndexModel::builder().keys(keys).options(unique()).build()
            } else {
                IndexModel::builder().keys(keys).build()
            };

            let result = self
                .collection::<Document>(collection)
                .create_index(model)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string());
            index_outcome(&label, is_unique, result)?;
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// create_index já é idempotente: qualquer erro aqui é real.
/// Sem os índices únicos, códigos e pareamentos duplicados passariam, então a subida falha.
fn index_outcome(label: &str, is_unique: bool, result: Result<(), String>) -> Result<(), String> {
    match result {
        Ok(()) => {
            log::info!("   ✅ Index ready: {}", label);
            Ok(())
        }
        Err(e) if is_unique => {
            log::error!("❌ Unique index {} could not be created: {}", label, e);
            Err(format!("unique index {} could not be created: {}", label, e))
        }
        Err(e) => {
            log::warn!("⚠️  Index {} could not be created: {}", label, e);
            Ok(())
        }
    }
}

fn database_name_from_uri(uri: &str) -> &str {
    let without_scheme = uri.split_once("://").map(|(_, rest)| rest).unwrap_or(uri);

    without_scheme
        .split_once('/')
        .map(|(_, path)| path.split('?').next().unwrap_or(""))
        .filter(|name| !name.is_empty())
        .unwrap_or("Lovii")
}

// ==================== STORE ERRORS ====================

#[derive(Debug)]
pub enum StoreError {
    /// A unique index rejected the write
    Duplicate(String),
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Duplicate(msg) => write!(f, "Duplicate key: {}", msg),
            StoreError::Backend(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error for StoreError {}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        use mongodb::error::{ErrorKind, WriteFailure};

        match e.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == 11000 => {
                StoreError::Duplicate(we.message.clone())
            }
            _ => StoreError::Backend(e.to_string()),
        }
    }
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(e: mongodb::bson::ser::Error) -> Self {
        StoreError::Backend(format!("BSON serialization failed: {}", e))
    }
}

// ==================== STORE TRAITS ====================
// Os serviços só enxergam estes traits; MongoDB implementa todos eles
// e os testes usam a versão em memória.

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: &User) -> Result<(), StoreError>;
    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_code(&self, code: &str) -> Result<Option<User>, StoreError>;
    /// No-op when the user does not exist.
    async fn set_push_token(&self, user_id: &str, token: &str) -> Result<(), StoreError>;
    /// Sets only the provided fields and returns the updated user, `None` if unknown.
    async fn update_profile(
        &self,
        user_id: &str,
        name: Option<&str>,
        avatar: Option<&str>,
    ) -> Result<Option<User>, StoreError>;
    async fn delete(&self, user_id: &str) -> Result<(), StoreError>;
}

#[async_trait]
pub trait PairingStore: Send + Sync {
    /// Fails with `StoreError::Duplicate` when the unordered pair already exists.
    async fn insert(&self, pairing: &Pairing) -> Result<(), StoreError>;
    /// Oldest pairing where the user is on either side.
    async fn find_for_user(&self, user_id: &str) -> Result<Option<Pairing>, StoreError>;
    async fn find_between(&self, a: &str, b: &str) -> Result<Option<Pairing>, StoreError>;
    async fn delete_for_user(&self, user_id: &str) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn insert(&self, note: &Note) -> Result<(), StoreError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Note>, StoreError>;
    /// Ordered by `timestamp` descending.
    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<Note>, StoreError>;
    async fn latest_for_owner(&self, user_id: &str) -> Result<Option<Note>, StoreError>;
    async fn update(&self, id: &str, patch: &NotePatch) -> Result<Option<Note>, StoreError>;
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
    async fn delete_by_owner(&self, user_id: &str) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Stored order: newest first.
    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<Task>, StoreError>;
    /// Inserts at the head of the owner's list.
    async fn prepend(&self, task: &Task) -> Result<(), StoreError>;
    /// Replaces the whole list in a single write, keeping the given order.
    async fn replace_all(&self, user_id: &str, tasks: &[Task]) -> Result<(), StoreError>;
    async fn delete_by_owner(&self, user_id: &str) -> Result<(), StoreError>;
}
