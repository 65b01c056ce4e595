//! MongoDB Record Backend
//!
//! Persists records as `{ id, value }` documents in the `values` collection.
//! The collection and its unique `id` index are created on first use, so the
//! service can start before the database is reachable.

use super::backend::RecordStore;
use super::types::{Record, StoreError, StoreResult};
use crate::config::MongoSettings;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{Document, doc};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, Credential, IndexOptions, ServerAddress};
use mongodb::{Client, Collection, Database, IndexModel};
use std::time::Duration;
use tokio::sync::OnceCell;

pub const COLLECTION_NAME: &str = "values";

const MAX_CONNECTION_IDLE: Duration = Duration::from_secs(60);
const DUPLICATE_KEY_CODE: i32 = 11000;

pub struct MongoStore {
    database: Database,
    collection: OnceCell<Collection<Record>>,
}

impl MongoStore {
    /// Prepares a client for the configured server. No connection is opened yet.
    pub fn new(settings: &MongoSettings) -> StoreResult<Self> {
        let client = Client::with_options(client_options(settings))?;
        Ok(Self {
            database: client.database(&settings.database_name),
            collection: OnceCell::new(),
        })
    }

    async fn collection(&self) -> StoreResult<&Collection<Record>> {
        self.collection
            .get_or_try_init(|| async {
                ensure_collection(&self.database).await?;
                Ok::<_, StoreError>(self.database.collection::<Record>(COLLECTION_NAME))
            })
            .await
    }
}

pub fn client_options(settings: &MongoSettings) -> ClientOptions {
    let mut options = ClientOptions::default();
    options.hosts = vec![ServerAddress::Tcp {
        host: settings.server_address.clone(),
        port: Some(settings.server_port),
    }];
    options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
    options.max_idle_time = Some(MAX_CONNECTION_IDLE);
    options.credential = credential(settings);
    options
}

/// Credentials are only sent when a user name is configured.
fn credential(settings: &MongoSettings) -> Option<Credential> {
    let username = settings.user_name.as_deref().filter(|name| !name.is_empty())?;
    let mut credential = Credential::default();
    credential.username = Some(username.to_string());
    credential.password = settings.user_password.clone();
    Some(credential)
}

async fn ensure_collection(database: &Database) -> StoreResult<()> {
    let existing = database.list_collection_names().await?;
    if !existing.iter().any(|name| name == COLLECTION_NAME) {
        tracing::info!("Creating collection '{}'", COLLECTION_NAME);
        if let Err(e) = database.create_collection(COLLECTION_NAME).await {
            // Another replica may have created it between the listing and now.
            let existing = database.list_collection_names().await?;
            if !existing.iter().any(|name| name == COLLECTION_NAME) {
                return Err(e.into());
            }
        }
    }

    let mut index_options = IndexOptions::default();
    index_options.unique = Some(true);
    let mut index = IndexModel::default();
    index.keys = doc! { "id": 1 };
    index.options = Some(index_options);

    database
        .collection::<Document>(COLLECTION_NAME)
        .create_index(index)
        .await?;

    Ok(())
}

pub fn id_filter(id: &str) -> Document {
    doc! { "id": id }
}

pub fn set_value(value: &str) -> Document {
    doc! { "$set": { "value": value } }
}

pub(crate) fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        _ => false,
    }
}

#[async_trait]
impl RecordStore for MongoStore {
    async fn get_all(&self) -> StoreResult<Vec<Record>> {
        let cursor = self.collection().await?.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Record>> {
        Ok(self.collection().await?.find_one(id_filter(id)).await?)
    }

    async fn create(&self, id: &str, value: &str) -> StoreResult<()> {
        let record = Record::new(id, value);
        match self.collection().await?.insert_one(&record).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::AlreadyExists(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, id: &str, value: &str) -> StoreResult<bool> {
        let result = self
            .collection()
            .await?
            .update_one(id_filter(id), set_value(value))
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let result = self.collection().await?.delete_one(id_filter(id)).await?;
        Ok(result.deleted_count > 0)
    }

    async fn len(&self) -> StoreResult<usize> {
        let count = self.collection().await?.count_documents(doc! {}).await?;
        usize::try_from(count).map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}
