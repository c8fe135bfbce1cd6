use async_trait::async_trait;
use futures_util::StreamExt;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use std::env;

use crate::db::{Datastore, StoreError};
use crate::models::click::ClickEvent;
use crate::models::url::ShortUrl;

/// Connect using `MONGODB_URI` / `MONGODB_DB` from the environment.
pub async fn get_database() -> anyhow::Result<Database> {
    let uri =
        env::var("MONGODB_URI").unwrap_or_else(|_| String::from("mongodb://localhost:27017"));
    let db_name = env::var("MONGODB_DB").unwrap_or_else(|_| String::from("linksnip"));
    let client = Client::with_uri_str(&uri).await?;
    Ok(client.database(&db_name))
}

/// MongoDB-backed datastore: a `urls` collection with a unique index on
/// `short_code` (the actual uniqueness boundary) and a `clicks` collection.
pub struct MongoStore {
    db: Database,
    urls: Collection<ShortUrl>,
    clicks: Collection<ClickEvent>,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        let urls = db.collection::<ShortUrl>("urls");
        let clicks = db.collection::<ClickEvent>("clicks");
        Self { db, urls, clicks }
    }

    /// Create the indexes the engine relies on. Must run before serving.
    pub async fn init_indexes(&self) -> anyhow::Result<()> {
        let unique_code = IndexModel::builder()
            .keys(doc! { "short_code": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.urls.create_index(unique_code).await?;

        let clicks_by_code = IndexModel::builder()
            .keys(doc! { "short_code": 1, "clicked_at": -1 })
            .build();
        self.clicks.create_index(clicks_by_code).await?;
        Ok(())
    }
}

fn backend(err: mongodb::error::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Mongo reports a unique-index violation as write error code 11000.
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(ref write))
            if write.code == 11000
    )
}

#[async_trait]
impl Datastore for MongoStore {
    async fn insert_url(&self, url: &ShortUrl) -> Result<(), StoreError> {
        self.urls.insert_one(url).await.map_err(|err| {
            if is_duplicate_key(&err) {
                StoreError::DuplicateCode
            } else {
                backend(err)
            }
        })?;
        Ok(())
    }

    async fn find_url(&self, code: &str) -> Result<Option<ShortUrl>, StoreError> {
        self.urls
            .find_one(doc! { "short_code": code })
            .await
            .map_err(backend)
    }

    async fn insert_click(&self, click: &ClickEvent) -> Result<(), StoreError> {
        self.clicks.insert_one(click).await.map_err(backend)?;
        Ok(())
    }

    async fn clicks_for(&self, code: &str) -> Result<Vec<ClickEvent>, StoreError> {
        let mut cursor = self
            .clicks
            .find(doc! { "short_code": code })
            .sort(doc! { "clicked_at": -1 })
            .await
            .map_err(backend)?;

        let mut clicks = Vec::new();
        while let Some(result) = cursor.next().await {
            clicks.push(result.map_err(backend)?);
        }
        Ok(clicks)
    }

    async fn count_clicks(&self, code: &str) -> Result<u64, StoreError> {
        self.clicks
            .count_documents(doc! { "short_code": code })
            .await
            .map_err(backend)
    }

    async fn list_urls(&self) -> Result<Vec<ShortUrl>, StoreError> {
        let mut cursor = self
            .urls
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await
            .map_err(backend)?;

        let mut urls = Vec::new();
        while let Some(result) = cursor.next().await {
            urls.push(result.map_err(backend)?);
        }
        Ok(urls)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(backend)
    }
}
