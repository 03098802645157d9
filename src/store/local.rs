//! Local JSON document store
//!
//! Keeps every collection in one JSON document, either purely in memory or
//! mirrored to a file after each write. A write that cannot be saved leaves
//! the store as it was.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::{
    aggregate_doc_id, rating_doc_id, AggregateRecord, FavoriteRecord, FavoriteStore,
    RatingRecord, RatingStore, StoreError,
};
use crate::data::AggregateRating;

/// All collections, keyed by document id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Documents {
    ratings: BTreeMap<String, RatingRecord>,
    average_ratings: BTreeMap<String, AggregateRecord>,
    favorites: BTreeMap<String, FavoriteRecord>,
    next_favorite_id: u64,
}

/// Document store backed by a JSON file or by memory only
#[derive(Debug)]
pub struct LocalStore {
    /// Backing file; `None` keeps documents in memory
    path: Option<PathBuf>,
    docs: Mutex<Documents>,
}

impl LocalStore {
    /// Creates an empty store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self {
            path: None,
            docs: Mutex::new(Documents::default()),
        }
    }

    /// Opens a file-backed store, starting empty if the file does not exist yet
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let docs = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Documents::default(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), "opened rating store");
        Ok(Self {
            path: Some(path),
            docs: Mutex::new(docs),
        })
    }

    /// Writes the documents to the backing file, if there is one
    async fn persist(&self, docs: &Documents) -> Result<(), StoreError> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(docs)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Saves `next` and makes it the current state
    ///
    /// `current` is untouched when saving fails.
    async fn commit(&self, current: &mut Documents, next: Documents) -> Result<(), StoreError> {
        self.persist(&next).await?;
        *current = next;
        Ok(())
    }
}

#[async_trait]
impl RatingStore for LocalStore {
    async fn put_rating(&self, record: RatingRecord) -> Result<(), StoreError> {
        let mut docs = self.docs.lock().await;
        let mut next = docs.clone();
        let id = rating_doc_id(&record.user_id, &record.food);
        next.ratings.insert(id, record);
        self.commit(&mut docs, next).await
    }

    async fn delete_rating(&self, user_id: &str, food: &str) -> Result<(), StoreError> {
        let mut docs = self.docs.lock().await;
        let mut next = docs.clone();
        if next.ratings.remove(&rating_doc_id(user_id, food)).is_none() {
            return Ok(());
        }
        self.commit(&mut docs, next).await
    }

    async fn ratings_by_user(&self, user_id: &str) -> Result<Vec<RatingRecord>, StoreError> {
        let docs = self.docs.lock().await;
        Ok(docs
            .ratings
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn ratings_for_food(
        &self,
        food: &str,
        school_code: &str,
    ) -> Result<Vec<RatingRecord>, StoreError> {
        let docs = self.docs.lock().await;
        Ok(docs
            .ratings
            .values()
            .filter(|r| r.food == food && r.school_code == school_code)
            .cloned()
            .collect())
    }

    async fn get_aggregate(
        &self,
        food: &str,
        school_code: &str,
    ) -> Result<Option<AggregateRating>, StoreError> {
        let docs = self.docs.lock().await;
        Ok(docs
            .average_ratings
            .get(&aggregate_doc_id(food, school_code))
            .map(|record| record.rating))
    }

    async fn put_aggregate(&self, record: AggregateRecord) -> Result<(), StoreError> {
        let mut docs = self.docs.lock().await;
        let mut next = docs.clone();
        let id = aggregate_doc_id(&record.food, &record.school_code);
        next.average_ratings.insert(id, record);
        self.commit(&mut docs, next).await
    }

    async fn delete_aggregate(&self, food: &str, school_code: &str) -> Result<(), StoreError> {
        let mut docs = self.docs.lock().await;
        let mut next = docs.clone();
        if next
            .average_ratings
            .remove(&aggregate_doc_id(food, school_code))
            .is_none()
        {
            return Ok(());
        }
        self.commit(&mut docs, next).await
    }
}

#[async_trait]
impl FavoriteStore for LocalStore {
    async fn find_favorites(
        &self,
        user_id: &str,
        food: &str,
    ) -> Result<Vec<FavoriteRecord>, StoreError> {
        let docs = self.docs.lock().await;
        Ok(docs
            .favorites
            .values()
            .filter(|f| f.user_id == user_id && f.food == food)
            .cloned()
            .collect())
    }

    async fn add_favorite(&self, user_id: &str, food: &str) -> Result<FavoriteRecord, StoreError> {
        let mut docs = self.docs.lock().await;
        let mut next = docs.clone();
        next.next_favorite_id += 1;
        let record = FavoriteRecord {
            id: format!("fav-{}", next.next_favorite_id),
            user_id: user_id.to_string(),
            food: food.to_string(),
            created_at: Utc::now(),
        };
        next.favorites.insert(record.id.clone(), record.clone());
        self.commit(&mut docs, next).await?;
        Ok(record)
    }

    async fn remove_favorite(&self, id: &str) -> Result<(), StoreError> {
        let mut docs = self.docs.lock().await;
        let mut next = docs.clone();
        if next.favorites.remove(id).is_none() {
            return Ok(());
        }
        self.commit(&mut docs, next).await
    }

    async fn favorites_by_user(&self, user_id: &str) -> Result<Vec<FavoriteRecord>, StoreError> {
        let docs = self.docs.lock().await;
        let mut favorites: Vec<FavoriteRecord> = docs
            .favorites
            .values()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        favorites.sort_by_key(|f| f.created_at);
        Ok(favorites)
    }
}
