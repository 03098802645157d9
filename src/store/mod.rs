//! Rating and favorite persistence
//!
//! The document layout follows a simple key/document model: one rating
//! document per (user, food), one aggregate document per (food, school), and
//! one favorite document per membership. The traits are the seam between the
//! orchestrator and whatever document database backs it.

pub mod local;

pub use local::LocalStore;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::AggregateRating;

/// Errors that can occur when reading or writing documents
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A document could not be (de)serialized
    #[error("Store serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One user's rating for one food
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRecord {
    pub user_id: String,
    pub food: String,
    /// Star score, 1 to 5
    pub rating: u8,
    pub school_code: String,
    /// Day of the menu the rating was given on
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub timestamp: DateTime<Utc>,
}

/// Stored community rating for a food at a school
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRecord {
    pub food: String,
    pub school_code: String,
    #[serde(flatten)]
    pub rating: AggregateRating,
}

/// A food a user marked as favorite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
    /// Document id assigned by the store
    pub id: String,
    pub user_id: String,
    pub food: String,
    pub created_at: DateTime<Utc>,
}

/// Storage for individual ratings and their per-school aggregates
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Creates or replaces the (user, food) rating document
    async fn put_rating(&self, record: RatingRecord) -> Result<(), StoreError>;

    /// Deletes the (user, food) rating document; deleting a missing one is not an error
    async fn delete_rating(&self, user_id: &str, food: &str) -> Result<(), StoreError>;

    /// All ratings written by a user
    async fn ratings_by_user(&self, user_id: &str) -> Result<Vec<RatingRecord>, StoreError>;

    /// All ratings for a food at a school
    async fn ratings_for_food(
        &self,
        food: &str,
        school_code: &str,
    ) -> Result<Vec<RatingRecord>, StoreError>;

    /// The aggregate document for a food at a school, if any
    async fn get_aggregate(
        &self,
        food: &str,
        school_code: &str,
    ) -> Result<Option<AggregateRating>, StoreError>;

    /// Creates or replaces an aggregate document
    async fn put_aggregate(&self, record: AggregateRecord) -> Result<(), StoreError>;

    /// Deletes an aggregate document; deleting a missing one is not an error
    async fn delete_aggregate(&self, food: &str, school_code: &str) -> Result<(), StoreError>;
}

/// Storage for favorite memberships
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// Favorite documents for (user, food); normally zero or one
    async fn find_favorites(&self, user_id: &str, food: &str)
        -> Result<Vec<FavoriteRecord>, StoreError>;

    /// Adds a favorite document with a fresh id
    async fn add_favorite(&self, user_id: &str, food: &str) -> Result<FavoriteRecord, StoreError>;

    /// Removes a favorite document by id
    async fn remove_favorite(&self, id: &str) -> Result<(), StoreError>;

    /// All favorites of a user
    async fn favorites_by_user(&self, user_id: &str) -> Result<Vec<FavoriteRecord>, StoreError>;
}

/// Makes a food name usable inside a document id
///
/// Reserved characters and parentheses all become `_`, the same character
/// that joins id parts. The mapping is therefore not injective: `우유(저지방)`
/// and `우유_저지방_` share an id. Stored documents already use these ids, so
/// the mapping stays as is; each record also carries the raw food name, and
/// lookups by food compare that field rather than the id.
pub fn encode_for_doc_id(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>' | '(' | ')' => '_',
            other => other,
        })
        .collect()
}

/// Document id of a user's rating for a food
pub fn rating_doc_id(user_id: &str, food: &str) -> String {
    format!("{}_{}", user_id, encode_for_doc_id(food))
}

/// Document id of the aggregate for a food at a school
pub fn aggregate_doc_id(food: &str, school_code: &str) -> String {
    format!("{}_{}", encode_for_doc_id(food), school_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_for_doc_id_replaces_reserved_characters() {
        assert_eq!(encode_for_doc_id("우유(저지방)"), "우유_저지방_");
        assert_eq!(encode_for_doc_id("a/b\\c?d%e*f:g|h\"i<j>k"), "a_b_c_d_e_f_g_h_i_j_k");
    }

    #[test]
    fn test_encode_for_doc_id_keeps_plain_names() {
        assert_eq!(encode_for_doc_id("쌀밥"), "쌀밥");
    }

    #[test]
    fn test_encode_for_doc_id_folds_parentheses_into_underscore() {
        assert_eq!(
            encode_for_doc_id("우유(저지방)"),
            encode_for_doc_id("우유_저지방_")
        );
        assert_eq!(
            rating_doc_id("kim", "우유(저지방)"),
            rating_doc_id("kim", "우유_저지방_")
        );
    }

    #[test]
    fn test_doc_ids() {
        assert_eq!(rating_doc_id("user1", "치즈/돈까스"), "user1_치즈_돈까스");
        assert_eq!(aggregate_doc_id("치즈/돈까스", "7480075"), "치즈_돈까스_7480075");
    }

    #[test]
    fn test_aggregate_record_flattens_rating() {
        let record = AggregateRecord {
            food: "쌀밥".to_string(),
            school_code: "7480075".to_string(),
            rating: AggregateRating {
                average_rating: 4.0,
                total_ratings: 2,
                total_score: 8,
            },
        };
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["totalRatings"], 2);
        assert_eq!(json["schoolCode"], "7480075");
        assert_eq!(json["averageRating"], 4.0);
    }
}
