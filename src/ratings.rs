//! Rating writes and aggregate recomputation
//!
//! Every change to a rating recomputes the food's aggregate from the full set
//! of its ratings. The recompute reads and then overwrites without a
//! transaction, so two overlapping writers can leave the aggregate one write
//! behind until the next change.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::data::{AggregateRating, RatingInput};
use crate::store::{AggregateRecord, RatingRecord, RatingStore, StoreError};

/// A rating change submitted by a user
#[derive(Debug, Clone)]
pub struct SaveRating {
    pub user_id: String,
    pub food: String,
    pub rating: RatingInput,
    pub school_code: String,
    pub date: NaiveDate,
}

/// Computes the aggregate for a set of scores, ignoring zeros
///
/// Returns `None` when no non-zero score remains.
pub fn compute_aggregate(scores: &[u8]) -> Option<AggregateRating> {
    let valid: Vec<u32> = scores
        .iter()
        .filter(|score| **score > 0)
        .map(|score| u32::from(*score))
        .collect();
    if valid.is_empty() {
        return None;
    }
    let total_score: u32 = valid.iter().sum();
    let total_ratings = valid.len() as u32;
    Some(AggregateRating {
        average_rating: f64::from(total_score) / f64::from(total_ratings),
        total_ratings,
        total_score,
    })
}

/// Reads and writes ratings through a `RatingStore`
#[derive(Clone)]
pub struct RatingService {
    store: Arc<dyn RatingStore>,
}

impl RatingService {
    pub fn new(store: Arc<dyn RatingStore>) -> Self {
        Self { store }
    }

    /// Writes or deletes a rating, then recomputes the food's aggregate
    ///
    /// A `RatingInput::Clear` deletes the user's rating document.
    pub async fn save_rating(&self, request: SaveRating) -> Result<(), StoreError> {
        match request.rating {
            RatingInput::Clear => {
                self.store
                    .delete_rating(&request.user_id, &request.food)
                    .await?;
            }
            RatingInput::Score(score) => {
                self.store
                    .put_rating(RatingRecord {
                        user_id: request.user_id.clone(),
                        food: request.food.clone(),
                        rating: score,
                        school_code: request.school_code.clone(),
                        date: Some(request.date),
                        timestamp: Utc::now(),
                    })
                    .await?;
            }
        }

        self.recalculate_average(&request.food, &request.school_code)
            .await
    }

    /// Recomputes and stores the aggregate for a food at a school
    ///
    /// The aggregate document is deleted once no non-zero rating remains.
    pub async fn recalculate_average(&self, food: &str, school_code: &str) -> Result<(), StoreError> {
        let ratings = self.store.ratings_for_food(food, school_code).await?;
        let scores: Vec<u8> = ratings.iter().map(|r| r.rating).collect();

        match compute_aggregate(&scores) {
            Some(rating) => {
                debug!(food, total = rating.total_ratings, average = rating.average_rating, "aggregate recomputed");
                self.store
                    .put_aggregate(AggregateRecord {
                        food: food.to_string(),
                        school_code: school_code.to_string(),
                        rating,
                    })
                    .await
            }
            None => {
                debug!(food, "no ratings left, removing aggregate");
                self.store.delete_aggregate(food, school_code).await
            }
        }
    }

    /// A user's ratings keyed by food, without zero scores
    pub async fn user_ratings(&self, user_id: &str) -> Result<HashMap<String, u8>, StoreError> {
        let records = self.store.ratings_by_user(user_id).await?;
        Ok(records
            .into_iter()
            .filter(|r| r.rating > 0)
            .map(|r| (r.food, r.rating))
            .collect())
    }

    /// Aggregates for several foods, fetched concurrently
    ///
    /// A food without an aggregate document reads as zero ratings. A food whose
    /// read fails is left out of the result.
    pub async fn average_ratings(
        &self,
        foods: &[String],
        school_code: &str,
    ) -> HashMap<String, AggregateRating> {
        let reads = foods.iter().map(|food| async move {
            let result = self.store.get_aggregate(food, school_code).await;
            (food, result)
        });

        let mut averages = HashMap::with_capacity(foods.len());
        for (food, result) in join_all(reads).await {
            match result {
                Ok(aggregate) => {
                    let aggregate = aggregate
                        .filter(|a| a.total_ratings > 0)
                        .unwrap_or_default();
                    averages.insert(food.clone(), aggregate);
                }
                Err(e) => warn!(food = %food, error = %e, "failed to read aggregate rating"),
            }
        }
        averages
    }
}
