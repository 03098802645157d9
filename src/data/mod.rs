//! Core data models for the meal board
//!
//! This module contains the menu and rating types shared by the meal source,
//! the rating store, and the orchestrator, plus the `MealSource` seam that the
//! NEIS client implements.

pub mod menu;
pub mod neis;

pub use menu::{parse_dish_names, strip_allergens};
pub use neis::{MealSourceError, NeisClient};

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Menu item names per day, as returned by a meal source
///
/// A date that is missing from the map has no published menu.
pub type MealMenus = BTreeMap<NaiveDate, Vec<String>>;

/// Menus held by a session, keyed by day
///
/// A missing key means the day has not been checked yet.
pub type MealData = BTreeMap<NaiveDate, MealDay>;

/// A single day's menu together with the time it was loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealDay {
    /// Menu item names in serving order; empty when nothing was published
    pub items: Vec<String>,
    /// When this day was last loaded from the source or the cache
    pub fetched_at: DateTime<Utc>,
}

impl MealDay {
    /// Creates a day record stamped with the given time
    pub fn new(items: Vec<String>, fetched_at: DateTime<Utc>) -> Self {
        Self { items, fetched_at }
    }

    /// Returns true if the record is younger than `freshness` at `now`
    pub fn is_fresh(&self, now: DateTime<Utc>, freshness: Duration) -> bool {
        now - self.fetched_at < freshness
    }
}

/// Community rating for one food at one school
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRating {
    /// Mean of all non-zero scores
    pub average_rating: f64,
    /// Number of non-zero scores
    pub total_ratings: u32,
    /// Sum of all non-zero scores
    #[serde(default)]
    pub total_score: u32,
}

/// A rating submitted by a user
///
/// A score of 0 is not a rating: it asks the store to delete the existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingInput {
    /// A star score between 1 and 5
    Score(u8),
    /// Remove the user's rating for the food
    Clear,
}

impl RatingInput {
    /// Highest accepted star score
    pub const MAX_SCORE: u8 = 5;

    /// Interprets a raw star value, returning `None` when it is out of range
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(RatingInput::Clear),
            1..=Self::MAX_SCORE => Some(RatingInput::Score(value)),
            _ => None,
        }
    }

    /// Returns the raw value, with 0 standing for `Clear`
    pub fn value(self) -> u8 {
        match self {
            RatingInput::Score(score) => score,
            RatingInput::Clear => 0,
        }
    }
}

/// Identifies one calendar month, the unit of batched fetching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    first: NaiveDate,
}

impl MonthKey {
    /// Returns the month containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date - Duration::days(i64::from(date.day0())),
        }
    }

    /// First day of the month
    pub fn first_day(self) -> NaiveDate {
        self.first
    }

    /// Last day of the month
    pub fn last_day(self) -> NaiveDate {
        self.days().last().unwrap_or(self.first)
    }

    /// Every day of the month in order
    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        let month = self.first.month();
        self.first.iter_days().take_while(move |day| day.month() == month)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first.format("%Y-%m"))
    }
}

/// A remote source of school menus
#[async_trait]
pub trait MealSource: Send + Sync {
    /// Fetches menus for every published day between `start` and `end`, inclusive
    async fn fetch_meals(&self, start: NaiveDate, end: NaiveDate)
        -> Result<MealMenus, MealSourceError>;
}
