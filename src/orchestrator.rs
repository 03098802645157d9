//! Session state and meal-data orchestration
//!
//! `MealOrchestrator` owns everything one session knows: loaded menus, the
//! month cache, community aggregates, and the signed-in user's ratings and
//! favorites. Menus are loaded one calendar month at a time and reused while
//! younger than the freshness window.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::auth::{AuthError, IdentityProvider, User};
use crate::cache::CacheManager;
use crate::data::{AggregateRating, MealData, MealDay, MealMenus, MealSource, MonthKey, RatingInput};
use crate::ratings::{RatingService, SaveRating};
use crate::stats::MenuStats;
use crate::store::{FavoriteStore, RatingStore, StoreError};

/// Message shown when a month of menus could not be loaded
pub const FETCH_ERROR_MESSAGE: &str = "급식 데이터를 가져오는 중 오류가 발생했습니다.";

/// Freshness and cache lifetime policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// Maximum age of a loaded day before its month is loaded again
    pub freshness: Duration,
    /// Lifetime of a month snapshot in the cache
    pub cache_ttl: Duration,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            freshness: Duration::hours(24),
            cache_ttl: Duration::hours(24),
        }
    }
}

/// What `ensure_data_for_date` had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// Every day of the month was already fresh; nothing was loaded
    Fresh,
    /// The month was restored from the cache without a network call
    Cached,
    /// The month was fetched; `days` of them had a published menu
    Fetched { days: usize },
    /// The fetch failed and held data was left as it was
    Failed,
}

/// Failures of user-triggered actions
///
/// The display strings are the messages shown to the user.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("로그인이 필요합니다.")]
    NotSignedIn,

    #[error("별점은 0점에서 5점 사이여야 합니다. (입력: {0})")]
    InvalidRating(u8),

    #[error("별점을 저장하는 중 오류가 발생했습니다.")]
    SaveRating(#[source] StoreError),

    #[error("즐겨찾기를 변경하는 중 오류가 발생했습니다.")]
    ToggleFavorite(#[source] StoreError),

    #[error("{0}")]
    SignIn(#[source] AuthError),

    #[error("로그아웃 중 오류가 발생했습니다.")]
    SignOut(#[source] AuthError),
}

/// External collaborators of a session
#[derive(Clone)]
pub struct Collaborators {
    pub meals: Arc<dyn MealSource>,
    pub ratings: Arc<dyn RatingStore>,
    pub favorites: Arc<dyn FavoriteStore>,
    pub identity: Arc<dyn IdentityProvider>,
}

/// Application state for one session
pub struct MealOrchestrator {
    source: Arc<dyn MealSource>,
    ratings: RatingService,
    favorite_store: Arc<dyn FavoriteStore>,
    identity: Arc<dyn IdentityProvider>,
    identity_rx: watch::Receiver<Option<User>>,
    school_code: String,
    policy: Policy,
    cache: CacheManager,
    meals: MealData,
    /// Months whose last fetch failed and that hold no data yet
    failed_months: HashSet<MonthKey>,
    average_ratings: HashMap<String, AggregateRating>,
    user_ratings: HashMap<String, u8>,
    favorites: Vec<String>,
    user: Option<User>,
    loading: bool,
    error: Option<String>,
}

impl MealOrchestrator {
    /// Creates an empty session for a school
    ///
    /// Personal data is loaded on the first `sync_identity` call.
    pub fn new(collaborators: Collaborators, school_code: impl Into<String>, policy: Policy) -> Self {
        let identity_rx = collaborators.identity.subscribe();
        Self {
            source: collaborators.meals,
            ratings: RatingService::new(collaborators.ratings),
            favorite_store: collaborators.favorites,
            identity: collaborators.identity,
            identity_rx,
            school_code: school_code.into(),
            policy,
            cache: CacheManager::new(policy.cache_ttl),
            meals: MealData::new(),
            failed_months: HashSet::new(),
            average_ratings: HashMap::new(),
            user_ratings: HashMap::new(),
            favorites: Vec::new(),
            user: None,
            loading: false,
            error: None,
        }
    }

    // ------------------------------------------------------------------
    // Menus
    // ------------------------------------------------------------------

    /// Makes sure the month containing `date` is loaded and fresh
    ///
    /// At most one upstream call is made, covering the whole month. Days the
    /// source does not return are recorded as empty menus so they count as
    /// checked. A failed fetch is logged, leaves held data untouched and marks
    /// the month unavailable until a later fetch or cache restore succeeds.
    pub async fn ensure_data_for_date(&mut self, date: NaiveDate) -> EnsureOutcome {
        let now = Utc::now();
        let month = MonthKey::containing(date);

        if self.month_is_fresh(month, now) {
            debug!(%month, "month already fresh");
            return EnsureOutcome::Fresh;
        }

        if let Some(cached) = self.cache.read_fresh(month, now) {
            debug!(%month, cached_at = %cached.cached_at, "restoring month from cache");
            self.merge_month(month, cached.data, cached.cached_at);
            self.failed_months.remove(&month);
            return EnsureOutcome::Cached;
        }

        self.loading = true;
        let result = self
            .source
            .fetch_meals(month.first_day(), month.last_day())
            .await;
        self.loading = false;

        match result {
            Ok(menus) => {
                self.cache.write(month, menus.clone(), now);
                let foods = distinct_foods(&menus);
                let days = self.merge_month(month, menus, now);
                self.failed_months.remove(&month);
                info!(%month, days, foods = foods.len(), "loaded month of meals");
                self.refresh_rating_aggregates(&foods).await;
                EnsureOutcome::Fetched { days }
            }
            Err(e) => {
                error!(%month, error = %e, "failed to fetch meal data");
                self.error = Some(FETCH_ERROR_MESSAGE.to_string());
                self.failed_months.insert(month);
                EnsureOutcome::Failed
            }
        }
    }

    /// Ensures every month touched by `dates` is loaded
    pub async fn ensure_data_for_dates(&mut self, dates: &[NaiveDate]) -> Vec<EnsureOutcome> {
        let mut seen = HashSet::new();
        let mut outcomes = Vec::new();
        for date in dates {
            if seen.insert(MonthKey::containing(*date)) {
                outcomes.push(self.ensure_data_for_date(*date).await);
            }
        }
        outcomes
    }

    /// Returns true if every day of the month is held and younger than the freshness window
    fn month_is_fresh(&self, month: MonthKey, now: DateTime<Utc>) -> bool {
        month.days().all(|day| {
            self.meals
                .get(&day)
                .is_some_and(|meal| meal.is_fresh(now, self.policy.freshness))
        })
    }

    /// Stores a month of menus stamped with `stamp`; returns the days with dishes
    fn merge_month(&mut self, month: MonthKey, mut menus: MealMenus, stamp: DateTime<Utc>) -> usize {
        let mut published = 0;
        for day in month.days() {
            let items = menus.remove(&day).unwrap_or_default();
            if !items.is_empty() {
                published += 1;
            }
            self.meals.insert(day, MealDay::new(items, stamp));
        }
        // Anything the source returned outside the month is still worth keeping
        for (day, items) in menus {
            self.meals.insert(day, MealDay::new(items, stamp));
        }
        published
    }

    /// Refreshes community aggregates for the given foods
    ///
    /// Duplicates are ignored. A food whose read fails keeps its previous value.
    pub async fn refresh_rating_aggregates(&mut self, foods: &[String]) {
        let mut seen = HashSet::new();
        let unique: Vec<String> = foods
            .iter()
            .filter(|food| seen.insert(food.as_str()))
            .cloned()
            .collect();
        if unique.is_empty() {
            return;
        }

        let averages = self
            .ratings
            .average_ratings(&unique, &self.school_code)
            .await;
        debug!(requested = unique.len(), received = averages.len(), "refreshed aggregates");
        self.average_ratings.extend(averages);
    }

    // ------------------------------------------------------------------
    // Ratings and favorites
    // ------------------------------------------------------------------

    /// Rates a food as the signed-in user; 0 removes the rating
    ///
    /// The personal rating is updated before the write and restored if the
    /// write fails. On success the food's aggregate is refreshed and the days
    /// around `date` are re-checked.
    pub async fn submit_rating(
        &mut self,
        food: &str,
        value: u8,
        date: NaiveDate,
    ) -> Result<(), ActionError> {
        let user = self.user.clone().ok_or(ActionError::NotSignedIn)?;
        let rating = RatingInput::from_value(value).ok_or(ActionError::InvalidRating(value))?;

        let previous = self.user_ratings.get(food).copied();
        self.set_user_rating(food, Some(rating.value()));

        let request = SaveRating {
            user_id: user.uid,
            food: food.to_string(),
            rating,
            school_code: self.school_code.clone(),
            date,
        };
        if let Err(e) = self.ratings.save_rating(request).await {
            error!(food, error = %e, "failed to save rating");
            self.set_user_rating(food, previous);
            let err = ActionError::SaveRating(e);
            self.error = Some(err.to_string());
            return Err(err);
        }

        self.refresh_rating_aggregates(&[food.to_string()]).await;

        for day in [date.pred_opt(), Some(date), date.succ_opt()]
            .into_iter()
            .flatten()
        {
            self.ensure_data_for_date(day).await;
        }
        Ok(())
    }

    /// Sets or removes a personal rating in local state; 0 counts as removal
    fn set_user_rating(&mut self, food: &str, value: Option<u8>) {
        match value {
            Some(score) if score > 0 => {
                self.user_ratings.insert(food.to_string(), score);
            }
            _ => {
                self.user_ratings.remove(food);
            }
        }
    }

    /// Flips the signed-in user's favorite mark on a food
    ///
    /// Returns the new membership.
    pub async fn toggle_favorite(&mut self, food: &str) -> Result<bool, ActionError> {
        let user = self.user.clone().ok_or(ActionError::NotSignedIn)?;

        match self.flip_favorite(&user.uid, food).await {
            Ok(true) => {
                if !self.favorites.iter().any(|f| f == food) {
                    self.favorites.push(food.to_string());
                }
                Ok(true)
            }
            Ok(false) => {
                self.favorites.retain(|f| f != food);
                Ok(false)
            }
            Err(e) => {
                error!(food, error = %e, "failed to toggle favorite");
                let err = ActionError::ToggleFavorite(e);
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    async fn flip_favorite(&self, user_id: &str, food: &str) -> Result<bool, StoreError> {
        let existing = self.favorite_store.find_favorites(user_id, food).await?;
        match existing.first() {
            None => {
                self.favorite_store.add_favorite(user_id, food).await?;
                Ok(true)
            }
            Some(record) => {
                self.favorite_store.remove_favorite(&record.id).await?;
                Ok(false)
            }
        }
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    /// Applies the latest identity change, if any
    ///
    /// Signing in loads the user's ratings and favorites; signing out clears
    /// them. Returns true when the signed-in user changed.
    pub async fn sync_identity(&mut self) -> bool {
        let current = self.identity_rx.borrow_and_update().clone();
        if current == self.user {
            return false;
        }
        self.user = current;

        match self.user.clone() {
            Some(user) => self.load_user_data(&user.uid).await,
            None => {
                self.user_ratings.clear();
                self.favorites.clear();
            }
        }
        true
    }

    async fn load_user_data(&mut self, uid: &str) {
        match self.ratings.user_ratings(uid).await {
            Ok(ratings) => self.user_ratings = ratings,
            Err(e) => {
                warn!(uid, error = %e, "failed to load user ratings");
                self.user_ratings.clear();
            }
        }

        match self.favorite_store.favorites_by_user(uid).await {
            Ok(records) => self.favorites = records.into_iter().map(|r| r.food).collect(),
            Err(e) => {
                warn!(uid, error = %e, "failed to load user favorites");
                self.favorites.clear();
            }
        }
    }

    /// Signs in through the identity provider and loads personal data
    pub async fn sign_in(&mut self, credential: &str) -> Result<User, ActionError> {
        match self.identity.sign_in(credential).await {
            Ok(user) => {
                self.sync_identity().await;
                Ok(user)
            }
            Err(e) => Err(self.auth_failed(ActionError::SignIn(e))),
        }
    }

    /// Signs out through the identity provider and clears personal data
    pub async fn sign_out(&mut self) -> Result<(), ActionError> {
        match self.identity.sign_out().await {
            Ok(()) => {
                self.sync_identity().await;
                Ok(())
            }
            Err(e) => Err(self.auth_failed(ActionError::SignOut(e))),
        }
    }

    fn auth_failed(&mut self, err: ActionError) -> ActionError {
        warn!(error = %err, "authentication action failed");
        self.error = Some(err.to_string());
        err
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Dishes for a date; empty when unpublished or not loaded yet
    pub fn meals_for_date(&self, date: NaiveDate) -> &[String] {
        self.meals
            .get(&date)
            .map(|day| day.items.as_slice())
            .unwrap_or(&[])
    }

    /// Returns true once the date has been checked against the source
    pub fn is_loaded(&self, date: NaiveDate) -> bool {
        self.meals.contains_key(&date)
    }

    /// Returns true if the date has no data because its month failed to load
    ///
    /// Stays set after the error message is cleared, until the month loads.
    pub fn is_unavailable(&self, date: NaiveDate) -> bool {
        !self.is_loaded(date) && self.failed_months.contains(&MonthKey::containing(date))
    }

    pub fn user_rating(&self, food: &str) -> Option<u8> {
        self.user_ratings.get(food).copied()
    }

    /// Community aggregate for a food; zero when nobody rated it
    pub fn average_rating(&self, food: &str) -> AggregateRating {
        self.average_ratings.get(food).copied().unwrap_or_default()
    }

    pub fn is_favorite(&self, food: &str) -> bool {
        self.favorites.iter().any(|f| f == food)
    }

    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Rating summary for a date's menu
    pub fn menu_stats(&self, date: NaiveDate) -> MenuStats {
        MenuStats::for_items(
            self.meals_for_date(date),
            &self.user_ratings,
            &self.average_ratings,
        )
    }

    pub fn school_code(&self) -> &str {
        &self.school_code
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// The latest user-facing error message
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Records a user-facing error message
    pub fn report_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

/// Distinct dish names across a set of menus, in first-seen order
fn distinct_foods(menus: &MealMenus) -> Vec<String> {
    let mut seen = HashSet::new();
    menus
        .values()
        .flatten()
        .filter(|food| seen.insert(food.as_str()))
        .cloned()
        .collect()
}
