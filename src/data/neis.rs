//! NEIS open API client for school meal menus
//!
//! Fetches the `mealServiceDietInfo` dataset for one school over a date range
//! and turns the rows into clean per-day dish lists.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::{menu::parse_dish_names, MealMenus, MealSource};
use crate::config::Config;

/// Dataset path below the API base URL
const MEAL_SERVICE_PATH: &str = "mealServiceDietInfo";

/// Result code for a successful response
const RESULT_OK: &str = "INFO-000";

/// Result code NEIS returns when there is no data for the request
const RESULT_NO_DATA: &str = "INFO-200";

/// Rows per page; a month of breakfast, lunch and dinner fits in one page
const PAGE_SIZE: u32 = 100;

/// Date format used by NEIS in requests and rows
const NEIS_DATE_FORMAT: &str = "%Y%m%d";

/// Errors that can occur when fetching meal data
#[derive(Debug, Error)]
pub enum MealSourceError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP error! status: {0}")]
    Status(StatusCode),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// NEIS reported an error result code
    #[error("NEIS error {code}: {message}")]
    Api { code: String, message: String },

    /// A row carried a date that is not `YYYYMMDD`
    #[error("Invalid meal date: {0}")]
    InvalidDate(String),
}

/// Top-level response body
#[derive(Debug, Deserialize)]
struct NeisResponse {
    #[serde(rename = "mealServiceDietInfo")]
    meal_service_diet_info: Option<Vec<DietInfoSection>>,
    /// Present instead of the dataset when the request produced no rows or failed
    #[serde(rename = "RESULT")]
    result: Option<ApiResult>,
}

/// One element of the dataset array: either the head block or the row block
#[derive(Debug, Deserialize)]
struct DietInfoSection {
    #[serde(default)]
    head: Option<Vec<HeadEntry>>,
    #[serde(default)]
    row: Option<Vec<MealRow>>,
}

#[derive(Debug, Deserialize)]
struct HeadEntry {
    #[allow(dead_code)]
    list_total_count: Option<u32>,
    #[serde(rename = "RESULT")]
    result: Option<ApiResult>,
}

#[derive(Debug, Deserialize)]
struct ApiResult {
    #[serde(rename = "CODE")]
    code: String,
    #[serde(rename = "MESSAGE", default)]
    message: String,
}

/// A single meal (breakfast, lunch or dinner) on one day
#[derive(Debug, Deserialize)]
struct MealRow {
    /// Serving date, `YYYYMMDD`
    #[serde(rename = "MLSV_YMD")]
    date: String,
    /// Dishes joined with `<br/>`
    #[serde(rename = "DDISH_NM")]
    dishes: String,
    /// Meal name such as 중식
    #[serde(rename = "MMEAL_SC_NM", default)]
    meal_name: Option<String>,
}

/// Client for the NEIS school meal API
#[derive(Debug, Clone)]
pub struct NeisClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Base URL of the open API hub
    base_url: String,
    /// API key; NEIS serves a small sample without one
    api_key: Option<String>,
    /// Office of education code (ATPT_OFCDC_SC_CODE)
    office_code: String,
    /// School code (SD_SCHUL_CODE)
    school_code: String,
}

impl NeisClient {
    /// Creates a client for the school named in the configuration
    pub fn new(config: &Config) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Creates a client with a custom HTTP client
    pub fn with_client(http_client: Client, config: &Config) -> Self {
        Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            office_code: config.office_code.clone(),
            school_code: config.school_code.clone(),
        }
    }

    /// Builds the request URL and query parameters for a date range
    fn request_parts(&self, start: NaiveDate, end: NaiveDate) -> (String, Vec<(&'static str, String)>) {
        let url = format!("{}/{}", self.base_url, MEAL_SERVICE_PATH);
        let mut query = Vec::with_capacity(8);
        if let Some(ref key) = self.api_key {
            query.push(("KEY", key.clone()));
        }
        query.push(("Type", "json".to_string()));
        query.push(("pIndex", "1".to_string()));
        query.push(("pSize", PAGE_SIZE.to_string()));
        query.push(("ATPT_OFCDC_SC_CODE", self.office_code.clone()));
        query.push(("SD_SCHUL_CODE", self.school_code.clone()));
        query.push(("MLSV_FROM_YMD", start.format(NEIS_DATE_FORMAT).to_string()));
        query.push(("MLSV_TO_YMD", end.format(NEIS_DATE_FORMAT).to_string()));
        (url, query)
    }
}

#[async_trait]
impl MealSource for NeisClient {
    /// Fetches the menus between `start` and `end`
    ///
    /// # Returns
    /// * `Ok(MealMenus)` - Dishes per published day; empty when NEIS has no data
    /// * `Err(MealSourceError)` - If the request, status, or parsing fails
    async fn fetch_meals(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MealMenus, MealSourceError> {
        let (url, query) = self.request_parts(start, end);
        debug!(%start, %end, school = %self.school_code, "requesting meals");

        let response = self.http_client.get(&url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "meal request rejected");
            return Err(MealSourceError::Status(status));
        }

        let text = response.text().await?;
        parse_response(&text)
    }
}

/// Parses a NEIS response body into dishes per day
fn parse_response(body: &str) -> Result<MealMenus, MealSourceError> {
    let response: NeisResponse = serde_json::from_str(body)?;

    if let Some(result) = response.result {
        return result_to_menus(result);
    }

    let Some(sections) = response.meal_service_diet_info else {
        return Ok(MealMenus::new());
    };

    let mut menus = MealMenus::new();
    for section in sections {
        if let Some(head) = section.head {
            for result in head.into_iter().filter_map(|entry| entry.result) {
                if result.code != RESULT_OK {
                    return result_to_menus(result);
                }
            }
        }

        for row in section.row.unwrap_or_default() {
            let date = NaiveDate::parse_from_str(&row.date, NEIS_DATE_FORMAT)
                .map_err(|_| MealSourceError::InvalidDate(row.date.clone()))?;
            debug!(%date, meal = row.meal_name.as_deref().unwrap_or("-"), "parsed meal row");
            menus
                .entry(date)
                .or_default()
                .extend(parse_dish_names(&row.dishes));
        }
    }

    Ok(menus)
}

/// Maps a bare result block to either "no data" or an API error
fn result_to_menus(result: ApiResult) -> Result<MealMenus, MealSourceError> {
    match result.code.as_str() {
        RESULT_OK | RESULT_NO_DATA => Ok(MealMenus::new()),
        _ => Err(MealSourceError::Api {
            code: result.code,
            message: result.message,
        }),
    }
}
