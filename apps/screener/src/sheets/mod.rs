//! Data Fetcher — pulls worksheet values from the Google Sheets v4 REST API
//! with a pull-through cache keyed by (sheet id, worksheet name).

pub mod auth;
pub mod dataset;

use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use url::Url;

use self::auth::AuthProvider;
use self::dataset::SheetDataset;

const SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4/spreadsheets";
/// Range used when no worksheet is named: the first sheet, all practical columns.
const DEFAULT_RANGE: &str = "A1:ZZ";

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("spreadsheet not found: {0}. Check the sheet ID/URL.")]
    NotFound(String),

    #[error("spreadsheet {0} is not shared with the authenticated account")]
    NotShared(String),

    #[error("worksheet '{0}' not found")]
    WorksheetNotFound(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("sheet is empty")]
    EmptySheet,

    #[error("Google API request failed with status {status}: {body}")]
    Api { status: u16, body: String },
}

/// Accepts a raw spreadsheet id or a full docs.google.com URL and returns
/// the id segment (the path component after "/d/").
pub fn extract_sheet_id(input: &str) -> &str {
    if input.contains("docs.google.com/spreadsheets") {
        let mut parts = input.split('/');
        while let Some(part) = parts.next() {
            if part == "d" {
                if let Some(id) = parts.next() {
                    return id;
                }
            }
        }
    }
    input
}

pub type CacheKey = (String, String);

pub fn cache_key(sheet_id: &str, worksheet: Option<&str>) -> CacheKey {
    (
        sheet_id.to_string(),
        worksheet.unwrap_or("default").to_string(),
    )
}

/// Session-scoped cache of fetched datasets. Entries live until replaced by
/// a refresh; there is no TTL.
#[derive(Default)]
pub struct DatasetCache {
    entries: HashMap<CacheKey, SheetDataset>,
}

impl DatasetCache {
    pub fn get(&self, key: &CacheKey) -> Option<&SheetDataset> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: CacheKey, dataset: SheetDataset) {
        self.entries.insert(key, dataset);
    }
}

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    values: Option<Vec<Vec<String>>>,
}

/// Client for reading one worksheet at a time, with caching.
pub struct SheetsClient {
    http: Client,
    auth: AuthProvider,
    cache: DatasetCache,
}

impl SheetsClient {
    pub fn new(http: Client, auth: AuthProvider) -> Self {
        Self {
            http,
            auth,
            cache: DatasetCache::default(),
        }
    }

    /// Fetches a worksheet as a dataset. `use_cache = false` (the `refresh`
    /// directive) bypasses the cache and replaces the entry on success.
    pub async fn fetch(
        &mut self,
        sheet: &str,
        worksheet: Option<&str>,
        use_cache: bool,
    ) -> Result<SheetDataset, SheetsError> {
        let sheet_id = extract_sheet_id(sheet).to_string();
        let key = cache_key(&sheet_id, worksheet);

        if use_cache {
            if let Some(cached) = self.cache.get(&key) {
                info!("Using cached data for sheet {}_{}", key.0, key.1);
                return Ok(cached.clone());
            }
        }

        let token = self.auth.access_token().await?;
        info!("Fetching data from Google Sheets...");

        // A bare range addresses the first sheet; a quoted sheet name
        // addresses the whole named worksheet.
        let range = match worksheet {
            Some(name) => format!("'{}'", name.replace('\'', "''")),
            None => DEFAULT_RANGE.to_string(),
        };

        let mut url = Url::parse(SHEETS_ENDPOINT).expect("sheets endpoint URL is valid");
        url.path_segments_mut()
            .expect("sheets endpoint URL has a path")
            .push(&sheet_id)
            .push("values")
            .push(&range);

        let response = self.http.get(url).bearer_auth(&token).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => SheetsError::Auth("access token rejected by the Sheets API".to_string()),
                403 => SheetsError::NotShared(sheet_id),
                404 => SheetsError::NotFound(sheet_id),
                // Unknown sheet names surface as 400 "Unable to parse range".
                400 if worksheet.is_some() => {
                    SheetsError::WorksheetNotFound(worksheet.unwrap_or_default().to_string())
                }
                _ => SheetsError::Api {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let payload: ValuesResponse = response.json().await?;
        let values = payload.values.unwrap_or_default();
        let label = format!("{}_{}", key.0, key.1);
        let dataset = SheetDataset::from_values(label, values).ok_or(SheetsError::EmptySheet)?;

        info!(
            "Fetched {} rows and {} columns",
            dataset.row_count(),
            dataset.column_count()
        );
        info!("Columns: {}", dataset.columns.join(", "));

        self.cache.insert(key, dataset.clone());
        Ok(dataset)
    }
}
