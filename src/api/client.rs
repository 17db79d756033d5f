use super::types::{
    numeric_series_id, ApiConfig, ApiError, Envelope, EpisodePage, LoginData, SearchRecord,
    SeriesCandidate, SeriesRecord,
};
use super::MetadataSource;
use crate::catalog::{CatalogEpisode, EpisodeCatalog};
use once_cell::sync::OnceCell;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Upper bound on followed `links.next` pages
const MAX_EPISODE_PAGES: u32 = 100;

/// TheTVDB v4 API client
pub struct TvdbClient {
    client: Client,
    config: ApiConfig,
    token: OnceCell<String>,
}

impl TvdbClient {
    /// Create a new client; the login happens on first use
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        if !config.is_configured() {
            return Err(ApiError::NotConfigured);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            config,
            token: OnceCell::new(),
        })
    }

    /// Run `request` with exponential backoff on transient failures
    fn with_retry<T>(
        &self,
        what: &str,
        request: impl Fn() -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut last_error = None;
        let mut delay = Duration::from_secs(1);

        for attempt in 1..=self.config.max_retries {
            debug!("{} (attempt {}/{})", what, attempt, self.config.max_retries);

            match request() {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!("Attempt {} failed: {}", attempt, e);

                    // Don't retry for certain errors
                    if e.is_permanent() {
                        return Err(e);
                    }

                    last_error = Some(e);

                    if attempt < self.config.max_retries {
                        debug!("Waiting {:?} before retry", delay);
                        std::thread::sleep(delay);
                        delay *= 2;
                    }
                }
            }
        }

        Err(last_error.unwrap_or(ApiError::MaxRetriesExceeded {
            attempts: self.config.max_retries,
        }))
    }

    fn token(&self) -> Result<&str, ApiError> {
        self.token
            .get_or_try_init(|| self.with_retry("Logging in to TheTVDB", || self.login()))
            .map(String::as_str)
    }

    fn login(&self) -> Result<String, ApiError> {
        let mut body = serde_json::json!({ "apikey": self.config.api_key });
        if let Some(pin) = &self.config.pin {
            body["pin"] = serde_json::Value::String(pin.clone());
        }

        let request = self
            .client
            .post(format!("{}/login", self.config.base_url))
            .header("Content-Type", "application/json")
            .body(body.to_string());

        let text = send(request, "login")?;
        parse_login(&text)
    }

    fn get(&self, path: &str, context: &str) -> Result<String, ApiError> {
        let token = self.token()?;
        let url = format!("{}{}", self.config.base_url, path);

        debug!("Requesting: {}", url);

        self.with_retry(context, || {
            send(self.client.get(&url).bearer_auth(token), context)
        })
    }
}

impl MetadataSource for TvdbClient {
    fn search_series(&self, query: &str) -> Result<Vec<SeriesCandidate>, ApiError> {
        info!("Searching TheTVDB for '{}'", query);

        let path = format!("/search?query={}&type=series", encode_query(query));
        let body = self.get(&path, &format!("search '{}'", query))?;
        parse_search(&body)
    }

    fn fetch_series(&self, id: &str) -> Result<SeriesCandidate, ApiError> {
        let id = numeric_series_id(id)
            .ok_or_else(|| ApiError::NotFound(format!("invalid series id '{}'", id)))?;

        let body = self.get(&format!("/series/{}", id), &format!("series {}", id))?;
        parse_series(&body)
    }

    fn fetch_episode_catalog(
        &self,
        series: &SeriesCandidate,
        season: Option<u32>,
    ) -> Result<EpisodeCatalog, ApiError> {
        info!("Fetching episodes for {} (ID {})", series.name, series.id);

        let mut episodes = Vec::new();
        let mut page = 0;

        loop {
            let path = format!("/series/{}/episodes/default?page={}", series.id, page);
            let body = self.get(&path, &format!("episodes of series {}", series.id))?;
            let (mut batch, has_next) = parse_episode_page(&body)?;

            debug!("Page {}: {} episodes", page, batch.len());
            episodes.append(&mut batch);

            page += 1;
            if !has_next || page >= MAX_EPISODE_PAGES {
                break;
            }
        }

        let catalog = EpisodeCatalog::new(series.name.clone(), episodes);
        info!("Fetched {} episodes for {}", catalog.len(), series.name);

        Ok(match season {
            Some(season) => catalog.restrict_to_season(season),
            None => catalog,
        })
    }
}

fn send(request: RequestBuilder, context: &str) -> Result<String, ApiError> {
    let response = request.send()?;
    let status = response.status();

    debug!("Response status: {}", status);

    let body = response.text()?;
    check_status(status, context, &body)?;

    Ok(body)
}

fn check_status(status: StatusCode, context: &str, body: &str) -> Result<(), ApiError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthorized),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound(context.to_string())),
        StatusCode::TOO_MANY_REQUESTS => Err(ApiError::RateLimited),
        s => Err(ApiError::ServerError(format!(
            "{} for {}: {}",
            s,
            context,
            body.chars().take(200).collect::<String>()
        ))),
    }
}

fn encode_query(query: &str) -> String {
    let mut encoded = String::with_capacity(query.len());
    for byte in query.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<Envelope<T>, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::ParseError(e.to_string()))
}

fn parse_login(body: &str) -> Result<String, ApiError> {
    parse_envelope::<LoginData>(body)?
        .data
        .map(|d| d.token)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::ParseError("login response has no token".to_string()))
}

fn parse_search(body: &str) -> Result<Vec<SeriesCandidate>, ApiError> {
    let records: Vec<SearchRecord> = parse_envelope(body)?.data.unwrap_or_default();

    Ok(records
        .into_iter()
        .filter_map(|r| {
            let id = r
                .tvdb_id
                .as_deref()
                .and_then(numeric_series_id)
                .or_else(|| r.id.as_deref().and_then(numeric_series_id))?;
            Some(SeriesCandidate {
                id,
                name: r.name?,
                year: r.year.filter(|y| !y.is_empty()),
            })
        })
        .collect())
}

fn series_from_record(record: SeriesRecord) -> Result<SeriesCandidate, ApiError> {
    let name = record
        .name
        .ok_or_else(|| ApiError::ParseError(format!("series {} has no name", record.id)))?;

    Ok(SeriesCandidate {
        id: record.id.to_string(),
        name,
        year: record.year.filter(|y| !y.is_empty()),
    })
}

fn parse_series(body: &str) -> Result<SeriesCandidate, ApiError> {
    let record = parse_envelope::<SeriesRecord>(body)?
        .data
        .ok_or_else(|| ApiError::ParseError("series response has no data".to_string()))?;
    series_from_record(record)
}

/// Episodes of one page, and whether another page follows
fn parse_episode_page(body: &str) -> Result<(Vec<CatalogEpisode>, bool), ApiError> {
    let envelope = parse_envelope::<EpisodePage>(body)?;
    let has_next = envelope
        .links
        .as_ref()
        .and_then(|l| l.next.as_ref())
        .is_some();

    let episodes = envelope
        .data
        .map(|page| {
            page.episodes
                .into_iter()
                .filter_map(|e| {
                    Some(CatalogEpisode::new(
                        e.season_number?,
                        e.number?,
                        e.name.unwrap_or_default(),
                    ))
                })
                .collect()
        })
        .unwrap_or_default();

    Ok((episodes, has_next))
}
