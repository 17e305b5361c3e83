use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use scraper::{Html, Selector};
use std::time::Duration;
use log::{info, warn, error};
use thiserror::Error;

use crate::delay_manager::{self, RETRY_BACKOFF_MAX_SECS, RETRY_BACKOFF_MIN_SECS};
use crate::normalizer::{self, ParseError};
use crate::record_store::Followers;

pub const PROFILE_BASE_URL: &str = "https://www.tiktok.com/@";

/// Follower counts at or above this get the highlight line.
pub const DEFAULT_HIGHLIGHT_THRESHOLD: i64 = 5000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Profile pages render the count client-side with some latency; waiting
/// longer than this per attempt is not worth it, retrying is.
const PAGE_TIMEOUT_SECS: u64 = 10;

const FOLLOWER_SELECTOR: &str = r#"strong[title="Followers"]"#;

pub fn profile_url(username: &str) -> String {
    format!("{}{}", PROFILE_BASE_URL, username)
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("follower count element not found")]
    ElementMissing,
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// The one capability the retry policy needs from the outside world:
/// load a profile page and come back with the raw follower text.
pub trait FollowerPage {
    fn fetch_follower_text(&self, username: &str) -> Result<String, FetchError>;
}

/// Live page fetcher: blocking HTTP GET plus an element lookup.
pub struct HttpFollowerPage {
    client: Client,
}

impl HttpFollowerPage {
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .timeout(Duration::from_secs(PAGE_TIMEOUT_SECS))
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .expect("Failed to build HTTP client");

        HttpFollowerPage { client }
    }

    fn random_user_agent(&self) -> &str {
        let uas = [
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
        ];
        use rand::Rng;
        let mut rng = rand::thread_rng();
        uas[rng.gen_range(0..uas.len())]
    }
}

impl Default for HttpFollowerPage {
    fn default() -> Self {
        Self::new()
    }
}

impl FollowerPage for HttpFollowerPage {
    fn fetch_follower_text(&self, username: &str) -> Result<String, FetchError> {
        let url = profile_url(username);
        let resp = self
            .client
            .get(&url)
            .header(USER_AGENT, self.random_user_agent())
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.text()?;
        let document = Html::parse_document(&body);
        let selector = Selector::parse(FOLLOWER_SELECTOR).unwrap();
        let text = document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .ok_or(FetchError::ElementMissing)?;
        if text.is_empty() {
            return Err(FetchError::ElementMissing);
        }
        Ok(text)
    }
}

/// Retry-with-jitter wrapper around a [`FollowerPage`].
///
/// A single username failing all attempts is data (`Followers::Failed`),
/// never an error: one dead profile must not abort a long run.
pub struct ProfileScraper<P: FollowerPage> {
    page: P,
    max_retries: u32,
    highlight_threshold: i64,
    backoff_secs: (f64, f64),
}

impl<P: FollowerPage> ProfileScraper<P> {
    pub fn new(page: P) -> Self {
        ProfileScraper {
            page,
            max_retries: DEFAULT_MAX_RETRIES,
            highlight_threshold: DEFAULT_HIGHLIGHT_THRESHOLD,
            backoff_secs: (RETRY_BACKOFF_MIN_SECS, RETRY_BACKOFF_MAX_SECS),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_highlight_threshold(mut self, threshold: i64) -> Self {
        self.highlight_threshold = threshold;
        self
    }

    pub fn with_backoff_secs(mut self, min_secs: f64, max_secs: f64) -> Self {
        self.backoff_secs = (min_secs, max_secs);
        self
    }

    pub fn fetch(&self, username: &str) -> Followers {
        let mut attempt = 0;
        loop {
            match self.attempt(username) {
                Ok(count) => {
                    if count >= self.highlight_threshold {
                        info!(
                            "Username: {}, Followers: {} *** High Follower Count ***",
                            username, count
                        );
                    } else {
                        info!("Username: {}, Followers: {}", username, count);
                    }
                    return Followers::Count(count);
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.max_retries {
                        error!("Error scraping {}: {}", username, e);
                        return Followers::Failed;
                    }
                    warn!(
                        "Retrying {}... Attempt {}/{}",
                        username, attempt, self.max_retries
                    );
                    let (min_secs, max_secs) = self.backoff_secs;
                    delay_manager::jittered_delay(min_secs, max_secs);
                }
            }
        }
    }

    fn attempt(&self, username: &str) -> Result<i64, FetchError> {
        let text = self.page.fetch_follower_text(username)?;
        Ok(normalizer::normalize(&text)?)
    }
}
