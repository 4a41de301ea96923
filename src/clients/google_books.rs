use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{BookDetail, BookEnricher, retry_linear};
use crate::config::GoogleBooksConfig;
use crate::domain::{PurchaseLinks, RecommendationError};

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    #[serde(default)]
    title: String,
    #[serde(default)]
    authors: Vec<String>,
    #[serde(default)]
    industry_identifiers: Vec<IndustryIdentifier>,
}

#[derive(Debug, Deserialize)]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    kind: String,
    identifier: String,
}

/// A failed lookup plus whether another attempt may succeed.
#[derive(Debug)]
struct LookupFailure {
    error: RecommendationError,
    retryable: bool,
}

impl LookupFailure {
    fn retryable(message: impl Into<String>) -> Self {
        Self {
            error: RecommendationError::books_api(message),
            retryable: true,
        }
    }

    fn fatal(message: impl Into<String>) -> Self {
        Self {
            error: RecommendationError::books_api(message),
            retryable: false,
        }
    }
}

/// Google Books volumes search, used to enrich AI suggestions with ISBNs and shop links.
#[derive(Clone)]
pub struct GoogleBooksClient {
    client: Client,
    config: GoogleBooksConfig,
}

impl GoogleBooksClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: GoogleBooksConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("shelfmark/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self { client, config })
    }

    fn search_url(&self, title: &str, author: &str) -> String {
        let query = if author.is_empty() {
            title.to_string()
        } else {
            format!("{title} {author}")
        };

        let mut url = format!(
            "{}/volumes?q={}&maxResults=1",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(&query)
        );
        if !self.config.api_key.is_empty() {
            url.push_str("&key=");
            url.push_str(&urlencoding::encode(&self.config.api_key));
        }
        url
    }

    async fn lookup(&self, title: &str, author: &str) -> Result<BookDetail, LookupFailure> {
        let response = self
            .client
            .get(self.search_url(title, author))
            .send()
            .await
            .map_err(|e| LookupFailure::retryable(format!("request failed: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let body: VolumesResponse = response
            .json()
            .await
            .map_err(|e| LookupFailure::fatal(format!("failed to parse response: {e}")))?;

        Ok(to_detail(body, title, author))
    }
}

#[async_trait]
impl BookEnricher for GoogleBooksClient {
    async fn search_book(
        &self,
        title: &str,
        author: &str,
    ) -> Result<BookDetail, RecommendationError> {
        if title.trim().is_empty() {
            return Err(RecommendationError::books_api("title is required"));
        }

        retry_linear(
            self.config.max_retries,
            Duration::from_millis(self.config.retry_wait_ms),
            |f: &LookupFailure| f.retryable,
            || self.lookup(title, author),
        )
        .await
        .map_err(|f| f.error)
    }
}

fn classify_status(status: StatusCode, body: &str) -> LookupFailure {
    match status {
        StatusCode::TOO_MANY_REQUESTS => LookupFailure::retryable("rate limit exceeded"),
        StatusCode::INTERNAL_SERVER_ERROR | StatusCode::SERVICE_UNAVAILABLE => {
            LookupFailure::retryable(format!("server error: {status}"))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LookupFailure::fatal("invalid API key"),
        _ => LookupFailure::fatal(format!("unexpected status {status}: {body}")),
    }
}

fn to_detail(response: VolumesResponse, title: &str, author: &str) -> BookDetail {
    let Some(volume) = response.items.into_iter().next() else {
        return BookDetail {
            title: title.to_string(),
            author: author.to_string(),
            ..BookDetail::default()
        };
    };
    let info = volume.volume_info;

    let find = |kind: &str| {
        info.industry_identifiers
            .iter()
            .find(|id| id.kind == kind)
            .map(|id| id.identifier.replace('-', ""))
            .filter(|id| !id.is_empty())
    };
    let isbn10 = find("ISBN_10");
    let isbn13 = find("ISBN_13");
    let isbn = isbn10.clone().or_else(|| isbn13.clone());

    let purchase_links = PurchaseLinks {
        amazon: isbn
            .as_ref()
            .map(|id| format!("https://www.amazon.co.jp/dp/{id}")),
        rakuten: isbn13
            .as_ref()
            .map(|id| format!("https://books.rakuten.co.jp/search?sitem={id}")),
    };

    BookDetail {
        title: if info.title.is_empty() {
            title.to_string()
        } else {
            info.title
        },
        author: if info.authors.is_empty() {
            author.to_string()
        } else {
            info.authors.join(", ")
        },
        isbn,
        purchase_links,
    }
}
