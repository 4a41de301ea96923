//! External AI and bibliographic collaborators.
//!
//! Services depend on the traits below; [`gemini::GeminiClient`] and
//! [`google_books::GoogleBooksClient`] are the production implementations.

pub mod gemini;
pub mod google_books;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{AiError, Article, PurchaseLinks, RecommendationError};

/// Metadata the AI produced for a URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArticle {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub suggested_tags: Vec<String>,
}

/// A candidate book as suggested by the recommender, before enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendedBook {
    pub title: String,
    pub author: Option<String>,
}

/// Canonical bibliographic data for a title/author lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDetail {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub purchase_links: PurchaseLinks,
}

#[async_trait]
pub trait ArticleGenerator: Send + Sync {
    async fn generate_from_url(&self, url: &str) -> Result<GeneratedArticle, AiError>;
}

#[async_trait]
pub trait BookRecommender: Send + Sync {
    async fn recommend(
        &self,
        articles: &[Article],
    ) -> Result<Vec<RecommendedBook>, RecommendationError>;
}

#[async_trait]
pub trait BookEnricher: Send + Sync {
    /// A lookup without a match returns the input title/author and no links.
    async fn search_book(&self, title: &str, author: &str)
    -> Result<BookDetail, RecommendationError>;
}

/// Runs `op` up to `max_retries + 1` times, sleeping `wait * attempt` between tries.
pub(crate) async fn retry_linear<T, E, F, Fut>(
    max_retries: u32,
    wait: Duration,
    is_retryable: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_retries && is_retryable(&err) => {
                attempt += 1;
                tracing::debug!(attempt, "retrying external call");
                tokio::time::sleep(wait * attempt).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = retry_linear(3, Duration::from_millis(1), |_| true, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n < 2 { Err("flaky") } else { Ok(n) } }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stops_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<(), &str> = retry_linear(2, Duration::from_millis(1), |_| true, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("down") }
        })
        .await;

        assert_eq!(result, Err("down"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_errors_fail_fast() {
        let calls = AtomicU32::new(0);
        let result: Result<(), &str> = retry_linear(5, Duration::from_secs(60), |_| false, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("fatal") }
        })
        .await;

        assert_eq!(result, Err("fatal"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
