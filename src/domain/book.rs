use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::article::is_http_url;
use super::{AppError, AppResult, now};
use crate::constants::{cache, limits};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amazon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rakuten: Option<String>,
}

impl PurchaseLinks {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.amazon.is_none() && self.rakuten.is_none()
    }
}

/// A recommended book. Only ever stored inside a [`BookRecommendationCache`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default)]
    pub purchase_links: PurchaseLinks,
}

impl Book {
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::validation("books.title", "book title is required"));
        }
        if self.title.chars().count() > limits::BOOK_TITLE_MAX {
            return Err(AppError::validation(
                "books.title",
                format!(
                    "book title must be {} characters or less",
                    limits::BOOK_TITLE_MAX
                ),
            ));
        }
        if self.author.trim().is_empty() {
            return Err(AppError::validation("books.author", "book author is required"));
        }
        if self.author.chars().count() > limits::BOOK_AUTHOR_MAX {
            return Err(AppError::validation(
                "books.author",
                format!(
                    "book author must be {} characters or less",
                    limits::BOOK_AUTHOR_MAX
                ),
            ));
        }
        let links = [
            self.purchase_links.amazon.as_deref(),
            self.purchase_links.rakuten.as_deref(),
        ];
        if links.into_iter().flatten().any(|link| !is_http_url(link)) {
            return Err(AppError::validation(
                "books.purchase_links",
                "purchase links must start with http:// or https://",
            ));
        }
        Ok(())
    }
}

/// Time-boxed snapshot of generated recommendations.
///
/// Never mutated after creation; regeneration always builds a fresh instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecommendationCache {
    /// Zero until the cache store assigns an identity.
    pub id: i64,
    pub books: Vec<Book>,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl BookRecommendationCache {
    /// Creates an unpersisted cache expiring one TTL from now.
    pub fn new(books: Vec<Book>) -> AppResult<Self> {
        for book in &books {
            book.validate()?;
        }
        let generated_at = now();
        Ok(Self {
            id: 0,
            books,
            generated_at,
            expires_at: generated_at + cache::recommendation_ttl(),
        })
    }

    #[must_use]
    pub fn empty() -> Self {
        let generated_at = now();
        Self {
            id: 0,
            books: Vec::new(),
            generated_at,
            expires_at: generated_at + cache::recommendation_ttl(),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    #[must_use]
    pub fn is_valid_at(&self, instant: DateTime<Utc>) -> bool {
        instant < self.expires_at
    }

    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.id > 0
    }
}
