use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::display;
use crate::db::timestamp::format_timestamp;
use crate::domain::{Article, ArticleInput, Book, BookRecommendationCache, Tag};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<&'static str, String>>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
            details: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            code: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: Vec<(&'static str, String)>) -> Self {
        if !details.is_empty() {
            self.details = Some(details.into_iter().collect());
        }
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct ArticleRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub memo: String,
}

impl From<ArticleRequest> for ArticleInput {
    fn from(req: ArticleRequest) -> Self {
        Self {
            title: req.title,
            url: req.url,
            summary: req.summary,
            tags: req.tags,
            memo: req.memo,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateArticleRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub memo: String,
}

#[derive(Debug, Deserialize)]
pub struct TagRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub keyword: String,
}

#[derive(Debug, Serialize)]
pub struct ArticleDto {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub memo: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Article> for ArticleDto {
    fn from(article: Article) -> Self {
        Self {
            id: article.id.value(),
            created_at: format_timestamp(article.created_at),
            updated_at: format_timestamp(article.updated_at),
            title: article.title,
            url: article.url,
            summary: article.summary,
            tags: article.tags,
            memo: article.memo,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TagDto {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Tag> for TagDto {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id.value(),
            name: tag.name,
            created_at: format_timestamp(tag.created_at),
            updated_at: format_timestamp(tag.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PurchaseLinksDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amazon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rakuten: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookDto {
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    pub purchase_links: PurchaseLinksDto,
}

impl From<Book> for BookDto {
    fn from(book: Book) -> Self {
        Self {
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            purchase_links: PurchaseLinksDto {
                amazon: book.purchase_links.amazon,
                rakuten: book.purchase_links.rakuten,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookRecommendationsDto {
    pub books: Vec<BookDto>,
    /// True when served from (or written to) the cache store.
    pub cached: bool,
    pub generated_at: String,
    pub expires_at: String,
}

impl From<BookRecommendationCache> for BookRecommendationsDto {
    fn from(cache: BookRecommendationCache) -> Self {
        Self {
            cached: cache.is_persisted(),
            generated_at: format_jst(cache.generated_at),
            expires_at: format_jst(cache.expires_at),
            books: cache.books.into_iter().map(BookDto::from).collect(),
        }
    }
}

/// `YYYY-MM-DD HH:MM:SS` in Asia/Tokyo.
#[must_use]
pub fn format_jst(ts: DateTime<Utc>) -> String {
    FixedOffset::east_opt(display::JST_OFFSET_SECONDS).map_or_else(
        || ts.format(display::TIMESTAMP_FORMAT).to_string(),
        |jst| ts.with_timezone(&jst).format(display::TIMESTAMP_FORMAT).to_string(),
    )
}
