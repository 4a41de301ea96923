//! Storage contracts implemented by the SQLite repositories and the
//! in-memory arena.

use async_trait::async_trait;

use super::{AppResult, Article, ArticleId, BookRecommendationCache, Tag, TagId};

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Persists a new article and returns it with its assigned id.
    async fn create(&self, article: Article) -> AppResult<Article>;

    async fn find_by_id(&self, id: ArticleId) -> AppResult<Article>;

    /// All articles, newest first.
    async fn find_all(&self) -> AppResult<Vec<Article>>;

    async fn update(&self, article: Article) -> AppResult<Article>;

    async fn delete(&self, id: ArticleId) -> AppResult<()>;

    /// Multi-keyword AND search over title and summary, newest first.
    async fn search(&self, keyword: &str) -> AppResult<Vec<Article>>;
}

#[async_trait]
pub trait TagStore: Send + Sync {
    async fn create(&self, tag: Tag) -> AppResult<Tag>;

    async fn find_by_id(&self, id: TagId) -> AppResult<Tag>;

    async fn find_by_name(&self, name: &str) -> AppResult<Tag>;

    /// All tags ordered by name.
    async fn find_all(&self) -> AppResult<Vec<Tag>>;

    async fn update(&self, tag: Tag) -> AppResult<Tag>;

    async fn delete(&self, id: TagId) -> AppResult<()>;
}

#[async_trait]
pub trait RecommendationCacheStore: Send + Sync {
    /// Newest cache whose expiry is still in the future, if any.
    async fn find_latest_valid(&self) -> AppResult<Option<BookRecommendationCache>>;

    /// Atomically replaces any prior cache and returns the stored copy.
    async fn save(&self, cache: BookRecommendationCache) -> AppResult<BookRecommendationCache>;
}
