//! In-memory backend.
//!
//! One arena per record type, all behind a single reader/writer lock with
//! monotonic id counters. Reads hand out clones, never references into the
//! arena.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{
    AppError, AppResult, Article, ArticleId, ArticleStore, BookRecommendationCache,
    RecommendationCacheStore, Tag, TagId, TagStore, now,
};
use crate::services::search::{SearchQuery, sort_newest_first};

#[derive(Debug, Default)]
struct MemoryState {
    articles: HashMap<ArticleId, Article>,
    tags: HashMap<TagId, Tag>,
    cache: Option<BookRecommendationCache>,
    next_article_id: i64,
    next_tag_id: i64,
    next_cache_id: i64,
}

impl MemoryState {
    fn tag_name_taken(&self, name: &str, except: Option<TagId>) -> bool {
        self.tags
            .values()
            .any(|t| t.name == name && Some(t.id) != except)
    }

    /// Mirrors the join-table behavior: article tags always exist as tag records.
    fn register_tags(&mut self, names: &[String]) {
        for name in names {
            if self.tag_name_taken(name, None) {
                continue;
            }
            self.next_tag_id += 1;
            let id = TagId::new(self.next_tag_id);
            let ts = now();
            self.tags.insert(
                id,
                Tag {
                    id,
                    name: name.clone(),
                    created_at: ts,
                    updated_at: ts,
                },
            );
        }
    }

    fn newest_first(&self) -> Vec<Article> {
        let mut all: Vec<Article> = self.articles.values().cloned().collect();
        sort_newest_first(&mut all);
        all
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn create(&self, mut article: Article) -> AppResult<Article> {
        let mut state = self.state.write().await;
        state.next_article_id += 1;
        article.id = ArticleId::new(state.next_article_id);
        state.register_tags(&article.tags);
        state.articles.insert(article.id, article.clone());
        Ok(article)
    }

    async fn find_by_id(&self, id: ArticleId) -> AppResult<Article> {
        let state = self.state.read().await;
        state
            .articles
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found("article", id))
    }

    async fn find_all(&self) -> AppResult<Vec<Article>> {
        Ok(self.state.read().await.newest_first())
    }

    async fn update(&self, article: Article) -> AppResult<Article> {
        let mut state = self.state.write().await;
        if !state.articles.contains_key(&article.id) {
            return Err(AppError::not_found("article", article.id));
        }
        state.register_tags(&article.tags);
        state.articles.insert(article.id, article.clone());
        Ok(article)
    }

    async fn delete(&self, id: ArticleId) -> AppResult<()> {
        let mut state = self.state.write().await;
        state
            .articles
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("article", id))
    }

    async fn search(&self, keyword: &str) -> AppResult<Vec<Article>> {
        let query = SearchQuery::parse(keyword);
        let state = self.state.read().await;
        if query.is_empty() {
            return Ok(state.newest_first());
        }
        Ok(query.apply(state.articles.values().cloned().collect()))
    }
}

#[async_trait]
impl TagStore for MemoryStore {
    async fn create(&self, mut tag: Tag) -> AppResult<Tag> {
        let mut state = self.state.write().await;
        if state.tag_name_taken(&tag.name, None) {
            return Err(AppError::already_exists("tag", &tag.name));
        }
        state.next_tag_id += 1;
        tag.id = TagId::new(state.next_tag_id);
        state.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn find_by_id(&self, id: TagId) -> AppResult<Tag> {
        let state = self.state.read().await;
        state
            .tags
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found("tag", id))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Tag> {
        let state = self.state.read().await;
        state
            .tags
            .values()
            .find(|t| t.name == name)
            .cloned()
            .ok_or_else(|| AppError::not_found("tag", name))
    }

    async fn find_all(&self) -> AppResult<Vec<Tag>> {
        let state = self.state.read().await;
        let mut tags: Vec<Tag> = state.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn update(&self, tag: Tag) -> AppResult<Tag> {
        let mut state = self.state.write().await;
        let Some(previous) = state.tags.get(&tag.id).map(|t| t.name.clone()) else {
            return Err(AppError::not_found("tag", tag.id));
        };
        if state.tag_name_taken(&tag.name, Some(tag.id)) {
            return Err(AppError::already_exists("tag", &tag.name));
        }
        // articles reference tags by name here, so a rename follows through
        for article in state.articles.values_mut() {
            for name in &mut article.tags {
                if *name == previous {
                    name.clone_from(&tag.name);
                }
            }
        }
        state.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn delete(&self, id: TagId) -> AppResult<()> {
        let mut state = self.state.write().await;
        let removed = state
            .tags
            .remove(&id)
            .ok_or_else(|| AppError::not_found("tag", id))?;
        for article in state.articles.values_mut() {
            article.tags.retain(|name| *name != removed.name);
        }
        Ok(())
    }
}

#[async_trait]
impl RecommendationCacheStore for MemoryStore {
    async fn find_latest_valid(&self) -> AppResult<Option<BookRecommendationCache>> {
        let state = self.state.read().await;
        Ok(state.cache.as_ref().filter(|c| c.is_valid()).cloned())
    }

    async fn save(&self, mut cache: BookRecommendationCache) -> AppResult<BookRecommendationCache> {
        let mut state = self.state.write().await;
        state.next_cache_id += 1;
        cache.id = state.next_cache_id;
        state.cache = Some(cache.clone());
        Ok(cache)
    }
}
