use std::sync::Arc;

use tracing::info;

use crate::domain::{AppError, AppResult, Article, ArticleId, ArticleInput, ArticleStore};

/// Article use cases on top of an [`ArticleStore`].
pub struct ArticleService {
    store: Arc<dyn ArticleStore>,
}

impl ArticleService {
    #[must_use]
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: ArticleInput) -> AppResult<Article> {
        let article = Article::new(input)?;
        let created = self.store.create(article).await?;
        info!(article_id = %created.id, "Created article");
        Ok(created)
    }

    pub async fn get(&self, id: ArticleId) -> AppResult<Article> {
        ensure_assigned(id)?;
        self.store.find_by_id(id).await
    }

    pub async fn list(&self) -> AppResult<Vec<Article>> {
        self.store.find_all().await
    }

    pub async fn update(&self, id: ArticleId, input: ArticleInput) -> AppResult<Article> {
        ensure_assigned(id)?;
        let mut article = self.store.find_by_id(id).await?;
        article.update(input)?;
        let updated = self.store.update(article).await?;
        info!(article_id = %id, "Updated article");
        Ok(updated)
    }

    pub async fn delete(&self, id: ArticleId) -> AppResult<()> {
        ensure_assigned(id)?;
        self.store.delete(id).await?;
        info!(article_id = %id, "Deleted article");
        Ok(())
    }

    /// Blank keywords list everything.
    pub async fn search(&self, keyword: &str) -> AppResult<Vec<Article>> {
        self.store.search(keyword).await
    }
}

fn ensure_assigned(id: ArticleId) -> AppResult<()> {
    if id.is_assigned() {
        Ok(())
    } else {
        Err(AppError::invalid_argument("id", "article id must be positive"))
    }
}
