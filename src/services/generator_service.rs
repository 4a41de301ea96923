use std::sync::Arc;

use tracing::{debug, info};

use super::{ArticleService, TagService};
use crate::clients::ArticleGenerator;
use crate::constants::limits;
use crate::domain::article::is_http_url;
use crate::domain::{AppError, AppResult, Article, ArticleInput};

/// Creates articles from a URL using AI-generated metadata.
pub struct GeneratorService {
    generator: Arc<dyn ArticleGenerator>,
    articles: Arc<ArticleService>,
    tags: Arc<TagService>,
}

impl GeneratorService {
    #[must_use]
    pub fn new(
        generator: Arc<dyn ArticleGenerator>,
        articles: Arc<ArticleService>,
        tags: Arc<TagService>,
    ) -> Self {
        Self {
            generator,
            articles,
            tags,
        }
    }

    pub async fn generate_from_url(&self, url: &str, memo: &str) -> AppResult<Article> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AppError::validation("url", "url is required"));
        }
        if !is_http_url(url) {
            return Err(AppError::validation(
                "url",
                "url must start with http:// or https://",
            ));
        }

        let generated = self.generator.generate_from_url(url).await?;
        if generated.title.trim().is_empty() {
            return Err(AppError::validation("title", "generated title is empty"));
        }
        if generated.summary.trim().is_empty() {
            return Err(AppError::validation("summary", "generated summary is empty"));
        }

        let mut tags = Vec::with_capacity(generated.suggested_tags.len());
        for suggestion in generated.suggested_tags {
            let name = suggestion.trim();
            if name.is_empty() || name.chars().count() > limits::TAG_NAME_MAX {
                debug!(tag = %suggestion, "Skipping unusable suggested tag");
                continue;
            }
            let tag = self.tags.find_or_create(name).await?;
            tags.push(tag.name);
        }

        let article = self
            .articles
            .create(ArticleInput {
                title: generated.title.trim().to_string(),
                url: url.to_string(),
                summary: generated.summary.trim().to_string(),
                tags,
                memo: memo.to_string(),
            })
            .await?;

        info!(article_id = %article.id, url = %article.url, "Generated article from URL");
        Ok(article)
    }
}
