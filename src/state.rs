use std::sync::Arc;

use crate::clients::gemini::GeminiClient;
use crate::clients::google_books::GoogleBooksClient;
use crate::clients::{ArticleGenerator, BookEnricher, BookRecommender};
use crate::config::{Config, StorageKind};
use crate::db::{MemoryStore, Store};
use crate::domain::{ArticleStore, RecommendationCacheStore, TagStore};
use crate::services::{
    ArticleService, EmptyCachePolicy, GeneratorService, RecommendationService, TagService,
};

/// Where records live for this process.
#[derive(Clone)]
pub enum StorageBackend {
    Sqlite(Store),
    Memory(Arc<MemoryStore>),
}

impl StorageBackend {
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        match config.general.storage {
            StorageKind::Sqlite => {
                let store = Store::with_pool_options(
                    &config.general.database_path,
                    config.general.max_db_connections,
                    config.general.min_db_connections,
                )
                .await?;
                Ok(Self::Sqlite(store))
            }
            StorageKind::Memory => Ok(Self::Memory(Arc::new(MemoryStore::new()))),
        }
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        match self {
            Self::Sqlite(store) => store.ping().await,
            Self::Memory(_) => Ok(()),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::Memory(_) => "memory",
        }
    }

    fn article_store(&self) -> Arc<dyn ArticleStore> {
        match self {
            Self::Sqlite(store) => Arc::new(store.article_repo()),
            Self::Memory(store) => store.clone(),
        }
    }

    fn tag_store(&self) -> Arc<dyn TagStore> {
        match self {
            Self::Sqlite(store) => Arc::new(store.tag_repo()),
            Self::Memory(store) => store.clone(),
        }
    }

    fn cache_store(&self) -> Arc<dyn RecommendationCacheStore> {
        match self {
            Self::Sqlite(store) => Arc::new(store.recommendation_repo()),
            Self::Memory(store) => store.clone(),
        }
    }
}

/// External AI and bibliographic collaborators, swappable in tests.
#[derive(Clone)]
pub struct Collaborators {
    pub generator: Arc<dyn ArticleGenerator>,
    pub recommender: Arc<dyn BookRecommender>,
    pub enricher: Arc<dyn BookEnricher>,
}

impl Collaborators {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let gemini = Arc::new(GeminiClient::new(config.gemini.clone())?);
        let books = Arc::new(GoogleBooksClient::new(config.google_books.clone())?);
        Ok(Self {
            generator: gemini.clone(),
            recommender: gemini,
            enricher: books,
        })
    }
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub backend: StorageBackend,

    pub articles: Arc<ArticleService>,

    pub tags: Arc<TagService>,

    pub generator: Arc<GeneratorService>,

    pub recommendations: Arc<RecommendationService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let backend = StorageBackend::connect(&config).await?;
        let collaborators = Collaborators::from_config(&config)?;
        Ok(Self::assemble(config, backend, collaborators))
    }

    /// Wires services over an existing backend and collaborator set.
    #[must_use]
    pub fn assemble(config: Config, backend: StorageBackend, collaborators: Collaborators) -> Self {
        let articles = Arc::new(ArticleService::new(backend.article_store()));
        let tags = Arc::new(TagService::new(backend.tag_store()));

        let generator = Arc::new(GeneratorService::new(
            collaborators.generator,
            articles.clone(),
            tags.clone(),
        ));

        let empty_policy = if config.recommendations.persist_empty {
            EmptyCachePolicy::Persist
        } else {
            EmptyCachePolicy::Transient
        };
        let recommendations = Arc::new(
            RecommendationService::new(
                backend.article_store(),
                backend.cache_store(),
                collaborators.recommender,
                collaborators.enricher,
            )
            .with_empty_policy(empty_policy)
            .with_concurrency(config.recommendations.enrichment_concurrency),
        );

        Self {
            config: Arc::new(config),
            backend,
            articles,
            tags,
            generator,
            recommendations,
        }
    }
}
