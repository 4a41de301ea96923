//! Book recommendation cache manager.
//!
//! Serves the latest valid cache when there is one. Otherwise it regenerates:
//! load every article, ask the recommender for candidates, enrich each
//! candidate with bibliographic data, keep the ones that pass book validation
//! and persist the result as the new cache. A cache row that cannot be read
//! counts as a miss.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::clients::{BookEnricher, BookRecommender, RecommendedBook};
use crate::constants::metrics as metric_names;
use crate::domain::{
    AppError, AppResult, ArticleStore, Book, BookRecommendationCache, RecommendationCacheStore,
};

/// What to do with the empty result produced when there are no articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyCachePolicy {
    /// Return it without touching the cache store.
    #[default]
    Transient,
    /// Save it like any other regeneration.
    Persist,
}

pub struct RecommendationService {
    articles: Arc<dyn ArticleStore>,
    cache: Arc<dyn RecommendationCacheStore>,
    recommender: Arc<dyn BookRecommender>,
    enricher: Arc<dyn BookEnricher>,
    empty_policy: EmptyCachePolicy,
    concurrency: usize,
}

impl RecommendationService {
    #[must_use]
    pub fn new(
        articles: Arc<dyn ArticleStore>,
        cache: Arc<dyn RecommendationCacheStore>,
        recommender: Arc<dyn BookRecommender>,
        enricher: Arc<dyn BookEnricher>,
    ) -> Self {
        Self {
            articles,
            cache,
            recommender,
            enricher,
            empty_policy: EmptyCachePolicy::default(),
            concurrency: crate::constants::limits::ENRICHMENT_CONCURRENCY,
        }
    }

    #[must_use]
    pub const fn with_empty_policy(mut self, policy: EmptyCachePolicy) -> Self {
        self.empty_policy = policy;
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Returns a valid recommendation cache, regenerating it on a miss.
    ///
    /// # Errors
    /// - `Database` when articles cannot be loaded or the cache cannot be saved.
    ///   A failed cache lookup is logged and treated as a miss.
    /// - `Recommendation` when the recommender fails.
    /// - `NoValidRecommendations` when no candidate survives filtering.
    #[instrument(skip(self))]
    pub async fn get_recommendations(&self) -> AppResult<BookRecommendationCache> {
        match self.cache.find_latest_valid().await {
            Ok(Some(cached)) if cached.is_valid() => {
                metrics::counter!(metric_names::CACHE_HITS).increment(1);
                debug!(cache_id = cached.id, "Serving cached book recommendations");
                return Ok(cached);
            }
            Ok(_) => {}
            // an unreadable row is replaced by the next save
            Err(e) => warn!(error = %e, "Cache lookup failed, regenerating recommendations"),
        }
        metrics::counter!(metric_names::CACHE_MISSES).increment(1);

        let articles = self.articles.find_all().await?;
        if articles.is_empty() {
            info!("No articles saved, returning empty recommendations");
            let empty = BookRecommendationCache::empty();
            return match self.empty_policy {
                EmptyCachePolicy::Transient => Ok(empty),
                EmptyCachePolicy::Persist => self.persist(empty).await,
            };
        }

        let candidates = self.recommender.recommend(&articles).await?;
        let candidate_count = candidates.len();
        info!(
            articles = articles.len(),
            candidates = candidate_count,
            "Recommender returned candidates"
        );

        let books: Vec<Book> = stream::iter(candidates)
            .map(|candidate| self.enrich(candidate))
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .filter(|book| match book.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!(title = %book.title, error = %e, "Dropping unusable recommendation");
                    false
                }
            })
            .collect();

        if books.is_empty() {
            warn!(
                candidates = candidate_count,
                "No recommendation passed validation"
            );
            return Err(AppError::NoValidRecommendations {
                candidates: candidate_count,
            });
        }

        let cache = BookRecommendationCache::new(books)?;
        self.persist(cache).await
    }

    async fn persist(&self, cache: BookRecommendationCache) -> AppResult<BookRecommendationCache> {
        let saved = self.cache.save(cache).await.map_err(|e| match e {
            AppError::Database { .. } => e,
            other => AppError::database("save recommendations", other),
        })?;
        info!(
            cache_id = saved.id,
            books = saved.books.len(),
            expires_at = %saved.expires_at,
            "Saved book recommendations"
        );
        Ok(saved)
    }

    /// Looks a candidate up; any failure degrades to the candidate's own fields.
    async fn enrich(&self, candidate: RecommendedBook) -> Book {
        let author = candidate.author.clone().unwrap_or_default();
        match self.enricher.search_book(&candidate.title, &author).await {
            Ok(detail) => Book {
                title: detail.title,
                author: detail.author,
                isbn: detail.isbn,
                purchase_links: detail.purchase_links,
            },
            Err(e) => {
                metrics::counter!(metric_names::ENRICHMENT_FAILURES).increment(1);
                warn!(title = %candidate.title, error = %e, "Book enrichment failed, using basic info");
                Book {
                    title: candidate.title,
                    author,
                    ..Book::default()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::BookDetail;
    use crate::db::MemoryStore;
    use crate::domain::{
        Article, ArticleInput, ErrorKind, PurchaseLinks, RecommendationError,
        RecommendationErrorKind,
    };
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeRecommender {
        calls: AtomicUsize,
        books: Vec<RecommendedBook>,
        fail: bool,
    }

    #[async_trait]
    impl BookRecommender for FakeRecommender {
        async fn recommend(
            &self,
            _articles: &[Article],
        ) -> Result<Vec<RecommendedBook>, RecommendationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RecommendationError::new(
                    RecommendationErrorKind::AiError,
                    "quota exceeded",
                ));
            }
            Ok(self.books.clone())
        }
    }

    #[derive(Default)]
    struct FakeEnricher {
        failing_titles: Vec<String>,
        anthology_titles: Vec<String>,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BookEnricher for FakeEnricher {
        async fn search_book(
            &self,
            title: &str,
            author: &str,
        ) -> Result<BookDetail, RecommendationError> {
            self.seen.lock().unwrap().push(title.to_string());
            if self.failing_titles.iter().any(|t| t == title) {
                return Err(RecommendationError::books_api("lookup failed"));
            }
            let author = if self.anthology_titles.iter().any(|t| t == title) {
                (1..=40)
                    .map(|i| format!("Contributor {i}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            } else {
                author.to_string()
            };
            Ok(BookDetail {
                title: title.to_string(),
                author,
                isbn: Some("4873115655".to_string()),
                purchase_links: PurchaseLinks {
                    amazon: Some("https://www.amazon.co.jp/dp/4873115655".to_string()),
                    rakuten: None,
                },
            })
        }
    }

    /// Cache store whose reads always fail to decode.
    struct UnreadableCache(Arc<MemoryStore>);

    #[async_trait]
    impl RecommendationCacheStore for UnreadableCache {
        async fn find_latest_valid(&self) -> AppResult<Option<BookRecommendationCache>> {
            Err(AppError::database(
                "decode recommendations",
                "expected value at line 1 column 1",
            ))
        }

        async fn save(&self, cache: BookRecommendationCache) -> AppResult<BookRecommendationCache> {
            self.0.save(cache).await
        }
    }

    fn candidate(title: &str, author: Option<&str>) -> RecommendedBook {
        RecommendedBook {
            title: title.to_string(),
            author: author.map(ToString::to_string),
        }
    }

    fn five_candidates() -> Vec<RecommendedBook> {
        (1..=5)
            .map(|i| candidate(&format!("Book {i}"), Some(&format!("Author {i}"))))
            .collect()
    }

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let article = Article::new(ArticleInput {
            title: "Go言語入門".into(),
            url: "https://example.com/go".into(),
            summary: "Goの基礎".into(),
            tags: vec!["go".into()],
            memo: String::new(),
        })
        .unwrap();
        ArticleStore::create(store.as_ref(), article).await.unwrap();
        store
    }

    fn service(
        store: &Arc<MemoryStore>,
        recommender: &Arc<FakeRecommender>,
        enricher: &Arc<FakeEnricher>,
    ) -> RecommendationService {
        RecommendationService::new(
            store.clone(),
            store.clone(),
            recommender.clone(),
            enricher.clone(),
        )
    }

    #[tokio::test]
    async fn valid_cache_is_served_without_recommender() {
        let store = seeded_store().await;
        let cached = BookRecommendationCache::new(vec![Book {
            title: "Cached".into(),
            author: "Someone".into(),
            ..Book::default()
        }])
        .unwrap();
        let cached = store.save(cached).await.unwrap();

        let recommender = Arc::new(FakeRecommender::default());
        let enricher = Arc::new(FakeEnricher::default());
        let result = service(&store, &recommender, &enricher)
            .get_recommendations()
            .await
            .unwrap();

        assert_eq!(result, cached);
        assert_eq!(recommender.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn expired_cache_triggers_regeneration() {
        let store = seeded_store().await;
        let mut stale = BookRecommendationCache::empty();
        stale.expires_at = Utc::now() - Duration::hours(1);
        store.save(stale).await.unwrap();

        let recommender = Arc::new(FakeRecommender {
            books: five_candidates(),
            ..FakeRecommender::default()
        });
        let enricher = Arc::new(FakeEnricher::default());
        let result = service(&store, &recommender, &enricher)
            .get_recommendations()
            .await
            .unwrap();

        assert_eq!(recommender.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.books.len(), 5);
        assert!(result.is_persisted());
        assert!(result.is_valid());
    }

    #[tokio::test]
    async fn zero_articles_skip_recommender_and_stay_transient() {
        let store = Arc::new(MemoryStore::new());
        let recommender = Arc::new(FakeRecommender::default());
        let enricher = Arc::new(FakeEnricher::default());

        let result = service(&store, &recommender, &enricher)
            .get_recommendations()
            .await
            .unwrap();

        assert!(result.books.is_empty());
        assert!(!result.is_persisted());
        assert_eq!(result.expires_at - result.generated_at, Duration::hours(24));
        assert_eq!(recommender.calls.load(Ordering::SeqCst), 0);
        assert!(store.find_latest_valid().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn zero_articles_can_be_persisted() {
        let store = Arc::new(MemoryStore::new());
        let recommender = Arc::new(FakeRecommender::default());
        let enricher = Arc::new(FakeEnricher::default());

        let result = service(&store, &recommender, &enricher)
            .with_empty_policy(EmptyCachePolicy::Persist)
            .get_recommendations()
            .await
            .unwrap();

        assert!(result.books.is_empty());
        assert!(result.is_persisted());
        assert_eq!(recommender.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.find_latest_valid().await.unwrap(), Some(result));
    }

    #[tokio::test]
    async fn enrichment_failure_falls_back_to_basic_info() {
        let store = seeded_store().await;
        let recommender = Arc::new(FakeRecommender {
            books: five_candidates(),
            ..FakeRecommender::default()
        });
        let enricher = Arc::new(FakeEnricher {
            failing_titles: vec!["Book 3".into()],
            ..FakeEnricher::default()
        });

        let result = service(&store, &recommender, &enricher)
            .get_recommendations()
            .await
            .unwrap();

        assert_eq!(result.books.len(), 5);
        let fallback = &result.books[2];
        assert_eq!(fallback.title, "Book 3");
        assert_eq!(fallback.author, "Author 3");
        assert!(fallback.isbn.is_none());
        assert!(fallback.purchase_links.is_empty());
        assert!(result.books[0].purchase_links.amazon.is_some());
        assert_eq!(enricher.seen.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn candidates_missing_fields_are_dropped() {
        let store = seeded_store().await;
        let recommender = Arc::new(FakeRecommender {
            books: vec![candidate("Kept", Some("Author")), candidate("No author", None)],
            ..FakeRecommender::default()
        });
        let enricher = Arc::new(FakeEnricher::default());

        let result = service(&store, &recommender, &enricher)
            .get_recommendations()
            .await
            .unwrap();

        assert_eq!(result.books.len(), 1);
        assert_eq!(result.books[0].title, "Kept");
    }

    #[tokio::test]
    async fn oversized_candidate_is_dropped_alone() {
        let store = seeded_store().await;
        let recommender = Arc::new(FakeRecommender {
            books: five_candidates(),
            ..FakeRecommender::default()
        });
        let enricher = Arc::new(FakeEnricher {
            anthology_titles: vec!["Book 3".into()],
            ..FakeEnricher::default()
        });

        let result = service(&store, &recommender, &enricher)
            .get_recommendations()
            .await
            .unwrap();

        let titles: Vec<_> = result.books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, ["Book 1", "Book 2", "Book 4", "Book 5"]);
        assert!(result.is_persisted());
        assert_eq!(store.find_latest_valid().await.unwrap(), Some(result));
    }

    #[tokio::test]
    async fn unreadable_cache_is_regenerated() {
        let store = seeded_store().await;
        let recommender = Arc::new(FakeRecommender {
            books: five_candidates(),
            ..FakeRecommender::default()
        });
        let enricher = Arc::new(FakeEnricher::default());
        let service = RecommendationService::new(
            store.clone(),
            Arc::new(UnreadableCache(store.clone())),
            recommender.clone(),
            enricher,
        );

        let first = service.get_recommendations().await.unwrap();
        let second = service.get_recommendations().await.unwrap();

        assert_eq!(first.books.len(), 5);
        assert_eq!(second.books.len(), 5);
        assert_eq!(recommender.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn no_valid_candidates_is_a_validation_error() {
        let store = seeded_store().await;
        let recommender = Arc::new(FakeRecommender {
            books: vec![candidate("", Some("A")), candidate(" ", None)],
            ..FakeRecommender::default()
        });
        let enricher = Arc::new(FakeEnricher {
            failing_titles: vec![String::new(), " ".into()],
            ..FakeEnricher::default()
        });

        let err = service(&store, &recommender, &enricher)
            .get_recommendations()
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(matches!(
            err,
            AppError::NoValidRecommendations { candidates: 2 }
        ));
        assert!(store.find_latest_valid().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn recommender_failure_propagates() {
        let store = seeded_store().await;
        let recommender = Arc::new(FakeRecommender {
            fail: true,
            ..FakeRecommender::default()
        });
        let enricher = Arc::new(FakeEnricher::default());

        let err = service(&store, &recommender, &enricher)
            .get_recommendations()
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ExternalService);
        assert!(matches!(
            err,
            AppError::Recommendation(RecommendationError {
                kind: RecommendationErrorKind::AiError,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn second_call_is_a_cache_hit() {
        let store = seeded_store().await;
        let recommender = Arc::new(FakeRecommender {
            books: five_candidates(),
            ..FakeRecommender::default()
        });
        let enricher = Arc::new(FakeEnricher::default());
        let service = service(&store, &recommender, &enricher);

        let first = service.get_recommendations().await.unwrap();
        let second = service.get_recommendations().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(recommender.calls.load(Ordering::SeqCst), 1);
    }
}
