use chrono::{Duration, Utc};
use shelfmark::db::Store;
use shelfmark::domain::{
    Article, ArticleId, ArticleInput, ArticleStore, Book, BookRecommendationCache, ErrorKind,
    PurchaseLinks, RecommendationCacheStore, Tag, TagId, TagStore,
};

async fn store() -> Store {
    Store::new("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database")
}

fn input(title: &str, tags: &[&str]) -> ArticleInput {
    ArticleInput {
        title: title.to_string(),
        url: "https://example.com/a".to_string(),
        summary: format!("summary of {title}"),
        tags: tags.iter().map(|t| (*t).to_string()).collect(),
        memo: String::new(),
    }
}

fn book(title: &str) -> Book {
    Book {
        title: title.to_string(),
        author: "Someone".to_string(),
        isbn: None,
        purchase_links: PurchaseLinks::default(),
    }
}

#[tokio::test]
async fn ping_succeeds() {
    assert!(store().await.ping().await.is_ok());
}

#[tokio::test]
async fn article_round_trip_keeps_tag_order() {
    let store = store().await;
    let repo = store.article_repo();

    let created = repo
        .create(Article::new(input("Zig", &["systems", "lang", "zig"])).unwrap())
        .await
        .unwrap();
    assert!(created.id.is_assigned());

    let loaded = repo.find_by_id(created.id).await.unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.tags, ["systems", "lang", "zig"]);

    // tags referenced by articles are materialized as rows
    let tags = store.tag_repo().find_all().await.unwrap();
    let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["lang", "systems", "zig"]);
}

#[tokio::test]
async fn article_update_rewrites_tags() {
    let store = store().await;
    let repo = store.article_repo();

    let mut article = repo
        .create(Article::new(input("Zig", &["a", "b"])).unwrap())
        .await
        .unwrap();
    article.update(input("Zig 0.13", &["c", "a"])).unwrap();
    repo.update(article.clone()).await.unwrap();

    let loaded = repo.find_by_id(article.id).await.unwrap();
    assert_eq!(loaded.title, "Zig 0.13");
    assert_eq!(loaded.tags, ["c", "a"]);
    assert_eq!(loaded.updated_at, article.updated_at);
}

#[tokio::test]
async fn missing_articles_are_not_found() {
    let repo = store().await.article_repo();

    let err = repo.find_by_id(ArticleId::new(42)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = repo.delete(ArticleId::new(42)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn find_all_is_newest_first() {
    let repo = store().await.article_repo();
    for title in ["first", "second", "third"] {
        repo.create(Article::new(input(title, &[])).unwrap())
            .await
            .unwrap();
    }

    let titles: Vec<_> = repo
        .find_all()
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.title)
        .collect();
    assert_eq!(titles, ["third", "second", "first"]);
}

#[tokio::test]
async fn search_escapes_like_wildcards() {
    let repo = store().await.article_repo();
    repo.create(Article::new(input("100% coverage", &[])).unwrap())
        .await
        .unwrap();
    repo.create(Article::new(input("1000 tips", &[])).unwrap())
        .await
        .unwrap();
    repo.create(Article::new(input("snake_case names", &[])).unwrap())
        .await
        .unwrap();
    repo.create(Article::new(input("snakeXcase", &[])).unwrap())
        .await
        .unwrap();

    let titles = |found: Vec<Article>| found.into_iter().map(|a| a.title).collect::<Vec<_>>();
    assert_eq!(titles(repo.search("100%").await.unwrap()), ["100% coverage"]);
    assert_eq!(titles(repo.search("SNAKE_").await.unwrap()), ["snake_case names"]);
    assert_eq!(repo.search("").await.unwrap().len(), 4);
}

#[tokio::test]
async fn tag_names_are_unique() {
    let repo = store().await.tag_repo();
    repo.create(Tag::new("rust").unwrap()).await.unwrap();

    let err = repo.create(Tag::new("rust").unwrap()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    let go = repo.create(Tag::new("go").unwrap()).await.unwrap();
    let mut renamed = go.clone();
    renamed.rename("rust").unwrap();
    let err = repo.update(renamed).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
}

#[tokio::test]
async fn deleting_a_tag_detaches_it_from_articles() {
    let store = store().await;
    let articles = store.article_repo();
    let tags = store.tag_repo();

    let article = articles
        .create(Article::new(input("Go", &["go", "web"])).unwrap())
        .await
        .unwrap();
    let web = tags.find_by_name("web").await.unwrap();
    tags.delete(web.id).await.unwrap();

    assert_eq!(articles.find_by_id(article.id).await.unwrap().tags, ["go"]);
    let err = tags.delete(TagId::new(999)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn cache_save_replaces_previous_entry() {
    let repo = store().await.recommendation_repo();
    assert!(repo.find_latest_valid().await.unwrap().is_none());

    let first = repo
        .save(BookRecommendationCache::new(vec![book("One")]).unwrap())
        .await
        .unwrap();
    assert!(first.is_persisted());

    let second = repo
        .save(BookRecommendationCache::new(vec![book("Two"), book("Three")]).unwrap())
        .await
        .unwrap();
    assert_ne!(first.id, second.id);

    let latest = repo.find_latest_valid().await.unwrap().unwrap();
    assert_eq!(latest.id, second.id);
    assert_eq!(latest.books, second.books);
    assert_eq!(latest.expires_at, second.expires_at);
}

#[tokio::test]
async fn expired_cache_is_ignored() {
    let repo = store().await.recommendation_repo();
    let now = Utc::now();

    repo.save(BookRecommendationCache {
        id: 0,
        books: vec![book("Stale")],
        generated_at: now - Duration::hours(25),
        expires_at: now - Duration::hours(1),
    })
    .await
    .unwrap();

    assert!(repo.find_latest_valid().await.unwrap().is_none());
}

#[tokio::test]
async fn unreadable_cache_row_is_replaced_by_save() {
    use sea_orm::{ActiveModelTrait, Set};
    use shelfmark::entities::book_recommendations;

    let store = store().await;
    book_recommendations::ActiveModel {
        recommendations_json: Set("not json".to_string()),
        created_at: Set("2025-01-01T00:00:00.000000Z".to_string()),
        expires_at: Set("2999-01-01T00:00:00.000000Z".to_string()),
        ..Default::default()
    }
    .insert(&store.conn)
    .await
    .unwrap();

    let repo = store.recommendation_repo();
    let err = repo.find_latest_valid().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Database);

    let saved = repo
        .save(BookRecommendationCache::new(vec![book("Fresh")]).unwrap())
        .await
        .unwrap();
    let latest = repo.find_latest_valid().await.unwrap().unwrap();
    assert_eq!(latest.id, saved.id);
    assert_eq!(latest.books, saved.books);
}
