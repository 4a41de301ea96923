use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::db::timestamp::{format_timestamp, parse_timestamp};
use crate::domain::{AppError, AppResult, Article, ArticleId, ArticleStore};
use crate::entities::{article_tags, articles, prelude::*, tags};
use crate::services::search::{SearchQuery, like_pattern};

pub struct ArticleRepository {
    conn: DatabaseConnection,
}

impl ArticleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Attaches tag names, in stored order, to each article row.
    async fn hydrate(&self, rows: Vec<articles::Model>) -> AppResult<Vec<Article>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let links = ArticleTags::find()
            .filter(article_tags::Column::ArticleId.is_in(ids))
            .order_by_asc(article_tags::Column::ArticleId)
            .order_by_asc(article_tags::Column::Position)
            .find_also_related(Tags)
            .all(&self.conn)
            .await?;

        let mut by_article: HashMap<i64, Vec<String>> = HashMap::new();
        for (link, tag) in links {
            if let Some(tag) = tag {
                by_article.entry(link.article_id).or_default().push(tag.name);
            }
        }

        rows.into_iter()
            .map(|row| {
                let tags = by_article.remove(&row.id).unwrap_or_default();
                to_domain(row, tags)
            })
            .collect()
    }
}

#[async_trait]
impl ArticleStore for ArticleRepository {
    async fn create(&self, article: Article) -> AppResult<Article> {
        let txn = self.conn.begin().await?;

        let active = articles::ActiveModel {
            title: Set(article.title.clone()),
            url: Set(article.url.clone()),
            summary: Set(article.summary.clone()),
            memo: Set(article.memo.clone()),
            created_at: Set(format_timestamp(article.created_at)),
            updated_at: Set(format_timestamp(article.updated_at)),
            ..Default::default()
        };
        let id = Articles::insert(active).exec(&txn).await?.last_insert_id;

        replace_links(&txn, id, &article.tags).await?;
        txn.commit().await?;

        Ok(Article {
            id: ArticleId::new(id),
            ..article
        })
    }

    async fn find_by_id(&self, id: ArticleId) -> AppResult<Article> {
        let row = Articles::find_by_id(id.value())
            .one(&self.conn)
            .await?
            .ok_or_else(|| AppError::not_found("article", id))?;

        let mut hydrated = self.hydrate(vec![row]).await?;
        hydrated
            .pop()
            .ok_or_else(|| AppError::not_found("article", id))
    }

    async fn find_all(&self) -> AppResult<Vec<Article>> {
        let rows = Articles::find()
            .order_by_desc(articles::Column::CreatedAt)
            .order_by_desc(articles::Column::Id)
            .all(&self.conn)
            .await?;
        self.hydrate(rows).await
    }

    async fn update(&self, article: Article) -> AppResult<Article> {
        let txn = self.conn.begin().await?;

        let existing = Articles::find_by_id(article.id.value())
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("article", article.id))?;

        let mut active: articles::ActiveModel = existing.into();
        active.title = Set(article.title.clone());
        active.url = Set(article.url.clone());
        active.summary = Set(article.summary.clone());
        active.memo = Set(article.memo.clone());
        active.updated_at = Set(format_timestamp(article.updated_at));
        active.update(&txn).await?;

        replace_links(&txn, article.id.value(), &article.tags).await?;
        txn.commit().await?;

        Ok(article)
    }

    async fn delete(&self, id: ArticleId) -> AppResult<()> {
        let txn = self.conn.begin().await?;

        ArticleTags::delete_many()
            .filter(article_tags::Column::ArticleId.eq(id.value()))
            .exec(&txn)
            .await?;

        let result = Articles::delete_by_id(id.value()).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("article", id));
        }

        txn.commit().await?;
        Ok(())
    }

    async fn search(&self, keyword: &str) -> AppResult<Vec<Article>> {
        let query = SearchQuery::parse(keyword);
        if query.is_empty() {
            return self.find_all().await;
        }

        let mut condition = Condition::all();
        for token in query.ascii_tokens() {
            let pattern = like_pattern(token);
            condition = condition.add(
                Condition::any()
                    .add(
                        articles::Column::Title
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(articles::Column::Summary.like(LikeExpr::new(pattern).escape('\\'))),
            );
        }

        let candidates = Articles::find()
            .filter(condition)
            .order_by_desc(articles::Column::CreatedAt)
            .order_by_desc(articles::Column::Id)
            .all(&self.conn)
            .await?;

        let candidates = self.hydrate(candidates).await?;
        Ok(query.apply(candidates))
    }
}

/// Rewrites the join rows for an article, creating tags that do not exist yet.
async fn replace_links<C: ConnectionTrait>(
    db: &C,
    article_id: i64,
    names: &[String],
) -> AppResult<()> {
    ArticleTags::delete_many()
        .filter(article_tags::Column::ArticleId.eq(article_id))
        .exec(db)
        .await?;

    if names.is_empty() {
        return Ok(());
    }

    let mut links = Vec::with_capacity(names.len());
    for (position, name) in names.iter().enumerate() {
        let tag_id = find_or_create_tag(db, name).await?;
        links.push(article_tags::ActiveModel {
            article_id: Set(article_id),
            tag_id: Set(tag_id),
            position: Set(i32::try_from(position).unwrap_or(i32::MAX)),
        });
    }

    ArticleTags::insert_many(links).exec(db).await?;
    Ok(())
}

async fn find_or_create_tag<C: ConnectionTrait>(db: &C, name: &str) -> AppResult<i64> {
    if let Some(tag) = Tags::find()
        .filter(tags::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok(tag.id);
    }

    let now = format_timestamp(crate::domain::now());
    let active = tags::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(Tags::insert(active).exec(db).await?.last_insert_id)
}

fn to_domain(row: articles::Model, tags: Vec<String>) -> AppResult<Article> {
    Ok(Article {
        id: ArticleId::new(row.id),
        created_at: parse_timestamp("articles.created_at", &row.created_at)?,
        updated_at: parse_timestamp("articles.updated_at", &row.updated_at)?,
        title: row.title,
        url: row.url,
        summary: row.summary,
        tags,
        memo: row.memo,
    })
}
