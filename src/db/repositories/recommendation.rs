use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::db::timestamp::{format_timestamp, parse_timestamp};
use crate::domain::{AppError, AppResult, Book, BookRecommendationCache, RecommendationCacheStore};
use crate::entities::{book_recommendations, prelude::*};

/// Holds at most one recommendation row; every save supersedes the previous one.
pub struct RecommendationRepository {
    conn: DatabaseConnection,
}

impl RecommendationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl RecommendationCacheStore for RecommendationRepository {
    async fn find_latest_valid(&self) -> AppResult<Option<BookRecommendationCache>> {
        let now = format_timestamp(chrono::Utc::now());

        let row = BookRecommendations::find()
            .filter(book_recommendations::Column::ExpiresAt.gt(now))
            .order_by_desc(book_recommendations::Column::CreatedAt)
            .order_by_desc(book_recommendations::Column::Id)
            .one(&self.conn)
            .await?;

        row.map(to_domain).transpose()
    }

    async fn save(&self, cache: BookRecommendationCache) -> AppResult<BookRecommendationCache> {
        let json = serde_json::to_string(&cache.books)
            .map_err(|e| AppError::database("encode recommendations", e))?;

        let txn = self.conn.begin().await?;

        BookRecommendations::delete_many().exec(&txn).await?;

        let active = book_recommendations::ActiveModel {
            recommendations_json: Set(json),
            created_at: Set(format_timestamp(cache.generated_at)),
            expires_at: Set(format_timestamp(cache.expires_at)),
            ..Default::default()
        };
        let id = BookRecommendations::insert(active)
            .exec(&txn)
            .await?
            .last_insert_id;

        txn.commit().await?;

        Ok(BookRecommendationCache { id, ..cache })
    }
}

fn to_domain(row: book_recommendations::Model) -> AppResult<BookRecommendationCache> {
    let books: Vec<Book> = serde_json::from_str(&row.recommendations_json)
        .map_err(|e| AppError::database("decode recommendations", e))?;

    Ok(BookRecommendationCache {
        id: row.id,
        books,
        generated_at: parse_timestamp("book_recommendations.created_at", &row.created_at)?,
        expires_at: parse_timestamp("book_recommendations.expires_at", &row.expires_at)?,
    })
}
