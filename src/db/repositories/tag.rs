use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};

use crate::db::timestamp::{format_timestamp, parse_timestamp};
use crate::domain::{AppError, AppResult, Tag, TagId, TagStore};
use crate::entities::{article_tags, prelude::*, tags};

pub struct TagRepository {
    conn: DatabaseConnection,
}

impl TagRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl TagStore for TagRepository {
    async fn create(&self, tag: Tag) -> AppResult<Tag> {
        let active = tags::ActiveModel {
            name: Set(tag.name.clone()),
            created_at: Set(format_timestamp(tag.created_at)),
            updated_at: Set(format_timestamp(tag.updated_at)),
            ..Default::default()
        };

        let id = Tags::insert(active)
            .exec(&self.conn)
            .await
            .map_err(|e| duplicate_name(e, &tag.name))?
            .last_insert_id;

        Ok(Tag {
            id: TagId::new(id),
            ..tag
        })
    }

    async fn find_by_id(&self, id: TagId) -> AppResult<Tag> {
        Tags::find_by_id(id.value())
            .one(&self.conn)
            .await?
            .ok_or_else(|| AppError::not_found("tag", id))
            .and_then(to_domain)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Tag> {
        Tags::find()
            .filter(tags::Column::Name.eq(name))
            .one(&self.conn)
            .await?
            .ok_or_else(|| AppError::not_found("tag", name))
            .and_then(to_domain)
    }

    async fn find_all(&self) -> AppResult<Vec<Tag>> {
        Tags::find()
            .order_by_asc(tags::Column::Name)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn update(&self, tag: Tag) -> AppResult<Tag> {
        let existing = Tags::find_by_id(tag.id.value())
            .one(&self.conn)
            .await?
            .ok_or_else(|| AppError::not_found("tag", tag.id))?;

        let mut active: tags::ActiveModel = existing.into();
        active.name = Set(tag.name.clone());
        active.updated_at = Set(format_timestamp(tag.updated_at));
        active
            .update(&self.conn)
            .await
            .map_err(|e| duplicate_name(e, &tag.name))?;

        Ok(tag)
    }

    async fn delete(&self, id: TagId) -> AppResult<()> {
        let txn = self.conn.begin().await?;

        ArticleTags::delete_many()
            .filter(article_tags::Column::TagId.eq(id.value()))
            .exec(&txn)
            .await?;

        let result = Tags::delete_by_id(id.value()).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("tag", id));
        }

        txn.commit().await?;
        Ok(())
    }
}

fn duplicate_name(err: DbErr, name: &str) -> AppError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        AppError::already_exists("tag", name)
    } else {
        AppError::from(err)
    }
}

fn to_domain(row: tags::Model) -> AppResult<Tag> {
    Ok(Tag {
        id: TagId::new(row.id),
        created_at: parse_timestamp("tags.created_at", &row.created_at)?,
        updated_at: parse_timestamp("tags.updated_at", &row.updated_at)?,
        name: row.name,
    })
}
