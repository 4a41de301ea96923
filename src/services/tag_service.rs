use std::sync::Arc;

use tracing::info;

use crate::domain::{AppError, AppResult, Tag, TagId, TagStore};

pub struct TagService {
    store: Arc<dyn TagStore>,
}

impl TagService {
    #[must_use]
    pub fn new(store: Arc<dyn TagStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, name: &str) -> AppResult<Tag> {
        let tag = Tag::new(name)?;
        let created = self.store.create(tag).await?;
        info!(tag_id = %created.id, name = %created.name, "Created tag");
        Ok(created)
    }

    pub async fn get(&self, id: TagId) -> AppResult<Tag> {
        ensure_assigned(id)?;
        self.store.find_by_id(id).await
    }

    pub async fn get_by_name(&self, name: &str) -> AppResult<Tag> {
        if name.trim().is_empty() {
            return Err(AppError::invalid_argument("name", "tag name is required"));
        }
        self.store.find_by_name(name).await
    }

    pub async fn list(&self) -> AppResult<Vec<Tag>> {
        self.store.find_all().await
    }

    pub async fn rename(&self, id: TagId, name: &str) -> AppResult<Tag> {
        ensure_assigned(id)?;
        let mut tag = self.store.find_by_id(id).await?;
        tag.rename(name)?;
        self.store.update(tag).await
    }

    pub async fn delete(&self, id: TagId) -> AppResult<()> {
        ensure_assigned(id)?;
        self.store.delete(id).await?;
        info!(tag_id = %id, "Deleted tag");
        Ok(())
    }

    /// Returns the tag called `name`, creating it when missing.
    pub async fn find_or_create(&self, name: &str) -> AppResult<Tag> {
        match self.store.find_by_name(name).await {
            Ok(tag) => Ok(tag),
            Err(AppError::NotFound { .. }) => match self.create(name).await {
                // lost a race with a concurrent create
                Err(AppError::AlreadyExists { .. }) => self.store.find_by_name(name).await,
                other => other,
            },
            Err(e) => Err(e),
        }
    }
}

fn ensure_assigned(id: TagId) -> AppResult<()> {
    if id.is_assigned() {
        Ok(())
    } else {
        Err(AppError::invalid_argument("id", "tag id must be positive"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::domain::ErrorKind;

    fn service() -> TagService {
        TagService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn list_is_alphabetical() {
        let service = service();
        for name in ["rust", "go", "python"] {
            service.create(name).await.unwrap();
        }
        let names: Vec<String> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, ["go", "python", "rust"]);
    }

    #[tokio::test]
    async fn duplicate_names_conflict() {
        let service = service();
        service.create("rust").await.unwrap();
        let err = service.create("rust").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn blank_name_lookup_is_invalid() {
        let err = service().get_by_name(" ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn find_or_create_is_idempotent() {
        let service = service();
        let first = service.find_or_create("async").await.unwrap();
        let second = service.find_or_create("async").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rename_validates() {
        let service = service();
        let tag = service.create("old").await.unwrap();
        let err = service.rename(tag.id, "").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let renamed = service.rename(tag.id, "new").await.unwrap();
        assert_eq!(renamed.name, "new");
        assert_eq!(service.get_by_name("new").await.unwrap().id, tag.id);
    }
}
