use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::{AppError, AppResult, TagId, now};
use crate::constants::limits;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> AppResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        let ts = now();
        Ok(Self {
            id: TagId::UNASSIGNED,
            name,
            created_at: ts,
            updated_at: ts,
        })
    }

    pub fn rename(&mut self, name: impl Into<String>) -> AppResult<()> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        let ts = now();
        self.updated_at = if ts > self.updated_at {
            ts
        } else {
            self.updated_at + Duration::microseconds(1)
        };
        Ok(())
    }
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("name", "tag name is required"));
    }
    if name.chars().count() > limits::TAG_NAME_MAX {
        return Err(AppError::validation(
            "name",
            format!("tag name must be {} characters or less", limits::TAG_NAME_MAX),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_valid_tag() {
        let tag = Tag::new("rust").unwrap();
        assert_eq!(tag.name, "rust");
        assert_eq!(tag.id, TagId::UNASSIGNED);
        assert_eq!(tag.created_at, tag.updated_at);
    }

    #[test]
    fn rejects_blank_names() {
        assert!(Tag::new("").is_err());
        assert!(Tag::new("   ").is_err());
        assert!(Tag::new("\t\n").is_err());
    }

    #[test]
    fn enforces_length_in_characters() {
        assert!(Tag::new("語".repeat(50)).is_ok());
        assert!(Tag::new("語".repeat(51)).is_err());
    }

    #[test]
    fn rename_validates_and_touches() {
        let mut tag = Tag::new("old").unwrap();
        let before = tag.updated_at;

        assert!(tag.rename(" ").is_err());
        assert_eq!(tag.name, "old");
        assert_eq!(tag.updated_at, before);

        tag.rename("new").unwrap();
        assert_eq!(tag.name, "new");
        assert!(tag.updated_at > before);
    }
}
