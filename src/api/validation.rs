use super::ApiError;
use crate::domain::{ArticleId, TagId};

pub fn validate_article_id(id: i64) -> Result<ArticleId, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid article ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(ArticleId::new(id))
}

pub fn validate_tag_id(id: i64) -> Result<TagId, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid tag ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(TagId::new(id))
}

pub fn validate_tag_name(name: &str) -> Result<&str, ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::validation("Tag name cannot be empty"));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_positive() {
        assert_eq!(validate_article_id(5).unwrap(), ArticleId::new(5));
        assert!(validate_article_id(0).is_err());
        assert!(validate_tag_id(-1).is_err());
    }

    #[test]
    fn tag_name_must_not_be_blank() {
        assert!(validate_tag_name("rust").is_ok());
        assert!(validate_tag_name("  ").is_err());
    }
}
