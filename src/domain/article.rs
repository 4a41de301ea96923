use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::{AppError, AppResult, ArticleId, now};
use crate::constants::limits;

/// Caller-supplied fields for creating or updating an article.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleInput {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub memo: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub url: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub memo: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Builds an unpersisted article after validating every field.
    pub fn new(input: ArticleInput) -> AppResult<Self> {
        let tags = validate(&input)?;
        let ts = now();
        Ok(Self {
            id: ArticleId::UNASSIGNED,
            title: input.title,
            url: input.url,
            summary: input.summary,
            tags,
            memo: input.memo,
            created_at: ts,
            updated_at: ts,
        })
    }

    /// Replaces the mutable fields. Nothing changes unless the whole input is valid.
    pub fn update(&mut self, input: ArticleInput) -> AppResult<()> {
        let tags = validate(&input)?;
        self.title = input.title;
        self.url = input.url;
        self.summary = input.summary;
        self.tags = tags;
        self.memo = input.memo;
        self.touch();
        Ok(())
    }

    /// Advances `updated_at`, keeping it strictly after the previous value.
    fn touch(&mut self) {
        let ts = now();
        self.updated_at = if ts > self.updated_at {
            ts
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

fn validate(input: &ArticleInput) -> AppResult<Vec<String>> {
    if input.title.is_empty() {
        return Err(AppError::validation("title", "title is required"));
    }
    if input.title.chars().count() > limits::TITLE_MAX {
        return Err(AppError::validation(
            "title",
            format!("title must be {} characters or less", limits::TITLE_MAX),
        ));
    }

    if input.url.is_empty() {
        return Err(AppError::validation("url", "url is required"));
    }
    if !is_http_url(&input.url) {
        return Err(AppError::validation(
            "url",
            "url must start with http:// or https://",
        ));
    }

    if input.summary.is_empty() {
        return Err(AppError::validation("summary", "summary is required"));
    }
    if input.summary.chars().count() > limits::SUMMARY_MAX {
        return Err(AppError::validation(
            "summary",
            format!("summary must be {} characters or less", limits::SUMMARY_MAX),
        ));
    }

    let mut tags: Vec<String> = Vec::with_capacity(input.tags.len());
    for tag in &input.tags {
        if tag.trim().is_empty() {
            return Err(AppError::validation("tags", "tag cannot be empty"));
        }
        if tag.chars().count() > limits::TAG_NAME_MAX {
            return Err(AppError::validation(
                "tags",
                format!("tag must be {} characters or less", limits::TAG_NAME_MAX),
            ));
        }
        // ordered set: first occurrence wins
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
    Ok(tags)
}

#[must_use]
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;

    fn input() -> ArticleInput {
        ArticleInput {
            title: "Go言語入門".to_string(),
            url: "https://example.com/go".to_string(),
            summary: "An introduction to Go".to_string(),
            tags: vec!["go".to_string(), "programming".to_string()],
            memo: "read later".to_string(),
        }
    }

    #[test]
    fn new_round_trips_fields() {
        let article = Article::new(input()).unwrap();
        assert_eq!(article.id, ArticleId::UNASSIGNED);
        assert_eq!(article.title, "Go言語入門");
        assert_eq!(article.url, "https://example.com/go");
        assert_eq!(article.summary, "An introduction to Go");
        assert_eq!(article.tags, vec!["go", "programming"]);
        assert_eq!(article.memo, "read later");
        assert_eq!(article.created_at, article.updated_at);
    }

    #[test]
    fn empty_memo_and_tags_are_allowed() {
        let article = Article::new(ArticleInput {
            tags: vec![],
            memo: String::new(),
            ..input()
        })
        .unwrap();
        assert!(article.tags.is_empty());
        assert!(article.memo.is_empty());
    }

    #[test]
    fn rejects_missing_title() {
        let err = Article::new(ArticleInput {
            title: String::new(),
            ..input()
        })
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "validation failed for title: title is required");
    }

    #[test]
    fn title_length_counts_characters() {
        let ok = "あ".repeat(255);
        assert!(
            Article::new(ArticleInput {
                title: ok,
                ..input()
            })
            .is_ok()
        );

        let too_long = "a".repeat(256);
        assert!(
            Article::new(ArticleInput {
                title: too_long,
                ..input()
            })
            .is_err()
        );
    }

    #[test]
    fn rejects_non_http_url() {
        for url in ["ftp://example.com", "example.com", ""] {
            let err = Article::new(ArticleInput {
                url: url.to_string(),
                ..input()
            })
            .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "url {url:?}");
        }
    }

    #[test]
    fn rejects_long_summary() {
        let err = Article::new(ArticleInput {
            summary: "x".repeat(1001),
            ..input()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "summary", .. }));
    }

    #[test]
    fn rejects_bad_tags() {
        let empty = Article::new(ArticleInput {
            tags: vec![String::new()],
            ..input()
        });
        assert!(empty.is_err());

        let blank = Article::new(ArticleInput {
            tags: vec!["go".into(), "   ".into()],
            ..input()
        })
        .unwrap_err();
        assert_eq!(blank.kind(), ErrorKind::Validation);

        let long = Article::new(ArticleInput {
            tags: vec!["t".repeat(51)],
            ..input()
        });
        assert!(long.is_err());
    }

    #[test]
    fn duplicate_tags_collapse_in_order() {
        let article = Article::new(ArticleInput {
            tags: vec!["b".into(), "a".into(), "b".into()],
            ..input()
        })
        .unwrap();
        assert_eq!(article.tags, vec!["b", "a"]);
    }

    #[test]
    fn update_refreshes_updated_at_only() {
        let mut article = Article::new(input()).unwrap();
        let created = article.created_at;
        let before = article.updated_at;
        let invoked = now();

        article
            .update(ArticleInput {
                title: "Updated".to_string(),
                ..input()
            })
            .unwrap();

        assert_eq!(article.title, "Updated");
        assert_eq!(article.created_at, created);
        assert_ne!(article.updated_at, before);
        assert!(article.updated_at >= invoked);
    }

    #[test]
    fn failed_update_leaves_article_untouched() {
        let mut article = Article::new(input()).unwrap();
        let snapshot = article.clone();

        let result = article.update(ArticleInput {
            title: "New title".to_string(),
            url: "not a url".to_string(),
            ..input()
        });

        assert!(result.is_err());
        assert_eq!(article, snapshot);
    }
}
