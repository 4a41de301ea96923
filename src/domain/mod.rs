//! Domain types for the article shelf with strong typing.
//!
//! Entities validate themselves on construction and update, so every value
//! that leaves this module already satisfies its invariants.

pub mod article;
pub mod book;
pub mod error;
pub mod repository;
pub mod tag;

pub use article::{Article, ArticleInput};
pub use book::{Book, BookRecommendationCache, PurchaseLinks};
pub use error::{
    AiError, AiErrorKind, AppError, AppResult, ErrorKind, RecommendationError,
    RecommendationErrorKind,
};
pub use repository::{ArticleStore, RecommendationCacheStore, TagStore};
pub use tag::Tag;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current instant truncated to the precision the stores persist.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Identity of a record that has not been persisted yet.
            pub const UNASSIGNED: Self = Self(0);

            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn value(&self) -> i64 {
                self.0
            }

            #[must_use]
            pub const fn is_assigned(&self) -> bool {
                self.0 > 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self::new(id)
            }
        }
    };
}

define_id!(
    /// Unique identifier for an Article.
    ///
    /// ```rust
    /// use shelfmark::domain::ArticleId;
    ///
    /// let id = ArticleId::new(42);
    /// assert_eq!(id.value(), 42);
    /// assert_eq!(id.to_string(), "42");
    /// ```
    ArticleId
);

define_id!(
    /// Unique identifier for a Tag.
    TagId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_id_conversions() {
        let id = ArticleId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i64::from(id), 42);
        assert_eq!(ArticleId::from(42), id);
        assert!(id.is_assigned());
        assert!(!ArticleId::UNASSIGNED.is_assigned());
    }

    #[test]
    fn tag_id_serialization() {
        let id = TagId::new(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");
        let back: TagId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn now_has_microsecond_precision() {
        let ts = now();
        assert_eq!(ts.timestamp_subsec_nanos() % 1_000, 0);
    }
}
