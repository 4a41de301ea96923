//! Multi-keyword article search.
//!
//! A phrase is split on whitespace into lowercase tokens. An article matches
//! when every token occurs as a substring of its lowercased title or summary;
//! different tokens may land in different fields. Results are newest first.

use crate::domain::Article;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery {
    tokens: Vec<String>,
}

impl SearchQuery {
    #[must_use]
    pub fn parse(keyword: &str) -> Self {
        Self {
            tokens: keyword.split_whitespace().map(str::to_lowercase).collect(),
        }
    }

    /// Blank phrases select every article.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Tokens safe to push into a SQL `LIKE` prefilter.
    ///
    /// SQLite folds case for ASCII only, so non-ASCII tokens are left to
    /// [`SearchQuery::matches`].
    pub fn ascii_tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens
            .iter()
            .filter(|t| t.is_ascii())
            .map(String::as_str)
    }

    #[must_use]
    pub fn matches(&self, title: &str, summary: &str) -> bool {
        if self.tokens.is_empty() {
            return true;
        }
        let title = title.to_lowercase();
        let summary = summary.to_lowercase();
        self.tokens
            .iter()
            .all(|token| title.contains(token.as_str()) || summary.contains(token.as_str()))
    }

    /// Filters `articles` down to matches, newest first.
    #[must_use]
    pub fn apply(&self, articles: Vec<Article>) -> Vec<Article> {
        let mut hits: Vec<Article> = articles
            .into_iter()
            .filter(|a| self.matches(&a.title, &a.summary))
            .collect();
        sort_newest_first(&mut hits);
        hits
    }
}

/// Newest `created_at` first; the higher id wins a tie.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// `%pattern%` for `LIKE ... ESCAPE '\'`, with wildcards taken literally.
#[must_use]
pub fn like_pattern(token: &str) -> String {
    let mut out = String::with_capacity(token.len() + 2);
    out.push('%');
    for c in token.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}
