use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{ArticleGenerator, BookRecommender, GeneratedArticle, RecommendedBook, retry_linear};
use crate::config::GeminiConfig;
use crate::domain::{AiError, AiErrorKind, Article, RecommendationError, RecommendationErrorKind};
use crate::parser::parse_ai_json;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool {
    url_context: UrlContext,
}

#[derive(Debug, Serialize)]
struct UrlContext {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    total_token_count: u64,
}

#[derive(Debug, Deserialize)]
struct BookList {
    #[serde(default)]
    books: Vec<BookSuggestion>,
}

#[derive(Debug, Deserialize)]
struct BookSuggestion {
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: Option<String>,
}

/// Google Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("shelfmark/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            urlencoding::encode(&self.config.api_key)
        )
    }

    /// Sends `prompt` and returns the first candidate's text, retrying transient failures.
    async fn generate(&self, prompt: &str, url_context: bool) -> Result<String, AiError> {
        if self.config.api_key.is_empty() {
            return Err(AiError::new(
                AiErrorKind::Unauthorized,
                "Gemini API key is not configured",
            ));
        }

        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            tools: if url_context {
                vec![Tool {
                    url_context: UrlContext {},
                }]
            } else {
                Vec::new()
            },
            generation_config: GenerationConfig {
                temperature: 0.3,
                max_output_tokens: 4096,
            },
        };

        retry_linear(
            self.config.max_retries,
            Duration::from_millis(self.config.retry_wait_ms),
            AiError::is_retryable,
            || self.send(&request),
        )
        .await
    }

    async fn send(&self, request: &GenerateRequest<'_>) -> Result<String, AiError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            AiError::new(
                AiErrorKind::InvalidResponse,
                format!("failed to decode Gemini response: {e}"),
            )
        })?;

        if let Some(usage) = &body.usage_metadata {
            tracing::debug!(tokens = usage.total_token_count, "Gemini request completed");
        }

        first_text(body)
    }
}

#[async_trait]
impl ArticleGenerator for GeminiClient {
    async fn generate_from_url(&self, url: &str) -> Result<GeneratedArticle, AiError> {
        let text = self.generate(&article_prompt(url), true).await?;
        parse_article(&text)
    }
}

#[async_trait]
impl BookRecommender for GeminiClient {
    async fn recommend(
        &self,
        articles: &[Article],
    ) -> Result<Vec<RecommendedBook>, RecommendationError> {
        if articles.is_empty() {
            return Err(RecommendationError::new(
                RecommendationErrorKind::NoArticles,
                "no articles to base recommendations on",
            ));
        }

        let text = self.generate(&recommendation_prompt(articles), false).await?;
        Ok(parse_books(&text)?)
    }
}

fn transport_error(err: reqwest::Error) -> AiError {
    if err.is_timeout() {
        AiError::new(AiErrorKind::Timeout, format!("Gemini request timed out: {err}"))
    } else {
        AiError::new(
            AiErrorKind::NetworkError,
            format!("Gemini request failed: {err}"),
        )
    }
}

fn classify_status(status: StatusCode, body: &str) -> AiError {
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AiErrorKind::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => AiErrorKind::ApiLimit,
        StatusCode::BAD_REQUEST if body.contains("SAFETY") => AiErrorKind::ContentBlocked,
        StatusCode::BAD_REQUEST => AiErrorKind::InvalidUrl,
        _ => AiErrorKind::NetworkError,
    };
    AiError::new(kind, format!("Gemini API returned {status}: {body}"))
}

fn first_text(response: GenerateResponse) -> Result<String, AiError> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AiError::new(AiErrorKind::InvalidResponse, "Gemini returned no content"))
}

fn parse_article(text: &str) -> Result<GeneratedArticle, AiError> {
    let article: GeneratedArticle = parse_ai_json(text)?;
    if article.title.trim().is_empty() || article.summary.trim().is_empty() {
        return Err(AiError::new(
            AiErrorKind::InvalidResponse,
            "AI response is missing title or summary",
        ));
    }
    Ok(article)
}

fn parse_books(text: &str) -> Result<Vec<RecommendedBook>, AiError> {
    let list: BookList = parse_ai_json(text)?;
    if list.books.iter().any(|b| b.title.trim().is_empty()) {
        return Err(AiError::new(
            AiErrorKind::InvalidResponse,
            "AI recommended a book without a title",
        ));
    }
    Ok(list
        .books
        .into_iter()
        .map(|b| RecommendedBook {
            title: b.title.trim().to_string(),
            author: b
                .author
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
        })
        .collect())
}

fn article_prompt(url: &str) -> String {
    format!(
        "Read the web page at the URL below and describe it for a personal bookmark library.\n\n\
         URL: {url}\n\n\
         Rules:\n\
         - Reply with a single JSON object and nothing else: no prose, no markdown fences.\n\
         - \"summary\" captures the core of the article in at most 200 characters.\n\
         - \"suggestedTags\" holds 3 to 5 specific, searchable tags; include the technologies used \
         when the article is technical.\n\
         - Write in the article's language.\n\n\
         Format:\n\
         {{\"title\": \"...\", \"summary\": \"...\", \"suggestedTags\": [\"...\"]}}"
    )
}

fn recommendation_prompt(articles: &[Article]) -> String {
    let mut listing = String::from("Saved articles:\n\n");
    for (i, article) in articles.iter().enumerate() {
        let _ = writeln!(listing, "{}. Title: {}", i + 1, article.title);
        let _ = writeln!(listing, "   Summary: {}", article.summary);
        if !article.tags.is_empty() {
            let _ = writeln!(listing, "   Tags: {}", article.tags.join(", "));
        }
        if !article.memo.is_empty() {
            let _ = writeln!(listing, "   Memo: {}", article.memo);
        }
        listing.push('\n');
    }

    format!(
        "{listing}\
         Based on the interests these articles reveal, recommend exactly 5 books.\n\n\
         Rules:\n\
         - Only real, published books. Give the exact title and the author's full name.\n\
         - Prefer practical technical, business and specialist books.\n\
         - Reply with a single JSON object and nothing else: no prose, no markdown fences.\n\n\
         Format:\n\
         {{\"books\": [{{\"title\": \"...\", \"author\": \"...\"}}]}}"
    )
}
