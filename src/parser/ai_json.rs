//! Pulls a JSON object out of free-form model output.
//!
//! Fallback order: strip a fenced code block, then cut from the first `{` to
//! the last `}`, then parse strictly. Anything that still fails to parse is an
//! `InvalidResponse`.

use serde::de::DeserializeOwned;

use crate::domain::{AiError, AiErrorKind};

#[must_use]
pub fn extract_json(text: &str) -> &str {
    let mut body = text.trim();

    if body.starts_with("```") {
        // drop the opening fence line, e.g. ```json
        body = body.split_once('\n').map_or("", |(_, rest)| rest);
        if let Some(end) = body.rfind("```") {
            body = &body[..end];
        }
        body = body.trim();
    }

    if let (Some(start), Some(end)) = (body.find('{'), body.rfind('}'))
        && start < end
    {
        body = &body[start..=end];
    }

    body.trim()
}

pub fn parse_ai_json<T: DeserializeOwned>(text: &str) -> Result<T, AiError> {
    let json = extract_json(text);
    serde_json::from_str(json).map_err(|e| {
        AiError::new(
            AiErrorKind::InvalidResponse,
            format!("failed to parse AI response as JSON: {e}"),
        )
    })
}
