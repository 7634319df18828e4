//! Validates a generation reply and decodes it into a [`RecommendationBatch`].
//!
//! The model is asked for JSON but nothing enforces it, so every step either
//! produces a fully valid value or a specific error:
//!
//! 1. the reply must carry a non-empty content list (shape error otherwise),
//! 2. the first non-blank `text` block is used (shape error if there is none),
//! 3. its text must parse as JSON (decode error otherwise),
//! 4. the JSON must hold a non-empty `recommendations` array (shape error),
//! 5. every entry needs non-empty `title`, `author`, `reason` and `genre`.

use serde_json::Value;
use tracing::warn;

use crate::error::{RecommendError, Result, ShapeError};
use crate::generation::{ContentBlock, GenerationReply};
use crate::model::{MatchType, Recommendation, RecommendationBatch};

pub fn decode_reply(reply: &GenerationReply) -> Result<RecommendationBatch> {
    let blocks = match reply.content.as_deref() {
        Some(blocks) if !blocks.is_empty() => blocks,
        Some(_) => {
            return Err(ShapeError::MalformedReply("content list is empty".into()).into());
        }
        None => {
            return Err(ShapeError::MalformedReply("content list is missing".into()).into());
        }
    };

    let text = blocks
        .iter()
        .find_map(|block| match block {
            ContentBlock::Text { text } if !text.trim().is_empty() => Some(text.as_str()),
            _ => None,
        })
        .ok_or(ShapeError::NoTextContent)?;

    decode_recommendations(text)
}

/// Decode the model's text into a batch. Exposed separately for callers that
/// already extracted the text.
pub fn decode_recommendations(text: &str) -> Result<RecommendationBatch> {
    let parsed: Value =
        serde_json::from_str(strip_code_fence(text)).map_err(RecommendError::Decode)?;

    let entries = match parsed.get("recommendations") {
        Some(Value::Array(entries)) if !entries.is_empty() => entries,
        _ => return Err(ShapeError::InvalidRecommendationList.into()),
    };

    let recommendations = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| recommendation_from(index, entry))
        .collect::<std::result::Result<Vec<_>, ShapeError>>()?;

    RecommendationBatch::new(recommendations)
        .ok_or_else(|| ShapeError::InvalidRecommendationList.into())
}

fn recommendation_from(index: usize, entry: &Value) -> std::result::Result<Recommendation, ShapeError> {
    let invalid = |reason: String| ShapeError::InvalidRecommendation { index, reason };

    let object = entry
        .as_object()
        .ok_or_else(|| invalid("entry is not an object".into()))?;

    let required = |name: &str| match object.get(name).and_then(Value::as_str).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        Some(_) => Err(invalid(format!("`{name}` is empty"))),
        None => Err(invalid(format!("`{name}` is missing or not a string"))),
    };
    let title = required("title")?;
    let author = required("author")?;
    let reason = required("reason")?;
    let genre = required("genre")?;

    let match_type = object
        .get("matchType")
        .and_then(Value::as_str)
        .and_then(|raw| {
            let parsed = MatchType::parse_lenient(raw);
            if parsed.is_none() {
                warn!(index, match_type = raw, "Ignoring unrecognised matchType");
            }
            parsed
        });

    let rarity_note = match match_type {
        Some(MatchType::UltraRare) => object
            .get("rarityNote")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|note| !note.is_empty())
            .map(str::to_string),
        _ => None,
    };

    Ok(Recommendation {
        title,
        author,
        reason,
        genre,
        match_type,
        rarity_note,
        purchase_links: None,
    })
}

/// Models sometimes wrap the JSON in a Markdown fence despite being told not to.
/// Any info string (`json`, `JSON`, ...) after the opening fence is dropped.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
