//! # Intent Translation
//!
//! Turns a free-text search intent into the structured base query. The engine
//! consults the translator once per top-level search; a translation failure
//! aborts the search before any partition work starts.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::constants::fields;
use crate::error::TranslationError;
use crate::partition::SearchQuery;

/// Natural-language-to-query translator
#[async_trait]
pub trait Translator: Send + Sync {
    /// Produce a structured query for `intent`, with paging hints
    async fn translate(
        &self,
        intent: &str,
        page: u32,
        page_size: u32,
    ) -> Result<SearchQuery, TranslationError>;
}

/// Translator for intents that already carry a structured query.
///
/// Extracts the outermost JSON object embedded in the intent text (surrounding
/// prose or code fences are ignored) and fills in `page`/`per_page` when the
/// object does not set them. Paging in the translated query only describes the
/// base query: the engine always sends the request's own page and page size
/// on every partition call.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonIntentTranslator;

#[async_trait]
impl Translator for JsonIntentTranslator {
    async fn translate(
        &self,
        intent: &str,
        page: u32,
        page_size: u32,
    ) -> Result<SearchQuery, TranslationError> {
        let mut query = extract_structured_query(intent)?;

        if query.get(fields::PAGE).is_none() {
            query.insert(fields::PAGE, Value::from(page));
        }
        if query.get(fields::PER_PAGE).is_none() {
            query.insert(fields::PER_PAGE, Value::from(page_size));
        }

        debug!(fields = query.fields().len(), "Translated structured intent");
        Ok(query)
    }
}

/// Parse the outermost `{ ... }` span of `text` as a query object
pub fn extract_structured_query(text: &str) -> Result<SearchQuery, TranslationError> {
    let start = text
        .find('{')
        .ok_or_else(|| TranslationError::new("No structured query found in intent"))?;
    let end = text
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| TranslationError::new("Unterminated structured query in intent"))?;

    let value: Value = serde_json::from_str(&text[start..=end])
        .map_err(|e| TranslationError::new(format!("Structured query is not valid JSON: {e}")))?;

    SearchQuery::from_value(value)
        .ok_or_else(|| TranslationError::new("Structured query must be a JSON object"))
}
