use super::card::{FallbackLocation, Layout, DEFAULT_LOCATION};
use super::gemini::{GenerateContentRequest, GenerateContentResponse, GenerativeModel};
use super::prompt::{build_prompt, layout_function, LAYOUT_FUNCTION_NAME};
use crate::error::{ModelError, PlannerError, Result};
use log::{debug, info};
use serde_json::Value;
use std::sync::Arc;

/// Turns a free-text query into a set of weather cards via a forced function call.
pub struct LayoutGenerator {
    model: Arc<dyn GenerativeModel>,
    fallback: FallbackLocation,
}

impl LayoutGenerator {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            fallback: DEFAULT_LOCATION,
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackLocation) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn request_for(&self, query: &str) -> GenerateContentRequest {
        GenerateContentRequest::user_prompt(build_prompt(query, &self.fallback))
            .force_function(layout_function())
    }

    pub async fn generate(&self, query: &str) -> Result<Layout> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PlannerError::EmptyQuery);
        }
        info!("Processing query: {}", query);

        let response = self.model.generate_content(&self.request_for(query)).await?;
        let args = extract_function_args(response, LAYOUT_FUNCTION_NAME)?;

        let mut layout: Layout =
            serde_json::from_value(args).map_err(|e| ModelError::Schema(e.to_string()))?;
        layout.apply_fallback_location(&self.fallback);

        info!("Generated layout with {} cards", layout.cards.len());
        Ok(layout)
    }
}

/// Arguments of the first function call in the first candidate.
///
/// Either the model called `expected` or the call fails; text answers are
/// reported, never parsed.
pub fn extract_function_args(
    response: GenerateContentResponse,
    expected: &str,
) -> std::result::Result<Value, ModelError> {
    let content = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .ok_or(ModelError::NoCandidates)?;

    let mut texts = Vec::new();
    for part in content.parts {
        if let Some(call) = part.function_call {
            debug!("Function call found: {}", call.name);
            if call.name != expected {
                return Err(ModelError::UnexpectedFunction(call.name));
            }
            return Ok(call.args);
        }
        if let Some(text) = part.text {
            texts.push(text);
        }
    }

    if texts.is_empty() {
        Err(ModelError::NoCandidates)
    } else {
        Err(ModelError::TextOnly(texts.join("\n")))
    }
}
