use serde_json::Value;
use std::sync::Arc;

use super::bedrock::KnowledgeBaseGenerator;
use super::error::GenerationError;
use crate::models::{CANDIDATE_MODEL_ARNS, DEFAULT_REGION};

/// Turns an ingredient list into recipe text using a knowledge base, falling
/// back through candidate models in order.
///
/// Unlike the vision and inference stages this never fails: when every
/// candidate errors the caller gets a message carrying the last error.
pub struct RecipeGenerator {
    backend: Arc<dyn KnowledgeBaseGenerator>,
    candidates: Vec<String>,
}

impl RecipeGenerator {
    pub fn new(backend: Arc<dyn KnowledgeBaseGenerator>) -> Self {
        Self::with_candidates(
            backend,
            CANDIDATE_MODEL_ARNS.iter().map(|arn| arn.to_string()).collect(),
        )
    }

    pub fn with_candidates(backend: Arc<dyn KnowledgeBaseGenerator>, candidates: Vec<String>) -> Self {
        Self { backend, candidates }
    }

    /// `region` defaults to us-east-1.
    pub async fn generate(
        &self,
        ingredients: &[String],
        knowledge_base_id: &str,
        region: Option<&str>,
    ) -> String {
        let region = region.unwrap_or(DEFAULT_REGION);
        let prompt = build_prompt(ingredients);
        let mut last_error: Option<GenerationError> = None;

        for model_arn in &self.candidates {
            log::info!("📚 Generating recipe with {}", model_arn);

            match self
                .backend
                .retrieve_and_generate(region, &prompt, knowledge_base_id, model_arn)
                .await
            {
                Ok(response) => return extract_output_text(&response),
                Err(e) => {
                    log::warn!("⚠️ Model {} failed: {}", model_arn, e);
                    last_error = Some(e);
                }
            }
        }

        let last_error = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no candidate models configured".to_string());
        log::error!("❌ Recipe generation failed across all models");

        format!(
            "Bedrock retrieve_and_generate failed across models. Last error: {}",
            last_error
        )
    }
}

pub fn build_prompt(ingredients: &[String]) -> String {
    format!(
        "
You are a helpful recipe assistant.

Using ONLY the provided context and any relevant knowledge from the knowledge base, generate:
- Title (one line)
- Instructions (numbered steps)

Do NOT include extra sections like ingredients, time, or descriptions. Output strictly:

Title: <title>
Instructions:
1. ...
2. ...

Context (ingredients): {}
",
        ingredients.join(", ")
    )
}

/// Reads generated text from `output.text`, then `responseText`, then
/// `generatedText`. Empty strings count as missing. Falls back to the whole
/// response rendered as JSON.
pub fn extract_output_text(response: &Value) -> String {
    let candidates = [
        response.pointer("/output/text"),
        response.get("responseText"),
        response.get("generatedText"),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|text| !text.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| response.to_string())
}
