use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::models::RecipeResult;
use crate::services::{
    parse_ingredient_list, ConverseModel, IngredientNormalizer, InferenceServiceError,
    KnowledgeBaseGenerator, LabelDetector, RecipeGenerator, VisionServiceError,
};

/// Failures that abort an upload. Recipe generation is deliberately absent:
/// it degrades to an error string instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Vision(#[from] VisionServiceError),

    #[error(transparent)]
    Inference(#[from] InferenceServiceError),

    #[error("failed to store upload: {0}")]
    Storage(#[from] std::io::Error),
}

/// Vision -> normalize -> parse -> knowledge-base recipe, strictly in order,
/// each external call made once. Generation runs in the default region, where
/// the candidate model ARNs live.
pub struct RecipePipeline {
    detector: Arc<dyn LabelDetector>,
    normalizer: IngredientNormalizer,
    generator: RecipeGenerator,
    knowledge_base_id: String,
}

impl RecipePipeline {
    pub fn new(
        detector: Arc<dyn LabelDetector>,
        converse: Arc<dyn ConverseModel>,
        knowledge_base: Arc<dyn KnowledgeBaseGenerator>,
        knowledge_base_id: impl Into<String>,
    ) -> Self {
        Self {
            detector,
            normalizer: IngredientNormalizer::new(converse),
            generator: RecipeGenerator::new(knowledge_base),
            knowledge_base_id: knowledge_base_id.into(),
        }
    }

    pub async fn run(&self, image_path: &Path) -> Result<RecipeResult, PipelineError> {
        let labels = self.detector.detect_labels(image_path).await?;
        log::debug!("🏷️ Labels: {:?}", labels);

        let normalized = self.normalizer.normalize(&labels).await?;
        let ingredients = parse_ingredient_list(normalized.as_deref());
        log::info!("🥗 Parsed {} ingredients: {:?}", ingredients.len(), ingredients);

        let recipe_text = self
            .generator
            .generate(&ingredients, &self.knowledge_base_id, None)
            .await;

        Ok(RecipeResult {
            ingredients,
            recipe_text,
        })
    }
}
