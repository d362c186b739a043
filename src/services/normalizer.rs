use std::sync::Arc;

use super::bedrock::{ConverseModel, ConverseRequest, InferenceConfig, Message, TextBlock};
use super::error::InferenceServiceError;
use crate::models::{Label, NORMALIZER_MODEL_ID};

const TEMPERATURE: f32 = 0.5;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that normalizes data for a recipe website. \
You identify edible ingredients from image labels and remove non-edible items like objects, \
furniture, or non-food items.";

/// Asks a hosted model which of the detected labels are edible ingredients.
pub struct IngredientNormalizer {
    model: Arc<dyn ConverseModel>,
    model_id: String,
}

impl IngredientNormalizer {
    pub fn new(model: Arc<dyn ConverseModel>) -> Self {
        Self {
            model,
            model_id: NORMALIZER_MODEL_ID.to_string(),
        }
    }

    /// Returns the model's raw answer, expected (but not checked) to be a
    /// comma-separated list. `None` when the answer is not text.
    pub async fn normalize(&self, labels: &[Label]) -> Result<Option<String>, InferenceServiceError> {
        let request = self.build_request(labels);
        let response = self.model.converse(&request).await?;
        let text = response.first_text()?.map(str::to_string);

        log::info!("🥕 Normalized ingredients: {:?}", text);
        Ok(text)
    }

    fn build_request(&self, labels: &[Label]) -> ConverseRequest {
        let joined = labels
            .iter()
            .map(|label| label.description.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let prompt = format!(
            "The following is a list of items detected in an image: {}. \
             Please identify which items are edible ingredients that could be used in cooking/recipes. \
             Return ONLY the edible ingredients as a comma-separated list, removing any non-edible items \
             like objects, furniture, or non-food items.",
            joined
        );

        ConverseRequest {
            model_id: self.model_id.clone(),
            messages: vec![Message::user(prompt)],
            system: vec![TextBlock {
                text: SYSTEM_PROMPT.to_string(),
            }],
            inference_config: InferenceConfig {
                temperature: TEMPERATURE,
            },
        }
    }
}
