use serde::{Deserialize, Serialize};

/// A single tag returned by the vision service. Scores and bounding data are
/// dropped when the response is mapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub description: String,
}

impl Label {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// What one upload produces: the parsed ingredients and the recipe text
/// (or the generator's failure string).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeResult {
    pub ingredients: Vec<String>,
    pub recipe_text: String,
}

/// Region used when the caller does not name one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Model that filters vision labels down to edible ingredients.
pub const NORMALIZER_MODEL_ID: &str = "us.amazon.nova-pro-v1:0";

/// Backing models for knowledge-base generation, tried in this order.
pub const CANDIDATE_MODEL_ARNS: &[&str] = &[
    // Anthropic Claude 3.5 Sonnet v2
    "arn:aws:bedrock:us-east-1::foundation-model/anthropic.claude-3-5-sonnet-20241022-v2:0",
    // Anthropic Claude 3.5 Haiku
    "arn:aws:bedrock:us-east-1::foundation-model/anthropic.claude-3-5-haiku-20241022-v1:0",
    // Meta Llama 3.1 70B Instruct
    "arn:aws:bedrock:us-east-1::foundation-model/meta.llama3-1-70b-instruct-v1:0",
    // Amazon Nova Pro
    "arn:aws:bedrock:us-east-1::foundation-model/amazon.nova-pro-v1:0",
    // Mistral Large 24.02
    "arn:aws:bedrock:us-east-1::foundation-model/mistral.mistral-large-2402-v1:0",
];
