pub mod bedrock; // Bedrock converse + knowledge-base generation
pub mod error;
pub mod google_auth;
pub mod ingredients;
pub mod normalizer;
pub mod recipe;
pub mod vision; // Google Cloud Vision label detection

pub use bedrock::{BedrockClient, ConverseModel, KnowledgeBaseGenerator};
pub use error::{InferenceServiceError, VisionServiceError};
pub use google_auth::ServiceAccountKey;
pub use ingredients::parse_ingredient_list;
pub use normalizer::IngredientNormalizer;
pub use recipe::RecipeGenerator;
pub use vision::{GoogleVisionClient, LabelDetector};
