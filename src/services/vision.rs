use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::VisionServiceError;
use super::google_auth::{ServiceAccountKey, ServiceAccountTokenSource};
use crate::models::Label;

const VISION_ENDPOINT: &str = "https://vision.googleapis.com";
const VISION_SCOPE: &str = "https://www.googleapis.com/auth/cloud-vision";

/// Anything that can turn an image on disk into labels.
#[async_trait::async_trait]
pub trait LabelDetector: Send + Sync {
    async fn detect_labels(&self, image_path: &Path) -> Result<Vec<Label>, VisionServiceError>;
}

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
struct AnnotateImageResponse {
    #[serde(default, rename = "labelAnnotations")]
    label_annotations: Vec<LabelAnnotation>,
    error: Option<RpcStatus>,
}

#[derive(Debug, Deserialize)]
struct LabelAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct RpcStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

/// Google Cloud Vision label detection over REST, authenticated with a
/// service-account key.
pub struct GoogleVisionClient {
    tokens: ServiceAccountTokenSource,
    endpoint: String,
    client: reqwest::Client,
}

impl GoogleVisionClient {
    pub fn new(key: ServiceAccountKey) -> Self {
        Self {
            tokens: ServiceAccountTokenSource::new(key, VISION_SCOPE),
            endpoint: VISION_ENDPOINT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn annotate(&self, image_path: &Path) -> Result<Vec<Label>, VisionServiceError> {
        let image_data = tokio::fs::read(image_path).await?;
        log::debug!("📊 Image file size: {} bytes", image_data.len());

        let request = AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: general_purpose::STANDARD.encode(&image_data),
                },
                features: vec![Feature {
                    feature_type: "LABEL_DETECTION",
                }],
            }],
        };

        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .post(format!("{}/v1/images:annotate", self.endpoint))
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(VisionServiceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let annotated: AnnotateResponse = response.json().await?;
        let Some(first) = annotated.responses.into_iter().next() else {
            return Ok(Vec::new());
        };

        if let Some(error) = first.error {
            return Err(VisionServiceError::Annotate(format!(
                "{} (code {})",
                error.message, error.code
            )));
        }

        Ok(first
            .label_annotations
            .into_iter()
            .map(|annotation| Label::new(annotation.description))
            .collect())
    }
}

#[async_trait::async_trait]
impl LabelDetector for GoogleVisionClient {
    async fn detect_labels(&self, image_path: &Path) -> Result<Vec<Label>, VisionServiceError> {
        log::info!("📸 Detecting labels for: {}", image_path.display());

        match self.annotate(image_path).await {
            Ok(labels) => {
                log::info!("🏷️ Vision returned {} labels", labels.len());
                Ok(labels)
            }
            Err(e) => {
                log::error!("❌ Label detection failed: {}", e);
                Err(e)
            }
        }
    }
}
