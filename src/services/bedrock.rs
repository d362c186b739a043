use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_credential_types::Credentials;
use aws_sigv4::http_request::{sign, SignableBody, SignableRequest, SigningSettings};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::SystemTime;

use super::error::{BedrockRequestError, GenerationError, InferenceServiceError};

const SIGNING_SERVICE: &str = "bedrock";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextBlock {
    pub text: String,
}

/// A message content block. Non-text blocks (tool use, images) deserialize
/// with `text: None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: vec![ContentBlock {
                text: Some(text.into()),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InferenceConfig {
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConverseRequest {
    #[serde(skip)]
    pub model_id: String,
    pub messages: Vec<Message>,
    pub system: Vec<TextBlock>,
    #[serde(rename = "inferenceConfig")]
    pub inference_config: InferenceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConverseOutput {
    pub message: Message,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConverseResponse {
    pub output: ConverseOutput,
}

impl ConverseResponse {
    /// Text of the first content block of the output message. `Ok(None)` when
    /// that block is not text; an empty content list is malformed.
    pub fn first_text(&self) -> Result<Option<&str>, InferenceServiceError> {
        self.output
            .message
            .content
            .first()
            .map(|block| block.text.as_deref())
            .ok_or_else(|| {
                InferenceServiceError::MalformedResponse("output message has no content".to_string())
            })
    }
}

#[derive(Debug, Clone, Serialize)]
struct RetrieveAndGenerateInput<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct KnowledgeBaseConfiguration<'a> {
    knowledge_base_id: &'a str,
    model_arn: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveAndGenerateConfiguration<'a> {
    #[serde(rename = "type")]
    config_type: &'static str,
    knowledge_base_configuration: KnowledgeBaseConfiguration<'a>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveAndGenerateRequest<'a> {
    input: RetrieveAndGenerateInput<'a>,
    retrieve_and_generate_configuration: RetrieveAndGenerateConfiguration<'a>,
}

/// Converse-style chat inference.
#[async_trait::async_trait]
pub trait ConverseModel: Send + Sync {
    async fn converse(&self, request: &ConverseRequest) -> Result<ConverseResponse, InferenceServiceError>;
}

/// Retrieval-augmented generation against a knowledge base. The response is
/// returned untyped because callers read it through several field fallbacks.
#[async_trait::async_trait]
pub trait KnowledgeBaseGenerator: Send + Sync {
    async fn retrieve_and_generate(
        &self,
        region: &str,
        prompt: &str,
        knowledge_base_id: &str,
        model_arn: &str,
    ) -> Result<Value, GenerationError>;
}

/// Bedrock runtime and agent-runtime client speaking the JSON REST protocol
/// with SigV4-signed requests.
pub struct BedrockClient {
    credentials: SharedCredentialsProvider,
    region: String,
    endpoint_override: Option<String>,
    client: reqwest::Client,
}

struct RawResponse {
    status: reqwest::StatusCode,
    body: String,
}

impl BedrockClient {
    pub fn new(credentials: SharedCredentialsProvider, region: impl Into<String>) -> Self {
        Self {
            credentials,
            region: region.into(),
            endpoint_override: None,
            client: reqwest::Client::new(),
        }
    }

    /// Sends both runtime and agent-runtime calls to one base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint_override = Some(endpoint.into());
        self
    }

    fn base_url(&self, api: &str, region: &str) -> String {
        match &self.endpoint_override {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://{}.{}.amazonaws.com", api, region),
        }
    }

    fn converse_url(&self, model_id: &str) -> String {
        // Model ids carry a ':' that must reach the service percent-encoded.
        format!(
            "{}/model/{}/converse",
            self.base_url("bedrock-runtime", &self.region),
            urlencoding::encode(model_id)
        )
    }

    async fn signed_post(
        &self,
        region: &str,
        url: &str,
        body: Vec<u8>,
    ) -> Result<RawResponse, BedrockRequestError> {
        let credentials = self
            .credentials
            .provide_credentials()
            .await
            .map_err(|e| BedrockRequestError::Credentials(e.to_string()))?;
        let signed = sign_post(credentials, region, url, &body, SystemTime::now())?;

        let mut builder = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .body(body);
        for (name, value) in signed {
            builder = builder.header(name, value);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        log::debug!("📥 Bedrock response status: {} ({} bytes)", status, body.len());

        Ok(RawResponse { status, body })
    }
}

/// SigV4 headers for a JSON POST to `url`: `x-amz-date`, `authorization` and,
/// for temporary credentials, `x-amz-security-token`.
fn sign_post(
    credentials: Credentials,
    region: &str,
    url: &str,
    body: &[u8],
    time: SystemTime,
) -> Result<Vec<(String, String)>, BedrockRequestError> {
    let identity: Identity = credentials.into();
    let params = v4::SigningParams::builder()
        .identity(&identity)
        .region(region)
        .name(SIGNING_SERVICE)
        .time(time)
        .settings(SigningSettings::default())
        .build()
        .map_err(|e| BedrockRequestError::Signing(e.to_string()))?
        .into();

    let request = SignableRequest::new(
        "POST",
        url,
        std::iter::once(("content-type", "application/json")),
        SignableBody::Bytes(body),
    )
    .map_err(|e| BedrockRequestError::Signing(e.to_string()))?;

    let (instructions, _signature) = sign(request, &params)
        .map_err(|e| BedrockRequestError::Signing(e.to_string()))?
        .into_parts();

    Ok(instructions
        .headers()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect())
}

#[async_trait::async_trait]
impl ConverseModel for BedrockClient {
    async fn converse(&self, request: &ConverseRequest) -> Result<ConverseResponse, InferenceServiceError> {
        let url = self.converse_url(&request.model_id);
        let body = serde_json::to_vec(request)
            .map_err(|e| InferenceServiceError::MalformedResponse(e.to_string()))?;

        log::info!("🤖 Sending converse request with model: {}", request.model_id);
        let raw = self.signed_post(&self.region, &url, body).await?;

        if !raw.status.is_success() {
            log::error!("❌ Converse API error ({}): {}", raw.status, raw.body);
            return Err(InferenceServiceError::Api {
                status: raw.status.as_u16(),
                body: raw.body,
            });
        }

        serde_json::from_str(&raw.body)
            .map_err(|e| InferenceServiceError::MalformedResponse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl KnowledgeBaseGenerator for BedrockClient {
    async fn retrieve_and_generate(
        &self,
        region: &str,
        prompt: &str,
        knowledge_base_id: &str,
        model_arn: &str,
    ) -> Result<Value, GenerationError> {
        let url = format!("{}/retrieveAndGenerate", self.base_url("bedrock-agent-runtime", region));
        let request = RetrieveAndGenerateRequest {
            input: RetrieveAndGenerateInput { text: prompt },
            retrieve_and_generate_configuration: RetrieveAndGenerateConfiguration {
                config_type: "KNOWLEDGE_BASE",
                knowledge_base_configuration: KnowledgeBaseConfiguration {
                    knowledge_base_id,
                    model_arn,
                },
            },
        };

        let raw = self
            .signed_post(region, &url, serde_json::to_vec(&request)?)
            .await?;

        if !raw.status.is_success() {
            return Err(GenerationError::Api {
                status: raw.status.as_u16(),
                body: raw.body,
            });
        }

        Ok(serde_json::from_str(&raw.body)?)
    }
}
