use thiserror::Error;

/// Failures of the label-detection call. These abort the pipeline.
#[derive(Debug, Error)]
pub enum VisionServiceError {
    #[error("failed to read image: {0}")]
    ReadImage(#[from] std::io::Error),

    #[error("failed to obtain vision access token: {0}")]
    Auth(String),

    #[error("vision request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("vision service error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("vision service could not annotate image: {0}")]
    Annotate(String),
}

/// A signed Bedrock call that never got an HTTP answer.
#[derive(Debug, Error)]
pub enum BedrockRequestError {
    #[error("no AWS credentials: {0}")]
    Credentials(String),

    #[error("failed to sign request: {0}")]
    Signing(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Failures of the converse inference call. These abort the pipeline.
#[derive(Debug, Error)]
pub enum InferenceServiceError {
    #[error("inference request failed: {0}")]
    Request(#[from] BedrockRequestError),

    #[error("inference service error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("malformed inference response: {0}")]
    MalformedResponse(String),
}

/// One candidate model's failed retrieve-and-generate attempt. Recorded by the
/// recipe generator, never returned to its caller.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("retrieve_and_generate request failed: {0}")]
    Request(#[from] BedrockRequestError),

    #[error("retrieve_and_generate error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("retrieve_and_generate payload error: {0}")]
    Payload(#[from] serde_json::Error),
}
