//! In-memory collaborators that record how the pipeline calls them.

use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::models::Label;
use crate::services::bedrock::{ContentBlock, ConverseOutput, ConverseRequest, ConverseResponse, Message};
use crate::services::error::GenerationError;
use crate::services::{
    ConverseModel, InferenceServiceError, KnowledgeBaseGenerator, LabelDetector, VisionServiceError,
};

pub struct FakeDetector {
    labels: Option<Vec<Label>>,
    calls: AtomicUsize,
}

impl FakeDetector {
    pub fn with_labels(labels: Vec<Label>) -> Arc<Self> {
        Arc::new(Self {
            labels: Some(labels),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            labels: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LabelDetector for FakeDetector {
    async fn detect_labels(&self, _image_path: &Path) -> Result<Vec<Label>, VisionServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.labels.clone().ok_or_else(|| VisionServiceError::Api {
            status: 403,
            body: "PERMISSION_DENIED".to_string(),
        })
    }
}

enum Reply {
    Text(String),
    NonText,
    Fail,
}

pub struct FakeModel {
    reply: Reply,
    prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(Reply::Text(text.to_string()))
    }

    pub fn non_text() -> Arc<Self> {
        Self::new(Reply::NonText)
    }

    pub fn failing() -> Arc<Self> {
        Self::new(Reply::Fail)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ConverseModel for FakeModel {
    async fn converse(&self, request: &ConverseRequest) -> Result<ConverseResponse, InferenceServiceError> {
        let prompt = request
            .messages
            .first()
            .and_then(|m| m.content.first())
            .and_then(|c| c.text.clone())
            .unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt);

        let text = match &self.reply {
            Reply::Text(text) => Some(text.clone()),
            Reply::NonText => None,
            Reply::Fail => {
                return Err(InferenceServiceError::Api {
                    status: 400,
                    body: "ValidationException".to_string(),
                })
            }
        };

        Ok(ConverseResponse {
            output: ConverseOutput {
                message: Message {
                    role: "assistant".to_string(),
                    content: vec![ContentBlock { text }],
                },
            },
        })
    }
}

#[derive(Debug, Clone)]
pub struct KnowledgeBaseCall {
    pub region: String,
    pub prompt: String,
    pub knowledge_base_id: String,
    pub model_arn: String,
}

pub struct FakeKnowledgeBase {
    response: Option<Value>,
    calls: Mutex<Vec<KnowledgeBaseCall>>,
}

impl FakeKnowledgeBase {
    pub fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Some(json!({ "output": { "text": text } })),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            response: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<KnowledgeBaseCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl KnowledgeBaseGenerator for FakeKnowledgeBase {
    async fn retrieve_and_generate(
        &self,
        region: &str,
        prompt: &str,
        knowledge_base_id: &str,
        model_arn: &str,
    ) -> Result<Value, GenerationError> {
        self.calls.lock().unwrap().push(KnowledgeBaseCall {
            region: region.to_string(),
            prompt: prompt.to_string(),
            knowledge_base_id: knowledge_base_id.to_string(),
            model_arn: model_arn.to_string(),
        });

        self.response.clone().ok_or_else(|| GenerationError::Api {
            status: 503,
            body: "ServiceUnavailable".to_string(),
        })
    }
}
