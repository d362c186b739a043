use std::path::PathBuf;
use thiserror::Error;

use super::pipeline::{PipelineError, RecipePipeline};
use crate::models::RecipeResult;

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Problems with the upload itself. The message is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No file part")]
    MissingFilePart,

    #[error("No selected file")]
    NoSelectedFile,

    #[error("File type not allowed. Please upload a PNG/JPG/JPEG.")]
    DisallowedType,
}

/// The `image` part of the form as received.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub data: Vec<u8>,
}

#[derive(Debug)]
pub enum UploadOutcome {
    Rejected(ValidationError),
    Completed(RecipeResult),
}

pub struct UploadHandler {
    pipeline: RecipePipeline,
    upload_dir: PathBuf,
}

impl UploadHandler {
    pub fn new(pipeline: RecipePipeline, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            pipeline,
            upload_dir: upload_dir.into(),
        }
    }

    pub async fn handle_upload(&self, upload: Option<ImageUpload>) -> Result<UploadOutcome, PipelineError> {
        let (upload, filename) = match validate(upload) {
            Ok(accepted) => accepted,
            Err(rejection) => {
                log::warn!("🚫 Upload rejected: {}", rejection);
                return Ok(UploadOutcome::Rejected(rejection));
            }
        };

        tokio::fs::create_dir_all(&self.upload_dir).await?;
        let saved_path = self.upload_dir.join(&filename);
        // Same sanitized name from two users overwrites; accepted.
        tokio::fs::write(&saved_path, &upload.data).await?;
        log::info!("💾 Saved {} bytes to {}", upload.data.len(), saved_path.display());

        let result = self.pipeline.run(&saved_path).await?;
        Ok(UploadOutcome::Completed(result))
    }
}

fn validate(upload: Option<ImageUpload>) -> Result<(ImageUpload, String), ValidationError> {
    let upload = upload.ok_or(ValidationError::MissingFilePart)?;
    if upload.filename.is_empty() {
        return Err(ValidationError::NoSelectedFile);
    }
    if !allowed_file(&upload.filename) {
        return Err(ValidationError::DisallowedType);
    }

    // The extension survives sanitization, so the name is never empty here.
    let filename = secure_filename(&upload.filename);
    Ok((upload, filename))
}

pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reduces a client-supplied name to something safe to join onto the upload
/// directory: ASCII only, no separators, `[A-Za-z0-9_.-]`, no leading or
/// trailing dots/underscores.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename.chars().filter(char::is_ascii).collect();
    let spaced = ascii.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fakes::{FakeDetector, FakeKnowledgeBase, FakeModel};
    use crate::models::Label;
    use std::sync::Arc;

    struct Harness {
        handler: UploadHandler,
        detector: Arc<FakeDetector>,
        model: Arc<FakeModel>,
        kb: Arc<FakeKnowledgeBase>,
        dir: tempfile::TempDir,
    }

    fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let detector = FakeDetector::with_labels(vec![Label::new("Tomato"), Label::new("Chair")]);
        let model = FakeModel::replying("Tomato");
        let kb = FakeKnowledgeBase::answering("Title: Tomato Toast\nInstructions:\n1. Toast.");
        let pipeline = RecipePipeline::new(detector.clone(), model.clone(), kb.clone(), "KB");
        let handler = UploadHandler::new(pipeline, dir.path().join("uploads"));

        Harness {
            handler,
            detector,
            model,
            kb,
            dir,
        }
    }

    fn upload(name: &str) -> Option<ImageUpload> {
        Some(ImageUpload {
            filename: name.to_string(),
            data: b"\xff\xd8\xff fake jpeg".to_vec(),
        })
    }

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("photo.png"));
        assert!(allowed_file("photo.JPG"));
        assert!(allowed_file("archive.tar.jpeg"));
        assert!(!allowed_file("photo.gif"));
        assert!(!allowed_file("png"));
        assert!(!allowed_file("photo."));
        assert!(!allowed_file("photo.png.exe"));
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("My cool photo.jpg"), "My_cool_photo.jpg");
        assert_eq!(secure_filename("../../etc/passwd.png"), "etc_passwd.png");
        assert_eq!(secure_filename("C:\\Users\\me\\pic.jpeg"), "C_Users_me_pic.jpeg");
        assert_eq!(secure_filename("tomates-rôties.png"), "tomates-rties.png");
        assert_eq!(secure_filename("..."), "");
    }

    #[test]
    fn test_accepted_names_never_sanitize_to_empty() {
        let hostile = [
            "\u{1F345}.png",
            "../..//.jpg",
            "__.._.JPEG",
            " .\\. .png",
            "\u{00E9}\u{00E8}.Jpg",
        ];

        for name in hostile {
            assert!(allowed_file(name), "{}", name);
            assert!(!secure_filename(name).is_empty(), "{}", name);
        }
    }

    #[tokio::test]
    async fn test_gif_rejected_before_any_external_call() {
        let h = harness();

        let outcome = h.handler.handle_upload(upload("photo.gif")).await.unwrap();

        assert!(matches!(outcome, UploadOutcome::Rejected(ValidationError::DisallowedType)));
        assert_eq!(h.detector.calls(), 0);
        assert!(h.model.prompts().is_empty());
        assert!(h.kb.calls().is_empty());
        assert!(!h.dir.path().join("uploads").exists());
    }

    #[tokio::test]
    async fn test_missing_and_empty_file_rejected() {
        let h = harness();

        let missing = h.handler.handle_upload(None).await.unwrap();
        let empty = h.handler.handle_upload(upload("")).await.unwrap();

        assert!(matches!(missing, UploadOutcome::Rejected(ValidationError::MissingFilePart)));
        assert!(matches!(empty, UploadOutcome::Rejected(ValidationError::NoSelectedFile)));
        assert_eq!(h.detector.calls(), 0);
    }

    #[tokio::test]
    async fn test_non_ascii_name_keeps_extension_letters() {
        let h = harness();

        let outcome = h.handler.handle_upload(upload("\u{1F345}.png")).await.unwrap();

        assert!(matches!(outcome, UploadOutcome::Completed(_)));
        assert!(h.dir.path().join("uploads").join("png").exists());
    }

    #[tokio::test]
    async fn test_accepted_upload_is_saved_and_processed() {
        let h = harness();

        let outcome = h.handler.handle_upload(upload("My Lunch.JPG")).await.unwrap();

        let UploadOutcome::Completed(result) = outcome else {
            panic!("expected completed upload");
        };
        assert_eq!(result.ingredients, vec!["Tomato"]);
        assert!(result.recipe_text.starts_with("Title: Tomato Toast"));

        let saved = h.dir.path().join("uploads").join("My_Lunch.JPG");
        assert_eq!(std::fs::read(saved).unwrap(), b"\xff\xd8\xff fake jpeg");
        assert_eq!(h.detector.calls(), 1);
        assert_eq!(h.kb.calls().len(), 1);
    }
}
