pub mod pipeline;
pub mod upload;

#[cfg(test)]
pub(crate) mod fakes;

pub use pipeline::RecipePipeline;
pub use upload::{ImageUpload, UploadHandler, UploadOutcome};
#[cfg(feature = "web-server")]
pub use upload::ValidationError;
