#[cfg(feature = "web-server")]
use anyhow::Context;
use anyhow::Result;
use std::path::PathBuf;

const DEFAULT_CREDENTIALS_PATH: &str = "./service-account.json";
const DEFAULT_KNOWLEDGE_BASE_ID: &str = "WBEE2GZJPH";
const DEFAULT_UPLOAD_FOLDER: &str = "uploads";
#[cfg(feature = "web-server")]
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
#[cfg(feature = "web-server")]
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Settings read from the environment. AWS credentials are not part of it:
/// they come from the SDK's default provider chain.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub google_credentials: PathBuf,
    pub knowledge_base_id: String,
    pub upload_dir: PathBuf,
    #[cfg(feature = "web-server")]
    pub bind_addr: String,
    #[cfg(feature = "web-server")]
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        #[cfg(feature = "web-server")]
        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("MAX_UPLOAD_BYTES is not a byte count: {}", raw))?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            google_credentials: or_default("GOOGLE_APPLICATION_CREDENTIALS", DEFAULT_CREDENTIALS_PATH).into(),
            knowledge_base_id: or_default("BEDROCK_KB_ID", DEFAULT_KNOWLEDGE_BASE_ID),
            upload_dir: or_default("UPLOAD_FOLDER", DEFAULT_UPLOAD_FOLDER).into(),
            #[cfg(feature = "web-server")]
            bind_addr: or_default("BIND_ADDR", DEFAULT_BIND_ADDR),
            #[cfg(feature = "web-server")]
            max_upload_bytes,
        })
    }
}
