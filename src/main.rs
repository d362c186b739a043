mod config;
mod handlers;
mod models;
mod services;
#[cfg(feature = "web-server")]
mod web; // upload page + axum server

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use dotenv::dotenv;
use std::sync::Arc;

use config::AppConfig;
use handlers::{RecipePipeline, UploadHandler};
use models::DEFAULT_REGION;
use services::{BedrockClient, GoogleVisionClient, ServiceAccountKey};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init();

    log::info!("🚀 Starting Snap Recipe...");

    let config = AppConfig::from_env()?;
    log::info!("📚 Knowledge base: {} ({})", config.knowledge_base_id, DEFAULT_REGION);

    let key = ServiceAccountKey::from_file(&config.google_credentials)?;
    let vision = Arc::new(GoogleVisionClient::new(key));
    log::info!("✅ Vision client initialized");

    // AWS default provider chain
    let aws = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(DEFAULT_REGION))
        .load()
        .await;
    let credentials = aws
        .credentials_provider()
        .context("no AWS credentials provider available")?;
    let bedrock = Arc::new(BedrockClient::new(credentials, DEFAULT_REGION));
    log::info!("✅ Bedrock client initialized");

    let pipeline = RecipePipeline::new(vision, bedrock.clone(), bedrock, config.knowledge_base_id.clone());

    std::fs::create_dir_all(&config.upload_dir)?;
    let upload_handler = Arc::new(UploadHandler::new(pipeline, config.upload_dir.clone()));
    log::info!("📁 Uploads go to {}", config.upload_dir.display());

    #[cfg(feature = "web-server")]
    {
        use web::server::create_router;

        let app = create_router(upload_handler, config.max_upload_bytes);
        let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

        log::info!("🌐 Listening on http://{}", config.bind_addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                log::info!("🛑 Shutting down...");
            })
            .await?;
    }

    #[cfg(not(feature = "web-server"))]
    {
        use handlers::{ImageUpload, UploadOutcome};

        let path = std::env::args()
            .nth(1)
            .context("usage: snap-recipe <image.png|jpg|jpeg>")?;
        let filename = std::path::Path::new(&path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let data = std::fs::read(&path).with_context(|| format!("cannot read {}", path))?;

        match upload_handler.handle_upload(Some(ImageUpload { filename, data })).await? {
            UploadOutcome::Completed(result) => {
                println!("Ingredients: {}", result.ingredients.join(", "));
                println!("\n{}", result.recipe_text);
            }
            UploadOutcome::Rejected(rejection) => anyhow::bail!("{}", rejection),
        }
    }

    Ok(())
}
