pub mod page;

// Axum front end: `GET /` and `POST /upload`
pub mod server {
    use axum::{
        extract::{
            multipart::{MultipartError, MultipartRejection},
            DefaultBodyLimit, Multipart, State,
        },
        http::StatusCode,
        response::{Html, IntoResponse, Redirect, Response},
        routing::{get, post},
        Router,
    };
    use axum_extra::extract::cookie::{Cookie, CookieJar};
    use std::sync::Arc;
    use tower_http::limit::RequestBodyLimitLayer;

    use super::page::render_index;
    use crate::handlers::{ImageUpload, UploadHandler, UploadOutcome, ValidationError};

    /// One-shot message shown by the next `GET /`.
    pub const FLASH_COOKIE: &str = "flash";

    pub struct AppState {
        pub upload_handler: Arc<UploadHandler>,
    }

    pub fn create_router(handler: Arc<UploadHandler>, max_upload_bytes: usize) -> Router {
        let state = Arc::new(AppState {
            upload_handler: handler,
        });

        Router::new()
            .route("/", get(index_handler))
            .route("/upload", post(upload_handler))
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(max_upload_bytes))
            .with_state(state)
    }

    async fn index_handler(jar: CookieJar) -> (CookieJar, Html<String>) {
        let flash = jar
            .get(FLASH_COOKIE)
            .and_then(|cookie| urlencoding::decode(cookie.value()).ok())
            .map(|message| message.into_owned());

        let jar = match flash {
            Some(_) => jar.remove(Cookie::build(FLASH_COOKIE).path("/")),
            None => jar,
        };

        (jar, Html(render_index(flash.as_deref(), None)))
    }

    async fn upload_handler(
        State(state): State<Arc<AppState>>,
        jar: CookieJar,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Response {
        let upload = match multipart {
            Ok(multipart) => match read_image_field(multipart).await {
                Ok(upload) => upload,
                Err(e) => {
                    log::error!("❌ Failed to read multipart body: {}", e);
                    return (e.status(), e.body_text()).into_response();
                }
            },
            Err(rejection) => {
                log::warn!("⚠️ Upload without multipart body: {}", rejection);
                return flash_redirect(jar, &ValidationError::MissingFilePart.to_string());
            }
        };

        match state.upload_handler.handle_upload(upload).await {
            Ok(UploadOutcome::Completed(result)) => Html(render_index(None, Some(&result))).into_response(),
            Ok(UploadOutcome::Rejected(rejection)) => flash_redirect(jar, &rejection.to_string()),
            Err(e) => {
                log::error!("❌ Upload pipeline failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }

    async fn read_image_field(mut multipart: Multipart) -> Result<Option<ImageUpload>, MultipartError> {
        while let Some(field) = multipart.next_field().await? {
            if field.name() != Some("image") {
                continue;
            }

            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await?.to_vec();
            log::info!("📤 Received upload '{}' ({} bytes)", filename, data.len());
            return Ok(Some(ImageUpload { filename, data }));
        }

        Ok(None)
    }

    fn flash_redirect(jar: CookieJar, message: &str) -> Response {
        let cookie = Cookie::build((FLASH_COOKIE, urlencoding::encode(message).into_owned()))
            .path("/")
            .http_only(true);

        (jar.add(cookie), Redirect::to("/")).into_response()
    }
}
