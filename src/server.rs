use crate::classifier::CHARSET;
use crate::config::Config;
use crate::error::OcrError;
use crate::preprocessing::{Pipeline, Preset};
use crate::recognition::{GlyphResult, Recognizer};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub recognizer: Recognizer,
    pub config: Arc<Config>,
}

/// OCR response
#[derive(Serialize)]
pub struct OcrResponse {
    pub text: String,
    pub glyphs: Vec<GlyphResult>,
    pub unrecognized: usize,
    pub preset: String,
    pub processing_time_ms: u64,
    pub warnings: Vec<String>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub classifier: String,
    pub charset: String,
    pub feature_length: usize,
    pub confidence_threshold: f32,
    pub presets: Vec<String>,
    pub default_preset: String,
    pub max_file_size_bytes: usize,
}

/// Build the router around an already-loaded recognizer
pub fn router(recognizer: Recognizer, config: Config) -> Router {
    let max_file_size = config.max_file_size;
    let state = AppState {
        recognizer,
        config: Arc::new(config),
    };

    Router::new()
        .route("/ocr", post(handle_ocr))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let classifier = crate::classifiers::load(&config)?;
    let recognizer = Recognizer::new(classifier)
        .with_preprocessor(Arc::new(Pipeline::new(config.preset)))
        .with_config(config.recognition);
    let addr = format!("{}:{}", config.host, config.port);

    let app = router(recognizer, config);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Handle OCR requests
async fn handle_ocr(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OcrResponse>, OcrError> {
    let start = Instant::now();

    let mut file_data: Option<Bytes> = None;
    let mut preset: Option<Preset> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| OcrError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                file_data = Some(field.bytes().await.map_err(|e| {
                    OcrError::InvalidRequest(format!("Failed to read file data: {}", e))
                })?);
            }
            "preset" => {
                let value = field.text().await.map_err(|e| {
                    OcrError::InvalidRequest(format!("Invalid preset field: {}", e))
                })?;
                preset = Some(value.parse()?);
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    let data = file_data.ok_or(OcrError::MissingFile)?;

    if data.len() > state.config.max_file_size {
        return Err(OcrError::ImageTooLarge {
            size: data.len(),
            max: state.config.max_file_size,
        });
    }

    let image = image::load_from_memory(&data)
        .map_err(|e| OcrError::UnsupportedFormat(format!("Failed to decode image: {}", e)))?;

    let recognizer = match preset {
        Some(preset) => state
            .recognizer
            .clone()
            .with_preprocessor(Arc::new(Pipeline::new(preset))),
        None => state.recognizer.clone(),
    };
    let preset_name = recognizer.preprocessor().name().to_string();

    let result = recognizer.recognize(image).await?;

    let mut warnings = Vec::new();
    if result.unrecognized > 0 {
        warnings.push(format!(
            "{} glyph(s) could not be classified",
            result.unrecognized
        ));
    }
    if result.glyphs.is_empty() {
        warnings.push("No glyphs found in image".to_string());
    }

    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        "OCR completed in {}ms, preset: {}, glyphs: {}, text length: {}",
        processing_time_ms,
        preset_name,
        result.glyphs.len(),
        result.text.len()
    );

    Ok(Json(OcrResponse {
        text: result.text,
        glyphs: result.glyphs,
        unrecognized: result.unrecognized,
        preset: preset_name,
        processing_time_ms,
        warnings,
    }))
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    let recognition = state.recognizer.config();
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        classifier: state.recognizer.classifier().name().to_string(),
        charset: CHARSET.iter().collect(),
        feature_length: recognition.grid.feature_len(),
        confidence_threshold: recognition.confidence_threshold,
        presets: Preset::ALL.iter().map(|p| p.as_str().to_string()).collect(),
        default_preset: state.config.preset.as_str().to_string(),
        max_file_size_bytes: state.config.max_file_size,
    })
}
