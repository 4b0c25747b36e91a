use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to initialize classifier: {0}")]
    InitializationError(String),

    #[error("Invalid raster: {0}")]
    InvalidRaster(String),

    #[error("Label {0} was never registered")]
    UnknownLabel(u32),

    #[error("Label space exhausted after {0} labels")]
    LabelSpaceExhausted(u32),

    #[error("Classifier failed: {0}")]
    ClassifierError(String),

    #[error("Preprocessing failed: {0}")]
    PreprocessingError(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Missing file in request")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OcrError {
    /// Stable machine-readable code reported to HTTP clients
    pub fn code(&self) -> &'static str {
        match self {
            OcrError::InitializationError(_) => "INIT_ERROR",
            OcrError::InvalidRaster(_) => "INVALID_RASTER",
            OcrError::UnknownLabel(_) | OcrError::LabelSpaceExhausted(_) => "SEGMENTATION_ERROR",
            OcrError::ClassifierError(_) => "CLASSIFIER_ERROR",
            OcrError::PreprocessingError(_) => "PREPROCESSING_ERROR",
            OcrError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            OcrError::ImageTooLarge { .. } => "IMAGE_TOO_LARGE",
            OcrError::MissingFile => "MISSING_FILE",
            OcrError::InvalidRequest(_) => "INVALID_REQUEST",
            OcrError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            OcrError::InvalidRaster(_)
            | OcrError::UnsupportedFormat(_)
            | OcrError::MissingFile
            | OcrError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            OcrError::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for OcrError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_bad_request() {
        assert_eq!(OcrError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            OcrError::UnsupportedFormat("image/x-foo".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            OcrError::ImageTooLarge { size: 10, max: 5 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_segmentation_errors_share_code() {
        assert_eq!(OcrError::UnknownLabel(7).code(), "SEGMENTATION_ERROR");
        assert_eq!(OcrError::LabelSpaceExhausted(9).code(), "SEGMENTATION_ERROR");
        assert_eq!(
            OcrError::ClassifierError("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
