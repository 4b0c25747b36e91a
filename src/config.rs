use crate::features::FeatureGrid;
use crate::preprocessing::Preset;
use crate::segmentation::{GlyphFilter, MergeRadius};
use clap::Parser;
use std::path::PathBuf;

/// Minimum best-class score for a glyph to contribute to the text
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.1;

#[derive(Parser, Debug)]
#[command(name = "glyph-ocr-server")]
#[command(about = "Glyph segmentation and character recognition server")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "OCR_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "OCR_PORT", default_value = "9292")]
    pub port: u16,

    /// Maximum file size in bytes (default: 50MB)
    #[arg(long, env = "OCR_MAX_FILE_SIZE", default_value = "52428800")]
    pub max_file_size: usize,

    /// Path to the pretrained network weights (JSON)
    #[arg(long = "model", env = "OCR_MODEL_PATH")]
    pub model_path: PathBuf,

    /// Default preprocessing preset (none, minimal, default, aggressive)
    #[arg(long, env = "OCR_PRESET", default_value = "default")]
    pub preset: Preset,

    /// Minimum score for a character to appear in the recognized text
    #[arg(long, env = "OCR_CONFIDENCE_THRESHOLD", default_value_t = DEFAULT_CONFIDENCE_THRESHOLD)]
    pub confidence_threshold: f32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

/// Tunables of one recognition pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecognitionConfig {
    pub confidence_threshold: f32,
    pub filter: GlyphFilter,
    pub merge_radius: MergeRadius,
    pub grid: FeatureGrid,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            filter: GlyphFilter::default(),
            merge_radius: MergeRadius::default(),
            grid: FeatureGrid::default(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_file_size: usize,
    pub model_path: PathBuf,
    pub preset: Preset,
    pub recognition: RecognitionConfig,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            max_file_size: args.max_file_size,
            model_path: args.model_path,
            preset: args.preset,
            recognition: RecognitionConfig {
                confidence_threshold: args.confidence_threshold,
                ..RecognitionConfig::default()
            },
        }
    }
}
