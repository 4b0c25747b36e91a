//! Glyph segmentation and character recognition
//!
//! A binary raster is split into connected ink components, filtered to
//! glyph-shaped regions, merged with close neighbours, resampled into fixed
//! feature vectors and scored by a pretrained classifier over `A-Z0-9`.

pub mod classifier;
pub mod classifiers;
pub mod config;
pub mod error;
pub mod features;
pub mod preprocessing;
pub mod raster;
pub mod recognition;
pub mod segmentation;
pub mod server;

pub use classifier::{Classifier, CHARSET};
pub use config::{Config, RecognitionConfig};
pub use error::OcrError;
pub use raster::{BoundingBox, CroppedRegion, Raster};
pub use recognition::{Candidate, GlyphResult, Recognition, Recognizer};
