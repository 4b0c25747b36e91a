//! Classifier implementations
//!
//! This module contains implementations of the Classifier trait and the
//! startup hook that loads the one configured for the server.

pub mod network;

pub use network::{Activation, FeedForwardClassifier, Layer, NetworkWeights};

use crate::classifier::Classifier;
use crate::config::Config;
use crate::error::OcrError;
use std::sync::Arc;

/// Load the configured classifier once, for sharing across requests
pub fn load(config: &Config) -> Result<Arc<dyn Classifier>, OcrError> {
    tracing::info!("Loading classifier from {:?}...", config.model_path);
    let classifier = FeedForwardClassifier::from_file(&config.model_path)?;

    let expected = config.recognition.grid.feature_len();
    if classifier.input_len() != expected {
        return Err(OcrError::InitializationError(format!(
            "network takes {} inputs but the feature grid produces {}",
            classifier.input_len(),
            expected
        )));
    }

    Ok(Arc::new(classifier))
}
