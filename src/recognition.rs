//! Recognition pipeline
//!
//! Segments a binary raster into glyphs, runs each glyph's feature vector
//! through the injected [`Classifier`], and turns the raw scores into the
//! recognized text plus one ranked [`GlyphResult`] per glyph.

use crate::classifier::{Classifier, CHARSET, CLASS_COUNT};
use crate::config::RecognitionConfig;
use crate::error::OcrError;
use crate::features::extract_features;
use crate::preprocessing::{Pipeline, Preprocessor};
use crate::raster::{BoundingBox, CroppedRegion, Raster};
use crate::segmentation;
use image::DynamicImage;
use serde::Serialize;
use std::sync::Arc;

/// One plausible reading of a glyph
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    pub character: char,
    pub confidence: f32,
}

/// Ranked candidates for one glyph and where it was found
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlyphResult {
    candidates: Vec<Candidate>,
    bounding_box: BoundingBox,
}

impl GlyphResult {
    /// Candidates are ordered by confidence, highest first; ties keep their order
    pub fn new(mut candidates: Vec<Candidate>, bounding_box: BoundingBox) -> Self {
        candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Self {
            candidates,
            bounding_box,
        }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// Highest-confidence candidate
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }
}

/// Scores of one glyph reduced to a decision
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Argmax class, if it reached the confidence threshold
    pub best: Option<Candidate>,
    /// Every class scoring at or above the mean score, in class order
    pub candidates: Vec<Candidate>,
}

/// Reduce one glyph's class scores to its best character and candidate list
pub fn aggregate_scores(scores: &[f32], threshold: f32) -> Result<Classification, OcrError> {
    if scores.len() != CLASS_COUNT {
        return Err(OcrError::ClassifierError(format!(
            "expected {} scores, got {}",
            CLASS_COUNT,
            scores.len()
        )));
    }
    if let Some(index) = scores.iter().position(|s| !s.is_finite()) {
        return Err(OcrError::ClassifierError(format!(
            "non-finite score for class {}",
            CHARSET[index]
        )));
    }

    // First maximum in class order wins ties
    let mut argmax = 0;
    for (index, &score) in scores.iter().enumerate() {
        if score > scores[argmax] {
            argmax = index;
        }
    }

    let best = (scores[argmax] >= threshold).then(|| Candidate {
        character: CHARSET[argmax],
        confidence: scores[argmax],
    });

    let mean = scores.iter().sum::<f32>() / CLASS_COUNT as f32;
    let candidates = CHARSET
        .iter()
        .zip(scores)
        .filter(|&(_, &score)| score >= mean)
        .map(|(&character, &confidence)| Candidate {
            character,
            confidence,
        })
        .collect();

    Ok(Classification { best, candidates })
}

/// Output of one recognition call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Recognition {
    /// Best characters that cleared the confidence threshold, left to right
    pub text: String,
    /// One record per classified glyph, sorted by x origin
    pub glyphs: Vec<GlyphResult>,
    /// Glyphs dropped because the classifier failed on them
    pub unrecognized: usize,
}

/// Segments and classifies glyphs with an injected classifier
#[derive(Clone)]
pub struct Recognizer {
    classifier: Arc<dyn Classifier>,
    preprocessor: Arc<dyn Preprocessor>,
    config: RecognitionConfig,
}

impl Recognizer {
    /// Recognizer using the default preprocessing pipeline and settings
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier,
            preprocessor: Arc::new(Pipeline::default()),
            config: RecognitionConfig::default(),
        }
    }

    pub fn with_preprocessor(mut self, preprocessor: Arc<dyn Preprocessor>) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    pub fn with_config(mut self, config: RecognitionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn preprocessor(&self) -> &dyn Preprocessor {
        self.preprocessor.as_ref()
    }

    pub fn config(&self) -> &RecognitionConfig {
        &self.config
    }

    /// Crop every glyph out of a binary raster, left to right
    pub fn extract_glyphs(&self, raster: &Raster) -> Result<Vec<CroppedRegion>, OcrError> {
        segmentation::extract_glyphs(raster, &self.config.filter, self.config.merge_radius)
    }

    /// Recognize an already-binarized raster
    pub fn recognize_raster(&self, raster: &Raster) -> Result<Recognition, OcrError> {
        if raster.is_empty() {
            tracing::debug!("Empty raster, nothing to recognize");
            return Ok(Recognition::default());
        }

        let glyphs = self.extract_glyphs(raster)?;
        let mut recognition = Recognition::default();

        for (index, glyph) in glyphs.iter().enumerate() {
            match self.classify_glyph(glyph) {
                Ok(classification) => {
                    if let Some(best) = classification.best {
                        recognition.text.push(best.character);
                    }
                    recognition.glyphs.push(GlyphResult::new(
                        classification.candidates,
                        glyph.bounding_box,
                    ));
                }
                Err(e) => {
                    tracing::warn!(
                        "Skipping glyph {} at {:?}: {}",
                        index,
                        glyph.bounding_box,
                        e
                    );
                    recognition.unrecognized += 1;
                }
            }
        }

        tracing::debug!(
            "Recognized {:?} from {} glyphs ({} unrecognized)",
            recognition.text,
            glyphs.len(),
            recognition.unrecognized
        );

        Ok(recognition)
    }

    /// Binarize with the configured preprocessor, then recognize
    pub fn recognize_image(&self, image: DynamicImage) -> Result<Recognition, OcrError> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(Recognition::default());
        }

        let binary = self.preprocessor.preprocess(image)?;
        self.recognize_raster(&Raster::from_image(&binary))
    }

    /// Run [`Recognizer::recognize_image`] on the blocking pool
    pub async fn recognize(&self, image: DynamicImage) -> Result<Recognition, OcrError> {
        let recognizer = self.clone();
        tokio::task::spawn_blocking(move || recognizer.recognize_image(image))
            .await
            .map_err(|e| OcrError::Internal(format!("Recognition task failed: {}", e)))?
    }

    fn classify_glyph(&self, glyph: &CroppedRegion) -> Result<Classification, OcrError> {
        let features = extract_features(&glyph.raster, self.config.grid)?;
        tracing::trace!(
            "Glyph at {:?}: aspect {:.3}, mean sample {:.3}",
            glyph.bounding_box,
            features.aspect_ratio(),
            features.samples().iter().sum::<f32>() / features.samples().len().max(1) as f32
        );
        let scores = self.classifier.classify(features.as_slice())?;
        aggregate_scores(&scores, self.config.confidence_threshold)
    }
}
