use crate::error::OcrError;
use image::{DynamicImage, GrayImage};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use super::steps;
use super::Preprocessor;

/// Preprocessing preset names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Pass the image through untouched; it must already be binary
    None,
    /// Clean scans: grayscale, Otsu threshold
    Minimal,
    /// Balanced: grayscale, normalize, denoise, Sauvola threshold
    #[default]
    Default,
    /// Noisy input: grayscale, normalize, denoise, sharpen, Sauvola threshold, despeckle
    Aggressive,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::None,
        Preset::Minimal,
        Preset::Default,
        Preset::Aggressive,
    ];

    /// Get the preset name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Minimal => "minimal",
            Self::Default => "default",
            Self::Aggressive => "aggressive",
        }
    }
}

impl FromStr for Preset {
    type Err = OcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| OcrError::InvalidRequest(format!("Unknown preset: {}", s)))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing information for a single preprocessing step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: &'static str,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessingResult {
    #[serde(skip)]
    pub image: DynamicImage,
    pub total_time_ms: u64,
    pub preset: &'static str,
    pub steps: Vec<StepTiming>,
}

/// Binarization pipeline that applies steps based on preset
#[derive(Debug, Clone, Copy, Default)]
pub struct Pipeline {
    preset: Preset,
}

impl Pipeline {
    pub fn new(preset: Preset) -> Self {
        Self { preset }
    }

    /// Run the preset's steps, recording how long each took
    pub fn process(&self, image: DynamicImage) -> Result<PreprocessingResult, OcrError> {
        let start = Instant::now();
        let mut timings = Vec::new();

        if self.preset == Preset::None {
            return Ok(PreprocessingResult {
                image,
                total_time_ms: 0,
                preset: self.preset.as_str(),
                steps: timings,
            });
        }

        let step_start = Instant::now();
        let gray = steps::grayscale::apply(image)?;
        timings.push(StepTiming {
            name: "grayscale",
            time_ms: step_start.elapsed().as_millis() as u64,
        });

        let binary = match self.preset {
            Preset::Minimal => run_step("otsu", gray, &mut timings, steps::threshold::otsu)?,
            Preset::Default => {
                let gray = run_step("normalize", gray, &mut timings, steps::normalize::apply)?;
                let gray = run_step("denoise", gray, &mut timings, steps::denoise::apply)?;
                run_step("sauvola", gray, &mut timings, steps::threshold::sauvola)?
            }
            Preset::Aggressive => {
                let gray = run_step("normalize", gray, &mut timings, steps::normalize::apply)?;
                let gray = run_step("denoise", gray, &mut timings, steps::denoise::apply)?;
                let gray = run_step("sharpen", gray, &mut timings, steps::sharpen::apply)?;
                let binary = run_step("sauvola", gray, &mut timings, steps::threshold::sauvola)?;
                run_step("despeckle", binary, &mut timings, steps::despeckle::apply)?
            }
            Preset::None => gray,
        };

        Ok(PreprocessingResult {
            image: DynamicImage::ImageLuma8(binary),
            total_time_ms: start.elapsed().as_millis() as u64,
            preset: self.preset.as_str(),
            steps: timings,
        })
    }
}

impl Preprocessor for Pipeline {
    fn name(&self) -> &str {
        self.preset.as_str()
    }

    fn preprocess(&self, image: DynamicImage) -> Result<DynamicImage, OcrError> {
        let result = self.process(image)?;
        tracing::debug!(
            "Preprocessed with preset {} in {}ms ({} steps)",
            result.preset,
            result.total_time_ms,
            result.steps.len()
        );
        Ok(result.image)
    }
}

fn run_step<F>(
    name: &'static str,
    image: GrayImage,
    timings: &mut Vec<StepTiming>,
    step_fn: F,
) -> Result<GrayImage, OcrError>
where
    F: FnOnce(GrayImage) -> Result<GrayImage, OcrError>,
{
    let step_start = Instant::now();
    let result = step_fn(image)?;
    timings.push(StepTiming {
        name,
        time_ms: step_start.elapsed().as_millis() as u64,
    });
    Ok(result)
}
