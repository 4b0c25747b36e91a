use crate::error::OcrError;

/// Output classes in score order: A-Z then 0-9
pub const CHARSET: [char; 36] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Number of scores every classifier must return
pub const CLASS_COUNT: usize = CHARSET.len();

/// Trait that every glyph classifier implements
///
/// Implementations are shared read-only across concurrent recognitions, so
/// `classify` must not mutate shared state.
pub trait Classifier: Send + Sync {
    /// Returns the classifier identifier (e.g., "ffnn")
    fn name(&self) -> &'static str;

    /// Length of feature vector this classifier expects
    fn input_len(&self) -> usize;

    /// One score per class of [`CHARSET`], in the same order
    fn classify(&self, features: &[f32]) -> Result<Vec<f32>, OcrError>;
}
