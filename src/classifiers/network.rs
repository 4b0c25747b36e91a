use crate::classifier::{Classifier, CLASS_COUNT};
use crate::error::OcrError;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Per-layer activation function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Sigmoid,
    Relu,
    Linear,
}

impl Activation {
    fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Relu => x.max(0.0),
            Activation::Linear => x,
        }
    }
}

/// Serialized fully-connected layer: `weights[output][input]` plus one bias per output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub weights: Vec<Vec<f32>>,
    pub biases: Vec<f32>,
    #[serde(default)]
    pub activation: Activation,
}

impl Layer {
    /// Layer of zero weights and biases
    pub fn zeros(inputs: usize, outputs: usize, activation: Activation) -> Self {
        Self {
            weights: vec![vec![0.0; inputs]; outputs],
            biases: vec![0.0; outputs],
            activation,
        }
    }
}

/// Layer ready for inference, weights shaped (outputs, inputs)
#[derive(Debug, Clone)]
struct Dense {
    weights: Array2<f32>,
    biases: Array1<f32>,
    activation: Activation,
}

impl Dense {
    fn zeros(inputs: usize, outputs: usize, activation: Activation) -> Self {
        Self {
            weights: Array2::zeros((outputs, inputs)),
            biases: Array1::zeros(outputs),
            activation,
        }
    }

    fn from_layer(index: usize, layer: &Layer, inputs: usize) -> Result<Self, OcrError> {
        let outputs = layer.weights.len();

        if let Some(row) = layer.weights.iter().find(|row| row.len() != inputs) {
            return Err(OcrError::InitializationError(format!(
                "layer {} expects {} inputs, found a row of {}",
                index,
                inputs,
                row.len()
            )));
        }

        let flat: Vec<f32> = layer.weights.iter().flatten().copied().collect();
        let weights = Array2::from_shape_vec((outputs, inputs), flat).map_err(|e| {
            OcrError::InitializationError(format!("layer {} weights: {}", index, e))
        })?;
        let biases = Array1::from(layer.biases.clone());

        if biases.len() != outputs {
            return Err(OcrError::InitializationError(format!(
                "layer {} has {} outputs but {} biases",
                index,
                outputs,
                biases.len()
            )));
        }

        Ok(Self {
            weights,
            biases,
            activation: layer.activation,
        })
    }

    fn outputs(&self) -> usize {
        self.weights.dim().0
    }

    fn forward(&self, input: &Array1<f32>) -> Array1<f32> {
        let activation = self.activation;
        (self.weights.dot(input) + &self.biases).mapv(|v| activation.apply(v))
    }

    fn to_layer(&self) -> Layer {
        Layer {
            weights: self.weights.outer_iter().map(|row| row.to_vec()).collect(),
            biases: self.biases.to_vec(),
            activation: self.activation,
        }
    }
}

/// On-disk weights format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkWeights {
    pub inputs: usize,
    pub layers: Vec<Layer>,
}

/// Pretrained feed-forward network mapping feature vectors to class scores
///
/// Weights are loaded once from JSON and only read afterwards.
#[derive(Debug, Clone)]
pub struct FeedForwardClassifier {
    inputs: usize,
    layers: Vec<Dense>,
}

impl FeedForwardClassifier {
    /// Validate layer shapes and build the classifier
    pub fn new(weights: NetworkWeights) -> Result<Self, OcrError> {
        let NetworkWeights { inputs, layers } = weights;

        if layers.is_empty() {
            return Err(OcrError::InitializationError(
                "network has no layers".to_string(),
            ));
        }

        let mut width = inputs;
        let mut dense = Vec::with_capacity(layers.len());
        for (i, layer) in layers.iter().enumerate() {
            let layer = Dense::from_layer(i, layer, width)?;
            width = layer.outputs();
            dense.push(layer);
        }

        if width != CLASS_COUNT {
            return Err(OcrError::InitializationError(format!(
                "network produces {} scores, expected {}",
                width, CLASS_COUNT
            )));
        }

        Ok(Self {
            inputs,
            layers: dense,
        })
    }

    /// Network with zero weights; every class scores `activation(0)`
    pub fn zeros(inputs: usize, hidden: usize) -> Self {
        Self {
            inputs,
            layers: vec![
                Dense::zeros(inputs, hidden, Activation::Sigmoid),
                Dense::zeros(hidden, CLASS_COUNT, Activation::Sigmoid),
            ],
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, OcrError> {
        let weights: NetworkWeights = serde_json::from_reader(reader).map_err(|e| {
            OcrError::InitializationError(format!("Failed to parse network weights: {}", e))
        })?;
        Self::new(weights)
    }

    /// Load weights from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, OcrError> {
        let file = File::open(path).map_err(|e| {
            OcrError::InitializationError(format!(
                "Failed to open network weights {:?}: {}",
                path, e
            ))
        })?;
        let classifier = Self::from_reader(BufReader::new(file))?;

        tracing::info!(
            "Loaded network from {:?}: {} inputs, {} layers",
            path,
            classifier.inputs,
            classifier.layers.len()
        );

        Ok(classifier)
    }

    pub fn weights(&self) -> NetworkWeights {
        NetworkWeights {
            inputs: self.inputs,
            layers: self.layers.iter().map(Dense::to_layer).collect(),
        }
    }
}

impl Classifier for FeedForwardClassifier {
    fn name(&self) -> &'static str {
        "ffnn"
    }

    fn input_len(&self) -> usize {
        self.inputs
    }

    fn classify(&self, features: &[f32]) -> Result<Vec<f32>, OcrError> {
        if features.len() != self.inputs {
            return Err(OcrError::ClassifierError(format!(
                "expected {} features, got {}",
                self.inputs,
                features.len()
            )));
        }

        let mut activations = Array1::from(features.to_vec());
        for layer in &self.layers {
            activations = layer.forward(&activations);
        }

        if activations.iter().any(|v| !v.is_finite()) {
            return Err(OcrError::ClassifierError(
                "network produced a non-finite score".to_string(),
            ));
        }

        Ok(activations.to_vec())
    }
}
