// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text recognition model
//!
//! Recognizes the text content of a single cropped text line and decodes
//! the model's per-timestep class scores with greedy CTC.

use anyhow::{anyhow, Context, Result};
use ndarray::{Array4, ArrayView2, ArrayViewD, Axis, Ix2};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::preprocessing::{REC_INPUT_HEIGHT, REC_MIN_WIDTH};

/// Recognition model input height
pub const RECOGNITION_INPUT_HEIGHT: u32 = REC_INPUT_HEIGHT;

/// Recognized text with confidence score
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    /// Mean probability of the emitted characters (0.0-1.0)
    pub confidence: f32,
}

impl RecognizedText {
    pub fn new(text: String, confidence: f32) -> Self {
        Self { text, confidence }
    }

    /// Check if the text is empty or whitespace only
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Character table for CTC decoding
///
/// Class 0 is the CTC blank; class `i > 0` maps to `chars[i - 1]`. A space
/// is appended after the file's characters, matching models exported with
/// `use_space_char`.
#[derive(Debug, Clone, PartialEq)]
pub struct CharDictionary {
    chars: Vec<char>,
}

impl CharDictionary {
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut chars = Vec::new();
        for line in reader.lines() {
            let line = line.context("Failed to read dictionary line")?;
            let line = line.trim_end_matches(['\r', '\n']);
            if let Some(ch) = line.chars().next() {
                chars.push(ch);
            }
        }
        if chars.is_empty() {
            anyhow::bail!("OCR character dictionary is empty");
        }
        chars.push(' ');
        Ok(Self { chars })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open dictionary: {}", path.display()))?;
        Self::from_reader(BufReader::new(file))
    }

    /// Number of model classes, including the blank
    pub fn num_classes(&self) -> usize {
        self.chars.len() + 1
    }

    pub fn char_for_class(&self, class: usize) -> Option<char> {
        class.checked_sub(1).and_then(|i| self.chars.get(i)).copied()
    }

    /// Greedy CTC decode of a `[timesteps, classes]` score matrix
    ///
    /// Picks the best class per timestep, collapses repeats and drops
    /// blanks. Leading/trailing spaces are trimmed.
    pub fn ctc_decode(&self, scores: ArrayView2<f32>) -> RecognizedText {
        let mut text = String::new();
        let mut total = 0.0f32;
        let mut emitted = 0usize;
        let mut prev_class = 0usize;

        for row in scores.axis_iter(Axis(0)) {
            let (best_class, best_score) = row
                .iter()
                .enumerate()
                .fold((0usize, f32::NEG_INFINITY), |best, (i, &score)| {
                    if score > best.1 {
                        (i, score)
                    } else {
                        best
                    }
                });

            if best_class != 0 && best_class != prev_class {
                if let Some(ch) = self.char_for_class(best_class) {
                    text.push(ch);
                    total += best_score;
                    emitted += 1;
                }
            }
            prev_class = best_class;
        }

        let confidence = if emitted == 0 {
            0.0
        } else {
            (total / emitted as f32).clamp(0.0, 1.0)
        };

        RecognizedText::new(text.trim().to_string(), confidence)
    }
}

/// PaddleOCR text recognition model
///
/// Runs on CPU. The session is shared behind a mutex that is held only for
/// the duration of one `run`.
#[derive(Clone)]
pub struct OcrRecognitionModel {
    session: Arc<Mutex<Session>>,
    dictionary: Arc<CharDictionary>,
    input_name: String,
}

impl std::fmt::Debug for OcrRecognitionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrRecognitionModel")
            .field("num_classes", &self.dictionary.num_classes())
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl OcrRecognitionModel {
    /// Load the OCR recognition model and its character dictionary
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - Dictionary file not found or empty
    /// - ONNX Runtime initialization fails
    pub async fn new<P: AsRef<Path>, D: AsRef<Path>>(model_path: P, dict_path: D) -> Result<Self> {
        let model_path = model_path.as_ref();
        let dict_path = dict_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("OCR recognition model not found: {}", model_path.display());
        }
        if !dict_path.exists() {
            anyhow::bail!(
                "OCR character dictionary not found: {}",
                dict_path.display()
            );
        }

        info!(
            "Loading OCR recognition model from {}",
            model_path.display()
        );

        let dictionary = CharDictionary::from_file(dict_path)?;
        info!(
            "Loaded character dictionary with {} classes",
            dictionary.num_classes()
        );

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!(
                    "Failed to load OCR recognition model from {}",
                    model_path.display()
                )
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        debug!("Recognition model loaded - input: {}", input_name);
        info!("OCR recognition model loaded (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            dictionary: Arc::new(dictionary),
            input_name,
        })
    }

    pub fn dictionary(&self) -> &CharDictionary {
        &self.dictionary
    }

    /// Recognize text from a preprocessed line crop
    ///
    /// The input should come from `preprocess_for_recognition()`:
    /// shape `[1, 3, 48, W]` with a dynamic width.
    pub fn recognize(&self, input: &Array4<f32>) -> Result<RecognizedText> {
        let shape = input.shape();
        if shape[0] != 1
            || shape[1] != 3
            || shape[2] != RECOGNITION_INPUT_HEIGHT as usize
            || shape[3] < REC_MIN_WIDTH as usize
        {
            anyhow::bail!(
                "Invalid input shape: {:?}, expected [1, 3, {}, W>={}]",
                shape,
                RECOGNITION_INPUT_HEIGHT,
                REC_MIN_WIDTH
            );
        }

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("OCR recognition session lock poisoned"))?;

        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Recognition inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let scores = scores_from_output(output_tensor.view())?;
        if scores.ncols() != self.dictionary.num_classes() {
            debug!(
                "Recognition output has {} classes, dictionary has {}",
                scores.ncols(),
                self.dictionary.num_classes()
            );
        }

        let recognized = self.dictionary.ctc_decode(scores);
        Ok(recognized)
    }
}

/// Reduce `[1, T, C]` or `[T, C]` output to a 2-D score matrix
fn scores_from_output(output: ArrayViewD<f32>) -> Result<ArrayView2<f32>> {
    let original_shape = output.shape().to_vec();
    let view = match output.ndim() {
        3 if original_shape[0] == 1 => output.index_axis_move(Axis(0), 0),
        2 => output,
        _ => anyhow::bail!("Unexpected recognition output shape: {:?}", original_shape),
    };

    view.into_dimensionality::<Ix2>()
        .map_err(|e| anyhow!("Unexpected recognition output shape: {}", e))
}
