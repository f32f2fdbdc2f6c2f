// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR text detection model
//!
//! Runs the DB (Differentiable Binarization) detector and turns its
//! probability map into axis-aligned text boxes.

use anyhow::{anyhow, Context, Result};
use ndarray::{Array2, Array4, ArrayViewD, Axis};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::cmp::Ordering;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Boxes whose top edges differ by less than this many pixels are treated
/// as the same text line when ordering
const SAME_LINE_TOLERANCE: f32 = 10.0;

/// A detected text box with location and confidence
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    /// X coordinate of top-left corner (in preprocessed image space)
    pub x: f32,
    /// Y coordinate of top-left corner (in preprocessed image space)
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Mean probability over the region's pixels (0.0-1.0)
    pub confidence: f32,
}

impl TextBox {
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.confidence > 0.0
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Grow the box outward the way DB post-processing "unclips" shrunk
    /// text kernels: offset = area * ratio / perimeter
    pub fn unclip(&self, ratio: f32, max_width: f32, max_height: f32) -> TextBox {
        let perimeter = 2.0 * (self.width + self.height);
        if perimeter <= 0.0 {
            return self.clone();
        }
        let offset = self.area() * ratio / perimeter;

        let x0 = (self.x - offset).max(0.0);
        let y0 = (self.y - offset).max(0.0);
        let x1 = (self.x + self.width + offset).min(max_width);
        let y1 = (self.y + self.height + offset).min(max_height);

        TextBox {
            x: x0,
            y: y0,
            width: (x1 - x0).max(0.0),
            height: (y1 - y0).max(0.0),
            confidence: self.confidence,
        }
    }
}

/// Post-processing knobs for the probability map
#[derive(Debug, Clone, Copy)]
pub struct DetectionConfig {
    /// Pixel probability above which a pixel counts as text
    pub threshold: f32,
    /// Regions with fewer pixels than this are discarded as noise
    pub min_region_pixels: usize,
    /// DB unclip ratio
    pub unclip_ratio: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            min_region_pixels: 10,
            unclip_ratio: 1.5,
        }
    }
}

/// PaddleOCR text detection model
///
/// Runs on CPU. The session is shared behind a mutex that is held only for
/// the duration of one `run`.
#[derive(Clone)]
pub struct OcrDetectionModel {
    session: Arc<Mutex<Session>>,
    input_name: String,
    config: DetectionConfig,
}

impl std::fmt::Debug for OcrDetectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrDetectionModel")
            .field("input_name", &self.input_name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OcrDetectionModel {
    /// Load the OCR detection model from a file
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    pub async fn new<P: AsRef<Path>>(model_path: P, config: DetectionConfig) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("OCR detection model not found: {}", model_path.display());
        }

        info!("Loading OCR detection model from {}", model_path.display());

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
                    "Failed to load OCR detection model from {}",
                    model_path.display()
                )
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "x".to_string());

        debug!("Detection model loaded - input: {}", input_name);
        info!("OCR detection model loaded (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            config,
        })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Run text detection on a preprocessed image tensor
    ///
    /// The input should come from `preprocess_for_detection()`.
    pub fn detect(&self, input: &Array4<f32>) -> Result<Vec<TextBox>> {
        let shape = input.shape();
        if shape[0] != 1 || shape[1] != 3 {
            anyhow::bail!("Invalid input shape: {:?}, expected [1, 3, H, W]", shape);
        }
        let (input_height, input_width) = (shape[2], shape[3]);

        let probability_map = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| anyhow!("OCR detection session lock poisoned"))?;

            let input_value =
                Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

            let outputs = session
                .run(ort::inputs![&self.input_name => input_value])
                .context("Detection inference failed")?;

            let output_tensor = outputs[0]
                .try_extract_array::<f32>()
                .context("Failed to extract output tensor")?;

            probability_map_from_output(output_tensor.view())?
        };

        let boxes = boxes_from_probability_map(
            &probability_map,
            input_height,
            input_width,
            &self.config,
        );
        debug!("Detected {} text regions", boxes.len());

        Ok(boxes)
    }
}

/// Reduce the detector output (`[1, 1, H, W]` or `[1, H, W]`) to a 2-D map
fn probability_map_from_output(output: ArrayViewD<f32>) -> Result<Array2<f32>> {
    let original_shape = output.shape().to_vec();
    let mut view = output;
    while view.ndim() > 2 {
        if view.shape()[0] != 1 {
            anyhow::bail!("Unexpected detection output shape: {:?}", original_shape);
        }
        view = view.index_axis_move(Axis(0), 0);
    }

    view.into_dimensionality::<ndarray::Ix2>()
        .map(|v| v.to_owned())
        .map_err(|e| anyhow!("Unexpected detection output shape: {}", e))
}

/// Threshold the probability map and return one box per connected region,
/// ordered top-to-bottom then left-to-right
pub fn boxes_from_probability_map(
    probability_map: &Array2<f32>,
    input_height: usize,
    input_width: usize,
    config: &DetectionConfig,
) -> Vec<TextBox> {
    let (prob_height, prob_width) = probability_map.dim();
    if prob_height == 0 || prob_width == 0 {
        return Vec::new();
    }

    let scale_y = input_height as f32 / prob_height as f32;
    let scale_x = input_width as f32 / prob_width as f32;

    let mut visited = Array2::<bool>::from_elem((prob_height, prob_width), false);
    let mut boxes = Vec::new();

    for y in 0..prob_height {
        for x in 0..prob_width {
            if visited[[y, x]] || probability_map[[y, x]] < config.threshold {
                continue;
            }

            let region = flood_fill(probability_map, &mut visited, x, y, config.threshold);
            if region.count < config.min_region_pixels {
                continue;
            }

            let text_box = TextBox {
                x: region.min_x as f32 * scale_x,
                y: region.min_y as f32 * scale_y,
                width: (region.max_x - region.min_x + 1) as f32 * scale_x,
                height: (region.max_y - region.min_y + 1) as f32 * scale_y,
                confidence: region.sum / region.count as f32,
            }
            .unclip(config.unclip_ratio, input_width as f32, input_height as f32);

            if text_box.is_valid() {
                boxes.push(text_box);
            }
        }
    }

    sort_reading_order(&mut boxes);
    boxes
}

/// Order boxes in reading order, treating boxes at nearly the same height as
/// one line
pub fn sort_reading_order(boxes: &mut [TextBox]) {
    boxes.sort_by(|a, b| {
        a.y.partial_cmp(&b.y)
            .unwrap_or(Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
    });

    for i in 1..boxes.len() {
        let mut j = i;
        while j > 0
            && (boxes[j].y - boxes[j - 1].y).abs() < SAME_LINE_TOLERANCE
            && boxes[j].x < boxes[j - 1].x
        {
            boxes.swap(j, j - 1);
            j -= 1;
        }
    }
}

struct Region {
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
    count: usize,
    sum: f32,
}

/// 4-connected flood fill from (start_x, start_y)
fn flood_fill(
    probability_map: &Array2<f32>,
    visited: &mut Array2<bool>,
    start_x: usize,
    start_y: usize,
    threshold: f32,
) -> Region {
    let (height, width) = probability_map.dim();
    let mut region = Region {
        min_x: start_x,
        max_x: start_x,
        min_y: start_y,
        max_y: start_y,
        count: 0,
        sum: 0.0,
    };
    let mut stack = vec![(start_x, start_y)];

    while let Some((x, y)) = stack.pop() {
        if visited[[y, x]] {
            continue;
        }
        let prob = probability_map[[y, x]];
        if prob < threshold {
            continue;
        }

        visited[[y, x]] = true;
        region.count += 1;
        region.sum += prob;
        region.min_x = region.min_x.min(x);
        region.max_x = region.max_x.max(x);
        region.min_y = region.min_y.min(y);
        region.max_y = region.max_y.max(y);

        if x > 0 {
            stack.push((x - 1, y));
        }
        if x + 1 < width {
            stack.push((x + 1, y));
        }
        if y > 0 {
            stack.push((x, y - 1));
        }
        if y + 1 < height {
            stack.push((x, y + 1));
        }
    }

    region
}
