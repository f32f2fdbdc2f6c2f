// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image-to-tensor preprocessing for downstream classifiers
//!
//! Produces the `[1, 3, H, W]` ImageNet-normalized layout most vision
//! backbones expect. The resize is direct, so aspect ratio is not kept.

use image::imageops::{self, FilterType};
use image::DynamicImage;
use ndarray::Array4;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::image_utils::{open_image, ImageError, DEFAULT_MAX_IMAGE_BYTES};

/// Default model input height and width
pub const DEFAULT_TARGET_SIZE: u32 = 224;

/// Mean values for normalization (ImageNet)
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Std values for normalization (ImageNet)
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Output size of the preprocessor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSize {
    pub height: u32,
    pub width: u32,
}

impl Default for TargetSize {
    fn default() -> Self {
        Self {
            height: DEFAULT_TARGET_SIZE,
            width: DEFAULT_TARGET_SIZE,
        }
    }
}

/// Dense NCHW tensor with a batch dimension of 1
#[derive(Debug, Clone)]
pub struct ImageTensor {
    values: Array4<f32>,
}

impl ImageTensor {
    /// Tensor shape as `[batch, channels, height, width]`
    pub fn shape(&self) -> [usize; 4] {
        let (n, c, h, w) = self.values.dim();
        [n, c, h, w]
    }

    pub fn values(&self) -> &Array4<f32> {
        &self.values
    }
}

/// Fixed resize + normalize pipeline
#[derive(Debug, Clone, Copy)]
pub struct ImagePreprocessor {
    target: TargetSize,
    max_image_bytes: usize,
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new(TargetSize::default())
    }
}

impl ImagePreprocessor {
    pub fn new(target: TargetSize) -> Self {
        Self {
            target,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    /// Largest encoded file `preprocess_path` will decode
    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    pub fn target(&self) -> TargetSize {
        self.target
    }

    /// Open `path` and build its tensor
    pub fn preprocess_path<P: AsRef<Path>>(&self, path: P) -> Result<ImageTensor, ImageError> {
        let (image, info) = open_image(path, self.max_image_bytes)?;
        debug!(
            "Preprocessing {}x{} image to {}x{}",
            info.width, info.height, self.target.width, self.target.height
        );
        Ok(self.preprocess(&image))
    }

    /// Build the tensor for an already decoded image
    ///
    /// Steps:
    /// 1. Convert to RGB
    /// 2. Resize to the target size (bilinear)
    /// 3. Scale to [0, 1]
    /// 4. Normalize each channel: (x - mean) / std
    /// 5. Lay out as NCHW with a leading batch dimension
    pub fn preprocess(&self, image: &DynamicImage) -> ImageTensor {
        let TargetSize { height, width } = self.target;
        let rgb = imageops::resize(&image.to_rgb8(), width, height, FilterType::Triangle);

        let mut values = Array4::zeros((1, 3, height as usize, width as usize));
        for (x, y, pixel) in rgb.enumerate_pixels() {
            for c in 0..3 {
                let scaled = pixel[c] as f32 / 255.0;
                values[[0, c, y as usize, x as usize]] =
                    (scaled - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
            }
        }

        ImageTensor { values }
    }
}
