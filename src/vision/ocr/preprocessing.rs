// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the PaddleOCR models

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

use crate::vision::tensor::{IMAGENET_MEAN, IMAGENET_STD};

/// Target size for PaddleOCR detection model
pub const OCR_INPUT_SIZE: u32 = 640;

/// Recognition model input height (PP-OCR Latin models use 48)
pub const REC_INPUT_HEIGHT: u32 = 48;

/// Maximum width for recognition model input
///
/// Meme captions tend to be long single lines, so this is wider than the
/// 320 used for document crops.
pub const REC_MAX_WIDTH: u32 = 1280;

/// Minimum width accepted by the recognition model
pub const REC_MIN_WIDTH: u32 = 4;

/// Preprocess an image for OCR detection
///
/// Steps:
/// 1. Resize with aspect ratio preservation to OCR_INPUT_SIZE
/// 2. Pad to square with gray (128) background
/// 3. Normalize with ImageNet mean/std: (pixel/255 - mean) / std
/// 4. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess_for_detection(image: &DynamicImage) -> Array4<f32> {
    let rgb = resize_with_padding(image, OCR_INPUT_SIZE).to_rgb8();
    let size = OCR_INPUT_SIZE as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] =
                (pixel[c] as f32 / 255.0 - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
        }
    }

    tensor
}

/// Preprocess a cropped text line for recognition
///
/// The crop is scaled to REC_INPUT_HEIGHT keeping its aspect ratio and
/// normalized to [-1, 1] the way the PaddleOCR recognizers were trained.
pub fn preprocess_for_recognition(image: &DynamicImage) -> Array4<f32> {
    let (orig_w, orig_h) = image.dimensions();
    let orig_h = orig_h.max(1);

    let scale = REC_INPUT_HEIGHT as f32 / orig_h as f32;
    let new_width = ((orig_w as f32 * scale).round() as u32).clamp(REC_MIN_WIDTH, REC_MAX_WIDTH);

    let rgb = image
        .resize_exact(new_width, REC_INPUT_HEIGHT, FilterType::Triangle)
        .to_rgb8();

    let mut tensor = Array4::zeros((1, 3, REC_INPUT_HEIGHT as usize, new_width as usize));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = (pixel[c] as f32 / 255.0 - 0.5) / 0.5;
        }
    }

    tensor
}

/// Resize image with aspect ratio preservation and padding
///
/// The image is scaled to fit within target_size x target_size
/// while preserving aspect ratio, then padded with gray (128)
/// to reach the target dimensions.
pub fn resize_with_padding(image: &DynamicImage, target_size: u32) -> DynamicImage {
    let (orig_w, orig_h) = image.dimensions();

    if orig_w == 0 || orig_h == 0 {
        return DynamicImage::ImageRgb8(RgbImage::from_pixel(
            target_size,
            target_size,
            Rgb([128, 128, 128]),
        ));
    }

    let info = PreprocessInfo::new(image, target_size);
    let new_w = ((orig_w as f32 * info.scale).round() as u32).clamp(1, target_size);
    let new_h = ((orig_h as f32 * info.scale).round() as u32).clamp(1, target_size);

    let resized = image
        .resize_exact(new_w, new_h, FilterType::Lanczos3)
        .to_rgb8();

    let mut output = RgbImage::from_pixel(target_size, target_size, Rgb([128, 128, 128]));
    image::imageops::replace(
        &mut output,
        &resized,
        info.offset_x as i64,
        info.offset_y as i64,
    );

    DynamicImage::ImageRgb8(output)
}

/// Scale and padding offsets applied by `resize_with_padding`
///
/// Used to map detection boxes back to original image coordinates.
#[derive(Debug, Clone, Copy)]
pub struct PreprocessInfo {
    /// Scale factor applied
    pub scale: f32,
    /// X offset from padding
    pub offset_x: u32,
    /// Y offset from padding
    pub offset_y: u32,
    /// Original image width
    pub original_width: u32,
    /// Original image height
    pub original_height: u32,
}

impl PreprocessInfo {
    pub fn new(image: &DynamicImage, target_size: u32) -> Self {
        let (orig_w, orig_h) = image.dimensions();

        if orig_w == 0 || orig_h == 0 {
            return Self {
                scale: 1.0,
                offset_x: 0,
                offset_y: 0,
                original_width: orig_w,
                original_height: orig_h,
            };
        }

        let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);
        let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, target_size);
        let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, target_size);

        Self {
            scale,
            offset_x: (target_size - new_w) / 2,
            offset_y: (target_size - new_h) / 2,
            original_width: orig_w,
            original_height: orig_h,
        }
    }

    /// Map a coordinate from preprocessed space back to original image space
    pub fn map_to_original(&self, x: f32, y: f32) -> (f32, f32) {
        let orig_x = (x - self.offset_x as f32) / self.scale;
        let orig_y = (y - self.offset_y as f32) / self.scale;
        (orig_x, orig_y)
    }

    /// Map a box from preprocessed space to a clamped pixel rectangle
    ///
    /// Returns `None` when nothing of the box falls inside the image.
    pub fn map_box_to_original(
        &self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Option<(u32, u32, u32, u32)> {
        let (x0, y0) = self.map_to_original(x, y);
        let (x1, y1) = self.map_to_original(x + width, y + height);

        let max_x = self.original_width as f32;
        let max_y = self.original_height as f32;
        let x0 = x0.clamp(0.0, max_x).floor() as u32;
        let y0 = y0.clamp(0.0, max_y).floor() as u32;
        let x1 = x1.clamp(0.0, max_x).ceil() as u32;
        let y1 = y1.clamp(0.0, max_y).ceil() as u32;

        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0, y0, x1 - x0, y1 - y0))
    }
}
