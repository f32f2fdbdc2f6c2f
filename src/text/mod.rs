// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text post-processing for OCR output

pub mod normalizer;

pub use normalizer::normalize;
