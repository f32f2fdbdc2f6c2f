// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Recognition languages supported by the OCR engine

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};

/// Language the recognizer is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OcrLanguage {
    English,
    Tagalog,
}

impl OcrLanguage {
    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            OcrLanguage::English => "en",
            OcrLanguage::Tagalog => "tl",
        }
    }
}

impl fmt::Display for OcrLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for OcrLanguage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "eng" | "english" => Ok(OcrLanguage::English),
            "tl" | "tgl" | "fil" | "tagalog" | "filipino" => Ok(OcrLanguage::Tagalog),
            other => Err(anyhow!(
                "unsupported OCR language '{}', supported: en, tl",
                other
            )),
        }
    }
}

/// Dictionary file covering every language in the set
///
/// English and Tagalog are both written in Latin script, so a single Latin
/// recognition model serves the whole set.
pub fn recognition_dictionary(languages: &[OcrLanguage]) -> Result<&'static str> {
    if languages.is_empty() {
        anyhow::bail!("at least one OCR language is required");
    }
    Ok("latin_dict.txt")
}

/// Parse a list of language codes, dropping duplicates
pub fn parse_languages<S: AsRef<str>>(codes: &[S]) -> Result<Vec<OcrLanguage>> {
    let mut languages = Vec::new();
    for code in codes {
        let language: OcrLanguage = code.as_ref().parse()?;
        if !languages.contains(&language) {
            languages.push(language);
        }
    }
    recognition_dictionary(&languages)?;
    Ok(languages)
}
