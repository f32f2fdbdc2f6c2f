// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Canonicalization of OCR text
//!
//! Reduces recognized text to lowercase ASCII words separated by single
//! spaces. The passes run in a fixed order because each one assumes the
//! cleanup done by the previous ones.

use regex::Regex;
use std::sync::LazyLock;

/// Pictographs, emoticons, transport symbols, flags, dingbats and the
/// miscellaneous/extended symbol blocks
static EMOJI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        "[",
        r"\x{1F600}-\x{1F64F}",
        r"\x{1F300}-\x{1F5FF}",
        r"\x{1F680}-\x{1F6FF}",
        r"\x{1F1E0}-\x{1F1FF}",
        r"\x{2700}-\x{27BF}",
        r"\x{1F900}-\x{1F9FF}",
        r"\x{2600}-\x{26FF}",
        r"\x{2B00}-\x{2BFF}",
        r"\x{1FA70}-\x{1FAFF}",
        "]+",
    ))
    .expect("emoji pattern is valid")
});

// Whitespace here also covers the ASCII information separators
// U+001C..U+001F, which `\s` and `str::trim` leave alone.
static NON_ASCII_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s\x1C-\x1F]").expect("pattern is valid"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\x1C-\x1F]+").expect("pattern is valid"));

static SINGLE_CHAR_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\b").expect("pattern is valid"));

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\x1C-\x1F]").expect("pattern is valid"));

fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1C}'..='\u{1F}').contains(&c)
}

/// Normalize raw OCR text
///
/// Steps:
/// 1. Drop emoji and pictographic symbols
/// 2. Lowercase and trim
/// 3. Keep only `[a-z0-9]` and whitespace
/// 4. Collapse whitespace runs to one space
/// 5. Drop standalone single-character tokens
/// 6. Drop any remaining non-word character
/// 7. Collapse and trim the gaps left by step 5
///
/// Never fails; empty or all-symbol input yields an empty string.
///
/// # Example
/// ```
/// use memesense_node::text::normalize;
///
/// assert_eq!(normalize("Hello World!"), "hello world");
/// assert_eq!(normalize("a big cat"), "big cat");
/// ```
pub fn normalize(text: &str) -> String {
    let text = EMOJI.replace_all(text, "");
    let text = text.to_lowercase();
    let text = NON_ASCII_ALNUM.replace_all(text.trim_matches(is_separator), "");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    let text = SINGLE_CHAR_TOKEN.replace_all(&text, "");
    // Second character-class pass; a no-op after step 3 for ASCII text.
    let text = NON_WORD.replace_all(&text, "");

    WHITESPACE_RUN.replace_all(&text, " ").trim().to_string()
}
