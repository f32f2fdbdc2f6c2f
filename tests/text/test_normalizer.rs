// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Text normalizer property tests
//!
//! Checks the output invariants over a table of realistic OCR output.

use memesense_node::text::normalize;

const SAMPLES: &[&str] = &[
    "",
    "   ",
    "😀😀😀",
    "Hello World!",
    "a big cat",
    "big a cat",
    "WHEN YOU SEE IT 😂😂😂",
    "Don't   stop   me   now",
    "Ako ay isang bata",
    "Salamát po, Kuya!",
    "I am 5 years old",
    "2 + 2 = 4",
    "Top 10 memes of 2024",
    "tab\tseparated\nnew line",
    "***** LOL *****",
    "x y z",
    "a a a big",
    "ÀÉÎÕÜ",
    "café ☕ time",
    "👍 nice ✨ work ⭐",
];

fn is_canonical(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' ')
}

#[test]
fn test_output_character_set() {
    for sample in SAMPLES {
        let out = normalize(sample);
        assert!(is_canonical(&out), "{:?} -> {:?}", sample, out);
    }
}

#[test]
fn test_no_double_spaces_or_edge_spaces() {
    for sample in SAMPLES {
        let out = normalize(sample);
        assert!(!out.contains("  "), "{:?} -> {:?}", sample, out);
        assert_eq!(out, out.trim(), "{:?} -> {:?}", sample, out);
    }
}

#[test]
fn test_no_single_character_tokens() {
    for sample in SAMPLES {
        let out = normalize(sample);
        assert!(
            out.split(' ').all(|token| token.chars().count() != 1),
            "{:?} -> {:?}",
            sample,
            out
        );
    }
}

#[test]
fn test_idempotent() {
    for sample in SAMPLES {
        let once = normalize(sample);
        assert_eq!(normalize(&once), once, "input {:?}", sample);
    }
}

#[test]
fn test_known_outputs() {
    let cases = [
        ("", ""),
        ("😀😀😀", ""),
        ("Hello World!", "hello world"),
        ("a big cat", "big cat"),
        ("WHEN YOU SEE IT 😂😂😂", "when you see it"),
        ("Don't   stop   me   now", "dont stop me now"),
        ("Ako ay isang bata", "ako ay isang bata"),
        ("I am 5 years old", "am years old"),
        ("Top 10 memes of 2024", "top 10 memes of 2024"),
        ("tab\tseparated\nnew line", "tab separated new line"),
        ("***** LOL *****", "lol"),
        ("x y z", ""),
        ("a a a big", "big"),
        ("ÀÉÎÕÜ", ""),
    ];

    for (input, expected) in cases {
        assert_eq!(normalize(input), expected, "input {:?}", input);
    }
}
