//! Helpers for VINs read off registration cards by OCR.

use crate::core::vin::{is_forbidden_char, is_valid_vin, is_vin_char, VIN_LENGTH};
use serde::Serialize;
use std::collections::HashMap;

/// Labels printed next to the VIN on registration cards (English and Arabic).
const VIN_KEYWORDS: &[&str] = &[
    "VIN",
    "CHASSIS",
    "CHASSIS NO",
    "CHASSIS NUMBER",
    "رقم الهيكل",
    "رقم الشاسيه",
    "الهيكل",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrectionMode {
    #[default]
    Standard,
    /// Also fixes L/1 and T/7, for very noisy scans.
    Aggressive,
}

/// Uppercase and keep ASCII letters and digits only.
pub fn normalize_ocr_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Single character correction for common OCR confusions.
pub fn auto_correct_char(c: char, mode: CorrectionMode) -> char {
    match (c, mode) {
        ('O' | 'Q', _) => '0',
        ('I', _) => '1',
        ('Z', _) => '2',
        ('S', _) => '5',
        ('B', _) => '8',
        ('G', _) => '6',
        ('L', CorrectionMode::Aggressive) => '1',
        ('T', CorrectionMode::Aggressive) => '7',
        (other, _) => other,
    }
}

pub fn auto_correct_vin(vin: &str, mode: CorrectionMode) -> String {
    vin.chars()
        .map(|c| auto_correct_char(c.to_ascii_uppercase(), mode))
        .collect()
}

pub fn contains_vin_keyword(text: &str) -> bool {
    let upper = text.to_uppercase();
    VIN_KEYWORDS.iter().any(|keyword| upper.contains(keyword))
}

/// VIN-shaped sequences in raw OCR text, most likely first.
///
/// Lines carrying a VIN label are searched together with the following line
/// (cards often wrap the number) and their candidates come first, ordered by
/// where they appear in the text. Each of those also gets an aggressively
/// corrected variant.
pub fn extract_vin_candidates(ocr_text: &str) -> Vec<String> {
    let lines: Vec<&str> = ocr_text.lines().collect();
    let mut priority: Vec<String> = Vec::new();
    let mut others: Vec<String> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let has_keyword = contains_vin_keyword(line);
        let search_text = if has_keyword {
            format!("{} {}", line, lines.get(i + 1).copied().unwrap_or(""))
        } else {
            line.to_string()
        };

        let normalized = normalize_ocr_text(&search_text);
        if normalized.len() < VIN_LENGTH {
            continue;
        }

        for start in 0..=normalized.len() - VIN_LENGTH {
            let corrected =
                auto_correct_vin(&normalized[start..start + VIN_LENGTH], CorrectionMode::Standard);
            if corrected.chars().any(is_forbidden_char) {
                continue;
            }
            if has_keyword {
                priority.push(corrected);
            } else {
                others.push(corrected);
            }
        }
    }

    let aggressive: Vec<String> = priority
        .iter()
        .map(|c| auto_correct_vin(c, CorrectionMode::Aggressive))
        .collect();
    for candidate in aggressive {
        if !priority.contains(&candidate) {
            priority.push(candidate);
        }
    }

    // 靠近標籤的優先；原文中找不到的排最後
    let position = |candidate: &String| ocr_text.find(candidate.as_str()).unwrap_or(usize::MAX);
    priority.sort_by_key(position);

    priority.extend(others);
    priority
}

/// First extracted candidate that passes the check digit.
pub fn best_vin_candidate(ocr_text: &str) -> Option<String> {
    extract_vin_candidates(ocr_text)
        .into_iter()
        .find(|candidate| is_valid_vin(candidate))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoftValidation {
    pub vin: String,
    /// Check digit passes.
    pub is_strict: bool,
    /// 17 characters from the VIN alphabet.
    pub is_pattern: bool,
}

/// Lenient check for when the strict one fails on a non-NA VIN.
pub fn soft_validate_vin(vin: &str) -> SoftValidation {
    let corrected = auto_correct_vin(&normalize_ocr_text(vin), CorrectionMode::Standard);
    let is_pattern = corrected.len() == VIN_LENGTH && corrected.chars().all(is_vin_char);

    SoftValidation {
        is_strict: is_valid_vin(&corrected),
        is_pattern,
        vin: corrected,
    }
}

/// 0-100 score: length 20, no I/O/Q 20, alphabet 20, check digit 40.
pub fn vin_confidence(vin: &str) -> u8 {
    let mut score = 0;
    let length_ok = vin.chars().count() == VIN_LENGTH;

    if length_ok {
        score += 20;
    }
    if !vin.chars().any(is_forbidden_char) {
        score += 20;
    }
    if length_ok && vin.chars().all(is_vin_char) {
        score += 20;
    }
    if is_valid_vin(vin) {
        score += 40;
    }
    score
}

/// Picks a VIN across several scanned frames.
///
/// A valid VIN read at least twice wins; otherwise the first valid one.
pub fn find_consensus_vin<S: AsRef<str>>(results: &[S]) -> Option<String> {
    let valid: Vec<String> = results
        .iter()
        .map(|r| auto_correct_vin(r.as_ref(), CorrectionMode::Standard))
        .filter(|vin| is_valid_vin(vin))
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for vin in &valid {
        *counts.entry(vin.as_str()).or_default() += 1;
    }

    valid
        .iter()
        .find(|vin| counts.get(vin.as_str()).copied().unwrap_or(0) >= 2)
        .or_else(|| valid.first())
        .cloned()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditRejection {
    TooManyChanges { changed: usize },
    InvalidChecksum,
}

impl EditRejection {
    pub fn message(&self) -> &'static str {
        match self {
            EditRejection::TooManyChanges { .. } => {
                "Only single character correction is allowed. Please rescan instead."
            }
            EditRejection::InvalidChecksum => "The edited VIN does not pass checksum validation.",
        }
    }
}

/// A scanned VIN may be fixed by hand, one character at most.
pub fn validate_user_edit(original: &str, edited: &str) -> Result<(), EditRejection> {
    let original: Vec<char> = original.chars().collect();
    let edited: Vec<char> = edited.chars().collect();

    let changed = (0..VIN_LENGTH)
        .filter(|&i| original.get(i) != edited.get(i))
        .count();

    if changed > 1 {
        return Err(EditRejection::TooManyChanges { changed });
    }

    let edited: String = edited.into_iter().collect();
    if !is_valid_vin(&edited) {
        return Err(EditRejection::InvalidChecksum);
    }

    Ok(())
}
