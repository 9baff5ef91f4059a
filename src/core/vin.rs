//! VIN structure, check digit and OCR cleanup.
//!
//! The check digit algorithm is the North American one (49 CFR 565). Many
//! VINs issued for other markets do not carry a meaningful check digit and
//! fail [`is_valid_vin`] even when they are well formed; use
//! [`validate_vin_format`] when only the structure matters.

use crate::domain::model::VinIssue;
use crate::utils::error::CourierError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const VIN_LENGTH: usize = 17;

/// Index of the check digit (position 9).
const CHECK_DIGIT_INDEX: usize = 8;

const POSITION_WEIGHTS: [u32; VIN_LENGTH] = [8, 7, 6, 5, 4, 3, 2, 10, 0, 9, 8, 7, 6, 5, 4, 3, 2];

/// Letters never used in a VIN.
pub fn is_forbidden_char(c: char) -> bool {
    matches!(c, 'I' | 'O' | 'Q')
}

/// `A-H J-N P R-Z 0-9`
pub fn is_vin_char(c: char) -> bool {
    c.is_ascii_digit() || (c.is_ascii_uppercase() && !is_forbidden_char(c))
}

fn transliterate(c: char) -> Option<u32> {
    let value = match c {
        '0'..='9' => c.to_digit(10)?,
        'A' | 'J' => 1,
        'B' | 'K' | 'S' => 2,
        'C' | 'L' | 'T' => 3,
        'D' | 'M' | 'U' => 4,
        'E' | 'N' | 'V' => 5,
        'F' | 'W' => 6,
        'G' | 'P' | 'X' => 7,
        'H' | 'Y' => 8,
        'R' | 'Z' => 9,
        _ => return None,
    };
    Some(value)
}

/// Structural checks only: length, alphabet.
pub fn validate_vin_format(vin: &str) -> Result<(), VinIssue> {
    let upper = vin.to_ascii_uppercase();
    let actual = upper.chars().count();
    if actual != VIN_LENGTH {
        return Err(VinIssue::Length { actual });
    }

    for (index, character) in upper.chars().enumerate() {
        if is_forbidden_char(character) {
            return Err(VinIssue::ForbiddenCharacter {
                position: index + 1,
                character,
            });
        }
        if !is_vin_char(character) {
            return Err(VinIssue::InvalidCharacter {
                position: index + 1,
                character,
            });
        }
    }

    Ok(())
}

/// Check digit the checksum expects for a structurally valid VIN.
pub fn expected_check_digit(vin: &str) -> Result<char, VinIssue> {
    validate_vin_format(vin)?;

    let mut sum = 0;
    for (c, weight) in vin.to_ascii_uppercase().chars().zip(POSITION_WEIGHTS) {
        // validate_vin_format guarantees every char transliterates
        sum += transliterate(c).unwrap_or(0) * weight;
    }

    Ok(match sum % 11 {
        10 => 'X',
        remainder => char::from_digit(remainder, 10).unwrap_or('0'),
    })
}

/// Full validation: structure and check digit.
pub fn validate_vin(vin: &str) -> Result<(), VinIssue> {
    let expected = expected_check_digit(vin)?;
    let found = vin
        .to_ascii_uppercase()
        .chars()
        .nth(CHECK_DIGIT_INDEX)
        .unwrap_or(' ');

    if found != expected {
        return Err(VinIssue::CheckDigit { expected, found });
    }
    Ok(())
}

pub fn is_valid_vin(vin: &str) -> bool {
    validate_vin(vin).is_ok()
}

/// Best-effort cleanup of scanned or typed VIN text.
///
/// Uppercases, drops everything that is not ASCII alphanumeric and maps the
/// letters a VIN never contains to the digits they are usually mistaken for
/// (O/Q -> 0, I -> 1). Longer input is searched for the first 17-character
/// window with a valid check digit, falling back to the first 17 characters.
/// Shorter input is returned as is. `None` only when nothing is left.
pub fn cleanup_vin(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| match c.to_ascii_uppercase() {
            'O' | 'Q' => '0',
            'I' => '1',
            other => other,
        })
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    if cleaned.len() > VIN_LENGTH {
        let found = (0..=cleaned.len() - VIN_LENGTH)
            .map(|start| &cleaned[start..start + VIN_LENGTH])
            .find(|window| is_valid_vin(window));

        return match found {
            Some(window) => Some(window.to_string()),
            None => {
                tracing::debug!("No valid VIN window in '{}', truncating", cleaned);
                Some(cleaned[..VIN_LENGTH].to_string())
            }
        };
    }

    Some(cleaned)
}

/// A structurally valid, uppercase VIN.
///
/// Parsing does not require the check digit to match; see
/// [`Vin::has_valid_check_digit`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Vin(String);

impl Vin {
    pub fn parse(s: &str) -> Result<Self, VinIssue> {
        validate_vin_format(s)?;
        Ok(Self(s.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// World Manufacturer Identifier, positions 1-3.
    pub fn wmi(&self) -> &str {
        &self.0[0..3]
    }

    /// Vehicle Descriptor Section, positions 4-8.
    pub fn vds(&self) -> &str {
        &self.0[3..8]
    }

    pub fn check_digit(&self) -> char {
        self.fixed(9)
    }

    pub fn model_year_code(&self) -> char {
        self.fixed(10)
    }

    pub fn plant_code(&self) -> char {
        self.fixed(11)
    }

    /// Positions 12-17.
    pub fn serial(&self) -> &str {
        &self.0[11..]
    }

    pub fn has_valid_check_digit(&self) -> bool {
        is_valid_vin(&self.0)
    }

    /// 1-based position, the way VIN layouts are documented. `None` outside 1..=17.
    pub fn char_at(&self, position: usize) -> Option<char> {
        // only ASCII after parse, so byte indexing is char indexing
        self.0
            .as_bytes()
            .get(position.wrapping_sub(1))
            .map(|b| *b as char)
    }

    fn fixed(&self, position: usize) -> char {
        self.0.as_bytes()[position - 1] as char
    }
}

impl fmt::Display for Vin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Vin {
    type Err = CourierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Vin::parse(s.trim())?)
    }
}

impl TryFrom<String> for Vin {
    type Error = VinIssue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Vin::parse(&value)
    }
}

impl From<Vin> for String {
    fn from(vin: Vin) -> Self {
        vin.0
    }
}
