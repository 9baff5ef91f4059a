use crate::utils::error::{CourierError, Result};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 經緯度座標（度）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Builds a point, rejecting non-finite or out-of-range degrees.
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CourierError::InvalidCoordinate {
                message: format!("latitude {} is outside -90..=90", lat),
            });
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(CourierError::InvalidCoordinate {
                message: format!("longitude {} is outside -180..=180", lng),
            });
        }
        Ok(Self { lat, lng })
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}

impl FromStr for GeoPoint {
    type Err = CourierError;

    /// 解析 "lat,lng" 格式
    fn from_str(s: &str) -> Result<Self> {
        let (lat, lng) = s.split_once(',').ok_or_else(|| CourierError::InvalidCoordinate {
            message: format!("expected 'lat,lng', got '{}'", s),
        })?;

        let parse = |part: &str, name: &str| -> Result<f64> {
            part.trim()
                .parse::<f64>()
                .map_err(|e| CourierError::InvalidCoordinate {
                    message: format!("{} '{}' is not a number: {}", name, part.trim(), e),
                })
        };

        GeoPoint::new(parse(lat, "latitude")?, parse(lng, "longitude")?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficCondition {
    Peak,
    Normal,
    Light,
}

impl fmt::Display for TrafficCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrafficCondition::Peak => "peak",
            TrafficCondition::Normal => "normal",
            TrafficCondition::Light => "light",
        };
        f.write_str(name)
    }
}

/// Extra handling time added on top of the driving time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum BufferKind {
    /// Park and collect the part
    Pickup,
    /// Park and hand over
    Delivery,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EtaUrgency {
    Imminent,
    Approaching,
    EnRoute,
}

impl EtaUrgency {
    pub fn from_minutes(minutes: u32) -> Self {
        if minutes <= 5 {
            EtaUrgency::Imminent
        } else if minutes <= 15 {
            EtaUrgency::Approaching
        } else {
            EtaUrgency::EnRoute
        }
    }

    /// Badge color used by the driver and customer apps.
    pub fn color(&self) -> &'static str {
        match self {
            EtaUrgency::Imminent => "#10b981",
            EtaUrgency::Approaching => "#f59e0b",
            EtaUrgency::EnRoute => "#6b7280",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtaResult {
    pub arrival: DateTime<FixedOffset>,
    pub duration_minutes: u32,
    pub distance_km: f64,
    pub formatted_eta: String,
    pub countdown_text: String,
    pub traffic: TrafficCondition,
    pub urgency: EtaUrgency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripEta {
    pub to_pickup: EtaResult,
    pub to_delivery: EtaResult,
    pub total_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalAlert {
    pub order_id: String,
    pub threshold_minutes: u32,
    pub eta_minutes: u32,
    pub message: String,
}

/// Reasons a VIN fails validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VinIssue {
    #[error("VIN must be 17 characters (currently {actual})")]
    Length { actual: usize },

    #[error("VIN cannot contain I, O, or Q (found '{character}' at position {position})")]
    ForbiddenCharacter { position: usize, character: char },

    #[error("VIN contains invalid character '{character}' at position {position}")]
    InvalidCharacter { position: usize, character: char },

    #[error("VIN check digit is '{found}' but the checksum expects '{expected}'")]
    CheckDigit { expected: char, found: char },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeSource {
    Local,
    Nhtsa,
}

impl fmt::Display for DecodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeSource::Local => f.write_str("local"),
            DecodeSource::Nhtsa => f.write_str("nhtsa"),
        }
    }
}

/// How the manufacturer code was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WmiMatch {
    Exact,
    /// Only the first two characters matched a known code.
    Partial,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedVin {
    pub make: String,
    pub model: String,
    pub year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub source: DecodeSource,
    pub wmi_match: WmiMatch,
}

impl DecodedVin {
    pub const UNKNOWN_MODEL: &'static str = "Unknown Model";

    pub fn is_low_confidence(&self) -> bool {
        self.wmi_match == WmiMatch::Partial
    }

    /// e.g. "2019 Toyota Camry"
    pub fn summary(&self) -> String {
        let year = self
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        format!("{} {} {}", year, self.make, self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_geo_point() {
        let p: GeoPoint = "25.2854, 51.5310".parse().unwrap();
        assert_eq!(p.lat, 25.2854);
        assert_eq!(p.lng, 51.5310);
    }

    #[test]
    fn test_geo_point_rejects_out_of_range() {
        assert!(GeoPoint::new(91.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -180.5).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!("25.28".parse::<GeoPoint>().is_err());
        assert!("north,51.5".parse::<GeoPoint>().is_err());
    }

    #[test]
    fn test_urgency_buckets() {
        assert_eq!(EtaUrgency::from_minutes(5), EtaUrgency::Imminent);
        assert_eq!(EtaUrgency::from_minutes(6), EtaUrgency::Approaching);
        assert_eq!(EtaUrgency::from_minutes(15), EtaUrgency::Approaching);
        assert_eq!(EtaUrgency::from_minutes(16), EtaUrgency::EnRoute);
        assert_eq!(EtaUrgency::EnRoute.color(), "#6b7280");
    }

    #[test]
    fn test_decoded_summary() {
        let decoded = DecodedVin {
            make: "Toyota".to_string(),
            model: "Camry".to_string(),
            year: None,
            body_type: None,
            engine_size: None,
            fuel_type: None,
            drive_type: None,
            transmission: None,
            country: Some("Japan".to_string()),
            source: DecodeSource::Local,
            wmi_match: WmiMatch::Partial,
        };
        assert_eq!(decoded.summary(), "Unknown Toyota Camry");
        assert!(decoded.is_low_confidence());
    }
}
