use crate::domain::model::{DecodeSource, DecodedVin, WmiMatch};
use crate::domain::ports::VinDecoder;
use crate::utils::error::{CourierError, Result};
use crate::utils::validation::{validate_positive_number, validate_url, Validate};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_NHTSA_ENDPOINT: &str = "https://vpic.nhtsa.dot.gov/api/vehicles/decodevin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NhtsaSettings {
    pub enabled: bool,
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for NhtsaSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_NHTSA_ENDPOINT.to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Validate for NhtsaSettings {
    fn validate(&self) -> Result<()> {
        validate_url("vin.nhtsa.endpoint", &self.endpoint)?;
        validate_positive_number("vin.nhtsa.timeout_seconds", self.timeout_seconds as usize, 1)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DecodeResponse {
    #[serde(default)]
    results: Vec<DecodeVariable>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DecodeVariable {
    variable: String,
    value: Option<String>,
}

/// Client for the NHTSA vPIC `decodevin` endpoint.
pub struct NhtsaVinDecoder {
    client: reqwest::Client,
    endpoint: String,
}

impl NhtsaVinDecoder {
    pub fn new(settings: &NhtsaSettings) -> Result<Self> {
        settings.validate()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl VinDecoder for NhtsaVinDecoder {
    async fn decode(&self, vin: &str) -> Result<Option<DecodedVin>> {
        let url = format!("{}/{}", self.endpoint, vin);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("format", "json")])
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CourierError::DecodeError {
                message: format!("NHTSA returned HTTP {}", response.status()),
            });
        }

        let body = response.text().await?;
        let payload: DecodeResponse = serde_json::from_str(&body)?;
        Ok(map_decode_response(&payload))
    }

    fn name(&self) -> &'static str {
        "nhtsa"
    }
}

fn map_decode_response(payload: &DecodeResponse) -> Option<DecodedVin> {
    // vPIC 對未知欄位回傳空字串或 null
    let value = |name: &str| -> Option<String> {
        payload
            .results
            .iter()
            .find(|r| r.variable == name)
            .and_then(|r| r.value.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let make = value("Make")?;
    let year = value("Model Year")?;

    let country = value("Plant Country").or_else(|| {
        value("Manufacturer Name")
            .and_then(|name| name.split_whitespace().next().map(str::to_string))
    });

    Some(DecodedVin {
        make,
        model: value("Model").unwrap_or_else(|| "Unknown".to_string()),
        year: year.parse().ok(),
        body_type: value("Body Class"),
        engine_size: value("Displacement (L)").map(|litres| format!("{}L", litres)),
        fuel_type: value("Fuel Type - Primary"),
        drive_type: value("Drive Type"),
        transmission: value("Transmission Style"),
        country,
        source: DecodeSource::Nhtsa,
        wmi_match: WmiMatch::Exact,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> DecodeResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_maps_variables() {
        let response = payload(
            r#"{"Count": 5, "Message": "ok", "SearchCriteria": "VIN:x", "Results": [
                {"Value": "TOYOTA", "ValueId": "448", "Variable": "Make", "VariableId": 26},
                {"Value": "Camry", "ValueId": null, "Variable": "Model", "VariableId": 28},
                {"Value": "2011", "ValueId": null, "Variable": "Model Year", "VariableId": 29},
                {"Value": "2.5", "ValueId": null, "Variable": "Displacement (L)", "VariableId": 13},
                {"Value": "", "ValueId": null, "Variable": "Plant Country", "VariableId": 75},
                {"Value": "TOYOTA MOTOR MANUFACTURING", "ValueId": null, "Variable": "Manufacturer Name", "VariableId": 27}
            ]}"#,
        );

        let decoded = map_decode_response(&response).unwrap();
        assert_eq!(decoded.make, "TOYOTA");
        assert_eq!(decoded.model, "Camry");
        assert_eq!(decoded.year, Some(2011));
        assert_eq!(decoded.engine_size.as_deref(), Some("2.5L"));
        assert_eq!(decoded.country.as_deref(), Some("TOYOTA"));
        assert_eq!(decoded.body_type, None);
        assert_eq!(decoded.source, DecodeSource::Nhtsa);
    }

    #[test]
    fn test_missing_make_or_year_is_no_answer() {
        let response = payload(
            r#"{"Results": [
                {"Value": null, "Variable": "Make"},
                {"Value": "2011", "Variable": "Model Year"}
            ]}"#,
        );
        assert!(map_decode_response(&response).is_none());

        let response = payload(r#"{"Results": [{"Value": "BMW", "Variable": "Make"}]}"#);
        assert!(map_decode_response(&response).is_none());
    }

    #[test]
    fn test_settings_validation() {
        assert!(NhtsaSettings::default().validate().is_ok());
        let bad = NhtsaSettings {
            endpoint: "ftp://example.com".to_string(),
            ..NhtsaSettings::default()
        };
        assert!(bad.validate().is_err());
    }
}
