use crate::core::vin::{validate_vin_format, VIN_LENGTH};
use crate::core::vin_tables;
use crate::domain::model::{DecodeSource, DecodedVin, WmiMatch};
use crate::domain::ports::VinDecoder;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Offline decode from the built-in tables.
///
/// The manufacturer is matched on the full WMI first, then on its first two
/// characters. Years outside 2010-2039 share codes with the 30-year cycle
/// before them and come out wrong; nothing here can tell the difference.
pub fn decode_vin_locally(vin: &str) -> Option<DecodedVin> {
    let chars: Vec<char> = vin.chars().map(|c| c.to_ascii_uppercase()).collect();
    if chars.len() != VIN_LENGTH {
        return None;
    }

    let wmi: String = chars[..3].iter().collect();
    let prefix: String = chars[..2].iter().collect();

    let (manufacturer, wmi_match) = match vin_tables::manufacturer_exact(&wmi) {
        Some(found) => (found, WmiMatch::Exact),
        None => {
            let found = vin_tables::manufacturer_by_prefix(&prefix)?;
            tracing::debug!("WMI {} unknown, using {} by prefix", wmi, found.wmi);
            (found, WmiMatch::Partial)
        }
    };

    let model = vin_tables::model_name(manufacturer.make, chars[4])
        .unwrap_or(DecodedVin::UNKNOWN_MODEL);

    Some(DecodedVin {
        make: manufacturer.make.to_string(),
        model: model.to_string(),
        year: vin_tables::model_year(chars[9]),
        body_type: None,
        engine_size: None,
        fuel_type: None,
        drive_type: None,
        transmission: None,
        country: Some(manufacturer.country.to_string()),
        source: DecodeSource::Local,
        wmi_match,
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalVinDecoder;

#[async_trait]
impl VinDecoder for LocalVinDecoder {
    async fn decode(&self, vin: &str) -> Result<Option<DecodedVin>> {
        Ok(decode_vin_locally(vin))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// Tries `primary`, then `secondary` when the primary fails or has no answer.
pub struct FallbackVinDecoder<P, S> {
    primary: P,
    secondary: S,
}

impl<P: VinDecoder, S: VinDecoder> FallbackVinDecoder<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl<P: VinDecoder, S: VinDecoder> VinDecoder for FallbackVinDecoder<P, S> {
    async fn decode(&self, vin: &str) -> Result<Option<DecodedVin>> {
        match self.primary.decode(vin).await {
            Ok(Some(decoded)) => return Ok(Some(decoded)),
            Ok(None) => tracing::warn!(
                "{} decoder did not recognise {}, falling back to {}",
                self.primary.name(),
                vin,
                self.secondary.name()
            ),
            Err(e) => tracing::warn!(
                "{} decoder failed for {}: {}; falling back to {}",
                self.primary.name(),
                vin,
                e,
                self.secondary.name()
            ),
        }

        self.secondary.decode(vin).await
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}

/// Checks the VIN structure, then decodes it.
///
/// The check digit is not enforced, so VINs from markets that don't use it
/// still decode.
pub async fn decode_vin<D: VinDecoder + ?Sized>(decoder: &D, vin: &str) -> Result<Option<DecodedVin>> {
    validate_vin_format(vin)?;
    let normalized = vin.to_ascii_uppercase();
    decoder.decode(&normalized).await
}
