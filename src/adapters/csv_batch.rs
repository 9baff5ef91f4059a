use crate::core::vin::is_valid_vin;
use crate::core::vin_decode::decode_vin;
use crate::domain::ports::VinDecoder;
use crate::utils::error::{CourierError, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

#[derive(Debug, Deserialize)]
struct InputRow {
    vin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchRow {
    pub vin: String,
    pub valid_checksum: bool,
    pub make: String,
    pub model: String,
    pub year: String,
    pub country: String,
    pub source: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub decoded: usize,
    pub failed: usize,
}

/// Decodes every `vin` in the input CSV and writes one output row per input row.
pub async fn decode_csv<R, W, D>(input: R, output: W, decoder: &D) -> Result<BatchSummary>
where
    R: Read,
    W: Write,
    D: VinDecoder + ?Sized,
{
    let mut reader = csv::Reader::from_reader(input);
    let mut writer = csv::Writer::from_writer(output);
    let mut summary = BatchSummary::default();

    for record in reader.deserialize::<InputRow>() {
        let vin = record?.vin.trim().to_ascii_uppercase();
        summary.total += 1;

        let mut row = BatchRow {
            valid_checksum: is_valid_vin(&vin),
            vin: vin.clone(),
            ..BatchRow::default()
        };

        match decode_vin(decoder, &vin).await {
            Ok(Some(decoded)) => {
                summary.decoded += 1;
                row.year = decoded.year.map(|y| y.to_string()).unwrap_or_default();
                row.make = decoded.make;
                row.model = decoded.model;
                row.country = decoded.country.unwrap_or_default();
                row.source = decoded.source.to_string();
            }
            Ok(None) => {
                summary.failed += 1;
                row.error = "Unknown manufacturer".to_string();
            }
            Err(CourierError::InvalidVin(issue)) => {
                summary.failed += 1;
                row.error = issue.to_string();
            }
            Err(e) => return Err(e),
        }

        writer.serialize(&row)?;
    }

    writer.flush()?;
    tracing::info!(
        "Batch decoded {} of {} VINs ({} failed)",
        summary.decoded,
        summary.total,
        summary.failed
    );
    Ok(summary)
}
