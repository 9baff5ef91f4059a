pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::Cli;
pub use crate::config::TomlConfig;

pub use crate::adapters::nhtsa::NhtsaVinDecoder;
pub use crate::core::eta::{calculate_eta, calculate_eta_at, format_countdown, EtaEstimator};
pub use crate::core::geo::calculate_distance;
pub use crate::core::vin::{cleanup_vin, is_valid_vin, validate_vin, Vin};
pub use crate::core::vin_decode::{decode_vin_locally, FallbackVinDecoder, LocalVinDecoder};
pub use crate::domain::model::{BufferKind, DecodedVin, EtaResult, GeoPoint, VinIssue};
pub use crate::utils::error::{CourierError, Result};
