pub mod eta;
pub mod eta_alerts;
pub mod geo;
pub mod vin;
pub mod vin_decode;
pub mod vin_ocr;
pub mod vin_tables;
pub mod watch;

pub use crate::domain::model::{BufferKind, DecodedVin, EtaResult, GeoPoint, TripEta};
pub use crate::domain::ports::{PositionSource, VinDecoder};
pub use crate::utils::error::Result;
