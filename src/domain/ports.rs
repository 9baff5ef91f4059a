use crate::domain::model::{DecodedVin, GeoPoint};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Turns a VIN into a vehicle description.
///
/// `Ok(None)` means the decoder ran but did not recognise the VIN; `Err` means
/// the decoder itself failed (network, payload, ...).
#[async_trait]
pub trait VinDecoder: Send + Sync {
    async fn decode(&self, vin: &str) -> Result<Option<DecodedVin>>;

    fn name(&self) -> &'static str;
}

/// A feed of driver positions, one per polling tick.
pub trait PositionSource: Send {
    fn next_position(&mut self) -> Option<GeoPoint>;
}
