use crate::domain::model::GeoPoint;
use crate::domain::ports::PositionSource;
use crate::utils::error::Result;
use serde::Deserialize;
use std::collections::VecDeque;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct TrackRow {
    lat: f64,
    lng: f64,
}

/// Replays a recorded driver track (`lat,lng` CSV), one point per tick.
#[derive(Debug, Clone, Default)]
pub struct TrackReplay {
    points: VecDeque<GeoPoint>,
}

impl TrackReplay {
    pub fn from_points(points: impl IntoIterator<Item = GeoPoint>) -> Self {
        Self {
            points: points.into_iter().collect(),
        }
    }

    pub fn from_reader<R: Read>(input: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(input);
        let mut points = VecDeque::new();

        for row in reader.deserialize::<TrackRow>() {
            let row = row?;
            points.push_back(GeoPoint::new(row.lat, row.lng)?);
        }

        tracing::debug!("Loaded track with {} points", points.len());
        Ok(Self { points })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn remaining(&self) -> usize {
        self.points.len()
    }
}

impl PositionSource for TrackReplay {
    fn next_position(&mut self) -> Option<GeoPoint> {
        self.points.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_points_in_order() {
        let mut track = TrackReplay::from_reader("lat,lng\n25.30,51.50\n25.29,51.52\n".as_bytes()).unwrap();
        assert_eq!(track.remaining(), 2);
        assert_eq!(track.next_position().map(|p| p.lat), Some(25.30));
        assert_eq!(track.next_position().map(|p| p.lng), Some(51.52));
        assert!(track.next_position().is_none());
    }

    #[test]
    fn test_rejects_out_of_range_point() {
        assert!(TrackReplay::from_reader("lat,lng\n125.0,51.5\n".as_bytes()).is_err());
        assert!(TrackReplay::from_reader("lat,lng\nabc,51.5\n".as_bytes()).is_err());
    }
}
