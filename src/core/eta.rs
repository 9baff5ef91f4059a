use crate::domain::model::{BufferKind, EtaResult, EtaUrgency, GeoPoint, TrafficCondition, TripEta};
use crate::utils::error::{CourierError, Result};
use crate::utils::validation::{validate_range, Validate};
use chrono::{DateTime, Datelike, FixedOffset, Local, TimeZone, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// Average urban driving speeds (km/h) per traffic condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedSettings {
    pub peak_kmh: f64,
    pub normal_kmh: f64,
    pub light_kmh: f64,
}

impl Default for SpeedSettings {
    fn default() -> Self {
        Self {
            peak_kmh: 20.0,
            normal_kmh: 30.0,
            light_kmh: 40.0,
        }
    }
}

/// Minutes added for parking and handing over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferSettings {
    pub pickup_minutes: u32,
    pub delivery_minutes: u32,
}

impl Default for BufferSettings {
    fn default() -> Self {
        Self {
            pickup_minutes: 3,
            delivery_minutes: 2,
        }
    }
}

/// Inclusive hour range, e.g. `[7, 9]` covers 07:00 to 09:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourWindow(pub u32, pub u32);

impl HourWindow {
    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.0 && hour <= self.1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficSettings {
    pub peak_windows: Vec<HourWindow>,
    /// Light traffic from this hour until midnight
    pub light_from_hour: u32,
    /// ...and from midnight through this hour
    pub light_until_hour: u32,
    /// Weekend days without rush hour (Friday in Qatar)
    pub peak_exempt_days: Vec<String>,
}

impl Default for TrafficSettings {
    fn default() -> Self {
        Self {
            peak_windows: vec![HourWindow(7, 9), HourWindow(16, 19)],
            light_from_hour: 22,
            light_until_hour: 5,
            peak_exempt_days: vec!["Fri".to_string()],
        }
    }
}

impl TrafficSettings {
    fn exempt_weekdays(&self) -> Result<Vec<Weekday>> {
        self.peak_exempt_days
            .iter()
            .map(|day| {
                day.parse::<Weekday>()
                    .map_err(|_| CourierError::InvalidConfigValueError {
                        field: "eta.traffic.peak_exempt_days".to_string(),
                        value: day.clone(),
                        reason: "Expected a weekday name such as 'Fri' or 'Friday'".to_string(),
                    })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtaSettings {
    pub speeds: SpeedSettings,
    pub buffers: BufferSettings,
    pub traffic: TrafficSettings,
}

impl Validate for EtaSettings {
    fn validate(&self) -> Result<()> {
        for (field, speed) in [
            ("eta.speeds.peak_kmh", self.speeds.peak_kmh),
            ("eta.speeds.normal_kmh", self.speeds.normal_kmh),
            ("eta.speeds.light_kmh", self.speeds.light_kmh),
        ] {
            if !speed.is_finite() || speed <= 0.0 {
                return Err(CourierError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: speed.to_string(),
                    reason: "Speed must be a positive number".to_string(),
                });
            }
        }

        for window in &self.traffic.peak_windows {
            validate_range("eta.traffic.peak_windows", window.0, 0, 23)?;
            validate_range("eta.traffic.peak_windows", window.1, window.0, 23)?;
        }
        validate_range("eta.traffic.light_from_hour", self.traffic.light_from_hour, 0, 23)?;
        validate_range("eta.traffic.light_until_hour", self.traffic.light_until_hour, 0, 23)?;
        self.traffic.exempt_weekdays()?;

        Ok(())
    }
}

/// Time-of-day ETA estimator.
#[derive(Debug, Clone)]
pub struct EtaEstimator {
    settings: EtaSettings,
    exempt_days: Vec<Weekday>,
}

impl Default for EtaEstimator {
    fn default() -> Self {
        Self {
            settings: EtaSettings::default(),
            exempt_days: vec![Weekday::Fri],
        }
    }
}

impl EtaEstimator {
    pub fn new(settings: EtaSettings) -> Result<Self> {
        settings.validate()?;
        let exempt_days = settings.traffic.exempt_weekdays()?;
        Ok(Self {
            settings,
            exempt_days,
        })
    }

    pub fn settings(&self) -> &EtaSettings {
        &self.settings
    }

    pub fn traffic_condition<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> TrafficCondition {
        let hour = now.hour();
        let traffic = &self.settings.traffic;

        if !self.exempt_days.contains(&now.weekday())
            && traffic.peak_windows.iter().any(|w| w.contains(hour))
        {
            return TrafficCondition::Peak;
        }

        if hour >= traffic.light_from_hour || hour <= traffic.light_until_hour {
            return TrafficCondition::Light;
        }

        TrafficCondition::Normal
    }

    pub fn speed_kmh(&self, condition: TrafficCondition) -> f64 {
        match condition {
            TrafficCondition::Peak => self.settings.speeds.peak_kmh,
            TrafficCondition::Normal => self.settings.speeds.normal_kmh,
            TrafficCondition::Light => self.settings.speeds.light_kmh,
        }
    }

    pub fn buffer_minutes(&self, kind: BufferKind) -> u32 {
        match kind {
            BufferKind::Pickup => self.settings.buffers.pickup_minutes,
            BufferKind::Delivery => self.settings.buffers.delivery_minutes,
            BufferKind::None => 0,
        }
    }

    /// 以指定時間計算 ETA
    pub fn estimate_at(
        &self,
        from: &GeoPoint,
        to: &GeoPoint,
        buffer: BufferKind,
        now: DateTime<FixedOffset>,
    ) -> EtaResult {
        let distance_km = from.distance_to(to);
        let traffic = self.traffic_condition(&now);
        let speed_kmh = self.speed_kmh(traffic);

        let travel_minutes = distance_km / speed_kmh * 60.0;
        let total = (travel_minutes + f64::from(self.buffer_minutes(buffer))).ceil();
        // NaN casts to 0, so this also covers hand-built points with NaN fields
        let duration_minutes = (total as u32).max(1);

        let arrival = now + chrono::Duration::minutes(i64::from(duration_minutes));

        tracing::debug!(
            "ETA {:.2} km at {} km/h ({}) -> {} min",
            distance_km,
            speed_kmh,
            traffic,
            duration_minutes
        );

        EtaResult {
            arrival,
            duration_minutes,
            distance_km: (distance_km * 10.0).round() / 10.0,
            formatted_eta: format_clock_time(&arrival),
            countdown_text: format_countdown(i64::from(duration_minutes)),
            traffic,
            urgency: EtaUrgency::from_minutes(duration_minutes),
        }
    }

    /// 以本地時鐘計算 ETA
    pub fn estimate(&self, from: &GeoPoint, to: &GeoPoint, buffer: BufferKind) -> EtaResult {
        self.estimate_at(from, to, buffer, Local::now().fixed_offset())
    }

    /// Driver -> pickup (pickup buffer), then pickup -> delivery (delivery buffer).
    pub fn estimate_trip_at(
        &self,
        driver: &GeoPoint,
        pickup: &GeoPoint,
        delivery: &GeoPoint,
        now: DateTime<FixedOffset>,
    ) -> TripEta {
        let to_pickup = self.estimate_at(driver, pickup, BufferKind::Pickup, now);
        let to_delivery = self.estimate_at(pickup, delivery, BufferKind::Delivery, now);
        let total_minutes = to_pickup.duration_minutes + to_delivery.duration_minutes;

        TripEta {
            to_pickup,
            to_delivery,
            total_minutes,
        }
    }

    pub fn estimate_trip(&self, driver: &GeoPoint, pickup: &GeoPoint, delivery: &GeoPoint) -> TripEta {
        self.estimate_trip_at(driver, pickup, delivery, Local::now().fixed_offset())
    }
}

/// ETA from raw coordinates with the default profile and the local clock.
pub fn calculate_eta(
    current_lat: f64,
    current_lng: f64,
    dest_lat: f64,
    dest_lng: f64,
    buffer: BufferKind,
) -> Result<EtaResult> {
    calculate_eta_at(
        current_lat,
        current_lng,
        dest_lat,
        dest_lng,
        buffer,
        Local::now().fixed_offset(),
    )
}

pub fn calculate_eta_at(
    current_lat: f64,
    current_lng: f64,
    dest_lat: f64,
    dest_lng: f64,
    buffer: BufferKind,
    now: DateTime<FixedOffset>,
) -> Result<EtaResult> {
    let from = GeoPoint::new(current_lat, current_lng)?;
    let to = GeoPoint::new(dest_lat, dest_lng)?;
    Ok(EtaEstimator::default().estimate_at(&from, &to, buffer, now))
}

/// "Arriving now", "1 min", "12 min", "2h", "1h 5m"
pub fn format_countdown(minutes: i64) -> String {
    if minutes < 1 {
        return "Arriving now".to_string();
    }
    if minutes < 60 {
        return format!("{} min", minutes);
    }

    let hours = minutes / 60;
    let mins = minutes % 60;
    if mins == 0 {
        format!("{}h", hours)
    } else {
        format!("{}h {}m", hours, mins)
    }
}

/// 12 小時制，例如 "3:45 PM"
pub fn format_clock_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%-I:%M %p").to_string()
}
