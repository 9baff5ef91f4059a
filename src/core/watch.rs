use crate::core::eta::EtaEstimator;
use crate::core::eta_alerts::ArrivalAlerts;
use crate::domain::model::{ArrivalAlert, BufferKind, EtaResult, GeoPoint};
use crate::domain::ports::PositionSource;
use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    /// 0 disables waiting between ticks.
    pub poll_interval_seconds: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WatchTick {
    pub tick: usize,
    pub position: GeoPoint,
    pub eta: EtaResult,
    pub alerts: Vec<ArrivalAlert>,
}

type Clock = Box<dyn Fn() -> DateTime<FixedOffset> + Send + Sync>;

/// Re-estimates the ETA for one order on every position update.
pub struct EtaWatcher<S: PositionSource> {
    estimator: EtaEstimator,
    alerts: ArrivalAlerts,
    source: S,
    order_id: String,
    destination: GeoPoint,
    buffer: BufferKind,
    interval: Duration,
    clock: Clock,
}

impl<S: PositionSource> EtaWatcher<S> {
    pub fn new(
        estimator: EtaEstimator,
        alerts: ArrivalAlerts,
        source: S,
        order_id: impl Into<String>,
        destination: GeoPoint,
    ) -> Self {
        Self {
            estimator,
            alerts,
            source,
            order_id: order_id.into(),
            destination,
            buffer: BufferKind::None,
            interval: Duration::from_secs(WatchSettings::default().poll_interval_seconds),
            clock: Box::new(|| Local::now().fixed_offset()),
        }
    }

    pub fn with_buffer(mut self, buffer: BufferKind) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<FixedOffset> + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    /// Runs until the position source is exhausted.
    pub async fn run<F>(mut self, mut on_tick: F) -> Vec<WatchTick>
    where
        F: FnMut(&WatchTick),
    {
        let mut ticker = if self.interval.is_zero() {
            None
        } else {
            Some(tokio::time::interval(self.interval))
        };
        let mut history = Vec::new();

        tracing::info!(
            "Watching order {} towards {} (every {:?})",
            self.order_id,
            self.destination,
            self.interval
        );

        loop {
            if let Some(ticker) = ticker.as_mut() {
                ticker.tick().await;
            }

            let Some(position) = self.source.next_position() else {
                break;
            };

            let now = (self.clock)();
            let eta = self
                .estimator
                .estimate_at(&position, &self.destination, self.buffer, now);
            let alerts = self.alerts.check(&self.order_id, eta.duration_minutes);

            let tick = WatchTick {
                tick: history.len() + 1,
                position,
                eta,
                alerts,
            };
            tracing::debug!(
                "Tick {}: {} ({} km)",
                tick.tick,
                tick.eta.countdown_text,
                tick.eta.distance_km
            );

            on_tick(&tick);
            history.push(tick);
        }

        tracing::info!("Position feed ended after {} ticks", history.len());
        history
    }
}
