use crate::domain::model::ArrivalAlert;
use crate::utils::error::{CourierError, Result};
use crate::utils::validation::{validate_positive_number, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    pub thresholds: Vec<u32>,
    /// An alert for threshold `t` fires while `t - window < eta <= t`.
    pub window_minutes: u32,
    /// Dedup keys are dropped wholesale once this many are tracked.
    pub max_tracked: usize,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            thresholds: vec![15, 10, 5],
            window_minutes: 2,
            max_tracked: 1000,
        }
    }
}

impl Validate for AlertSettings {
    fn validate(&self) -> Result<()> {
        validate_positive_number("eta.alerts.window_minutes", self.window_minutes as usize, 1)?;
        validate_positive_number("eta.alerts.max_tracked", self.max_tracked, 1)?;
        if self.thresholds.iter().any(|t| *t == 0) {
            return Err(CourierError::InvalidConfigValueError {
                field: "eta.alerts.thresholds".to_string(),
                value: format!("{:?}", self.thresholds),
                reason: "Thresholds must be at least 1 minute".to_string(),
            });
        }
        Ok(())
    }
}

/// "Driver arriving soon" notifications, once per order and threshold.
#[derive(Debug, Default)]
pub struct ArrivalAlerts {
    settings: AlertSettings,
    sent: HashSet<(String, u32)>,
}

impl ArrivalAlerts {
    pub fn new(settings: AlertSettings) -> Self {
        Self {
            settings,
            sent: HashSet::new(),
        }
    }

    /// Returns the alerts that became due for this ETA reading.
    pub fn check(&mut self, order_id: &str, eta_minutes: u32) -> Vec<ArrivalAlert> {
        let mut due = Vec::new();

        for &threshold in &self.settings.thresholds {
            let lower = threshold.saturating_sub(self.settings.window_minutes);
            let in_window = eta_minutes <= threshold && eta_minutes > lower;
            if !in_window {
                continue;
            }

            if !self.sent.insert((order_id.to_string(), threshold)) {
                continue;
            }

            tracing::info!(
                "Arrival alert for order {}: threshold {} min, ETA {} min",
                order_id,
                threshold,
                eta_minutes
            );

            due.push(ArrivalAlert {
                order_id: order_id.to_string(),
                threshold_minutes: threshold,
                eta_minutes,
                message: format!(
                    "Your driver will arrive in approximately {} minutes",
                    threshold
                ),
            });
        }

        if self.sent.len() > self.settings.max_tracked {
            tracing::debug!("Clearing {} tracked arrival alerts", self.sent.len());
            self.sent.clear();
        }

        due
    }

    pub fn tracked(&self) -> usize {
        self.sent.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_inside_window_once() {
        let mut alerts = ArrivalAlerts::default();

        let first = alerts.check("order-1", 15);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].threshold_minutes, 15);

        // still in the 15-minute window, already sent
        assert!(alerts.check("order-1", 14).is_empty());
        // between windows
        assert!(alerts.check("order-1", 12).is_empty());

        let ten = alerts.check("order-1", 9);
        assert_eq!(ten.len(), 1);
        assert_eq!(ten[0].threshold_minutes, 10);
        assert_eq!(
            ten[0].message,
            "Your driver will arrive in approximately 10 minutes"
        );
    }

    #[test]
    fn test_window_lower_bound_is_exclusive() {
        let mut alerts = ArrivalAlerts::default();
        assert!(alerts.check("order-1", 13).is_empty());
        assert!(alerts.check("order-1", 3).is_empty());
        assert_eq!(alerts.check("order-1", 4).len(), 1);
    }

    #[test]
    fn test_orders_are_independent() {
        let mut alerts = ArrivalAlerts::default();
        assert_eq!(alerts.check("a", 5).len(), 1);
        assert_eq!(alerts.check("b", 5).len(), 1);
        assert_eq!(alerts.tracked(), 2);
    }

    #[test]
    fn test_clears_when_over_capacity() {
        let mut alerts = ArrivalAlerts::new(AlertSettings {
            max_tracked: 2,
            ..AlertSettings::default()
        });
        alerts.check("a", 5);
        alerts.check("b", 5);
        assert_eq!(alerts.tracked(), 2);
        alerts.check("c", 5);
        assert_eq!(alerts.tracked(), 0);
    }

    #[test]
    fn test_settings_validation() {
        assert!(AlertSettings::default().validate().is_ok());
        let bad = AlertSettings {
            thresholds: vec![0],
            ..AlertSettings::default()
        };
        assert!(bad.validate().is_err());
    }
}
