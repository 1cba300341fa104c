//! Due-date scheduler configuration.

use serde::{Deserialize, Serialize};

/// Scheduling configuration for the due-date sweeps.
///
/// Cron expressions use the six-field `sec min hour day month weekday`
/// syntax.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Cron schedule for the upcoming-deadline sweep.
    #[serde(default = "default_upcoming_cron")]
    pub upcoming_cron: String,
    /// Horizon in days for the upcoming-deadline sweep.
    #[serde(default = "default_upcoming_horizon")]
    pub upcoming_horizon_days: i64,
    /// Cron schedule for the urgent-deadline sweep.
    #[serde(default = "default_urgent_cron")]
    pub urgent_cron: String,
    /// Horizon in hours for the urgent-deadline sweep.
    #[serde(default = "default_urgent_horizon")]
    pub urgent_horizon_hours: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            upcoming_cron: default_upcoming_cron(),
            upcoming_horizon_days: default_upcoming_horizon(),
            urgent_cron: default_urgent_cron(),
            urgent_horizon_hours: default_urgent_horizon(),
        }
    }
}

/// Daily at 9 AM.
fn default_upcoming_cron() -> String {
    "0 0 9 * * *".to_string()
}

fn default_upcoming_horizon() -> i64 {
    3
}

/// Every hour on the hour.
fn default_urgent_cron() -> String {
    "0 0 * * * *".to_string()
}

fn default_urgent_horizon() -> i64 {
    24
}
