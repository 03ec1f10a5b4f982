//! Runtime configuration parsed from environment variables.
//!
//! `.env` is loaded by `main` before [`Config::from_env`] runs. Command-line
//! flags override individual fields afterwards.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use designer::consts::{DEFAULT_ROW_SPACING, DEFAULT_ROW_TOLERANCE, DEFAULT_SEAT_SIZE, DEFAULT_SEAT_SPACING};
use designer::input::DrawSettings;
use uuid::Uuid;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_TABLE_SEATS: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the layout store; `None` runs local-only.
    pub store_url: Option<String>,
    pub layout_id: Option<Uuid>,
    pub request_timeout_secs: u64,
    pub seat_size: f64,
    pub seat_spacing: f64,
    pub row_spacing: f64,
    pub table_seats: usize,
    pub recalc_tolerance: f64,
}

impl Config {
    /// Build config from environment variables.
    ///
    /// All optional:
    /// - `SEATPLAN_STORE_URL`: store base URL (autosave disabled when absent)
    /// - `SEATPLAN_LAYOUT_ID`: layout to fetch and patch
    /// - `SEATPLAN_REQUEST_TIMEOUT_SECS`: default 10
    /// - `SEATPLAN_SEAT_SIZE`, `SEATPLAN_SEAT_SPACING`, `SEATPLAN_ROW_SPACING`: default 15 / 20 / 20
    /// - `SEATPLAN_TABLE_SEATS`: default 8
    /// - `SEATPLAN_RECALC_TOLERANCE`: default 15
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            store_url: env_string("SEATPLAN_STORE_URL").map(|url| url.trim_end_matches('/').to_string()),
            layout_id: env_string("SEATPLAN_LAYOUT_ID").and_then(|v| v.parse().ok()),
            request_timeout_secs: env_parse("SEATPLAN_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            seat_size: env_parse("SEATPLAN_SEAT_SIZE", DEFAULT_SEAT_SIZE),
            seat_spacing: env_parse("SEATPLAN_SEAT_SPACING", DEFAULT_SEAT_SPACING),
            row_spacing: env_parse("SEATPLAN_ROW_SPACING", DEFAULT_ROW_SPACING),
            table_seats: env_parse("SEATPLAN_TABLE_SEATS", DEFAULT_TABLE_SEATS),
            recalc_tolerance: env_parse("SEATPLAN_RECALC_TOLERANCE", DEFAULT_ROW_TOLERANCE),
        }
    }

    /// Generation settings handed to the editor.
    #[must_use]
    pub fn draw_settings(&self) -> DrawSettings {
        DrawSettings {
            seat_size: self.seat_size,
            seat_spacing: self.seat_spacing,
            row_spacing: self.row_spacing,
            table_seats: self.table_seats,
            row_tolerance: self.recalc_tolerance,
            ..DrawSettings::default()
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
