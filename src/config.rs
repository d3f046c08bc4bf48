use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;

use chrono::NaiveTime;
use dotenv::dotenv;
use tracing::info;

use crate::domain::types::{Address, ParcelId};
use crate::error::{DispatchError, DispatchResult};
use crate::utils::{clock, parse_clock_label};

pub mod constant {
    pub const HUB: usize = 0;
    pub const FLEET_SIZE: usize = 3;
    pub const VEHICLE_CAPACITY: usize = 16;
    pub const SPEED_MPH: f64 = 18.0;

    // (hour, minute) of day
    pub const START_TIME: (u32, u32) = (8, 0);
    pub const DEFAULT_DELAY_GATE: (u32, u32) = (9, 5);
    pub const CORRECTION_TIME: (u32, u32) = (10, 20);
    pub const LATE_GATE_THRESHOLD: (u32, u32) = (10, 0);
    pub const EARLY_DEADLINE: (u32, u32) = (10, 30);
    /// Times of day the binary prints a parcel status table for.
    pub const STATUS_CHECKPOINTS: [(u32, u32); 3] = [(8, 35), (9, 35), (12, 3)];

    pub const NO_DEADLINE_MINUTES: u32 = 9999;
    pub const LATE_PENALTY_PER_MINUTE: f64 = 5.0;
    pub const TWO_OPT_MOVE_LIMIT: usize = 32;
    pub const TWO_OPT_MIN_STOPS: usize = 4;
    pub const IMPROVEMENT_EPSILON: f64 = 1e-9;

    pub const PACKAGES_CSV_PATH: &str = "data/packages.csv";
    pub const DISTANCES_CSV_PATH: &str = "data/distances.csv";
    pub const REPORT_CSV_PATH: &str = "deliveries.csv";
    pub const SUMMARY_JSON_PATH: &str = "day_summary.json";

    pub const SEED: u64 = 64;
    pub const FIXTURE_LOCATION_COUNT: usize = 27;
    pub const FIXTURE_PARCEL_COUNT: u32 = 36;
}

/// Knobs of a single operating day.
#[derive(Debug, Clone)]
pub struct DayConfig {
    pub start_time: NaiveTime,
    pub speed_mph: f64,
    pub capacity: usize,
    /// Gate used for "delayed" notes that carry no readable time.
    pub default_delay_gate: NaiveTime,
    /// When corrected addresses become known.
    pub correction_time: NaiveTime,
    /// Gated units at or after this time are moved straight to the last vehicle.
    pub late_gate_threshold: NaiveTime,
    /// Deadlines at or before this time are rescued from vehicle 2.
    pub early_deadline: NaiveTime,
    pub late_penalty_per_minute: f64,
    pub two_opt_move_limit: usize,
    /// Replacement addresses for "wrong address" parcels whose note does not carry one.
    pub address_fixes: BTreeMap<ParcelId, Address>,
}

impl Default for DayConfig {
    fn default() -> Self {
        let mut address_fixes = BTreeMap::new();
        address_fixes.insert(
            9,
            Address {
                street: "410 S State St".to_string(),
                city: "Salt Lake City".to_string(),
                zip: "84111".to_string(),
            },
        );

        Self {
            start_time: clock(constant::START_TIME),
            speed_mph: constant::SPEED_MPH,
            capacity: constant::VEHICLE_CAPACITY,
            default_delay_gate: clock(constant::DEFAULT_DELAY_GATE),
            correction_time: clock(constant::CORRECTION_TIME),
            late_gate_threshold: clock(constant::LATE_GATE_THRESHOLD),
            early_deadline: clock(constant::EARLY_DEADLINE),
            late_penalty_per_minute: constant::LATE_PENALTY_PER_MINUTE,
            two_opt_move_limit: constant::TWO_OPT_MOVE_LIMIT,
            address_fixes,
        }
    }
}

impl DayConfig {
    /// Defaults overridden by `DISPATCH_*` variables from the environment or `.env`.
    pub fn from_env() -> DispatchResult<Self> {
        dotenv().ok();
        let mut config = Self::default();

        if let Some(speed) = env_setting::<f64>("DISPATCH_SPEED_MPH")? {
            config.speed_mph = speed;
        }
        if let Some(capacity) = env_setting::<usize>("DISPATCH_CAPACITY")? {
            config.capacity = capacity;
        }
        if let Ok(raw) = env::var("DISPATCH_START_TIME") {
            config.start_time = parse_clock_label(&raw).ok_or(DispatchError::InvalidSetting {
                name: "DISPATCH_START_TIME",
                value: raw,
            })?;
        }

        config.validate()?;
        info!(
            "Day config: start {}, {} mph, capacity {}",
            config.start_time.format("%H:%M"),
            config.speed_mph,
            config.capacity
        );
        Ok(config)
    }

    pub fn validate(&self) -> DispatchResult<()> {
        if !(self.speed_mph.is_finite() && self.speed_mph > 0.0) {
            return Err(DispatchError::InvalidSetting {
                name: "speed_mph",
                value: self.speed_mph.to_string(),
            });
        }
        if self.capacity == 0 {
            return Err(DispatchError::InvalidSetting {
                name: "capacity",
                value: self.capacity.to_string(),
            });
        }
        Ok(())
    }
}

/// Where the binary reads its inputs and writes its reports.
#[derive(Debug, Clone)]
pub struct InputConfig {
    pub packages_csv: String,
    pub distances_csv: String,
    pub report_csv: String,
    pub summary_json: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            packages_csv: constant::PACKAGES_CSV_PATH.to_string(),
            distances_csv: constant::DISTANCES_CSV_PATH.to_string(),
            report_csv: constant::REPORT_CSV_PATH.to_string(),
            summary_json: constant::SUMMARY_JSON_PATH.to_string(),
        }
    }
}

impl InputConfig {
    pub fn from_env() -> Self {
        dotenv().ok();
        let defaults = Self::default();
        Self {
            packages_csv: env::var("DISPATCH_PACKAGES_CSV").unwrap_or(defaults.packages_csv),
            distances_csv: env::var("DISPATCH_DISTANCES_CSV").unwrap_or(defaults.distances_csv),
            report_csv: env::var("DISPATCH_REPORT_CSV").unwrap_or(defaults.report_csv),
            summary_json: env::var("DISPATCH_SUMMARY_JSON").unwrap_or(defaults.summary_json),
        }
    }
}

fn env_setting<T: FromStr>(name: &'static str) -> DispatchResult<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| DispatchError::InvalidSetting { name, value: raw }),
        Err(_) => Ok(None),
    }
}
