use chrono::NaiveTime;
use thiserror::Error;

use crate::domain::types::{ParcelId, VehicleId};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed distance table: {0}")]
    MalformedMatrix(String),

    #[error("invalid setting {name}={value}")]
    InvalidSetting { name: &'static str, value: String },

    /// The load plan put more parcels on a vehicle than it can carry.
    #[error("vehicle {vehicle} was planned with {assigned} parcels but holds at most {capacity}")]
    CapacityExceeded {
        vehicle: VehicleId,
        assigned: usize,
        capacity: usize,
    },

    /// A route that would still be driving when the day rolls over.
    #[error("driving {minutes} minutes from {from} runs past midnight")]
    PastMidnight { from: NaiveTime, minutes: i64 },

    #[error("parcel {0} is not in the day's manifest")]
    UnknownParcel(ParcelId),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
