use serde::Serialize;

use super::types::{ParcelId, Vehicle, VehicleId};

/// A restricted unit that did not fit its pinned vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestrictionOverflow {
    pub parcel_ids: Vec<ParcelId>,
    pub pinned_to: VehicleId,
    pub placed_on: VehicleId,
}

/// Result of one operating day.
#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub vehicles: Vec<Vehicle>,
    pub total_miles: f64,
    pub restriction_overflows: Vec<RestrictionOverflow>,
}

impl DaySummary {
    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn vehicle_of(&self, parcel_id: ParcelId) -> Option<VehicleId> {
        self.vehicles
            .iter()
            .find(|v| v.carried.contains(&parcel_id))
            .map(|v| v.id)
    }
}
