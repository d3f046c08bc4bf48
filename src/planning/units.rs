use std::collections::BTreeMap;

use chrono::NaiveTime;
use tracing::warn;

use crate::config::constant::NO_DEADLINE_MINUTES;
use crate::domain::constraints::ParcelConstraints;
use crate::domain::types::{ParcelId, Parcels, VehicleId};
use crate::utils::minutes_of_day;

/// Atomic planning unit: a delivery group or a single parcel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadUnit {
    pub ids: Vec<ParcelId>,
    /// Minute of day of the tightest deadline, `NO_DEADLINE_MINUTES` if none.
    pub earliest_deadline: u32,
    pub pinned: Option<VehicleId>,
    pub gate: Option<NaiveTime>,
}

impl LoadUnit {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn first_id(&self) -> ParcelId {
        self.ids.first().copied().unwrap_or_default()
    }

    pub fn has_deadline(&self) -> bool {
        self.earliest_deadline != NO_DEADLINE_MINUTES
    }

    /// Cannot leave the hub at `start`.
    pub fn is_gated_after(&self, start: NaiveTime) -> bool {
        self.gate.is_some_and(|gate| gate > start)
    }

    /// Sort key: tightest deadline first, then lowest id.
    pub fn urgency(&self) -> (u32, ParcelId) {
        (self.earliest_deadline, self.first_id())
    }
}

pub fn build_units(parcels: &Parcels, constraints: &ParcelConstraints) -> Vec<LoadUnit> {
    constraints
        .groups
        .iter()
        .map(|group| {
            let ids: Vec<ParcelId> = group.iter().copied().collect();

            let earliest_deadline = ids
                .iter()
                .filter_map(|id| parcels.get(id).and_then(|p| p.deadline))
                .map(minutes_of_day)
                .min()
                .unwrap_or(NO_DEADLINE_MINUTES);

            let pins: Vec<VehicleId> = ids
                .iter()
                .filter_map(|id| constraints.restrictions.get(id).copied())
                .collect();
            let pinned = pins.iter().min().copied();
            if pins.iter().any(|v| Some(*v) != pinned) {
                warn!("Delivery group {:?} is pinned to several vehicles {:?}; using {:?}", ids, pins, pinned);
            }

            let gate = ids.iter().filter_map(|id| constraints.gate(*id)).max();

            LoadUnit {
                ids,
                earliest_deadline,
                pinned,
                gate,
            }
        })
        .collect()
}

/// Which unit each parcel belongs to.
pub fn unit_index(units: &[LoadUnit]) -> BTreeMap<ParcelId, usize> {
    units
        .iter()
        .enumerate()
        .flat_map(|(ix, unit)| unit.ids.iter().map(move |id| (*id, ix)))
        .collect()
}
