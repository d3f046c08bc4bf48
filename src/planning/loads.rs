use std::collections::BTreeMap;

use itertools::Itertools;

use super::units::LoadUnit;
use crate::domain::types::{ParcelId, VehicleId};

/// Working per-vehicle parcel lists while a plan is being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleLoads {
    lists: Vec<Vec<ParcelId>>,
    capacity: usize,
}

impl VehicleLoads {
    pub fn new(fleet_size: usize, capacity: usize) -> Self {
        Self {
            lists: vec![vec![]; fleet_size],
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Vehicle that takes whatever nobody else can.
    pub fn last(&self) -> VehicleId {
        self.lists.len()
    }

    pub fn contains_vehicle(&self, vehicle: VehicleId) -> bool {
        (1..=self.lists.len()).contains(&vehicle)
    }

    pub fn list(&self, vehicle: VehicleId) -> &[ParcelId] {
        &self.lists[vehicle - 1]
    }

    pub fn len(&self, vehicle: VehicleId) -> usize {
        self.list(vehicle).len()
    }

    pub fn free(&self, vehicle: VehicleId) -> usize {
        self.capacity.saturating_sub(self.len(vehicle))
    }

    pub fn fits(&self, vehicle: VehicleId, unit: &LoadUnit) -> bool {
        self.len(vehicle) + unit.len() <= self.capacity
    }

    /// Load `unit` only if it fits.
    pub fn try_push(&mut self, vehicle: VehicleId, unit: &LoadUnit) -> bool {
        if !self.fits(vehicle, unit) {
            return false;
        }
        self.push(vehicle, unit);
        true
    }

    /// Load `unit` regardless of capacity; finalisation rejects any overrun.
    pub fn push(&mut self, vehicle: VehicleId, unit: &LoadUnit) {
        self.lists[vehicle - 1].extend(&unit.ids);
    }

    pub fn remove(&mut self, vehicle: VehicleId, unit: &LoadUnit) {
        self.lists[vehicle - 1].retain(|id| !unit.ids.contains(id));
    }

    pub fn holds(&self, vehicle: VehicleId, unit: &LoadUnit) -> bool {
        self.list(vehicle).iter().any(|id| unit.ids.contains(id))
    }

    /// Distinct units on a vehicle, in loading order.
    pub fn units_on(&self, vehicle: VehicleId, index: &BTreeMap<ParcelId, usize>) -> Vec<usize> {
        self.list(vehicle)
            .iter()
            .filter_map(|id| index.get(id).copied())
            .unique()
            .collect()
    }

    pub fn into_lists(self) -> Vec<Vec<ParcelId>> {
        self.lists
    }
}
