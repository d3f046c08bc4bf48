use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::utils::parse_deadline;

pub type ParcelId = u32;
pub type LocationId = usize;
/// Vehicles are numbered from 1.
pub type VehicleId = usize;

/// Every parcel of the day, keyed by id.
pub type Parcels = BTreeMap<ParcelId, Parcel>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParcelStatus {
    AtDepot,
    EnRoute,
    Delivered,
}

impl fmt::Display for ParcelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ParcelStatus::AtDepot => "AT_DEPOT",
            ParcelStatus::EnRoute => "EN_ROUTE",
            ParcelStatus::Delivered => "DELIVERED",
        };
        f.write_str(label)
    }
}

/// Address a parcel carried until a correction replaced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SupersededAddress {
    pub address: Address,
    pub location_id: LocationId,
    pub until: NaiveTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parcel {
    pub id: ParcelId,
    pub address: Address,
    pub deadline_label: String,
    pub deadline: Option<NaiveTime>,
    pub weight: f64,
    pub note: String,
    pub location_id: LocationId,

    pub status: ParcelStatus,
    pub departed_at: Option<NaiveTime>,
    pub delivered_at: Option<NaiveTime>,
    pub superseded: Option<SupersededAddress>,
}

impl Parcel {
    pub fn new(
        id: ParcelId,
        address: Address,
        deadline_label: &str,
        weight: f64,
        note: &str,
        location_id: LocationId,
    ) -> Self {
        Self {
            id,
            address,
            deadline_label: deadline_label.trim().to_string(),
            deadline: parse_deadline(deadline_label),
            weight,
            note: note.trim().to_string(),
            location_id,
            status: ParcelStatus::AtDepot,
            departed_at: None,
            delivered_at: None,
            superseded: None,
        }
    }

    /// Swap in a corrected address that is known from `effective_at` onwards.
    pub fn apply_correction(&mut self, address: Address, location_id: LocationId, effective_at: NaiveTime) {
        let previous = SupersededAddress {
            address: std::mem::replace(&mut self.address, address),
            location_id: self.location_id,
            until: effective_at,
        };
        self.location_id = location_id;
        // keep the address that was on record before the first correction
        if self.superseded.is_none() {
            self.superseded = Some(previous);
        }
    }

    pub fn location_at(&self, at: NaiveTime) -> LocationId {
        match &self.superseded {
            Some(old) if at < old.until => old.location_id,
            _ => self.location_id,
        }
    }

    pub fn address_at(&self, at: NaiveTime) -> &Address {
        match &self.superseded {
            Some(old) if at < old.until => &old.address,
            _ => &self.address,
        }
    }

    /// Lifecycle snapshot at a time of day, derived from the departure and delivery stamps.
    pub fn status_at(&self, at: NaiveTime) -> ParcelStatus {
        match (self.departed_at, self.delivered_at) {
            (_, Some(delivered)) if delivered <= at => ParcelStatus::Delivered,
            (Some(departed), _) if departed <= at => ParcelStatus::EnRoute,
            _ => ParcelStatus::AtDepot,
        }
    }

    pub fn mark_departed(&mut self, at: NaiveTime) {
        self.departed_at = Some(at);
        self.status = ParcelStatus::EnRoute;
    }

    pub fn mark_delivered(&mut self, at: NaiveTime) {
        self.delivered_at = Some(at);
        self.status = ParcelStatus::Delivered;
    }

    /// Delivered after its deadline. Undelivered parcels are never late.
    pub fn is_late(&self) -> bool {
        matches!((self.delivered_at, self.deadline), (Some(at), Some(due)) if at > due)
    }
}

/// A vehicle and the route it drives. `stops` never contains the hub legs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub speed_mph: f64,
    pub capacity: usize,
    pub departed_at: NaiveTime,
    pub stops: Vec<LocationId>,
    /// First arrival at each stop of the driven route.
    pub arrivals: Vec<(LocationId, NaiveTime)>,
    pub carried: Vec<ParcelId>,
    pub miles: f64,
    pub returned_at: NaiveTime,
}

impl Vehicle {
    pub fn new(id: VehicleId, speed_mph: f64, capacity: usize, departed_at: NaiveTime, carried: Vec<ParcelId>) -> Self {
        Self {
            id,
            speed_mph,
            capacity,
            departed_at,
            stops: vec![],
            arrivals: vec![],
            carried,
            miles: 0.0,
            returned_at: departed_at,
        }
    }

    /// Full route including the hub at both ends.
    pub fn route(&self, hub: LocationId) -> Vec<LocationId> {
        let mut route = Vec::with_capacity(self.stops.len() + 2);
        route.push(hub);
        route.extend(&self.stops);
        route.push(hub);
        route
    }
}
