use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveTime;

use super::types::{Address, ParcelId, VehicleId};

/// Earliest time each gated parcel may leave the hub.
pub type TimeGates = BTreeMap<ParcelId, NaiveTime>;

/// Parcels that must ride the same vehicle.
pub type DeliveryGroup = BTreeSet<ParcelId>;

/// Parcels pinned to one vehicle.
pub type VehicleRestrictions = BTreeMap<ParcelId, VehicleId>;

#[derive(Debug, Clone, PartialEq)]
pub struct AddressCorrection {
    pub parcel_id: ParcelId,
    pub effective_at: NaiveTime,
    pub address: Address,
}

/// Everything the parser could read out of the parcel notes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParcelConstraints {
    pub gates: TimeGates,
    pub corrections: Vec<AddressCorrection>,
    pub restrictions: VehicleRestrictions,
    /// Partition of every parcel id, singletons included.
    pub groups: Vec<DeliveryGroup>,
}

impl ParcelConstraints {
    pub fn gate(&self, id: ParcelId) -> Option<NaiveTime> {
        self.gates.get(&id).copied()
    }

    /// Latest gate among `ids`, never earlier than `floor`.
    pub fn latest_gate(&self, ids: &[ParcelId], floor: NaiveTime) -> NaiveTime {
        ids.iter()
            .filter_map(|id| self.gate(*id))
            .fold(floor, |latest, gate| latest.max(gate))
    }
}
