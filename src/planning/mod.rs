//! Splits the day's parcels into one load per vehicle.
//!
//! Planning is strictly sequential: the assignment phases and both
//! corrective passes mutate the same per-vehicle lists.

pub mod assign;
pub mod loads;
pub mod rebalance;
pub mod units;

use std::collections::BTreeSet;

use tracing::{debug, info, span, Level};

use crate::config::constant::FLEET_SIZE;
use crate::config::DayConfig;
use crate::domain::constraints::ParcelConstraints;
use crate::domain::solution::RestrictionOverflow;
use crate::domain::types::{ParcelId, Parcels, VehicleId};
use crate::error::{DispatchError, DispatchResult};
use crate::utils::dedupe_preserving_order;
use assign::assign_units;
use loads::VehicleLoads;
use rebalance::{rebalance_gates, rescue_deadlines};
use units::{build_units, unit_index};

/// Final parcel-to-vehicle partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPlan {
    loads: Vec<Vec<ParcelId>>,
    pub overflows: Vec<RestrictionOverflow>,
}

impl LoadPlan {
    pub fn carried(&self, vehicle: VehicleId) -> &[ParcelId] {
        self.loads.get(vehicle.wrapping_sub(1)).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fleet_size(&self) -> usize {
        self.loads.len()
    }
}

pub fn plan_loads(
    parcels: &Parcels,
    constraints: &ParcelConstraints,
    config: &DayConfig,
) -> DispatchResult<LoadPlan> {
    let plan_span = span!(Level::INFO, "plan_loads", parcels = parcels.len());
    let _guard = plan_span.enter();

    let units = build_units(parcels, constraints);
    let index = unit_index(&units);
    let mut loads = VehicleLoads::new(FLEET_SIZE, config.capacity);

    let overflows = assign_units(&units, &mut loads);
    rebalance_gates(&units, &index, &mut loads, config);
    rescue_deadlines(&units, &index, &mut loads, config);

    let plan = finalize(loads, parcels, overflows)?;
    info!(
        "Planned loads: {:?}",
        (1..=plan.fleet_size()).map(|v| plan.carried(v).len()).collect::<Vec<_>>()
    );
    Ok(plan)
}

/// Every parcel on exactly one vehicle, no vehicle above capacity.
///
/// Overflow records are checked against the final lists: a unit that ended
/// up on its pinned vehicle is no longer an overflow.
fn finalize(
    loads: VehicleLoads,
    parcels: &Parcels,
    overflows: Vec<RestrictionOverflow>,
) -> DispatchResult<LoadPlan> {
    let capacity = loads.capacity();
    let mut lists = loads.into_lists();

    let mut assigned: BTreeSet<ParcelId> = BTreeSet::new();
    for list in lists.iter_mut() {
        let unique: Vec<ParcelId> = dedupe_preserving_order(list)
            .into_iter()
            .filter(|id| parcels.contains_key(id) && !assigned.contains(id))
            .collect();
        assigned.extend(&unique);
        *list = unique;
    }

    if let Some(last) = lists.last_mut() {
        last.extend(parcels.keys().filter(|id| !assigned.contains(*id)));
    }

    for (slot, list) in lists.iter().enumerate() {
        if list.len() > capacity {
            return Err(DispatchError::CapacityExceeded {
                vehicle: slot + 1,
                assigned: list.len(),
                capacity,
            });
        }
    }

    let overflows = overflows
        .into_iter()
        .filter_map(|mut overflow| {
            let first = overflow.parcel_ids.first()?;
            let holder = lists.iter().position(|list| list.contains(first))? + 1;
            if holder == overflow.pinned_to {
                debug!("Parcels {:?} are back on vehicle {}", overflow.parcel_ids, holder);
                return None;
            }
            overflow.placed_on = holder;
            Some(overflow)
        })
        .collect();

    Ok(LoadPlan { loads: lists, overflows })
}
