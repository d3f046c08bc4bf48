use tracing::{debug, warn};

use super::loads::VehicleLoads;
use super::units::LoadUnit;
use crate::domain::solution::RestrictionOverflow;

/// First-pass assignment: pinned units, then deadline units, then the rest.
pub fn assign_units(units: &[LoadUnit], loads: &mut VehicleLoads) -> Vec<RestrictionOverflow> {
    let overflows = place_pinned(units, loads);

    let mut urgent: Vec<&LoadUnit> = units
        .iter()
        .filter(|u| u.pinned.is_none() && u.has_deadline())
        .collect();
    urgent.sort_by_key(|u| u.urgency());
    for unit in urgent {
        place_urgent(unit, loads);
    }

    let mut normal: Vec<&LoadUnit> = units
        .iter()
        .filter(|u| u.pinned.is_none() && !u.has_deadline())
        .collect();
    normal.sort_by_key(|u| u.first_id());
    for unit in normal {
        place_normal(unit, loads);
    }

    debug!(
        "Initial loads: {:?}",
        (1..=loads.last()).map(|v| loads.len(v)).collect::<Vec<_>>()
    );
    overflows
}

fn place_pinned(units: &[LoadUnit], loads: &mut VehicleLoads) -> Vec<RestrictionOverflow> {
    let mut overflows = vec![];
    for unit in units {
        let Some(pinned) = unit.pinned else { continue };
        if loads.contains_vehicle(pinned) && loads.try_push(pinned, unit) {
            continue;
        }

        let spill = loads.last();
        loads.push(spill, unit);
        warn!(
            "Parcels {:?} are pinned to vehicle {} but were loaded on vehicle {}",
            unit.ids, pinned, spill
        );
        overflows.push(RestrictionOverflow {
            parcel_ids: unit.ids.clone(),
            pinned_to: pinned,
            placed_on: spill,
        });
    }
    overflows
}

/// Deadline units go to whichever of vehicles 1 and 2 has more room.
fn place_urgent(unit: &LoadUnit, loads: &mut VehicleLoads) {
    let first_preferred = loads.free(1) >= loads.free(2) || !loads.fits(2, unit);
    if loads.fits(1, unit) && first_preferred {
        loads.push(1, unit);
    } else if loads.fits(2, unit) {
        loads.push(2, unit);
    } else {
        loads.push(loads.last(), unit);
    }
}

fn place_normal(unit: &LoadUnit, loads: &mut VehicleLoads) {
    if !loads.try_push(1, unit) && !loads.try_push(2, unit) {
        loads.push(loads.last(), unit);
    }
}
