use std::collections::BTreeMap;

use tracing::debug;

use super::loads::VehicleLoads;
use super::units::LoadUnit;
use crate::config::DayConfig;
use crate::domain::types::ParcelId;

const FIRST: usize = 1;
const SECOND: usize = 2;

/// Keep the first vehicle leaving at the start time.
///
/// Gated units leave vehicle 1: late gates go to the last vehicle, earlier
/// ones to vehicle 2 when it has room. Vehicle 1 is then topped up from the
/// last vehicle with the most urgent ungated units.
pub fn rebalance_gates(
    units: &[LoadUnit],
    index: &BTreeMap<ParcelId, usize>,
    loads: &mut VehicleLoads,
    config: &DayConfig,
) {
    let last = loads.last();

    for ix in loads.units_on(FIRST, index) {
        let unit = &units[ix];
        if !unit.is_gated_after(config.start_time) || unit.pinned == Some(FIRST) {
            continue;
        }

        loads.remove(FIRST, unit);
        let late = unit.gate.is_some_and(|gate| gate >= config.late_gate_threshold);
        if late || !loads.try_push(SECOND, unit) {
            loads.push(last, unit);
        }
        debug!("Moved gated parcels {:?} off vehicle {}", unit.ids, FIRST);
    }

    let mut backfill: Vec<usize> = loads.units_on(last, index);
    backfill.sort_by_key(|&ix| units[ix].urgency());

    for ix in backfill {
        if loads.free(FIRST) == 0 {
            break;
        }
        let unit = &units[ix];
        if unit.is_gated_after(config.start_time) || unit.pinned.is_some_and(|v| v != FIRST) {
            continue;
        }
        if loads.fits(FIRST, unit) {
            loads.remove(last, unit);
            loads.push(FIRST, unit);
            debug!("Back-filled vehicle {} with parcels {:?}", FIRST, unit.ids);
        }
    }
}

/// Move tight-deadline units from vehicle 2 onto vehicle 1.
///
/// Vehicle 2 may leave late, so ungated, unpinned units due at or before the
/// early-deadline threshold ride vehicle 1 instead, making room by sending
/// ungated undated units from vehicle 1 to the last vehicle.
pub fn rescue_deadlines(
    units: &[LoadUnit],
    index: &BTreeMap<ParcelId, usize>,
    loads: &mut VehicleLoads,
    config: &DayConfig,
) {
    let last = loads.last();
    let early = crate::utils::minutes_of_day(config.early_deadline);

    let mut candidates = loads.units_on(SECOND, index);
    candidates.sort_by_key(|&ix| units[ix].urgency());
    let donors = loads.units_on(FIRST, index);

    let movable = |unit: &LoadUnit| {
        !unit.has_deadline() && !unit.is_gated_after(config.start_time) && unit.pinned.is_none()
    };

    for ix in candidates {
        let unit = &units[ix];
        if unit.earliest_deadline > early || unit.pinned.is_some() || unit.is_gated_after(config.start_time) {
            continue;
        }

        for &donor_ix in &donors {
            if loads.free(FIRST) >= unit.len() {
                break;
            }
            let donor = &units[donor_ix];
            if movable(donor) && loads.holds(FIRST, donor) {
                loads.remove(FIRST, donor);
                loads.push(last, donor);
                debug!("Made room on vehicle {} by moving {:?} to vehicle {}", FIRST, donor.ids, last);
            }
        }

        if loads.fits(FIRST, unit) {
            loads.remove(SECOND, unit);
            loads.push(FIRST, unit);
            debug!("Rescued deadline parcels {:?} onto vehicle {}", unit.ids, FIRST);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constant::NO_DEADLINE_MINUTES;
    use crate::planning::units::unit_index;
    use crate::utils::clock;

    fn unit(id: ParcelId, deadline: Option<u32>, gate: Option<(u32, u32)>) -> LoadUnit {
        LoadUnit {
            ids: vec![id],
            earliest_deadline: deadline.unwrap_or(NO_DEADLINE_MINUTES),
            pinned: None,
            gate: gate.map(clock),
        }
    }

    #[test]
    fn gated_units_leave_the_first_vehicle() {
        let units = vec![
            unit(1, None, None),
            unit(2, None, Some((9, 5))),
            unit(3, None, Some((10, 20))),
            unit(4, Some(600), None),
            unit(5, None, None),
        ];
        let index = unit_index(&units);
        let mut loads = VehicleLoads::new(3, 3);
        for ix in [0, 1, 2] {
            loads.push(1, &units[ix]);
        }
        loads.push(3, &units[4]);
        loads.push(3, &units[3]);

        rebalance_gates(&units, &index, &mut loads, &DayConfig::default());

        assert_eq!(loads.list(2), &[2]);
        // back-fill takes the dated unit first
        assert_eq!(loads.list(1), &[1, 4, 5]);
        assert_eq!(loads.list(3), &[3]);
    }

    #[test]
    fn early_gate_spills_to_last_vehicle_when_second_is_full() {
        let units = vec![unit(1, None, Some((9, 5))), unit(2, None, None), unit(3, None, None)];
        let index = unit_index(&units);
        let mut loads = VehicleLoads::new(3, 2);
        loads.push(1, &units[0]);
        loads.push(2, &units[1]);
        loads.push(2, &units[2]);

        rebalance_gates(&units, &index, &mut loads, &DayConfig::default());

        assert!(loads.list(1).is_empty());
        assert_eq!(loads.list(3), &[1]);
    }

    #[test]
    fn tight_deadlines_move_to_the_first_vehicle() {
        let units = vec![
            unit(1, None, None),
            unit(2, Some(9 * 60), None),
            unit(3, Some(10 * 60 + 30), None),
            unit(4, Some(11 * 60), None),
            unit(5, Some(9 * 60), Some((9, 5))),
        ];
        let index = unit_index(&units);
        let mut loads = VehicleLoads::new(3, 2);
        loads.push(1, &units[0]);
        loads.push(1, &units[1]);
        for ix in [2, 3, 4] {
            loads.push(2, &units[ix]);
        }

        rescue_deadlines(&units, &index, &mut loads, &DayConfig::default());

        assert_eq!(loads.list(1), &[2, 3]);
        assert_eq!(loads.list(2), &[4, 5]);
        assert_eq!(loads.list(3), &[1]);
    }
}
