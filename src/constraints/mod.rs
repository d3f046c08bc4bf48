//! Reads delivery constraints out of free-text parcel notes.
//!
//! Parsing is permissive: a note that matches none of the phrases in
//! [`grammar`] simply carries no constraint.

pub mod grammar;
pub mod union_find;

use tracing::{debug, warn};

use crate::config::DayConfig;
use crate::domain::constraints::{AddressCorrection, ParcelConstraints};
use crate::domain::types::{ParcelId, Parcels};
use grammar::{read_note, NoteDirective};
use union_find::partition;

pub fn parse_constraints(parcels: &Parcels, config: &DayConfig) -> ParcelConstraints {
    let mut constraints = ParcelConstraints::default();
    let mut links: Vec<(ParcelId, ParcelId)> = vec![];

    for (&id, parcel) in parcels {
        for directive in read_note(&parcel.note) {
            match directive {
                NoteDirective::Delayed { until } => {
                    let gate = until.unwrap_or(config.default_delay_gate);
                    raise_gate(&mut constraints, id, gate);
                }
                NoteDirective::WrongAddress { replacement } => {
                    // not routable before the true address is known
                    raise_gate(&mut constraints, id, config.correction_time);
                    match replacement.or_else(|| config.address_fixes.get(&id).cloned()) {
                        Some(address) => constraints.corrections.push(AddressCorrection {
                            parcel_id: id,
                            effective_at: config.correction_time,
                            address,
                        }),
                        None => warn!("Parcel {} has a wrong address but no known replacement", id),
                    }
                }
                NoteDirective::DeliverWith(others) => {
                    for other in others {
                        if parcels.contains_key(&other) {
                            links.push((id, other));
                        } else {
                            debug!("Parcel {} references unknown parcel {}", id, other);
                        }
                    }
                }
                NoteDirective::VehicleOnly(vehicle) => {
                    constraints.restrictions.insert(id, vehicle);
                }
            }
        }
    }

    let ids: Vec<ParcelId> = parcels.keys().copied().collect();
    constraints.groups = partition(&ids, &links);

    for group in constraints.groups.iter().filter(|g| g.len() > 1) {
        let mut locations = group.iter().filter_map(|id| parcels.get(id)).map(|p| p.location_id);
        let first = locations.next();
        if locations.any(|loc| Some(loc) != first) {
            debug!("Delivery group {:?} spans several locations", group);
        }
    }

    debug!(
        "Parsed constraints: {} gates, {} corrections, {} restrictions, {} groups",
        constraints.gates.len(),
        constraints.corrections.len(),
        constraints.restrictions.len(),
        constraints.groups.len()
    );
    constraints
}

fn raise_gate(constraints: &mut ParcelConstraints, id: ParcelId, gate: chrono::NaiveTime) {
    constraints
        .gates
        .entry(id)
        .and_modify(|current| *current = (*current).max(gate))
        .or_insert(gate);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constraints::DeliveryGroup;
    use crate::domain::types::{Address, Parcel};
    use crate::utils::clock;

    fn manifest(notes: &[(ParcelId, &str)]) -> Parcels {
        notes
            .iter()
            .map(|&(id, note)| (id, Parcel::new(id, Address::default(), "EOD", 1.0, note, id as usize)))
            .collect()
    }

    #[test]
    fn collects_every_kind_of_constraint() {
        let parcels = manifest(&[
            (3, "Can only be on truck 2"),
            (6, "Delayed on flight---will not arrive to depot until 9:05 am"),
            (9, "Wrong address listed"),
            (13, ""),
            (14, "Must be delivered with 15, 19"),
            (15, ""),
            (19, ""),
            (25, "Delayed on flight"),
        ]);
        let config = DayConfig::default();

        let c = parse_constraints(&parcels, &config);

        assert_eq!(c.restrictions.get(&3), Some(&2));
        assert_eq!(c.gate(6), Some(clock((9, 5))));
        assert_eq!(c.gate(25), Some(config.default_delay_gate));
        assert_eq!(c.gate(9), Some(clock((10, 20))));
        assert_eq!(c.corrections.len(), 1);
        assert_eq!(c.corrections[0].parcel_id, 9);
        assert_eq!(c.corrections[0].address.street, "410 S State St");
        assert_eq!(c.corrections[0].effective_at, clock((10, 20)));
        assert!(c.groups.contains(&DeliveryGroup::from([14, 15, 19])));
        assert_eq!(c.groups.len(), 6);
    }

    #[test]
    fn wrong_address_without_replacement_still_gates() {
        let parcels = manifest(&[(4, "Wrong address listed")]);
        let c = parse_constraints(&parcels, &DayConfig::default());

        assert_eq!(c.gate(4), Some(clock((10, 20))));
        assert!(c.corrections.is_empty());
    }

    #[test]
    fn later_gate_wins_when_notes_overlap() {
        let parcels = manifest(&[(9, "Delayed until 9:05 am, wrong address listed")]);
        let c = parse_constraints(&parcels, &DayConfig::default());
        assert_eq!(c.gate(9), Some(clock((10, 20))));
    }

    #[test]
    fn latest_gate_never_precedes_the_floor() {
        let parcels = manifest(&[(1, ""), (2, "Delayed until 9:05 am")]);
        let c = parse_constraints(&parcels, &DayConfig::default());
        assert_eq!(c.latest_gate(&[1], clock((8, 0))), clock((8, 0)));
        assert_eq!(c.latest_gate(&[1, 2], clock((8, 0))), clock((9, 5)));
        assert_eq!(c.latest_gate(&[1, 2], clock((10, 0))), clock((10, 0)));
    }
}
