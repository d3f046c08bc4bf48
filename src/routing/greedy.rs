use chrono::NaiveTime;
use itertools::Itertools;
use tracing::trace;

use crate::domain::constraints::TimeGates;
use crate::domain::types::{LocationId, ParcelId, Parcels};
use crate::error::DispatchResult;
use crate::evaluation::penalty::lateness_penalty;
use crate::simulation::Trip;
use crate::utils::dedupe_preserving_order;

/// The location picked by one greedy step.
#[derive(Debug, Clone, PartialEq)]
pub struct NextStop {
    pub location: LocationId,
    pub parcel_ids: Vec<ParcelId>,
    pub arrival: NaiveTime,
}

/// Cheapest location to drive to next from `at`.
///
/// Candidates are the locations of `feasible`, in the order they first
/// appear. A location costs its distance plus the lateness penalty of every
/// deadline parcel it serves; ties keep the earlier candidate.
pub fn choose_next_stop(
    trip: &Trip,
    at: LocationId,
    clock: NaiveTime,
    feasible: &[ParcelId],
    load: &Parcels,
    per_minute: f64,
) -> DispatchResult<Option<NextStop>> {
    let candidates = feasible
        .iter()
        .filter_map(|id| load.get(id))
        .map(|parcel| (parcel.location_id, parcel))
        .into_group_map_by(|(location, _)| *location);
    let order: Vec<LocationId> = dedupe_preserving_order(
        &feasible
            .iter()
            .filter_map(|id| load.get(id).map(|p| p.location_id))
            .collect::<Vec<_>>(),
    );

    let mut best: Option<(f64, NextStop)> = None;
    for location in order {
        let members = &candidates[&location];
        let miles = trip.matrix.distance(at, location);
        let arrival = trip.arrive(clock, miles)?;
        let score = miles
            + lateness_penalty(
                arrival,
                members.iter().filter_map(|(_, p)| p.deadline),
                per_minute,
            );

        if best.as_ref().map_or(true, |(lowest, _)| score < *lowest) {
            best = Some((
                score,
                NextStop {
                    location,
                    parcel_ids: members.iter().map(|(_, p)| p.id).collect(),
                    arrival,
                },
            ));
        }
    }
    Ok(best.map(|(_, stop)| stop))
}

/// Deadline-aware nearest-neighbour stop order for one vehicle, hub excluded.
///
/// Parcels become routable once their gate has passed; when none is, the
/// clock jumps to the earliest remaining gate.
pub fn greedy_stops(
    trip: &Trip,
    carried: &[ParcelId],
    load: &Parcels,
    gates: &TimeGates,
    per_minute: f64,
) -> DispatchResult<Vec<LocationId>> {
    let mut remaining: Vec<ParcelId> = carried
        .iter()
        .copied()
        .filter(|id| load.get(id).is_some_and(|p| p.location_id != trip.hub))
        .collect();
    let mut clock = trip.departed_at;
    let mut at = trip.hub;
    let mut stops = vec![];

    while !remaining.is_empty() {
        let gate_of = |id: &ParcelId| gates.get(id).copied().unwrap_or(trip.departed_at);
        let mut feasible: Vec<ParcelId> = remaining.iter().copied().filter(|id| gate_of(id) <= clock).collect();
        if feasible.is_empty() {
            if let Some(next_gate) = remaining.iter().map(gate_of).min() {
                trace!("Nothing routable at {}, waiting until {}", clock.format("%H:%M"), next_gate.format("%H:%M"));
                clock = clock.max(next_gate);
            }
            feasible = remaining.iter().copied().filter(|id| gate_of(id) <= clock).collect();
        }

        let Some(next) = choose_next_stop(trip, at, clock, &feasible, load, per_minute)? else {
            break;
        };
        remaining.retain(|id| !next.parcel_ids.contains(id));
        stops.push(next.location);
        at = next.location;
        clock = next.arrival;
    }

    Ok(dedupe_preserving_order(&stops))
}
