use std::collections::BTreeMap;

use chrono::NaiveTime;
use tracing::{trace, warn};

use crate::distance::DistanceMatrix;
use crate::domain::types::{LocationId, ParcelId, Parcels, Vehicle};
use crate::error::{DispatchError, DispatchResult};
use crate::utils::{advance, travel_minutes};

/// Fixed inputs of one vehicle's trip.
#[derive(Debug, Clone, Copy)]
pub struct Trip<'a> {
    pub departed_at: NaiveTime,
    pub speed_mph: f64,
    pub hub: LocationId,
    pub matrix: &'a DistanceMatrix,
}

impl Trip<'_> {
    /// Clock after driving `miles` from `at`. Fails if the drive ends after midnight.
    pub fn arrive(&self, at: NaiveTime, miles: f64) -> DispatchResult<NaiveTime> {
        let minutes = travel_minutes(miles, self.speed_mph);
        advance(at, minutes).ok_or(DispatchError::PastMidnight { from: at, minutes })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TravelOutcome {
    pub miles: f64,
    pub returned_at: NaiveTime,
    pub deliveries: BTreeMap<ParcelId, NaiveTime>,
    /// First arrival at each stop, in driving order.
    pub arrivals: Vec<(LocationId, NaiveTime)>,
}

/// Replay `stops` leg by leg from the hub and back. Touches nothing.
///
/// A parcel is delivered the first time its location is reached; parcels
/// addressed to the hub itself are handed over at departure.
pub fn simulate(trip: &Trip, stops: &[LocationId], load: &Parcels) -> DispatchResult<TravelOutcome> {
    let mut clock = trip.departed_at;
    let mut at = trip.hub;
    let mut miles = 0.0;
    let mut reached: BTreeMap<LocationId, NaiveTime> = BTreeMap::new();
    let mut arrivals = Vec::with_capacity(stops.len());
    reached.insert(trip.hub, trip.departed_at);

    for &stop in stops {
        let leg = trip.matrix.distance(at, stop);
        miles += leg;
        clock = trip.arrive(clock, leg)?;
        at = stop;
        if !reached.contains_key(&stop) {
            reached.insert(stop, clock);
            arrivals.push((stop, clock));
        }
    }

    let home = trip.matrix.distance(at, trip.hub);
    miles += home;
    let returned_at = trip.arrive(clock, home)?;

    let deliveries = load
        .values()
        .filter_map(|parcel| {
            reached
                .get(&parcel.location_at(trip.departed_at))
                .map(|when| (parcel.id, *when))
        })
        .collect();

    Ok(TravelOutcome {
        miles,
        returned_at,
        deliveries,
        arrivals,
    })
}

/// Record the accepted trip on the vehicle and its parcels.
pub fn write_back(outcome: &TravelOutcome, stops: Vec<LocationId>, vehicle: &mut Vehicle, load: &mut Parcels) {
    vehicle.stops = stops;
    vehicle.miles = outcome.miles;
    vehicle.returned_at = outcome.returned_at;
    vehicle.arrivals = outcome.arrivals.clone();

    for (id, parcel) in load.iter_mut() {
        match outcome.deliveries.get(id) {
            Some(at) => {
                trace!("Parcel {} delivered at {}", id, at.format("%H:%M"));
                parcel.mark_delivered(*at);
            }
            None => warn!(
                "Parcel {} on vehicle {} was never reached (location {})",
                id, vehicle.id, parcel.location_id
            ),
        }
    }
}
