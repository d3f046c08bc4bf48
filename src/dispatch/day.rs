use chrono::NaiveTime;
use tracing::{debug, info, span, Level};

use crate::config::DayConfig;
use crate::constraints::parse_constraints;
use crate::distance::DistanceMatrix;
use crate::domain::constraints::{AddressCorrection, ParcelConstraints};
use crate::domain::solution::DaySummary;
use crate::domain::types::{LocationId, ParcelId, Parcels, Vehicle, VehicleId};
use crate::error::{DispatchError, DispatchResult};
use crate::planning::plan_loads;
use crate::routing::build_route;
use crate::simulation::{simulate, write_back, Trip};
use crate::utils::hhmm;

/// Run one operating day: parse notes, plan loads, then route and drive
/// every vehicle. `parcels` comes back with every carried parcel delivered.
///
/// Vehicles 1 and 2 leave as soon as their gates allow and are driven in
/// parallel on disjoint parcel sets. Vehicle 3 needs a driver, so it leaves
/// once the first of them is back.
pub fn run_day<R>(
    hub: LocationId,
    matrix: &DistanceMatrix,
    parcels: &mut Parcels,
    resolve: &R,
    config: &DayConfig,
) -> DispatchResult<DaySummary>
where
    R: Fn(&str) -> LocationId,
{
    config.validate()?;
    let day_span = span!(Level::INFO, "run_day", parcels = parcels.len());
    let _guard = day_span.enter();

    let constraints = parse_constraints(parcels, config);
    let plan = plan_loads(parcels, &constraints, config)?;

    let leg = |vehicle: VehicleId, departure: NaiveTime| Leg {
        vehicle,
        departure,
        carried: plan.carried(vehicle),
        hub,
        matrix,
        constraints: &constraints,
        config,
    };

    let first = leg(1, constraints.latest_gate(plan.carried(1), config.start_time));
    let second = leg(2, constraints.latest_gate(plan.carried(2), config.start_time));
    let mut first_load = take_load(parcels, first.carried)?;
    let mut second_load = take_load(parcels, second.carried)?;
    apply_corrections(first.departure, &mut first_load, &constraints.corrections, resolve);
    apply_corrections(second.departure, &mut second_load, &constraints.corrections, resolve);

    let (v1, v2) = rayon::join(
        || dispatch_vehicle(&first, &mut first_load),
        || dispatch_vehicle(&second, &mut second_load),
    );
    parcels.append(&mut first_load);
    parcels.append(&mut second_load);
    let (v1, v2) = (v1?, v2?);

    let driver_free = v1.returned_at.min(v2.returned_at);
    let third = leg(3, constraints.latest_gate(plan.carried(3), driver_free));
    debug!("Driver free at {}, vehicle 3 leaves at {}", hhmm(driver_free), hhmm(third.departure));
    let mut third_load = take_load(parcels, third.carried)?;
    apply_corrections(third.departure, &mut third_load, &constraints.corrections, resolve);
    let v3 = dispatch_vehicle(&third, &mut third_load);
    parcels.append(&mut third_load);
    let v3 = v3?;

    let vehicles = vec![v1, v2, v3];
    let total_miles = vehicles.iter().map(|v| v.miles).sum();
    info!("Day complete: {:.1} miles over {} vehicles", total_miles, vehicles.len());

    Ok(DaySummary {
        vehicles,
        total_miles,
        restriction_overflows: plan.overflows,
    })
}

/// Everything one vehicle needs to drive its load.
struct Leg<'a> {
    vehicle: VehicleId,
    departure: NaiveTime,
    carried: &'a [ParcelId],
    hub: LocationId,
    matrix: &'a DistanceMatrix,
    constraints: &'a ParcelConstraints,
    config: &'a DayConfig,
}

fn dispatch_vehicle(leg: &Leg, load: &mut Parcels) -> DispatchResult<Vehicle> {
    let vehicle_span = span!(Level::INFO, "vehicle", id = leg.vehicle);
    let _guard = vehicle_span.enter();

    let mut vehicle = Vehicle::new(
        leg.vehicle,
        leg.config.speed_mph,
        leg.config.capacity,
        leg.departure,
        leg.carried.to_vec(),
    );
    for parcel in load.values_mut() {
        parcel.mark_departed(leg.departure);
    }

    let trip = Trip {
        departed_at: leg.departure,
        speed_mph: leg.config.speed_mph,
        hub: leg.hub,
        matrix: leg.matrix,
    };
    let stops = build_route(&trip, leg.carried, load, &leg.constraints.gates, leg.config)?;
    let outcome = simulate(&trip, &stops, load)?;
    write_back(&outcome, stops, &mut vehicle, load);

    info!(
        "Vehicle {}: {} parcels, {} -> {}, {:.1} miles",
        vehicle.id,
        vehicle.carried.len(),
        hhmm(vehicle.departed_at),
        hhmm(vehicle.returned_at),
        vehicle.miles
    );
    Ok(vehicle)
}

/// Move the carried parcels out of the day's collection.
fn take_load(parcels: &mut Parcels, carried: &[ParcelId]) -> DispatchResult<Parcels> {
    carried
        .iter()
        .map(|id| {
            parcels
                .remove(id)
                .map(|parcel| (*id, parcel))
                .ok_or(DispatchError::UnknownParcel(*id))
        })
        .collect()
}

/// Apply every correction already known at `now` to the parcels in `load`.
pub fn apply_corrections<R>(now: NaiveTime, load: &mut Parcels, corrections: &[AddressCorrection], resolve: &R)
where
    R: Fn(&str) -> LocationId,
{
    for correction in corrections.iter().filter(|c| c.effective_at <= now) {
        let Some(parcel) = load.get_mut(&correction.parcel_id) else {
            continue;
        };
        let location = resolve(&correction.address.street);
        debug!(
            "Parcel {} readdressed to {} (location {})",
            parcel.id, correction.address.street, location
        );
        parcel.apply_correction(correction.address.clone(), location, correction.effective_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Address, Parcel};
    use crate::utils::clock;

    fn corrected_load() -> (Parcels, Vec<AddressCorrection>) {
        let load: Parcels = [(9, Parcel::new(9, Address::default(), "EOD", 1.0, "Wrong address listed", 4))].into();
        let corrections = vec![AddressCorrection {
            parcel_id: 9,
            effective_at: clock((10, 20)),
            address: Address {
                street: "410 S State St".to_string(),
                ..Address::default()
            },
        }];
        (load, corrections)
    }

    #[test]
    fn corrections_wait_for_their_effective_time() {
        let (mut load, corrections) = corrected_load();
        let resolve = |street: &str| if street.contains("410") { 7 } else { 0 };

        apply_corrections(clock((10, 0)), &mut load, &corrections, &resolve);
        assert_eq!(load[&9].location_id, 4);

        apply_corrections(clock((10, 20)), &mut load, &corrections, &resolve);
        assert_eq!(load[&9].location_id, 7);
        assert_eq!(load[&9].location_at(clock((9, 0))), 4);
        assert_eq!(load[&9].address_at(clock((10, 20))).street, "410 S State St");
    }

    #[test]
    fn taking_an_unknown_parcel_fails() {
        let (mut load, _) = corrected_load();
        assert!(matches!(take_load(&mut load, &[3]), Err(DispatchError::UnknownParcel(3))));
        assert_eq!(take_load(&mut load, &[9]).unwrap().len(), 1);
        assert!(load.is_empty());
    }
}
