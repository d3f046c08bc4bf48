use crate::distance::DistanceMatrix;
use crate::domain::types::LocationId;

/// Mileage of hub -> stops -> hub.
pub fn route_miles(stops: &[LocationId], hub: LocationId, dm: &DistanceMatrix) -> f64 {
    if stops.is_empty() {
        return 0.0;
    }

    let hub_to_first_stop = dm.distance(hub, stops[0]);
    let last_stop_to_hub = dm.distance(stops[stops.len() - 1], hub);

    let between: f64 = stops
        .windows(2)
        .map(|leg| dm.distance(leg[0], leg[1]))
        .sum();

    hub_to_first_stop + between + last_stop_to_hub
}
