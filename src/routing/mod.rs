//! Stop order for one vehicle: greedy construction, then a bounded 2-opt
//! pass that is kept only when it saves miles without adding late parcels.

pub mod greedy;
pub mod two_opt;

use tracing::{debug, info};

use crate::config::constant::{IMPROVEMENT_EPSILON, TWO_OPT_MIN_STOPS};
use crate::config::DayConfig;
use crate::domain::constraints::TimeGates;
use crate::domain::types::{LocationId, ParcelId, Parcels};
use crate::error::DispatchResult;
use crate::evaluation::penalty::late_count;
use crate::simulation::{simulate, Trip};
use greedy::greedy_stops;
use two_opt::two_opt_bounded;

pub fn build_route(
    trip: &Trip,
    carried: &[ParcelId],
    load: &Parcels,
    gates: &TimeGates,
    config: &DayConfig,
) -> DispatchResult<Vec<LocationId>> {
    let greedy = greedy_stops(trip, carried, load, gates, config.late_penalty_per_minute)?;
    if greedy.len() < TWO_OPT_MIN_STOPS {
        return Ok(greedy);
    }

    let optimized = two_opt_bounded(&greedy, trip.hub, trip.matrix, config.two_opt_move_limit);
    let base = simulate(trip, &greedy, load)?;
    let candidate = match simulate(trip, &optimized, load) {
        Ok(candidate) => candidate,
        Err(err) => {
            debug!("2-opt rejected: {}", err);
            return Ok(greedy);
        }
    };
    let base_late = late_count(&base.deliveries, load);
    let candidate_late = late_count(&candidate.deliveries, load);

    if candidate.miles + IMPROVEMENT_EPSILON < base.miles && candidate_late <= base_late {
        info!(
            "2-opt accepted: {:.1} -> {:.1} miles, late {} -> {}",
            base.miles, candidate.miles, base_late, candidate_late
        );
        Ok(optimized)
    } else {
        debug!(
            "2-opt rejected: {:.1} -> {:.1} miles, late {} -> {}",
            base.miles, candidate.miles, base_late, candidate_late
        );
        Ok(greedy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMatrix;
    use crate::domain::types::{Address, Parcel};
    use crate::utils::clock;

    fn parcel(id: ParcelId, location: LocationId, deadline: &str) -> (ParcelId, Parcel) {
        (id, Parcel::new(id, Address::default(), deadline, 1.0, "", location))
    }

    #[test]
    fn short_routes_skip_two_opt() {
        let rows: Vec<Vec<f64>> = (0..4)
            .map(|i| (0..4).map(|j| if i == j { 0.0 } else { 1.0 }).collect())
            .collect();
        let matrix = DistanceMatrix::from_rows(rows).unwrap();
        let trip = Trip {
            departed_at: clock((8, 0)),
            speed_mph: 18.0,
            hub: 0,
            matrix: &matrix,
        };
        let load: Parcels = [parcel(1, 1, "EOD"), parcel(2, 2, "EOD"), parcel(3, 3, "EOD")].into();

        let stops = build_route(&trip, &[1, 2, 3], &load, &TimeGates::new(), &DayConfig::default()).unwrap();

        assert_eq!(stops, vec![1, 2, 3]);
        let outcome = simulate(&trip, &stops, &load).unwrap();
        assert_eq!(outcome.miles, 4.0);
        assert_eq!(outcome.returned_at, clock((8, 12)));
    }

    #[test]
    fn accepted_route_is_never_longer_or_later() {
        // points on a circle, listed out of order
        let coords: Vec<(f64, f64)> = (0..9)
            .map(|k| {
                let angle = (k * 4 % 9) as f64 * std::f64::consts::TAU / 9.0;
                (angle.cos() * 3.0, angle.sin() * 3.0)
            })
            .collect();
        let rows: Vec<Vec<f64>> = coords
            .iter()
            .map(|a| coords.iter().map(|b| ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()).collect())
            .collect();
        let matrix = DistanceMatrix::from_rows(rows).unwrap();
        let trip = Trip {
            departed_at: clock((8, 0)),
            speed_mph: 18.0,
            hub: 0,
            matrix: &matrix,
        };
        let load: Parcels = (1..9)
            .map(|id| parcel(id, id as usize, if id % 3 == 0 { "9:00 AM" } else { "EOD" }))
            .collect();
        let carried: Vec<ParcelId> = load.keys().copied().collect();
        let gates = TimeGates::new();
        let config = DayConfig::default();

        let greedy = greedy_stops(&trip, &carried, &load, &gates, config.late_penalty_per_minute).unwrap();
        let chosen = build_route(&trip, &carried, &load, &gates, &config).unwrap();

        let before = simulate(&trip, &greedy, &load).unwrap();
        let after = simulate(&trip, &chosen, &load).unwrap();
        assert!(after.miles <= before.miles);
        assert!(late_count(&after.deliveries, &load) <= late_count(&before.deliveries, &load));
        assert_eq!(after.deliveries.len(), 8);
    }

    /// Greedy drives 1, 2, 3, 4. Reversing the middle pair saves four miles
    /// but reaches location 2 at 8:06 instead of 8:04.
    fn detour_matrix() -> DistanceMatrix {
        DistanceMatrix::from_rows(vec![
            vec![0.0, 1.0, 5.0, 5.0, 5.0],
            vec![1.0, 0.0, 3.0, 4.0, 9.0],
            vec![5.0, 3.0, 0.0, 1.0, 5.0],
            vec![5.0, 4.0, 1.0, 0.0, 10.0],
            vec![5.0, 9.0, 5.0, 10.0, 0.0],
        ])
        .unwrap()
    }

    fn mile_a_minute(matrix: &DistanceMatrix) -> Trip<'_> {
        Trip {
            departed_at: clock((8, 0)),
            speed_mph: 60.0,
            hub: 0,
            matrix,
        }
    }

    #[test]
    fn shorter_reversal_is_taken_when_nothing_turns_late() {
        let matrix = detour_matrix();
        let trip = mile_a_minute(&matrix);
        let load: Parcels = (1..=4).map(|id| parcel(id, id as usize, "EOD")).collect();
        let config = DayConfig::default();

        let greedy = greedy_stops(&trip, &[1, 2, 3, 4], &load, &TimeGates::new(), config.late_penalty_per_minute).unwrap();
        assert_eq!(greedy, vec![1, 2, 3, 4]);

        let chosen = build_route(&trip, &[1, 2, 3, 4], &load, &TimeGates::new(), &config).unwrap();

        assert_eq!(chosen, vec![1, 3, 2, 4]);
        assert_eq!(simulate(&trip, &chosen, &load).unwrap().miles, 16.0);
    }

    #[test]
    fn shorter_reversal_is_refused_when_it_makes_a_parcel_late() {
        let matrix = detour_matrix();
        let trip = mile_a_minute(&matrix);
        let load: Parcels = (1..=4)
            .map(|id| parcel(id, id as usize, if id == 2 { "8:05 AM" } else { "EOD" }))
            .collect();
        let config = DayConfig::default();
        let reversed = simulate(&trip, &[1, 3, 2, 4], &load).unwrap();
        assert_eq!(reversed.miles, 16.0);
        assert_eq!(late_count(&reversed.deliveries, &load), 1);

        let chosen = build_route(&trip, &[1, 2, 3, 4], &load, &TimeGates::new(), &config).unwrap();

        assert_eq!(chosen, vec![1, 2, 3, 4]);
        let outcome = simulate(&trip, &chosen, &load).unwrap();
        assert_eq!(outcome.miles, 20.0);
        assert_eq!(outcome.deliveries[&2], clock((8, 4)));
        assert_eq!(late_count(&outcome.deliveries, &load), 0);
    }
}
