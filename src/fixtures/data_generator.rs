use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::distance::DistanceMatrix;
use crate::domain::types::{Address, LocationId, Parcel, ParcelId, Parcels};
use crate::error::DispatchResult;
use crate::setup::LocationIndex;

const GRID_MILES: f64 = 10.0;
const FIXTURE_CITY: &str = "Fixture City";
const FIXTURE_ZIP: &str = "84000";

/// A synthetic operating day.
#[derive(Debug, Clone)]
pub struct DayFixture {
    pub names: Vec<String>,
    pub matrix: DistanceMatrix,
    pub parcels: Parcels,
}

impl DayFixture {
    pub fn resolver(&self) -> LocationIndex {
        LocationIndex::new(&self.names)
    }
}

/// Seeded random day: locations scattered on a grid, parcels dropped on them.
///
/// Only coordinates, parcel locations and weights are random. Deadlines and
/// notes follow a fixed pattern so every seed exercises the same constraint
/// mix without overfilling the fleet.
pub fn generate_day(seed: u64, location_count: usize, parcel_count: ParcelId) -> DispatchResult<DayFixture> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let location_count = location_count.max(6);

    let coords: Vec<(f64, f64)> = (0..location_count)
        .map(|_| (rng.gen_range(0.0..GRID_MILES), rng.gen_range(0.0..GRID_MILES)))
        .collect();
    let rows: Vec<Vec<f64>> = coords
        .iter()
        .map(|a| coords.iter().map(|b| euclidean_miles(*a, *b)).collect())
        .collect();
    let matrix = DistanceMatrix::from_rows(rows)?;

    let names: Vec<String> = (0..location_count)
        .map(|k| match k {
            0 => format!("Fixture Hub, {}", FIXTURE_CITY),
            _ => format!("{}, {}", street(k), FIXTURE_CITY),
        })
        .collect();

    let parcels: Parcels = (1..=parcel_count)
        .map(|id| {
            let location: LocationId = rng.gen_range(1..location_count);
            let weight = rng.gen_range(1..=40) as f64;
            let address = Address {
                street: street(location),
                city: FIXTURE_CITY.to_string(),
                zip: FIXTURE_ZIP.to_string(),
            };
            (id, Parcel::new(id, address, deadline_for(id), weight, &note_for(id), location))
        })
        .collect();

    info!(
        "Generated fixture day: seed {}, {} locations, {} parcels",
        seed,
        location_count,
        parcels.len()
    );
    Ok(DayFixture { names, matrix, parcels })
}

fn street(location: LocationId) -> String {
    format!("{:03} Fixture Ave", location)
}

fn euclidean_miles(a: (f64, f64), b: (f64, f64)) -> f64 {
    let miles = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
    (miles * 10.0).round() / 10.0
}

fn deadline_for(id: ParcelId) -> &'static str {
    match id {
        13 => "9:00 AM",
        _ if id % 7 == 1 => "10:30 AM",
        _ => "EOD",
    }
}

fn note_for(id: ParcelId) -> String {
    match id {
        3 | 18 => "Can only be on truck 2".to_string(),
        6 | 25 | 28 => "Delayed on flight---will not arrive to depot until 9:05 am".to_string(),
        32 => "Delayed on flight".to_string(),
        9 => format!(
            "Wrong address listed; correct address is {}, {}, {}",
            street(5),
            FIXTURE_CITY,
            FIXTURE_ZIP
        ),
        14 => "Must be delivered with 15, 19".to_string(),
        16 => "Must be delivered with 13, 19".to_string(),
        20 => "Must be delivered with 13, 15".to_string(),
        _ => String::new(),
    }
}
