use std::error::Error;

use tracing::{info, span, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::app::report::{
    delivery_records, print_completion_report, print_status_snapshot, save_summary_json, save_to_csv,
};
use crate::config::constant::{FIXTURE_LOCATION_COUNT, FIXTURE_PARCEL_COUNT, HUB, SEED, STATUS_CHECKPOINTS};
use crate::config::{DayConfig, InputConfig};
use crate::dispatch::run_day;
use crate::distance::DistanceMatrix;
use crate::domain::types::Parcels;
use crate::error::DispatchResult;
use crate::fixtures::generate_day;
use crate::setup::{build_parcels, load_distance_table, load_package_rows, LocationIndex};
use crate::utils::clock;

fn init_tracing_and_env() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_span_events(fmt::format::FmtSpan::CLOSE))
        .init();

    dotenv::dotenv().ok();
    Ok(())
}

/// Read the day's inputs from CSV, or fall back to a generated day.
fn load_inputs(inputs: &InputConfig) -> DispatchResult<(LocationIndex, DistanceMatrix, Parcels)> {
    let table = load_distance_table(&inputs.distances_csv)
        .and_then(|table| load_package_rows(&inputs.packages_csv).map(|rows| (table, rows)));

    match table {
        Ok(((names, matrix), rows)) => {
            let index = LocationIndex::new(&names);
            let parcels = build_parcels(rows, |street: &str| index.resolve(street));
            Ok((index, matrix, parcels))
        }
        Err(err) => {
            warn!(
                "Failed to read {} / {}: {}. Falling back to a generated day.",
                inputs.distances_csv, inputs.packages_csv, err
            );
            let day = generate_day(SEED, FIXTURE_LOCATION_COUNT, FIXTURE_PARCEL_COUNT)?;
            Ok((day.resolver(), day.matrix, day.parcels))
        }
    }
}

pub fn run() -> Result<(), Box<dyn Error>> {
    init_tracing_and_env()?;
    let config = DayConfig::from_env()?;
    let inputs = InputConfig::from_env();

    let (index, matrix, mut parcels) = {
        let span = span!(Level::INFO, "setup");
        let _guard = span.enter();
        load_inputs(&inputs)?
    };

    let missing = matrix.missing_cells();
    if !missing.is_empty() {
        warn!(
            "{} location pairs have no distance and will count as 0 miles: {:?}",
            missing.len(),
            missing
        );
    }
    info!("Dispatching {} parcels over {} locations", parcels.len(), index.len());

    let summary = run_day(HUB, &matrix, &mut parcels, &|address: &str| index.resolve(address), &config)?;

    let records = delivery_records(&summary, &parcels);
    for checkpoint in STATUS_CHECKPOINTS {
        print_status_snapshot(&parcels, clock(checkpoint));
    }
    print_completion_report(&summary, &records, HUB);
    save_to_csv(&records, &inputs.report_csv)?;
    save_summary_json(&summary, &inputs.summary_json)?;

    Ok(())
}
