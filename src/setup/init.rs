use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info, warn};

use crate::distance::DistanceMatrix;
use crate::domain::types::{Address, LocationId, Parcel, Parcels};
use crate::error::{DispatchError, DispatchResult};
use crate::setup::init_types::PackageRow;

/// Fewest location names a row needs to count as the table header.
const MIN_HEADER_NAMES: usize = 2;

pub fn load_package_rows<P: AsRef<Path>>(path: P) -> DispatchResult<Vec<PackageRow>> {
    let rows = read_package_rows(std::fs::File::open(path.as_ref())?)?;
    info!("Loaded {} package rows from {}", rows.len(), path.as_ref().display());
    Ok(rows)
}

pub fn read_package_rows<R: io::Read>(reader: R) -> DispatchResult<Vec<PackageRow>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).flexible(true).from_reader(reader);
    let mut rows = vec![];
    for row in reader.deserialize::<PackageRow>() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Turn package rows into parcels, resolving each street to a location.
pub fn build_parcels<R>(rows: Vec<PackageRow>, resolve: R) -> Parcels
where
    R: Fn(&str) -> LocationId,
{
    let mut parcels = Parcels::new();
    for row in rows {
        if parcels.contains_key(&row.id) {
            warn!("Duplicate package id {}; keeping the first row", row.id);
            continue;
        }
        let location = resolve(&row.address);
        let address = Address {
            street: row.address,
            city: row.city,
            zip: row.zip,
        };
        let parcel = Parcel::new(
            row.id,
            address,
            &row.deadline,
            row.weight.unwrap_or_default(),
            &row.note,
            location,
        );
        debug!("Parcel {} -> location {}", parcel.id, location);
        parcels.insert(row.id, parcel);
    }
    parcels
}

pub fn load_distance_table<P: AsRef<Path>>(path: P) -> DispatchResult<(Vec<String>, DistanceMatrix)> {
    let table = read_distance_table(std::fs::File::open(path.as_ref())?)?;
    info!("Loaded {} locations from {}", table.0.len(), path.as_ref().display());
    Ok(table)
}

/// Find the square table inside a spreadsheet export.
///
/// The header is the row with the most non-numeric names after the first
/// column; the body is the next rows with a label in the first column. Each
/// body row starts at its first numeric cell, and cells that do not parse
/// stay zero.
pub fn read_distance_table<R: io::Read>(reader: R) -> DispatchResult<(Vec<String>, DistanceMatrix)> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let records: Vec<StringRecord> = reader.records().collect::<Result<_, _>>()?;

    let (header_at, _) = records
        .iter()
        .enumerate()
        .map(|(i, record)| (i, header_score(record)))
        .filter(|&(_, score)| score >= MIN_HEADER_NAMES)
        .fold(None, |best: Option<(usize, usize)>, (i, score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((i, score)),
        })
        .ok_or_else(|| DispatchError::MalformedMatrix("no header row of location names".to_string()))?;

    let names: Vec<String> = records[header_at]
        .iter()
        .skip(1)
        .filter(|cell| !cell.is_empty())
        .map(|cell| cell.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    let n = names.len();

    let body: Vec<&StringRecord> = records[header_at + 1..]
        .iter()
        .filter(|record| record.get(0).is_some_and(|label| !label.is_empty()))
        .take(n)
        .collect();
    if body.len() < n {
        return Err(DispatchError::MalformedMatrix(format!(
            "header names {} locations but only {} rows follow",
            n,
            body.len()
        )));
    }

    let rows = body.iter().map(|record| distance_row(record, n)).collect();
    Ok((names, DistanceMatrix::from_rows(rows)?))
}

fn header_score(record: &StringRecord) -> usize {
    record
        .iter()
        .skip(1)
        .filter(|cell| !cell.is_empty() && to_miles(cell).is_none())
        .count()
}

fn distance_row(record: &StringRecord, n: usize) -> Vec<f64> {
    let cells: Vec<&str> = record.iter().collect();
    let Some(start) = (1..cells.len()).find(|&k| to_miles(cells[k]).is_some()) else {
        return vec![0.0; n];
    };
    (0..n)
        .map(|j| cells.get(start + j).and_then(|cell| to_miles(cell)).unwrap_or(0.0))
        .collect()
}

fn to_miles(cell: &str) -> Option<f64> {
    let cell = cell.replace('"', "");
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_packages_with_alternate_headers() {
        let csv = "PackageID,Delivery Address,City,Zip Code,Delivery Deadline,Weight,Special Note\n\
                   1,195 W Oakland Ave,Salt Lake City,84115,10:30 AM,21,\n\
                   9,300 State St,Salt Lake City,84103,EOD,2,Wrong address listed\n\
                   9,duplicate,,,EOD,,\n\
                   12,3575 W Valley Central Station bus Loop,West Valley City,84119,EOD,n/a,\n";
        let rows = read_package_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3].weight, None);

        let parcels = build_parcels(rows, |street: &str| if street.starts_with("300") { 5 } else { 0 });

        assert_eq!(parcels.len(), 3);
        assert_eq!(parcels[&9].location_id, 5);
        assert_eq!(parcels[&9].address.zip, "84103");
        assert_eq!(parcels[&9].note, "Wrong address listed");
        assert_eq!(parcels[&1].deadline_label, "10:30 AM");
        assert_eq!(parcels[&12].weight, 0.0);
    }

    #[test]
    fn finds_the_table_under_metadata_rows() {
        let csv = "DISTANCE TABLE,,,\n\
                   ,,,\n\
                   ,HUB,Depot Annex,Council Hall\n\
                   HUB,HUB,0,,\n\
                   Depot Annex,(84107),7.2,0,\n\
                   Council Hall,(84103),3.8,7.1,0\n";

        let (names, dm) = read_distance_table(csv.as_bytes()).unwrap();

        assert_eq!(names, vec!["HUB", "Depot Annex", "Council Hall"]);
        assert_eq!(dm.len(), 3);
        assert_eq!(dm.distance(0, 1), 7.2);
        assert_eq!(dm.distance(2, 1), 7.1);
        assert_eq!(dm.distance(0, 2), 3.8);
    }

    #[test]
    fn missing_body_rows_are_an_error() {
        let csv = ",A,B,C\nA,0,1,2\n";
        assert!(matches!(
            read_distance_table(csv.as_bytes()),
            Err(DispatchError::MalformedMatrix(_))
        ));
    }
}
