use std::fs::File;
use std::path::Path;

use chrono::NaiveTime;
use colored::*;
use csv::Writer;
use itertools::Itertools;
use serde::Serialize;
use tracing::info;

use crate::domain::solution::DaySummary;
use crate::domain::types::{LocationId, ParcelId, ParcelStatus, Parcels, VehicleId};
use crate::error::DispatchResult;
use crate::utils::hhmm;

/// One line of the per-parcel delivery report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryRecord {
    pub parcel_id: ParcelId,
    pub vehicle: Option<VehicleId>,
    pub street: String,
    pub city: String,
    pub zip: String,
    pub deadline: String,
    pub weight: f64,
    pub status: String,
    pub departed_at: Option<String>,
    pub delivered_at: Option<String>,
    pub on_time: bool,
}

pub fn delivery_records(summary: &DaySummary, parcels: &Parcels) -> Vec<DeliveryRecord> {
    parcels
        .values()
        .map(|parcel| DeliveryRecord {
            parcel_id: parcel.id,
            vehicle: summary.vehicle_of(parcel.id),
            street: parcel.address.street.clone(),
            city: parcel.address.city.clone(),
            zip: parcel.address.zip.clone(),
            deadline: parcel.deadline_label.clone(),
            weight: parcel.weight,
            status: parcel.status.to_string(),
            departed_at: parcel.departed_at.map(hhmm),
            delivered_at: parcel.delivered_at.map(hhmm),
            on_time: parcel.status == ParcelStatus::Delivered && !parcel.is_late(),
        })
        .collect()
}

/// A parcel as it looked at one time of day.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub parcel_id: ParcelId,
    pub street: String,
    pub zip: String,
    pub deadline: String,
    pub status: ParcelStatus,
    pub delivered_at: Option<String>,
}

/// Status and on-record address of every parcel at `at`.
pub fn status_snapshot(parcels: &Parcels, at: NaiveTime) -> Vec<StatusLine> {
    parcels
        .values()
        .map(|parcel| {
            let status = parcel.status_at(at);
            let address = parcel.address_at(at);
            StatusLine {
                parcel_id: parcel.id,
                street: address.street.clone(),
                zip: address.zip.clone(),
                deadline: parcel.deadline_label.clone(),
                status,
                delivered_at: parcel.delivered_at.filter(|_| status == ParcelStatus::Delivered).map(hhmm),
            }
        })
        .collect()
}

pub fn print_status_snapshot(parcels: &Parcels, at: NaiveTime) {
    println!("{}", format!("Parcel status at {}", hhmm(at)).bold());
    for line in status_snapshot(parcels, at) {
        println!(
            "{:>3}  {:<40} {:<6} {:<9} {:<10} {}",
            line.parcel_id,
            line.street,
            line.zip,
            line.deadline,
            line.status.to_string(),
            line.delivered_at.unwrap_or_default()
        );
    }
}

pub fn save_to_csv<P: AsRef<Path>>(records: &[DeliveryRecord], path: P) -> DispatchResult<()> {
    let mut wtr = Writer::from_path(path.as_ref())?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    info!("Wrote {} delivery records to {}", records.len(), path.as_ref().display());
    Ok(())
}

pub fn save_summary_json<P: AsRef<Path>>(summary: &DaySummary, path: P) -> DispatchResult<()> {
    serde_json::to_writer_pretty(File::create(path.as_ref())?, summary)?;
    info!("Wrote day summary to {}", path.as_ref().display());
    Ok(())
}

pub fn print_completion_report(summary: &DaySummary, records: &[DeliveryRecord], hub: LocationId) {
    for vehicle in &summary.vehicles {
        println!(
            "Vehicle {}: {:>2} parcels, {} -> {}, {:>6.1} miles, route {:?}",
            vehicle.id,
            vehicle.carried.len(),
            hhmm(vehicle.departed_at),
            hhmm(vehicle.returned_at),
            vehicle.miles,
            vehicle.route(hub)
        );
        if !vehicle.arrivals.is_empty() {
            println!(
                "    {}",
                vehicle
                    .arrivals
                    .iter()
                    .map(|(stop, at)| format!("{}@{}", stop, hhmm(*at)))
                    .join(" ")
            );
        }
    }

    for overflow in &summary.restriction_overflows {
        println!(
            "{}",
            format!(
                "Parcels {:?} belong on vehicle {} but rode vehicle {}",
                overflow.parcel_ids, overflow.pinned_to, overflow.placed_on
            )
            .yellow()
        );
    }

    let late: Vec<ParcelId> = records.iter().filter(|r| !r.on_time).map(|r| r.parcel_id).collect();
    let verdict = format!(
        "Total mileage: {:.1}, {} of {} parcels on time",
        summary.total_miles,
        records.len() - late.len(),
        records.len()
    );
    if late.is_empty() {
        println!("{}", verdict.green().bold());
    } else {
        println!("{} , {}", verdict.red(), format!("late or undelivered: {:?}", late).red());
    }
}
