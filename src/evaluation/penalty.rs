use std::collections::BTreeMap;

use chrono::NaiveTime;

use crate::domain::types::{ParcelId, Parcels};

/// Whole minutes `arrival` is past `deadline`; zero when on time.
pub fn minutes_late(arrival: NaiveTime, deadline: NaiveTime) -> i64 {
    arrival.signed_duration_since(deadline).num_minutes().max(0)
}

/// Deadline penalty of arriving at a stop that serves `deadlines`.
pub fn lateness_penalty(
    arrival: NaiveTime,
    deadlines: impl IntoIterator<Item = NaiveTime>,
    per_minute: f64,
) -> f64 {
    deadlines
        .into_iter()
        .map(|due| minutes_late(arrival, due) as f64 * per_minute)
        .sum()
}

/// How many delivered parcels miss their deadline.
pub fn late_count(deliveries: &BTreeMap<ParcelId, NaiveTime>, load: &Parcels) -> usize {
    deliveries
        .iter()
        .filter(|(id, at)| {
            load.get(*id)
                .and_then(|p| p.deadline)
                .is_some_and(|due| **at > due)
        })
        .count()
}
