use serde::Deserialize;

use crate::domain::types::ParcelId;

/// One row of the packages CSV. Header spellings vary between exports.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageRow {
    #[serde(rename = "ID", alias = "PackageID", alias = "Package")]
    pub id: ParcelId,

    #[serde(rename = "Address", alias = "Delivery Address", default)]
    pub address: String,

    #[serde(rename = "City", default)]
    pub city: String,

    #[serde(rename = "Zip", alias = "Zip Code", default)]
    pub zip: String,

    #[serde(rename = "Deadline", alias = "Delivery Deadline", default = "end_of_day")]
    pub deadline: String,

    #[serde(rename = "Weight", default, deserialize_with = "csv::invalid_option")]
    pub weight: Option<f64>,

    #[serde(rename = "Note", alias = "Special Note", alias = "Special Notes", default)]
    pub note: String,
}

fn end_of_day() -> String {
    "EOD".to_string()
}
