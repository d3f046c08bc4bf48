//! The fixed set of phrases recognised in parcel notes.
//!
//! | phrase                                        | directive                  |
//! |-----------------------------------------------|----------------------------|
//! | `delayed ... [H:MM [am/pm]]`                  | [`NoteDirective::Delayed`]      |
//! | `wrong address [... correct address is S, C, Z]` | [`NoteDirective::WrongAddress`] |
//! | `must be delivered with 13, 15`               | [`NoteDirective::DeliverWith`]  |
//! | `can only be on truck N`, `vehicle N only`    | [`NoteDirective::VehicleOnly`]  |
//!
//! Matching is case-insensitive. Anything else in a note is ignored.

use chrono::NaiveTime;
use lazy_static::lazy_static;
use regex::Regex;

use crate::domain::types::{Address, ParcelId, VehicleId};
use crate::utils::meridiem_clock;

lazy_static! {
    static ref DELAYED_RE: Regex = Regex::new(r"(?i)\bdelayed\b").unwrap();
    static ref CLOCK_RE: Regex = Regex::new(r"(?i)\b(\d{1,2}):(\d{2})\s*(am|pm)?").unwrap();
    static ref WRONG_ADDRESS_RE: Regex = Regex::new(r"(?i)\bwrong address\b").unwrap();
    static ref CORRECT_ADDRESS_RE: Regex =
        Regex::new(r"(?i)\bcorrect(?:ed)? address(?: is|:)\s*(.+)$").unwrap();
    static ref DELIVER_WITH_RE: Regex = Regex::new(r"(?i)\bmust be delivered with\b(.*)$").unwrap();
    static ref ID_RE: Regex = Regex::new(r"\d+").unwrap();
    static ref VEHICLE_ONLY_RE: Regex = Regex::new(
        r"(?i)\bcan only be on (?:truck|vehicle)\s*#?(\d+)|\b(?:truck|vehicle)[\s-]*#?(\d+)\s+only\b"
    )
    .unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub enum NoteDirective {
    /// Parcel reaches the hub late; `until` is `None` when the note gives no readable time.
    Delayed { until: Option<NaiveTime> },
    WrongAddress { replacement: Option<Address> },
    DeliverWith(Vec<ParcelId>),
    VehicleOnly(VehicleId),
}

/// Every directive found in one note, in table order.
pub fn read_note(note: &str) -> Vec<NoteDirective> {
    let mut directives = vec![];
    if note.trim().is_empty() {
        return directives;
    }

    if DELAYED_RE.is_match(note) {
        directives.push(NoteDirective::Delayed {
            until: first_clock(note),
        });
    }

    if WRONG_ADDRESS_RE.is_match(note) {
        directives.push(NoteDirective::WrongAddress {
            replacement: inline_address(note),
        });
    }

    if let Some(tail) = DELIVER_WITH_RE.captures(note).and_then(|c| c.get(1)) {
        let ids: Vec<ParcelId> = ID_RE
            .find_iter(tail.as_str())
            .filter_map(|m| m.as_str().parse().ok())
            .collect();
        if !ids.is_empty() {
            directives.push(NoteDirective::DeliverWith(ids));
        }
    }

    if let Some(caps) = VEHICLE_ONLY_RE.captures(note) {
        if let Some(vehicle) = caps
            .get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse().ok())
        {
            directives.push(NoteDirective::VehicleOnly(vehicle));
        }
    }

    directives
}

fn first_clock(note: &str) -> Option<NaiveTime> {
    let caps = CLOCK_RE.captures(note)?;
    let hour = caps.get(1)?.as_str().parse().ok()?;
    let minute = caps.get(2)?.as_str().parse().ok()?;
    meridiem_clock(hour, minute, caps.get(3).map(|m| m.as_str()))
}

/// `correct address is 410 S State St, Salt Lake City, 84111`
fn inline_address(note: &str) -> Option<Address> {
    let raw = CORRECT_ADDRESS_RE.captures(note)?.get(1)?.as_str();
    let mut parts = raw.split(',').map(|part| part.trim().trim_end_matches('.').trim());
    let street = parts.next().filter(|s| !s.is_empty())?.to_string();
    Some(Address {
        street,
        city: parts.next().unwrap_or_default().to_string(),
        zip: parts.next().unwrap_or_default().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::clock;

    #[test]
    fn reads_delay_with_and_without_time() {
        assert_eq!(
            read_note("Delayed on flight---will not arrive to depot until 9:05 am"),
            vec![NoteDirective::Delayed {
                until: Some(clock((9, 5)))
            }]
        );
        assert_eq!(
            read_note("delayed until 1:30 PM"),
            vec![NoteDirective::Delayed {
                until: Some(clock((13, 30)))
            }]
        );
        assert_eq!(
            read_note("Delayed on flight"),
            vec![NoteDirective::Delayed { until: None }]
        );
        assert_eq!(read_note("Delayed until 99:99"), vec![NoteDirective::Delayed { until: None }]);
    }

    #[test]
    fn reads_wrong_address_with_inline_replacement() {
        assert_eq!(
            read_note("Wrong address listed"),
            vec![NoteDirective::WrongAddress { replacement: None }]
        );
        assert_eq!(
            read_note("Wrong address listed; correct address is 410 S State St, Salt Lake City, 84111"),
            vec![NoteDirective::WrongAddress {
                replacement: Some(Address {
                    street: "410 S State St".to_string(),
                    city: "Salt Lake City".to_string(),
                    zip: "84111".to_string(),
                })
            }]
        );
    }

    #[test]
    fn reads_grouping_ids() {
        assert_eq!(
            read_note("Must be delivered with 13, 15"),
            vec![NoteDirective::DeliverWith(vec![13, 15])]
        );
        assert!(read_note("Must be delivered with the others").is_empty());
    }

    #[test]
    fn reads_vehicle_pins() {
        assert_eq!(read_note("Can only be on truck 2"), vec![NoteDirective::VehicleOnly(2)]);
        assert_eq!(read_note("vehicle-3 only"), vec![NoteDirective::VehicleOnly(3)]);
        assert_eq!(read_note("Truck 1 only please"), vec![NoteDirective::VehicleOnly(1)]);
    }

    #[test]
    fn unknown_notes_carry_no_constraint() {
        assert!(read_note("").is_empty());
        assert!(read_note("Fragile, leave at the back door").is_empty());
        assert!(read_note("Deliver before lunch").is_empty());
    }
}
