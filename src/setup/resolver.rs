use crate::config::constant::HUB;
use crate::domain::types::LocationId;
use crate::utils::normalize_text;

/// Maps free-text addresses onto distance-table locations.
#[derive(Debug, Clone)]
pub struct LocationIndex {
    keys: Vec<String>,
}

impl LocationIndex {
    pub fn new(names: &[String]) -> Self {
        Self {
            keys: names.iter().map(|name| normalize_text(name)).collect(),
        }
    }

    /// First location whose name contains the address, or the hub.
    pub fn resolve(&self, address: &str) -> LocationId {
        let key = normalize_text(address);
        if key.is_empty() {
            return HUB;
        }
        self.keys.iter().position(|name| name.contains(&key)).unwrap_or(HUB)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
