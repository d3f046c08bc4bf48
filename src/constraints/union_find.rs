use std::collections::BTreeMap;

use crate::domain::constraints::DeliveryGroup;
use crate::domain::types::ParcelId;

/// Disjoint-set forest over parcel ids with path compression.
#[derive(Debug, Clone, Default)]
pub struct DisjointSet {
    parent: BTreeMap<ParcelId, ParcelId>,
}

impl DisjointSet {
    pub fn find(&mut self, id: ParcelId) -> ParcelId {
        let mut root = id;
        loop {
            let parent = *self.parent.entry(root).or_insert(root);
            if parent == root {
                break;
            }
            root = parent;
        }

        // point every node on the walked path straight at the root
        let mut node = id;
        while node != root {
            let next = self.parent.insert(node, root).unwrap_or(root);
            node = next;
        }
        root
    }

    /// Returns false when both ids were already in the same set.
    pub fn union(&mut self, a: ParcelId, b: ParcelId) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        // smaller id stays the root so class order does not depend on union order
        let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
        self.parent.insert(child, root);
        true
    }

    /// Equivalence classes of `universe`, ordered by smallest member.
    pub fn classes(&mut self, universe: impl IntoIterator<Item = ParcelId>) -> Vec<DeliveryGroup> {
        let mut by_root: BTreeMap<ParcelId, DeliveryGroup> = BTreeMap::new();
        for id in universe {
            let root = self.find(id);
            by_root.entry(root).or_default().insert(id);
        }

        let mut classes: Vec<DeliveryGroup> = by_root.into_values().collect();
        classes.sort_by_key(|class| class.first().copied());
        classes
    }
}

/// Partition `ids` into the classes induced by `links`.
pub fn partition(ids: &[ParcelId], links: &[(ParcelId, ParcelId)]) -> Vec<DeliveryGroup> {
    let mut sets = DisjointSet::default();
    for &(a, b) in links {
        sets.union(a, b);
    }
    sets.classes(ids.iter().copied())
}
