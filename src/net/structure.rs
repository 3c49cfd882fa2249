//! Compiled VASS elements: places with fixed offsets and transitions carrying
//! delta and guard vectors.
use indexmap::IndexMap;
use serde::Serialize;

use crate::net::ids::PlaceOffset;
use crate::net::index_vec::IndexVec;

pub type Weight = i64;

/// One entry per place, addressed by [`PlaceOffset`].
pub type Vector = IndexVec<PlaceOffset, Weight>;

pub const DEFAULT_ROLE: &str = "default";

pub fn zero_vector(places: usize) -> Vector {
    Vector::from_elem(0, places)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Place {
    pub offset: PlaceOffset,
    /// Upper token bound; 0 means unbounded.
    pub capacity: Weight,
    pub initial: Weight,
}

impl Place {
    pub fn new(offset: PlaceOffset, capacity: Weight, initial: Weight) -> Self {
        Self {
            offset,
            capacity,
            initial,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub delta: Vector,
    pub role: String,
    /// Inhibitor conditions keyed by the guarded place's label.
    pub guards: IndexMap<String, Vector>,
}

impl Transition {
    pub fn new(places: usize, role: impl Into<String>) -> Self {
        Self {
            delta: zero_vector(places),
            role: role.into(),
            guards: IndexMap::new(),
        }
    }

    /// Guard for `label`, created as a zero vector on first use.
    pub fn guard_mut(&mut self, label: &str) -> &mut Vector {
        let places = self.delta.len();
        self.guards
            .entry(label.to_owned())
            .or_insert_with(|| zero_vector(places))
    }

    /// True when firing neither moves tokens nor checks any guard.
    pub fn is_inert(&self) -> bool {
        self.guards.is_empty() && self.delta.iter().all(|unit| *unit == 0)
    }

    /// True when the delta or any guard has a non-zero entry at `offset`.
    pub fn touches(&self, offset: PlaceOffset) -> bool {
        self.delta[offset] != 0 || self.guards.values().any(|guard| guard[offset] != 0)
    }
}

/// Offset of the single non-zero entry of a guard vector.
pub fn guard_offset(guard: &Vector) -> Option<PlaceOffset> {
    let mut hits = guard
        .iter_enumerated()
        .filter(|(_, unit)| **unit != 0)
        .map(|(offset, _)| offset);
    match (hits.next(), hits.next()) {
        (Some(offset), None) => Some(offset),
        _ => None,
    }
}
