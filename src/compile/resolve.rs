//! Place indexing and two-level place identifier resolution.
use std::collections::HashMap;

use indexmap::IndexMap;
use itertools::Itertools;

use super::CompileError;
use crate::document::{PlaceRecord, ReferencePlaceRecord};
use crate::net::ids::{ElementId, PlaceOffset};
use crate::net::index_vec::IndexVec;
use crate::net::structure::Place;

/// Places sorted by document identifier with dense offsets assigned.
#[derive(Debug, Default)]
pub struct PlaceTable {
    by_id: HashMap<ElementId, PlaceOffset>,
    pub labels: IndexVec<PlaceOffset, String>,
    pub places: IndexMap<String, Place>,
}

impl PlaceTable {
    pub fn build(records: &[PlaceRecord]) -> Result<Self, CompileError> {
        let mut table = Self::default();
        for record in records.iter().sorted_by_key(|record| record.id) {
            if table.by_id.contains_key(&record.id) {
                return Err(CompileError::DuplicateIdentifier { id: record.id });
            }
            if table.places.contains_key(&record.label) {
                return Err(CompileError::DuplicatePlaceLabel {
                    label: record.label.clone(),
                });
            }

            let offset = table.labels.push(record.label.clone());
            table.by_id.insert(record.id, offset);
            table.places.insert(
                record.label.clone(),
                Place::new(offset, record.capacity.unwrap_or(0), record.tokens),
            );
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn offset(&self, id: ElementId) -> Option<PlaceOffset> {
        self.by_id.get(&id).copied()
    }

    pub fn label(&self, offset: PlaceOffset) -> &str {
        &self.labels[offset]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Direct(PlaceOffset),
    ViaReference(PlaceOffset),
    Unresolved,
}

impl Resolution {
    pub fn offset(self) -> Option<PlaceOffset> {
        match self {
            Resolution::Direct(offset) | Resolution::ViaReference(offset) => Some(offset),
            Resolution::Unresolved => None,
        }
    }
}

/// Resolves an arc's place-side identifier: real places first, reference
/// places as fallback. References are followed one level only.
pub struct PlaceResolver<'a> {
    places: &'a PlaceTable,
    references: HashMap<ElementId, ElementId>,
}

impl<'a> PlaceResolver<'a> {
    pub fn new(places: &'a PlaceTable, references: &[ReferencePlaceRecord]) -> Self {
        let references = references
            .iter()
            .map(|reference| (reference.id, reference.connected_place))
            .collect();
        Self { places, references }
    }

    pub fn resolve(&self, id: ElementId) -> Resolution {
        if let Some(offset) = self.places.offset(id) {
            return Resolution::Direct(offset);
        }
        self.references
            .get(&id)
            .and_then(|connected| self.places.offset(*connected))
            .map_or(Resolution::Unresolved, Resolution::ViaReference)
    }

    pub fn label(&self, offset: PlaceOffset) -> &'a str {
        self.places.label(offset)
    }
}
