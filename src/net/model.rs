//! The compiled model handed to emitters: label-keyed place and transition
//! tables plus the offset order every vector follows.
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::net::ids::PlaceOffset;
use crate::net::index_vec::IndexVec;
use crate::net::structure::{Place, Transition, Vector};

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Model {
    /// Label to attributes, iterated in offset order.
    pub places: IndexMap<String, Place>,
    /// Label to vectors, iterated in ascending document identifier order.
    pub transitions: IndexMap<String, Transition>,
    #[serde(skip)]
    labels: IndexVec<PlaceOffset, String>,
}

impl Model {
    pub(crate) fn new(
        labels: IndexVec<PlaceOffset, String>,
        places: IndexMap<String, Place>,
        transitions: IndexMap<String, Transition>,
    ) -> Self {
        debug_assert_eq!(labels.len(), places.len());
        Self {
            places,
            transitions,
            labels,
        }
    }

    pub fn place_count(&self) -> usize {
        self.labels.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Place labels in offset order.
    pub fn place_labels(&self) -> &IndexVec<PlaceOffset, String> {
        &self.labels
    }

    pub fn label_at(&self, offset: PlaceOffset) -> Option<&str> {
        self.labels.get(offset).map(String::as_str)
    }

    pub fn place(&self, label: &str) -> Option<&Place> {
        self.places.get(label)
    }

    pub fn transition(&self, label: &str) -> Option<&Transition> {
        self.transitions.get(label)
    }

    pub fn initial_marking(&self) -> Vector {
        self.places.values().map(|place| place.initial).collect::<Vec<_>>().into()
    }

    pub fn capacities(&self) -> Vector {
        self.places.values().map(|place| place.capacity).collect::<Vec<_>>().into()
    }

    /// Structural sanity check; findings are informational only.
    pub fn diagnose(&self) -> DiagnosticReport {
        let isolated_places = self
            .labels
            .iter_enumerated()
            .filter(|(offset, _)| !self.transitions.values().any(|t| t.touches(*offset)))
            .map(|(offset, label)| (offset, label.clone()))
            .collect();
        let inert_transitions = self
            .transitions
            .iter()
            .filter(|(_, transition)| transition.is_inert())
            .map(|(label, _)| label.clone())
            .collect();

        DiagnosticReport {
            isolated_places,
            inert_transitions,
            total_places: self.place_count(),
            total_transitions: self.transition_count(),
        }
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("places", &self.places)
            .field("transitions", &self.transitions)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticReport {
    /// Places no transition consumes, produces or guards on.
    pub isolated_places: Vec<(PlaceOffset, String)>,
    /// Transitions with an all-zero delta and no guards.
    pub inert_transitions: Vec<String>,
    pub total_places: usize,
    pub total_transitions: usize,
}

impl DiagnosticReport {
    pub fn has_issues(&self) -> bool {
        !self.isolated_places.is_empty() || !self.inert_transitions.is_empty()
    }

    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for (offset, label) in &self.isolated_places {
            warnings.push(format!("place `{label}` (offset {offset}) is not connected to any transition"));
        }
        for label in &self.inert_transitions {
            warnings.push(format!("transition `{label}` neither moves tokens nor has guards"));
        }
        warnings
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} places, {} transitions",
            self.total_places, self.total_transitions
        )?;
        for warning in self.warnings() {
            writeln!(f, "  - {warning}")?;
        }
        Ok(())
    }
}
