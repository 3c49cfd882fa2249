//! Model compiler: flat entity records in, normalized VASS model out.
//!
//! Steps run in a fixed order, each depending on the previous one:
//! place indexing, reference-place resolution, transition registration,
//! role assignment and finally arc application. Compilation is fail-fast;
//! no partial model is ever returned.
use std::collections::HashMap;

use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, info, warn};
use thiserror::Error;

use crate::document::entity::{ARC_INHIBITOR, ARC_REGULAR};
use crate::document::{ArcRecord, NetRecords, RoleRecord, TransitionRecord};
use crate::net::ids::{ElementId, TransitionIndex};
use crate::net::index_vec::Idx;
use crate::net::model::Model;
use crate::net::structure::{DEFAULT_ROLE, Transition, Weight};

pub mod resolve;

pub use resolve::{PlaceResolver, PlaceTable, Resolution};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("arc {source_id} -> {destination_id}: place {id} matches neither a place nor a reference place")]
    UnresolvedReference {
        source_id: ElementId,
        destination_id: ElementId,
        id: ElementId,
    },
    #[error("arc {source_id} -> {destination_id} does not touch a known transition")]
    MalformedArc {
        source_id: ElementId,
        destination_id: ElementId,
    },
    #[error("unknown arc type {arc_type:?}")]
    UnknownArcType { arc_type: String },
    #[error("place label {label:?} is used more than once")]
    DuplicatePlaceLabel { label: String },
    #[error("transition label {label:?} is used more than once")]
    DuplicateTransitionLabel { label: String },
    #[error("identifier {id} is used by more than one element of the same kind")]
    DuplicateIdentifier { id: ElementId },
    #[error("role {role:?} lists unknown transition {id}")]
    UnknownRoleTransition { role: String, id: ElementId },
}

/// Compiles with the `"default"` role for unclaimed transitions.
pub fn compile(records: &NetRecords) -> Result<Model, CompileError> {
    Compiler::default().compile(records)
}

#[derive(Debug, Clone)]
pub struct Compiler {
    default_role: String,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(DEFAULT_ROLE)
    }
}

impl Compiler {
    pub fn new(default_role: impl Into<String>) -> Self {
        Self {
            default_role: default_role.into(),
        }
    }

    pub fn compile(&self, records: &NetRecords) -> Result<Model, CompileError> {
        let places = PlaceTable::build(&records.places)?;
        let resolver = PlaceResolver::new(&places, &records.reference_places);
        let mut transitions = self.register_transitions(&records.transitions, places.len())?;
        transitions.assign_roles(&records.roles)?;
        for arc in &records.arcs {
            transitions.apply_arc(arc, &resolver)?;
        }

        info!(
            "compiled {} places and {} transitions",
            places.len(),
            transitions.table.len()
        );
        Ok(Model::new(places.labels, places.places, transitions.table))
    }

    fn register_transitions(
        &self,
        records: &[TransitionRecord],
        place_count: usize,
    ) -> Result<TransitionTable, CompileError> {
        let mut table = TransitionTable::default();
        for record in records.iter().sorted_by_key(|record| record.id) {
            if table.by_id.contains_key(&record.id) {
                return Err(CompileError::DuplicateIdentifier { id: record.id });
            }
            if table.table.contains_key(&record.label) {
                return Err(CompileError::DuplicateTransitionLabel {
                    label: record.label.clone(),
                });
            }

            let index = TransitionIndex::from_usize(table.table.len());
            table.table.insert(
                record.label.clone(),
                Transition::new(place_count, self.default_role.as_str()),
            );
            table.by_id.insert(record.id, index);
        }
        Ok(table)
    }
}

#[derive(Debug, Default)]
struct TransitionTable {
    by_id: HashMap<ElementId, TransitionIndex>,
    table: IndexMap<String, Transition>,
}

impl TransitionTable {
    fn index_of(&self, id: ElementId) -> Option<TransitionIndex> {
        self.by_id.get(&id).copied()
    }

    fn get_mut(&mut self, id: ElementId) -> Option<&mut Transition> {
        let index = self.index_of(id)?;
        Some(&mut self.table[index.index()])
    }

    // Later roles win; a transition claimed twice keeps the last name.
    fn assign_roles(&mut self, roles: &[RoleRecord]) -> Result<(), CompileError> {
        for role in roles {
            for id in &role.transition_ids {
                let transition = self.get_mut(*id).ok_or_else(|| {
                    CompileError::UnknownRoleTransition {
                        role: role.name.clone(),
                        id: *id,
                    }
                })?;
                if transition.role != role.name {
                    debug!(
                        "transition {} role {:?} replaced by {:?}",
                        id, transition.role, role.name
                    );
                }
                transition.role = role.name.clone();
            }
        }
        Ok(())
    }

    fn apply_arc(&mut self, arc: &ArcRecord, resolver: &PlaceResolver<'_>) -> Result<(), CompileError> {
        // place -> transition consumes, transition -> place produces
        let (index, place_id, unit): (TransitionIndex, ElementId, Weight) =
            if let Some(index) = self.index_of(arc.destination) {
                (index, arc.source, -arc.multiplicity)
            } else if let Some(index) = self.index_of(arc.source) {
                (index, arc.destination, arc.multiplicity)
            } else {
                return Err(CompileError::MalformedArc {
                    source_id: arc.source,
                    destination_id: arc.destination,
                });
            };

        let offset = resolver
            .resolve(place_id)
            .offset()
            .ok_or(CompileError::UnresolvedReference {
                source_id: arc.source,
                destination_id: arc.destination,
                id: place_id,
            })?;
        let label = resolver.label(offset);
        let transition = &mut self.table[index.index()];

        match arc.arc_type.as_str() {
            ARC_INHIBITOR => {
                transition.guard_mut(label)[offset] = unit;
            }
            ARC_REGULAR => {
                let entry = &mut transition.delta[offset];
                if *entry != 0 && *entry != unit {
                    warn!(
                        "arc {} -> {} overwrites delta {} with {} at place {:?}",
                        arc.source, arc.destination, entry, unit, label
                    );
                }
                *entry = unit;
            }
            other => {
                return Err(CompileError::UnknownArcType {
                    arc_type: other.to_owned(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{PlaceRecord, ReferencePlaceRecord};
    use crate::net::ids::PlaceOffset;
    use crate::net::structure::{Place, guard_offset};

    // A(1) -> fire -> B
    fn fire_net() -> NetRecords {
        NetRecords {
            places: vec![
                PlaceRecord::new(2, "B", 0),
                PlaceRecord::new(1, "A", 1).with_capacity(0),
            ],
            transitions: vec![TransitionRecord::new(3, "fire")],
            arcs: vec![ArcRecord::regular(1, 3, 1), ArcRecord::regular(3, 2, 1)],
            ..NetRecords::default()
        }
    }

    #[test]
    fn two_place_net_compiles_to_expected_vectors() {
        let model = compile(&fire_net()).unwrap();

        assert_eq!(model.places["A"], Place::new(PlaceOffset(0), 0, 1));
        assert_eq!(model.places["B"], Place::new(PlaceOffset(1), 0, 0));
        let fire = &model.transitions["fire"];
        assert_eq!(fire.delta.as_slice(), &[-1, 1]);
        assert_eq!(fire.role, "default");
        assert!(fire.guards.is_empty());
    }

    #[test]
    fn inhibitor_arc_adds_guard_without_touching_delta() {
        let mut records = fire_net();
        records.arcs.push(ArcRecord::inhibitor(2, 3, 1));
        let model = compile(&records).unwrap();

        let fire = &model.transitions["fire"];
        assert_eq!(fire.delta.as_slice(), &[-1, 1]);
        assert_eq!(fire.guards.len(), 1);
        assert_eq!(fire.guards["B"].as_slice(), &[0, -1]);
        assert_eq!(guard_offset(&fire.guards["B"]), Some(model.places["B"].offset));
    }

    #[test]
    fn multiple_guards_are_keyed_by_place_label() {
        let mut records = fire_net();
        records.places.push(PlaceRecord::new(4, "lock", 0));
        records.arcs.push(ArcRecord::inhibitor(4, 3, 2));
        records.arcs.push(ArcRecord::inhibitor(2, 3, 1));
        let model = compile(&records).unwrap();

        let guards = &model.transitions["fire"].guards;
        assert_eq!(guards.keys().collect::<Vec<_>>(), vec!["lock", "B"]);
        assert_eq!(guards["lock"].as_slice(), &[0, 0, -2]);
    }

    #[test]
    fn multiplicity_sign_follows_arc_direction() {
        let records = NetRecords {
            places: vec![PlaceRecord::new(1, "in", 5), PlaceRecord::new(2, "out", 0)],
            transitions: vec![TransitionRecord::new(9, "move")],
            arcs: vec![ArcRecord::regular(1, 9, 3), ArcRecord::regular(9, 2, 2)],
            ..NetRecords::default()
        };
        let model = compile(&records).unwrap();
        assert_eq!(model.transitions["move"].delta.as_slice(), &[-3, 2]);
    }

    #[test]
    fn reference_place_resolves_like_its_target() {
        let mut via_reference = fire_net();
        via_reference.reference_places.push(ReferencePlaceRecord::new(50, 2));
        via_reference.arcs[1] = ArcRecord::regular(3, 50, 1);

        assert_eq!(compile(&via_reference).unwrap(), compile(&fire_net()).unwrap());
    }

    #[test]
    fn unknown_place_identifier_is_unresolved() {
        let mut records = fire_net();
        records.arcs.push(ArcRecord::regular(3, 77, 1));
        assert_eq!(
            compile(&records).unwrap_err(),
            CompileError::UnresolvedReference {
                source_id: ElementId(3),
                destination_id: ElementId(77),
                id: ElementId(77),
            }
        );
    }

    #[test]
    fn arc_without_transition_is_malformed() {
        let mut records = fire_net();
        records.arcs.push(ArcRecord::regular(1, 2, 1));
        assert!(matches!(
            compile(&records),
            Err(CompileError::MalformedArc { .. })
        ));
    }

    #[test]
    fn unknown_arc_type_is_fatal() {
        let mut records = fire_net();
        records.arcs.push(ArcRecord::new(1, 3, 1, "reset"));
        assert_eq!(
            compile(&records).unwrap_err(),
            CompileError::UnknownArcType {
                arc_type: "reset".to_owned()
            }
        );
    }

    #[test]
    fn last_role_wins() {
        let mut records = fire_net();
        records.roles = vec![RoleRecord::new("user", [3]), RoleRecord::new("admin", [3])];
        let model = compile(&records).unwrap();
        assert_eq!(model.transitions["fire"].role, "admin");
    }

    #[test]
    fn role_for_unknown_transition_is_rejected() {
        let mut records = fire_net();
        records.roles = vec![RoleRecord::new("user", [42])];
        assert!(matches!(
            compile(&records),
            Err(CompileError::UnknownRoleTransition { id: ElementId(42), .. })
        ));
    }

    #[test]
    fn configured_default_role_applies_to_unclaimed_transitions() {
        let model = Compiler::new("anyone").compile(&fire_net()).unwrap();
        assert_eq!(model.transitions["fire"].role, "anyone");
    }

    #[test]
    fn duplicate_regular_arc_keeps_last_write() {
        let mut records = fire_net();
        records.arcs.push(ArcRecord::regular(1, 3, 4));
        let model = compile(&records).unwrap();
        assert_eq!(model.transitions["fire"].delta.as_slice(), &[-4, 1]);
    }

    #[test]
    fn duplicate_transition_label_is_rejected() {
        let mut records = fire_net();
        records.transitions.push(TransitionRecord::new(8, "fire"));
        assert!(matches!(
            compile(&records),
            Err(CompileError::DuplicateTransitionLabel { .. })
        ));
    }

    #[test]
    fn duplicate_transition_identifier_is_rejected() {
        let mut records = fire_net();
        records.transitions.push(TransitionRecord::new(3, "refire"));
        assert_eq!(
            compile(&records).unwrap_err(),
            CompileError::DuplicateIdentifier { id: ElementId(3) }
        );
    }

    #[test]
    fn arc_between_transitions_leaves_source_unresolved() {
        let mut records = fire_net();
        records.transitions.push(TransitionRecord::new(4, "other"));
        records.arcs.push(ArcRecord::regular(3, 4, 1));
        assert_eq!(
            compile(&records).unwrap_err(),
            CompileError::UnresolvedReference {
                source_id: ElementId(3),
                destination_id: ElementId(4),
                id: ElementId(3),
            }
        );
    }

    #[test]
    fn inhibitor_from_transition_gives_positive_guard() {
        let mut records = fire_net();
        records.arcs.push(ArcRecord::inhibitor(3, 2, 2));
        let model = compile(&records).unwrap();

        let fire = &model.transitions["fire"];
        assert_eq!(fire.delta.as_slice(), &[-1, 1]);
        assert_eq!(fire.guards["B"].as_slice(), &[0, 2]);
    }

    #[test]
    fn offsets_are_dense_and_transitions_follow_identifier_order() {
        let records = NetRecords {
            places: (0..6)
                .rev()
                .map(|i| PlaceRecord::new(i * 10, format!("p{i}"), 0))
                .collect(),
            transitions: vec![TransitionRecord::new(200, "late"), TransitionRecord::new(100, "early")],
            ..NetRecords::default()
        };
        let model = compile(&records).unwrap();

        let mut offsets: Vec<_> = model.places.values().map(|place| place.offset).collect();
        offsets.sort();
        assert_eq!(offsets, (0..6).map(PlaceOffset).collect::<Vec<_>>());
        assert_eq!(model.transitions.keys().collect::<Vec<_>>(), vec!["early", "late"]);
        assert_eq!(model.transitions["late"].delta.len(), 6);
    }

    #[test]
    fn compilation_is_deterministic() {
        let mut records = fire_net();
        records.arcs.push(ArcRecord::inhibitor(2, 3, 1));
        let first = serde_json::to_string(&compile(&records).unwrap()).unwrap();
        let second = serde_json::to_string(&compile(&records).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
