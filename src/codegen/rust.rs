//! Rust source target: a storage-generic state machine with constant tables.
use std::fmt::{self, Display, Formatter};

use itertools::Itertools;

use super::type_name;
use crate::net::model::Model;
use crate::net::structure::Vector;

pub const RUNTIME_IMPORT: &str = "use pflow_runtime::{Place, StateMachine, Storage, Transition};";

pub struct RustSource<'a> {
    model: &'a Model,
    name: String,
}

impl<'a> RustSource<'a> {
    pub fn new(model: &'a Model, name: &str) -> Self {
        Self {
            model,
            name: name.to_owned(),
        }
    }
}

impl Display for RustSource<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let machine = type_name(&self.name);

        writeln!(f, "// Generated by pflow from net {:?}. Do not edit.", self.name)?;
        writeln!(f, "{RUNTIME_IMPORT}")?;
        writeln!(f)?;
        writeln!(f, "pub struct {machine}<S: Storage> {{")?;
        writeln!(f, "    storage: S,")?;
        writeln!(f, "}}")?;
        writeln!(f)?;
        writeln!(f, "impl<S: Storage> {machine}<S> {{")?;
        writeln!(f, "    pub fn new(storage: S) -> Self {{")?;
        writeln!(f, "        Self {{ storage }}")?;
        writeln!(f, "    }}")?;
        writeln!(f, "}}")?;
        writeln!(f)?;
        writeln!(f, "impl<S: Storage> StateMachine for {machine}<S> {{")?;
        writeln!(f, "    type Storage = S;")?;
        writeln!(f)?;

        writeln!(f, "    const PLACES: &'static [Place] = &[")?;
        for (label, place) in &self.model.places {
            writeln!(
                f,
                "        Place {{ label: {:?}, offset: {}, capacity: {}, initial: {} }},",
                label, place.offset, place.capacity, place.initial
            )?;
        }
        writeln!(f, "    ];")?;
        writeln!(f)?;

        writeln!(f, "    const TRANSITIONS: &'static [Transition] = &[")?;
        for (label, transition) in &self.model.transitions {
            writeln!(f, "        Transition {{")?;
            writeln!(f, "            label: {label:?},")?;
            writeln!(f, "            role: {:?},", transition.role)?;
            writeln!(f, "            delta: &[{}],", list(&transition.delta))?;
            if transition.guards.is_empty() {
                writeln!(f, "            guards: &[],")?;
            } else {
                writeln!(f, "            guards: &[")?;
                for (place, guard) in &transition.guards {
                    writeln!(f, "                ({place:?}, &[{}]),", list(guard))?;
                }
                writeln!(f, "            ],")?;
            }
            writeln!(f, "        }},")?;
        }
        writeln!(f, "    ];")?;
        writeln!(f)?;

        writeln!(f, "    fn storage(&self) -> &S {{")?;
        writeln!(f, "        &self.storage")?;
        writeln!(f, "    }}")?;
        writeln!(f)?;
        writeln!(f, "    fn storage_mut(&mut self) -> &mut S {{")?;
        writeln!(f, "        &mut self.storage")?;
        writeln!(f, "    }}")?;
        writeln!(f, "}}")
    }
}

fn list(vector: &Vector) -> String {
    vector.iter().join(", ")
}
