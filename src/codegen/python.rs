//! Python source target: a `StateMachine` subclass holding dict literals.
use std::fmt::{self, Display, Formatter};

use itertools::Itertools;

use super::type_name;
use crate::net::model::Model;
use crate::net::structure::Vector;

pub const RUNTIME_IMPORT: &str = "from ptflow.state import StateMachine, Storage";

pub struct PythonSource<'a> {
    model: &'a Model,
    name: String,
}

impl<'a> PythonSource<'a> {
    pub fn new(model: &'a Model, name: &str) -> Self {
        Self {
            model,
            name: name.to_owned(),
        }
    }
}

impl Display for PythonSource<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Generated by pflow from net {}. Do not edit.", quote(&self.name))?;
        writeln!(f, "{RUNTIME_IMPORT}")?;
        writeln!(f)?;
        writeln!(f)?;
        writeln!(f, "class {}(StateMachine, Storage):", type_name(&self.name))?;
        writeln!(f)?;

        writeln!(f, "    places = {{")?;
        for (label, place) in &self.model.places {
            writeln!(
                f,
                "        {}: {{'offset': {}, 'capacity': {}, 'initial': {}}},",
                quote(label),
                place.offset,
                place.capacity,
                place.initial
            )?;
        }
        writeln!(f, "    }}")?;
        writeln!(f)?;

        writeln!(f, "    transitions = {{")?;
        for (label, transition) in &self.model.transitions {
            writeln!(f, "        {}: {{", quote(label))?;
            writeln!(f, "            'delta': {},", list(&transition.delta))?;
            writeln!(f, "            'role': {},", quote(&transition.role))?;
            if transition.guards.is_empty() {
                writeln!(f, "            'guards': {{}},")?;
            } else {
                writeln!(f, "            'guards': {{")?;
                for (place, guard) in &transition.guards {
                    writeln!(f, "                {}: {},", quote(place), list(guard))?;
                }
                writeln!(f, "            }},")?;
            }
            writeln!(f, "        }},")?;
        }
        writeln!(f, "    }}")
    }
}

fn list(vector: &Vector) -> String {
    format!("[{}]", vector.iter().join(", "))
}

// Single-quoted Python string literal.
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
