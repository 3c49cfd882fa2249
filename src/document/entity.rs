//! Typed entity records produced by the document reader.
use super::DocumentError;
use super::schema::Record;
use crate::net::ids::ElementId;
use crate::net::structure::Weight;

pub const ARC_REGULAR: &str = "regular";
pub const ARC_INHIBITOR: &str = "inhibitor";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRecord {
    pub name: String,
    pub transition_ids: Vec<ElementId>,
}

impl RoleRecord {
    pub fn new(name: impl Into<String>, transition_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            name: name.into(),
            transition_ids: transition_ids.into_iter().map(ElementId).collect(),
        }
    }
}

impl TryFrom<&Record> for RoleRecord {
    type Error = DocumentError;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        Ok(Self::new(
            record.text("name")?,
            record.integers("transitionId").iter().copied(),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcRecord {
    pub source: ElementId,
    pub destination: ElementId,
    pub multiplicity: Weight,
    /// Kept verbatim; the compiler decides what an arc type means.
    pub arc_type: String,
}

impl ArcRecord {
    pub fn new(
        source: i64,
        destination: i64,
        multiplicity: Weight,
        arc_type: impl Into<String>,
    ) -> Self {
        Self {
            source: ElementId(source),
            destination: ElementId(destination),
            multiplicity,
            arc_type: arc_type.into(),
        }
    }

    pub fn regular(source: i64, destination: i64, multiplicity: Weight) -> Self {
        Self::new(source, destination, multiplicity, ARC_REGULAR)
    }

    pub fn inhibitor(source: i64, destination: i64, multiplicity: Weight) -> Self {
        Self::new(source, destination, multiplicity, ARC_INHIBITOR)
    }
}

impl TryFrom<&Record> for ArcRecord {
    type Error = DocumentError;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        let multiplicity = record
            .integer_at_least("multiplicity", 1)?
            .ok_or_else(|| missing(record, "multiplicity"))?;
        Ok(Self::new(
            record.integer("sourceId")?,
            record.integer("destinationId")?,
            multiplicity,
            record.text("type")?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceRecord {
    pub id: ElementId,
    pub label: String,
    pub tokens: Weight,
    /// Absent in older editor exports.
    pub capacity: Option<Weight>,
    pub is_static: bool,
}

impl PlaceRecord {
    pub fn new(id: i64, label: impl Into<String>, tokens: Weight) -> Self {
        Self {
            id: ElementId(id),
            label: label.into(),
            tokens,
            capacity: None,
            is_static: false,
        }
    }

    pub fn with_capacity(mut self, capacity: Weight) -> Self {
        self.capacity = Some(capacity);
        self
    }
}

impl TryFrom<&Record> for PlaceRecord {
    type Error = DocumentError;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        let tokens = record
            .integer_at_least("tokens", 0)?
            .ok_or_else(|| missing(record, "tokens"))?;
        Ok(Self {
            id: ElementId(record.integer("id")?),
            label: record.text("label")?.to_owned(),
            tokens,
            capacity: record.integer_at_least("capacity", 0)?,
            is_static: record.flag("isStatic"),
        })
    }
}

/// Stands in for a place owned by another subnet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePlaceRecord {
    pub id: ElementId,
    pub connected_place: ElementId,
}

impl ReferencePlaceRecord {
    pub fn new(id: i64, connected_place: i64) -> Self {
        Self {
            id: ElementId(id),
            connected_place: ElementId(connected_place),
        }
    }
}

impl TryFrom<&Record> for ReferencePlaceRecord {
    type Error = DocumentError;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        Ok(Self::new(
            record.integer("id")?,
            record.integer("connectedPlaceId")?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRecord {
    pub id: ElementId,
    pub label: String,
}

impl TransitionRecord {
    pub fn new(id: i64, label: impl Into<String>) -> Self {
        Self {
            id: ElementId(id),
            label: label.into(),
        }
    }
}

impl TryFrom<&Record> for TransitionRecord {
    type Error = DocumentError;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        Ok(Self::new(record.integer("id")?, record.text("label")?))
    }
}

/// The five flat record sequences of a whole net, subnets already flattened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetRecords {
    pub roles: Vec<RoleRecord>,
    pub arcs: Vec<ArcRecord>,
    pub places: Vec<PlaceRecord>,
    pub reference_places: Vec<ReferencePlaceRecord>,
    pub transitions: Vec<TransitionRecord>,
}

fn missing(record: &Record, field: &str) -> DocumentError {
    DocumentError::MissingField {
        entity: record.entity().to_owned(),
        field: field.to_owned(),
    }
}
