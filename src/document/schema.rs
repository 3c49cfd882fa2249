//! Fixed field-name to value-kind table, applied eagerly while records are
//! read so that type errors surface at the document boundary.
use indexmap::IndexMap;

use super::DocumentError;
use super::markup::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Flag,
    IntegerList,
    Integer,
}

impl FieldKind {
    pub fn of(field: &str) -> Self {
        match field {
            "label" | "type" | "name" => FieldKind::Text,
            "isStatic" | "createCase" | "destroyCase" => FieldKind::Flag,
            "transitionId" => FieldKind::IntegerList,
            _ => FieldKind::Integer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Flag(bool),
    Integer(i64),
    IntegerList(Vec<i64>),
}

/// Untyped entity record: field name to coerced scalar, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    entity: String,
    fields: IndexMap<String, Value>,
}

impl Record {
    pub fn from_element(element: &Element) -> Result<Self, DocumentError> {
        let entity = element.name.clone();
        let mut fields = IndexMap::new();

        // layout sub-structures (arc break points and the like) are not fields
        for child in element.children.iter().filter(|child| child.is_leaf()) {
            let field = child.name.as_str();
            match FieldKind::of(field) {
                FieldKind::Text => {
                    fields.insert(field.to_owned(), Value::Text(child.text.clone()));
                }
                FieldKind::Flag => {
                    let flag = match child.text.trim() {
                        "true" => true,
                        "false" => false,
                        other => return Err(invalid(&entity, field, other)),
                    };
                    fields.insert(field.to_owned(), Value::Flag(flag));
                }
                FieldKind::IntegerList => {
                    let item = parse_integer(&entity, field, &child.text)?;
                    let slot = fields
                        .entry(field.to_owned())
                        .or_insert_with(|| Value::IntegerList(Vec::new()));
                    if let Value::IntegerList(items) = slot {
                        items.push(item);
                    }
                }
                FieldKind::Integer => {
                    let number = parse_integer(&entity, field, &child.text)?;
                    fields.insert(field.to_owned(), Value::Integer(number));
                }
            }
        }

        Ok(Self { entity, fields })
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn text(&self, field: &str) -> Result<&str, DocumentError> {
        match self.get(field) {
            Some(Value::Text(text)) => Ok(text),
            _ => Err(self.missing(field)),
        }
    }

    pub fn integer(&self, field: &str) -> Result<i64, DocumentError> {
        self.optional_integer(field)?
            .ok_or_else(|| self.missing(field))
    }

    pub fn optional_integer(&self, field: &str) -> Result<Option<i64>, DocumentError> {
        match self.get(field) {
            Some(Value::Integer(number)) => Ok(Some(*number)),
            None => Ok(None),
            Some(_) => Err(self.missing(field)),
        }
    }

    /// Integer with a lower bound checked at the boundary.
    pub fn integer_at_least(&self, field: &str, min: i64) -> Result<Option<i64>, DocumentError> {
        match self.optional_integer(field)? {
            Some(number) if number < min => {
                Err(invalid(&self.entity, field, &number.to_string()))
            }
            other => Ok(other),
        }
    }

    pub fn integers(&self, field: &str) -> &[i64] {
        match self.get(field) {
            Some(Value::IntegerList(items)) => items,
            _ => &[],
        }
    }

    pub fn flag(&self, field: &str) -> bool {
        matches!(self.get(field), Some(Value::Flag(true)))
    }

    fn missing(&self, field: &str) -> DocumentError {
        DocumentError::MissingField {
            entity: self.entity.clone(),
            field: field.to_owned(),
        }
    }
}

fn parse_integer(entity: &str, field: &str, raw: &str) -> Result<i64, DocumentError> {
    raw.trim().parse().map_err(|_| invalid(entity, field, raw))
}

fn invalid(entity: &str, field: &str, value: &str) -> DocumentError {
    DocumentError::InvalidValue {
        entity: entity.to_owned(),
        field: field.to_owned(),
        value: value.to_owned(),
    }
}
