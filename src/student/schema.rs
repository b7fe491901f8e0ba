//! Static field table for the student record.
//!
//! The validator walks this table instead of reflecting over the struct,
//! so adding a field means adding a row here and a slot in `StudentFields`.

/// Wire type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text { max_length: usize },
    Integer,
}

/// One row of the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required_on_create: bool,
    pub required_on_update: bool,
}

pub const NAME: &str = "name";
pub const ROLL: &str = "roll";
pub const CITY: &str = "city";

pub const STUDENT_SCHEMA: &[FieldSpec] = &[
    FieldSpec {
        name: NAME,
        kind: FieldKind::Text { max_length: 100 },
        required_on_create: true,
        required_on_update: true,
    },
    FieldSpec {
        name: ROLL,
        kind: FieldKind::Integer,
        required_on_create: true,
        required_on_update: true,
    },
    FieldSpec {
        name: CITY,
        kind: FieldKind::Text { max_length: 100 },
        required_on_create: true,
        required_on_update: true,
    },
];

/// Look up a field by name
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    STUDENT_SCHEMA.iter().find(|spec| spec.name == name)
}
