use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a student record
pub type StudentId = i64;

/// A persisted student record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    /// Assigned by the store on creation; never written by clients
    #[serde(skip_serializing)]
    pub id: StudentId,
    pub name: String,
    pub roll: i64,
    pub city: String,
}

/// Validated field values ready to be written to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentFields {
    pub name: String,
    pub roll: i64,
    pub city: String,
}

impl Student {
    pub fn from_fields(id: StudentId, fields: StudentFields) -> Self {
        Self {
            id,
            name: fields.name,
            roll: fields.roll,
            city: fields.city,
        }
    }

    /// Current field values, used as the base for updates
    pub fn fields(&self) -> StudentFields {
        StudentFields {
            name: self.name.clone(),
            roll: self.roll,
            city: self.city.clone(),
        }
    }
}
