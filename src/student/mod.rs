pub mod model;
pub mod schema;
pub mod validator;

pub use model::{Student, StudentFields, StudentId};
pub use schema::{FieldKind, FieldSpec, STUDENT_SCHEMA};
pub use validator::{FieldErrors, FieldRule, FieldValue, StartsWithLetter, Validator};
