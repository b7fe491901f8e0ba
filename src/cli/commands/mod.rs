pub mod students;
pub mod token;
