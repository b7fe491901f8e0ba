use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde_json::{Map, Value};

use crate::config::ValidationConfig;

use super::model::{Student, StudentFields};
use super::schema::{self, FieldKind, FieldSpec, CITY, NAME, ROLL, STUDENT_SCHEMA};

/// Field name -> human readable violations. Sorted so responses are stable.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_NULL: &str = "This field may not be null.";
pub const MSG_BLANK: &str = "This field may not be blank.";
pub const MSG_NOT_STRING: &str = "Not a valid string.";
pub const MSG_NOT_INTEGER: &str = "A valid integer is required.";

/// A payload value after it passed the built-in type checks for its field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
}

/// Extra predicate attached to a single field.
/// Runs only after the built-in checks for that field succeeded.
pub trait FieldRule: Send + Sync + fmt::Debug {
    fn check(&self, field: &str, value: &FieldValue) -> Result<(), String>;
}

/// Text must begin with the given letter, compared case-insensitively
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartsWithLetter {
    letter: char,
}

impl StartsWithLetter {
    pub fn new(letter: char) -> Self {
        Self {
            letter: letter.to_ascii_lowercase(),
        }
    }
}

impl FieldRule for StartsWithLetter {
    fn check(&self, field: &str, value: &FieldValue) -> Result<(), String> {
        let FieldValue::Text(text) = value else {
            return Ok(());
        };

        let matches = text
            .chars()
            .next()
            .map(|c| c.to_lowercase().eq(self.letter.to_lowercase()))
            .unwrap_or(false);

        if matches {
            Ok(())
        } else {
            Err(format!("{} should start with {}", field, self.letter))
        }
    }
}

/// Converts untyped payloads into student field values
#[derive(Debug)]
pub struct Validator {
    schema: &'static [FieldSpec],
    rules: Vec<(&'static str, Box<dyn FieldRule>)>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    pub fn new() -> Self {
        Self {
            schema: STUDENT_SCHEMA,
            rules: Vec::new(),
        }
    }

    /// Build a validator with the rules enabled by configuration
    pub fn from_config(config: &ValidationConfig) -> Self {
        let validator = Self::new();
        match config.name_initial {
            Some(letter) => validator.with_rule(NAME, StartsWithLetter::new(letter)),
            None => validator,
        }
    }

    /// Attach a rule to a field (chainable)
    pub fn with_rule(mut self, field: &'static str, rule: impl FieldRule + 'static) -> Self {
        if schema::field(field).is_none() {
            tracing::warn!("Rule attached to unknown field '{}' will never run", field);
        }
        self.rules.push((field, Box::new(rule)));
        self
    }

    /// Validate a payload against the schema.
    ///
    /// - `existing = None, partial = false`: create; every required field must be present.
    /// - `existing = Some, partial = false`: full update; same presence rule as create.
    /// - `partial = true`: only supplied fields are checked, the rest keep their values.
    ///
    /// Either every supplied field is valid and a complete candidate is returned,
    /// or nothing is returned but the collected errors.
    pub fn validate(
        &self,
        payload: &Map<String, Value>,
        existing: Option<&Student>,
        partial: bool,
    ) -> Result<StudentFields, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut values: HashMap<&'static str, FieldValue> = HashMap::new();

        for spec in self.schema {
            let Some(raw) = payload.get(spec.name) else {
                let required = match existing {
                    Some(_) => spec.required_on_update,
                    None => spec.required_on_create,
                };
                if required && !partial {
                    push_error(&mut errors, spec.name, MSG_REQUIRED);
                }
                continue;
            };

            match coerce(spec, raw).and_then(|value| self.apply_rules(spec.name, value)) {
                Ok(value) => {
                    values.insert(spec.name, value);
                }
                Err(message) => push_error(&mut errors, spec.name, message),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let base = existing.map(Student::fields);
        let name = take_text(&mut values, NAME).or_else(|| base.as_ref().map(|b| b.name.clone()));
        let roll = take_integer(&mut values, ROLL).or_else(|| base.as_ref().map(|b| b.roll));
        let city = take_text(&mut values, CITY).or_else(|| base.as_ref().map(|b| b.city.clone()));

        match (name, roll, city) {
            (Some(name), Some(roll), Some(city)) => Ok(StudentFields { name, roll, city }),
            (name, roll, city) => {
                // Partial payload with nothing to fall back on
                for (field, present) in [(NAME, name.is_some()), (ROLL, roll.is_some()), (CITY, city.is_some())] {
                    if !present {
                        push_error(&mut errors, field, MSG_REQUIRED);
                    }
                }
                Err(errors)
            }
        }
    }

    fn apply_rules(&self, field: &str, value: FieldValue) -> Result<FieldValue, String> {
        for (_, rule) in self.rules.iter().filter(|(name, _)| *name == field) {
            rule.check(field, &value)?;
        }
        Ok(value)
    }
}

/// Built-in type, presence and length checks for one field
fn coerce(spec: &FieldSpec, raw: &Value) -> Result<FieldValue, String> {
    if raw.is_null() {
        return Err(MSG_NULL.to_string());
    }

    match spec.kind {
        FieldKind::Text { max_length } => {
            let Value::String(text) = raw else {
                return Err(MSG_NOT_STRING.to_string());
            };
            let text = text.trim();
            if text.is_empty() {
                return Err(MSG_BLANK.to_string());
            }
            if text.chars().count() > max_length {
                return Err(format!(
                    "Ensure this field has no more than {} characters.",
                    max_length
                ));
            }
            Ok(FieldValue::Text(text.to_string()))
        }
        FieldKind::Integer => {
            let parsed = match raw {
                Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
                Value::String(s) => parse_integer(s.trim()),
                _ => None,
            };
            parsed
                .map(FieldValue::Integer)
                .ok_or_else(|| MSG_NOT_INTEGER.to_string())
        }
    }
}

/// A float with no fractional part that fits in i64
fn integral(value: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// "10", "10." and "10.0" are integers, "10.5" is not
fn parse_integer(text: &str) -> Option<i64> {
    if let Some((whole, zeros)) = text.split_once('.') {
        if !zeros.chars().all(|c| c == '0') {
            return None;
        }
        return whole.parse().ok();
    }
    text.parse().ok()
}

fn push_error(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors.entry(field.to_string()).or_default().push(message.into());
}

fn take_text(values: &mut HashMap<&'static str, FieldValue>, field: &str) -> Option<String> {
    match values.remove(field) {
        Some(FieldValue::Text(text)) => Some(text),
        _ => None,
    }
}

fn take_integer(values: &mut HashMap<&'static str, FieldValue>, field: &str) -> Option<i64> {
    match values.remove(field) {
        Some(FieldValue::Integer(n)) => Some(n),
        _ => None,
    }
}
