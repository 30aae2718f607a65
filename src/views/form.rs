use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::AppError;
use crate::models::{Entity, FieldKind, Rule};
use crate::views::reference::ReferenceSource;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const NUMBER_MESSAGE: &str = "This field should be a number.";

/// Raw input values keyed by field name, as typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues(BTreeMap<String, String>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Inline messages per field. Empty means the form may be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn add(&mut self, field: &str, message: String) {
        self.0.entry(field.to_string()).or_insert(message);
    }
}

fn min_message(min: i64) -> String {
    format!("This field should be at least {}.", min)
}

fn check_rule(rule: Rule, value: &str) -> Option<String> {
    match rule {
        Rule::Required => None,
        // Non-numeric input is reported by `Number`.
        Rule::Min(min) => match value.parse::<i64>() {
            Ok(n) if n < min => Some(min_message(min)),
            _ => None,
        },
        // Integer fields are stored as 32-bit columns.
        Rule::Number => value.parse::<i32>().err().map(|_| NUMBER_MESSAGE.to_string()),
    }
}

/// Runs every field rule of `E` against `values`. The first failing rule of
/// a field wins; empty optional fields skip their remaining rules.
pub fn validate<E: Entity>(values: &FormValues) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    for field in E::fields() {
        let value = values.get(field.name).unwrap_or_default().trim();
        if value.is_empty() {
            if field.is_required() {
                errors.add(field.name, REQUIRED_MESSAGE.to_string());
            }
            continue;
        }
        if let Some(message) = field.rules.iter().find_map(|rule| check_rule(*rule, value)) {
            errors.add(field.name, message);
        }
    }

    for reference in E::references() {
        let value = values.get(reference.name).unwrap_or_default().trim();
        if reference.required && value.is_empty() {
            errors.add(reference.name, REQUIRED_MESSAGE.to_string());
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

pub(crate) fn to_object<E: Entity>(entity: &E) -> Result<Map<String, Value>, AppError> {
    match serde_json::to_value(entity)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::BadRequest(format!(
            "{} does not serialize to an object: {}",
            E::NAME,
            other
        ))),
    }
}

pub(crate) fn display(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Form defaults for an existing record: scalar fields as text and each
/// reference as the id of the referenced record.
pub fn default_values<E: Entity>(entity: &E) -> Result<FormValues, AppError> {
    let object = to_object(entity)?;
    let mut values = FormValues::new();

    for field in E::fields() {
        values.set(field.name, display(object.get(field.name)));
    }
    for reference in E::references() {
        let id = object.get(reference.name).and_then(|r| r.get("id"));
        values.set(reference.name, display(id));
    }

    Ok(values)
}

/// Merges `values` over `base`, keeping every field the form does not carry,
/// then replaces each reference value by the matching record from its
/// source. An unmatched reference ends up absent.
pub fn merge_values<E: Entity>(
    base: &E,
    values: &FormValues,
    sources: &[Box<dyn ReferenceSource>],
) -> Result<E, AppError> {
    let mut object = to_object(base)?;

    for field in E::fields() {
        let Some(raw) = values.get(field.name) else {
            continue;
        };
        let value = match field.kind {
            FieldKind::Text | FieldKind::TextArea => Value::String(raw.to_string()),
            FieldKind::Integer => {
                let n = raw.trim().parse::<i32>().map_err(|_| {
                    AppError::BadRequest(format!("{}: {}", field.name, NUMBER_MESSAGE))
                })?;
                Value::from(n)
            }
        };
        object.insert(field.name.to_string(), value);
    }

    for reference in E::references() {
        let Some(raw) = values.get(reference.name) else {
            continue;
        };
        let resolved = sources
            .iter()
            .find(|s| s.spec().name == reference.name)
            .and_then(|s| s.resolve(raw));
        match resolved {
            Some(value) => object.insert(reference.name.to_string(), value),
            None => object.remove(reference.name),
        };
    }

    Ok(serde_json::from_value(Value::Object(object))?)
}
