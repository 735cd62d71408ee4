//! Content-collection schemas
//!
//! A schema turns the untyped front-matter of one content file into a typed
//! record, or reports every field that does not fit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use super::error::{Field, FieldError, FieldErrorKind, SchemaValidationError};
use crate::helpers;

/// Language used when a post does not declare one
pub const DEFAULT_LANG: &str = "en";

/// Validates raw front-matter into a typed record
pub trait Schema {
    type Output;

    /// Schema name, as referenced from `_config.yml`
    fn name(&self) -> &'static str;

    /// Validate one record. Pure: the same input always gives the same result.
    fn validate(&self, raw: &Value) -> Result<Self::Output, SchemaValidationError>;
}

/// Validated front-matter of a blog post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMetadata {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,

    pub date: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    pub lang: String,
}

impl PostMetadata {
    /// Create metadata with only the required fields set
    pub fn new(title: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            layout: None,
            date,
            categories: None,
            tags: None,
            lang: DEFAULT_LANG.to_string(),
        }
    }

    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    pub fn categories(&self) -> &[String] {
        self.categories.as_deref().unwrap_or_default()
    }
}

/// Schema of the `posts` collection
#[derive(Debug, Clone, Copy, Default)]
pub struct PostSchema;

impl Schema for PostSchema {
    type Output = PostMetadata;

    fn name(&self) -> &'static str {
        "post"
    }

    fn validate(&self, raw: &Value) -> Result<PostMetadata, SchemaValidationError> {
        let empty = Mapping::new();
        let map = match untag(raw) {
            Value::Mapping(map) => map,
            // `---\n---` and files without front-matter
            Value::Null => &empty,
            other => {
                return Err(SchemaValidationError::new(vec![FieldError::mismatch(
                    Field::Root,
                    "mapping",
                    type_name(other),
                )]))
            }
        };

        let mut issues = Issues::default();

        let title = issues.take(required_string(map, Field::Title));
        let layout = issues.take(optional_string(map, Field::Layout));
        let date = issues.take(required_date(map, Field::Date));
        let categories = issues.take_all(optional_string_seq(map, Field::Categories));
        let tags = issues.take_all(optional_string_seq(map, Field::Tags));
        let lang = issues.take(optional_string(map, Field::Lang));

        match (title, layout, date, categories, tags, lang) {
            (Some(title), Some(layout), Some(date), Some(categories), Some(tags), Some(lang)) => {
                Ok(PostMetadata {
                    title,
                    layout,
                    date,
                    categories,
                    tags,
                    lang: lang.unwrap_or_else(|| DEFAULT_LANG.to_string()),
                })
            }
            _ => Err(SchemaValidationError::new(issues.into_inner())),
        }
    }
}

/// Collects field errors while every rule runs
#[derive(Default)]
struct Issues(Vec<FieldError>);

impl Issues {
    fn take<T>(&mut self, result: Result<T, FieldError>) -> Option<T> {
        result.map_err(|e| self.0.push(e)).ok()
    }

    fn take_all<T>(&mut self, result: Result<T, Vec<FieldError>>) -> Option<T> {
        result.map_err(|e| self.0.extend(e)).ok()
    }

    fn into_inner(self) -> Vec<FieldError> {
        self.0
    }
}

fn lookup<'a>(map: &'a Mapping, field: Field) -> Option<&'a Value> {
    map.get(field.as_str()).map(untag)
}

fn required_string(map: &Mapping, field: Field) -> Result<String, FieldError> {
    match lookup(map, field) {
        None => Err(FieldError::missing(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(FieldError::mismatch(field, "string", type_name(other))),
    }
}

fn optional_string(map: &Mapping, field: Field) -> Result<Option<String>, FieldError> {
    match lookup(map, field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(FieldError::mismatch(field, "string", type_name(other))),
    }
}

fn optional_string_seq(map: &Mapping, field: Field) -> Result<Option<Vec<String>>, Vec<FieldError>> {
    let seq = match lookup(map, field) {
        None => return Ok(None),
        Some(Value::Sequence(seq)) => seq,
        Some(other) => {
            return Err(vec![FieldError::mismatch(
                field,
                "sequence of strings",
                type_name(other),
            )])
        }
    };

    let mut items = Vec::with_capacity(seq.len());
    let mut errors = Vec::new();
    for (i, item) in seq.iter().enumerate() {
        match untag(item) {
            Value::String(s) => items.push(s.clone()),
            other => errors.push(FieldError::mismatch(field, "string", type_name(other)).at(i)),
        }
    }

    if errors.is_empty() {
        Ok(Some(items))
    } else {
        Err(errors)
    }
}

fn required_date(map: &Mapping, field: Field) -> Result<DateTime<Utc>, FieldError> {
    match lookup(map, field) {
        None => Err(FieldError::missing(field)),
        Some(value) => coerce_date(value).map_err(|kind| FieldError::new(field, kind)),
    }
}

/// Coerce a date-like value into the canonical UTC datetime
///
/// Strings are parsed with [`helpers::parse_date_string`]; numbers are
/// milliseconds since the Unix epoch.
pub fn coerce_date(value: &Value) -> Result<DateTime<Utc>, FieldErrorKind> {
    match untag(value) {
        Value::String(s) => {
            helpers::parse_date_string(s).ok_or_else(|| FieldErrorKind::UncoercibleDate {
                input: s.clone(),
            })
        }
        Value::Number(n) => n
            .as_f64()
            .and_then(helpers::from_timestamp_millis)
            .ok_or_else(|| FieldErrorKind::UncoercibleDate {
                input: n.to_string(),
            }),
        other => Err(FieldErrorKind::TypeMismatch {
            expected: "date string or timestamp",
            found: type_name(other),
        }),
    }
}

/// Look through YAML tags such as `!!str` or custom `!date`
fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
