//! Validation errors for content schemas

use std::fmt;
use thiserror::Error;

/// A front-matter field known to a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// The front-matter value as a whole
    Root,
    Title,
    Layout,
    Date,
    Categories,
    Tags,
    Lang,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Root => "(root)",
            Field::Title => "title",
            Field::Layout => "layout",
            Field::Date => "date",
            Field::Categories => "categories",
            Field::Tags => "tags",
            Field::Lang => "lang",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single field failed validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
    #[error("required field is missing")]
    MissingRequiredField,

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot convert {input:?} to a date")]
    UncoercibleDate { input: String },
}

/// A field-attributed validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    /// Element position when the failure is inside a sequence
    pub index: Option<usize>,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(field: Field, kind: FieldErrorKind) -> Self {
        Self {
            field,
            index: None,
            kind,
        }
    }

    pub fn missing(field: Field) -> Self {
        Self::new(field, FieldErrorKind::MissingRequiredField)
    }

    pub fn mismatch(field: Field, expected: &'static str, found: &'static str) -> Self {
        Self::new(field, FieldErrorKind::TypeMismatch { expected, found })
    }

    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Field path such as `tags[1]`
    pub fn path(&self) -> String {
        match self.index {
            Some(i) => format!("{}[{}]", self.field, i),
            None => self.field.to_string(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path(), self.kind)
    }
}

impl std::error::Error for FieldError {}

/// Every field violation found in one front-matter record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid front-matter: {}", join_errors(.errors))]
pub struct SchemaValidationError {
    errors: Vec<FieldError>,
}

impl SchemaValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// All field errors, in field declaration order
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Errors reported against a particular field
    pub fn for_field(&self, field: Field) -> impl Iterator<Item = &FieldError> {
        self.errors.iter().filter(move |e| e.field == field)
    }

    pub fn has(&self, field: Field) -> bool {
        self.for_field(field).next().is_some()
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_display() {
        let err = FieldError::mismatch(Field::Tags, "string", "number").at(1);
        assert_eq!(err.to_string(), "tags[1]: expected string, found number");

        let err = FieldError::missing(Field::Title);
        assert_eq!(err.to_string(), "title: required field is missing");
    }

    #[test]
    fn test_validation_error_lists_all_fields() {
        let err = SchemaValidationError::new(vec![
            FieldError::missing(Field::Title),
            FieldError::new(
                Field::Date,
                FieldErrorKind::UncoercibleDate {
                    input: "soon".to_string(),
                },
            ),
        ]);

        assert!(err.has(Field::Title));
        assert!(err.has(Field::Date));
        assert!(!err.has(Field::Tags));
        assert_eq!(
            err.to_string(),
            "invalid front-matter: title: required field is missing; date: cannot convert \"soon\" to a date"
        );
    }
}
