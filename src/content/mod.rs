//! Content module - collections, front-matter and schema validation

pub mod collection;
pub mod error;
pub mod frontmatter;
pub mod loader;
mod schema;

pub use collection::{Collection, CollectionRegistry, POSTS};
pub use error::{Field, FieldError, FieldErrorKind, SchemaValidationError};
pub use frontmatter::FrontMatterError;
pub use loader::{ContentLoader, Entry, EntryError, LoadError, LoadReport};
pub use schema::{coerce_date, PostMetadata, PostSchema, Schema, DEFAULT_LANG};
