//! Configuration module

mod site;

pub use site::CollectionConfig;
pub use site::CollectionKind;
pub use site::SchemaKind;
pub use site::SiteConfig;
pub use site::DEFAULT_SITE;
