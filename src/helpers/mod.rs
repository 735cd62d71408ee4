//! Helper functions shared by the schema and the commands

mod date;

pub use date::*;
