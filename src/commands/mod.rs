//! CLI commands

pub mod check;
pub mod inspect;
pub mod list;
pub mod new;
