mod repository;

pub use repository::*;

/// Default schema applied by `init` when no external script is supplied.
pub const SCHEMA: &str = include_str!("schema.sql");
