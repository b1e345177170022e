// Application layer - the operation set every client (CLI, import, export) goes through.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
