//! Infrastructure layer - concrete implementations of application ports

pub mod openapi;
pub mod output;

pub use openapi::{CompositeOpenApiLoader, FileOpenApiLoader, HttpOpenApiLoader};
pub use output::FileSystemOutputService;
