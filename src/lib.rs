// Gallery media engine: viewport-driven thumbnail pre-caching and cropped video export.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod library;

pub use config::EngineConfig;
pub use engine::manager::LibraryMediaManager;
pub use error::{ExportError, IndexError};
