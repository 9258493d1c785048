//! Data models for documents, selections, languages, and commands.

pub mod entities;
pub mod types;

// Re-export all types for convenience
pub use entities::{Document, EditorState, Selection};
pub use types::{Language, LanguageServerConfig, LookupStrategy, ReferenceCommand, ReferenceOptions};
