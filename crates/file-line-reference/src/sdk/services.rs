//! Host-editor collaborators
//!
//! - SymbolProvider: document outline, backed by a language server
//! - Clipboard / StatusSink: where a finished reference goes

pub mod host_service;
pub mod symbol_service;

pub use host_service::*;
pub use symbol_service::*;
