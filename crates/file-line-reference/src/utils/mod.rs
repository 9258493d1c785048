//! Utility functions for paths, positions, and logging setup.

pub mod file;
pub mod logging;
pub mod position;

// Re-export commonly used functions for convenience
pub use file::{base_file_name, canonicalize_path, ensure_absolute_path, extension_of, file_uri};
pub use position::{is_before, range_contains, to_lsp_position, utf16_column};
