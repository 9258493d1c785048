pub mod config;
pub mod lsp;
pub mod model;
pub mod sdk;
pub mod utils;

pub use model::*;
pub use sdk::FileLineReferenceBuilder;
pub use sdk::client::{FileLineReference, STATUS_MESSAGE_TIMEOUT};
pub use sdk::reference_builder::ReferenceBuilder;
pub use sdk::services::{Clipboard, ClipboardError, StatusSink, SymbolProvider};
pub use sdk::symbol_resolver::{SymbolMatch, find_symbol_with_parent, resolve_function_label};
