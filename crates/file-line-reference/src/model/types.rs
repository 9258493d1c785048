use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Language family of a document, classified from the editor's language identifier.
///
/// Identifiers follow the common editor naming (`c`, `cpp`, `objective-c`,
/// `objective-cpp`, `java`). Anything else is [`Language::Other`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Language {
    C,
    Cpp,
    ObjectiveC,
    ObjectiveCpp,
    Java,
    Other,
}

impl Language {
    /// Classify an editor language identifier; unknown identifiers map to `Other`
    pub fn from_id(language_id: &str) -> Self {
        language_id.parse().unwrap_or(Language::Other)
    }

    /// C and C++ share the clangd detail/scope conventions
    pub fn is_c_family(self) -> bool {
        matches!(self, Language::C | Language::Cpp)
    }

    pub fn is_objective_c_family(self) -> bool {
        matches!(self, Language::ObjectiveC | Language::ObjectiveCpp)
    }

    /// How the enclosing function name is looked up for this language
    pub fn lookup_strategy(self) -> LookupStrategy {
        match self {
            Language::Java => LookupStrategy::LineScan,
            Language::C | Language::Cpp | Language::ObjectiveC | Language::ObjectiveCpp => {
                LookupStrategy::SymbolProvider
            }
            Language::Other => LookupStrategy::None,
        }
    }
}

/// Function-name lookup strategy selected once per invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    /// Scan the selected text (or the active line) with a declaration pattern
    LineScan,
    /// Ask the symbol provider for the document outline
    SymbolProvider,
    /// No function enrichment
    None,
}

/// The three user-invocable copy commands
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ReferenceCommand {
    /// File name + line reference
    CopyFileLine,
    /// File name + function reference
    CopyFileFunction,
    /// File name + line + function reference
    CopyFileLineFunction,
}

impl ReferenceCommand {
    pub fn options(self) -> ReferenceOptions {
        match self {
            ReferenceCommand::CopyFileLine => ReferenceOptions {
                include_line: true,
                include_function: false,
            },
            ReferenceCommand::CopyFileFunction => ReferenceOptions {
                include_line: false,
                include_function: true,
            },
            ReferenceCommand::CopyFileLineFunction => ReferenceOptions {
                include_line: true,
                include_function: true,
            },
        }
    }
}

/// Which optional parts a reference carries after the file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReferenceOptions {
    pub include_line: bool,
    pub include_function: bool,
}

/// Launch settings for a language server process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageServerConfig {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub initialization_options: Option<Value>,
}
