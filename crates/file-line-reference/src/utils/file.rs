use anyhow::Result;
use std::path::{Path, PathBuf};
use url::Url;

/// Canonicalizes a file path, resolving symbolic links and relative components.
///
/// # Errors
/// Returns an error if the path doesn't exist or cannot be canonicalized.
///
/// # Examples
/// ```no_run
/// use file_line_reference::utils::canonicalize_path;
/// let canonical = canonicalize_path("./src/main.rs").unwrap();
/// ```
pub fn canonicalize_path<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    path.as_ref().canonicalize().map_err(|e| {
        anyhow::anyhow!(
            "Failed to canonicalize path '{}': {}",
            path.as_ref().display(),
            e
        )
    })
}

/// Ensures a path is absolute, canonicalizing it if necessary.
pub fn ensure_absolute_path<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        canonicalize_path(path)
    }
}

/// `file://` URI for an absolute path
pub fn file_uri(path: &Path) -> Result<Url> {
    Url::from_file_path(path)
        .map_err(|()| anyhow::anyhow!("Invalid file path: {}", path.display()))
}

/// Last component of a `/` or `\` separated path.
///
/// Both separators are honoured regardless of platform, so editor paths from
/// any OS yield the same name.
///
/// ```
/// use file_line_reference::utils::base_file_name;
/// assert_eq!(base_file_name("C:\\src\\main.cpp"), "main.cpp");
/// assert_eq!(base_file_name("/home/me/Foo.java"), "Foo.java");
/// ```
pub fn base_file_name(path: &str) -> &str {
    path.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(path)
}

/// File extension without the dot, if any
pub fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}
