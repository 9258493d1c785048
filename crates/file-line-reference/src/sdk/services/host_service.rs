use std::io::Write;
use std::time::Duration;

/// Error types for clipboard operations
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Failed to access clipboard: {0}")]
    AccessDenied(String),

    #[error("Failed to write clipboard text: {0}")]
    WriteFailed(String),

    #[error("Failed to write reference: {0}")]
    IoError(#[from] std::io::Error),
}

/// Destination for a finished reference
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Where transient "copied" notifications are shown
pub trait StatusSink: Send + Sync {
    fn show(&self, message: &str, timeout: Duration);
}

/// The system clipboard.
///
/// On Linux the X11/Wayland selection only exists while its owner is alive, so
/// `write_text` keeps serving the text until another application (usually a
/// clipboard manager) takes it over, or until the optional hold time runs out.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard {
    hold: Option<Duration>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop serving the selection after `hold` even if nobody took it over
    pub fn holding_for(hold: Duration) -> Self {
        Self { hold: Some(hold) }
    }

    pub fn hold(&self) -> Option<Duration> {
        self.hold
    }

    #[cfg(target_os = "linux")]
    fn set_text(
        &self,
        clipboard: &mut arboard::Clipboard,
        text: &str,
    ) -> Result<(), arboard::Error> {
        use arboard::SetExtLinux;

        let set = clipboard.set();
        let set = match self.hold {
            Some(hold) => set.wait_until(std::time::Instant::now() + hold),
            None => set.wait(),
        };
        set.text(text)
    }

    #[cfg(not(target_os = "linux"))]
    fn set_text(
        &self,
        clipboard: &mut arboard::Clipboard,
        text: &str,
    ) -> Result<(), arboard::Error> {
        clipboard.set_text(text)
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::AccessDenied(e.to_string()))?;

        self.set_text(&mut clipboard, text).map_err(|e| match e {
            arboard::Error::ClipboardNotSupported | arboard::Error::ClipboardOccupied => {
                ClipboardError::AccessDenied(e.to_string())
            }
            _ => ClipboardError::WriteFailed(e.to_string()),
        })
    }
}

/// Prints the reference on stdout instead of touching the clipboard
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{text}")?;
        stdout.flush()?;
        Ok(())
    }
}

/// Status messages on stderr; a terminal has no transient area so the timeout is unused
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrStatus;

impl StatusSink for StderrStatus {
    fn show(&self, message: &str, _timeout: Duration) {
        eprintln!("{message}");
    }
}

/// Discards status messages
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentStatus;

impl StatusSink for SilentStatus {
    fn show(&self, message: &str, _timeout: Duration) {
        tracing::debug!("status: {}", message);
    }
}
