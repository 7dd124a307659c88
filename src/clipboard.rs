use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("clipboard write failed: {0}")]
    Write(String),
}

/// Destination for copied install commands.
pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// System clipboard via arboard. The handle is opened on first use and kept
/// alive, since X11 only serves the selection while its owner exists.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Option<arboard::Clipboard>,
}

impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.handle.is_none() {
            let opened = arboard::Clipboard::new()
                .map_err(|err| ClipboardError::Unavailable(err.to_string()))?;
            self.handle = Some(opened);
        }

        let Some(clipboard) = self.handle.as_mut() else {
            return Err(ClipboardError::Unavailable("no clipboard handle".to_string()));
        };

        clipboard
            .set_text(text.to_string())
            .map_err(|err| ClipboardError::Write(err.to_string()))
    }
}
