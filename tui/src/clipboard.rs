use crate::error::ClientError;

/// Somewhere the room id can be copied to
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClientError>;
}

/// The system clipboard, backed by `arboard`.
///
/// The handle is opened on first use and kept, some platforms drop the
/// clipboard contents together with the handle that set them.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self { inner: None }
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClientError> {
        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new().map_err(|e| ClientError::Clipboard {
                reason: e.to_string(),
            })?,
        };
        let clipboard = self.inner.insert(clipboard);

        clipboard
            .set_text(text.to_owned())
            .map_err(|e| ClientError::Clipboard {
                reason: e.to_string(),
            })
    }
}
