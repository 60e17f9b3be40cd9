use thiserror::Error;

/// Failures the user is told about. The [std::fmt::Display] output is the notification text,
/// the underlying reason only goes to the log.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Socket connection failed, try again later.")]
    Connection { reason: String },

    #[error("Speech recognition error. Try again.")]
    Speech { reason: String },

    #[error("Speech recognition is not supported in this environment.")]
    SpeechUnsupported,

    #[error("Could not copy the Room ID")]
    Clipboard { reason: String },
}

impl ClientError {
    pub fn connection(err: &anyhow::Error) -> Self {
        ClientError::Connection {
            reason: format!("{:#}", err),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ClientError::Connection { reason }
            | ClientError::Speech { reason }
            | ClientError::Clipboard { reason } => Some(reason),
            ClientError::SpeechUnsupported => None,
        }
    }
}
