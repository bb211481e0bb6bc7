use std::fmt;

#[derive(Debug)]
pub enum WhisperError {
    /// The service is not initialized or a decode session is already active.
    NotReady,
    Model(String),
    Vocab(String),
    Io(String),
}

impl fmt::Display for WhisperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WhisperError::NotReady => write!(f, "transcription service is not ready"),
            WhisperError::Model(msg) => write!(f, "model execution error: {msg}"),
            WhisperError::Vocab(msg) => write!(f, "vocabulary error: {msg}"),
            WhisperError::Io(msg) => write!(f, "io error: {msg}"),
        }
    }
}

impl std::error::Error for WhisperError {}

impl From<std::io::Error> for WhisperError {
    fn from(err: std::io::Error) -> Self {
        WhisperError::Io(err.to_string())
    }
}

impl<R> From<ort::Error<R>> for WhisperError {
    fn from(err: ort::Error<R>) -> Self {
        WhisperError::Model(err.to_string())
    }
}

impl From<serde_json::Error> for WhisperError {
    fn from(err: serde_json::Error) -> Self {
        WhisperError::Vocab(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WhisperError>;
