use thiserror::Error;

/// Errors raised by the port reader or the merger loop.
#[derive(Debug, Error)]
pub enum MergerError {
    #[error("failed to bind 127.0.0.1:{port}: {source}")]
    AddressInUse {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed transcription line: `{line}`")]
    TranscriptionParse { line: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
