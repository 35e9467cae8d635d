//! Error types returned by every public operation of the client.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed source error attached to variants that wrap an underlying failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// All failure modes of the client.
///
/// Errors are always returned, never panicked: resource modules propagate the
/// dispatcher's result unchanged, and streaming operations can additionally
/// yield `Network`/`Decode` errors from the event stream after the initial
/// request succeeded.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid credentials / base URL.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Connection, timeout or TLS failure, including mid-stream disconnects.
    #[error("network error: {message}")]
    Network {
        message: String,
        #[source]
        source: BoxError,
    },

    /// The server answered with a 4xx/5xx status. The raw response body is
    /// preserved verbatim for caller diagnostics.
    #[error("API error (status {status_code}): {body}")]
    Api { status_code: u16, body: String },

    /// A response body or stream frame was not valid JSON, or a stream ended
    /// mid-frame.
    #[error("decode error: {message}")]
    Decode {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// An upload source file could not be opened or read.
    #[error("cannot read {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A collision-free multipart boundary could not be generated.
    #[error("multipart encoding error: {0}")]
    Encode(String),
}

impl Error {
    pub(crate) fn decode(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::Decode {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub(crate) fn truncated(message: impl Into<String>) -> Self {
        Error::Decode {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn network(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::Network {
            message: message.into(),
            source: source.into(),
        }
    }
}
