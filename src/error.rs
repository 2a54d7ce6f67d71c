//! Error kinds surfaced by the viewer core

/// Errors produced while resolving sources, decoding native messages,
/// or driving the native surface.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// The descriptor did not yield a usable `uri`
    #[error("no pdf source!")]
    MissingSource,

    /// Network, bundled-asset and inline base64 sources are rejected
    #[error("http, assets, or base64 sources not supported: {uri}")]
    UnsupportedSource { uri: String },

    /// Runtime failure reported by the native surface (missing file, corrupt document, ...)
    #[error("{message}")]
    NativeReported { message: String },

    /// Malformed structured payload in a `loadComplete` message
    #[error("malformed loadComplete payload: {0}")]
    ProtocolParse(#[from] serde_json::Error),

    /// Bad argument passed to an imperative operation
    #[error("{detail}")]
    InvalidArgument { detail: String },
}

impl ViewerError {
    pub fn unsupported(uri: impl Into<String>) -> Self {
        Self::UnsupportedSource { uri: uri.into() }
    }

    pub fn native(message: impl Into<String>) -> Self {
        Self::NativeReported {
            message: message.into(),
        }
    }

    pub fn invalid_argument(detail: impl Into<String>) -> Self {
        Self::InvalidArgument {
            detail: detail.into(),
        }
    }
}
