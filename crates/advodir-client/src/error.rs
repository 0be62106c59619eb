//! Client-side failure kinds.

use hyper::StatusCode;

/// A roster request that did not produce a [`SearchResponse`].
///
/// [`SearchResponse`]: advodir_core::SearchResponse
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid roster url: {0}")]
    InvalidUri(#[from] hyper::http::uri::InvalidUri),

    #[error("cannot build request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("request failed: {0}")]
    Http(#[from] hyper_util::client::legacy::Error),

    #[error("reading response body: {0}")]
    Body(#[from] hyper::Error),

    #[error("server answered {status}")]
    Status { status: StatusCode, message: Option<String> },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// True for failures a later identical request might not hit.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Http(_) | ClientError::Body(_) => true,
            ClientError::Status { status, .. } => status.is_server_error(),
            ClientError::InvalidUri(_) | ClientError::Request(_) | ClientError::Decode(_) => false,
        }
    }
}
