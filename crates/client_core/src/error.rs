use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("anti-forgery token field `{field}` is missing from the page")]
    MissingCsrfToken { field: String },
    #[error("anti-forgery token field `{field}` is empty")]
    EmptyCsrfToken { field: String },
}

/// Anything that prevents a usable response body from reaching the
/// controller: network failures and bodies that are not the expected JSON.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected response body (HTTP {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}
