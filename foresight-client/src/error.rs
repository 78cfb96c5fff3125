use reqwest::StatusCode;
use thiserror::Error;

/// A request that could not produce a usable response body.
///
/// Bodies that arrive but lack the expected shape are not errors; the
/// decoders in [`crate::payload`] turn them into "no data".
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid base url: {0}")]
    InvalidUrl(String),

    #[error("bearer token contains characters not allowed in a header")]
    InvalidToken,

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("opening {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("reading forecast csv: {0}")]
    Read(#[from] csv::Error),
}
