//! Error types produced by the PokeAPI client.

use std::io;

use thiserror::Error;

/// Transport-level errors encountered while issuing HTTP requests.
///
/// The ingest pipeline treats every variant uniformly as "no data for this
/// URL": failed items are logged and dropped without distinguishing 4xx from
/// 5xx or timeouts.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The server returned an HTTP error status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Fully qualified request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Short error description supplied by the server.
        message: String,
    },
    /// The request failed due to an I/O or decoding error.
    #[error("network error contacting {url}: {source}")]
    Network {
        /// Fully qualified request URL.
        url: String,
        /// I/O error reported by the transport.
        source: io::Error,
    },
}
