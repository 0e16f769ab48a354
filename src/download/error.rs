//! Error types for the download module.
//!
//! This module defines structured errors for all download operations,
//! providing context-rich error messages for debugging and user feedback.
//! Every variant is fatal to the job that produced it; cancellation is not
//! an error and is reported through [`JobOutcome`](super::JobOutcome).

use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::CatalogError;

/// Errors that can occur during downloads.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Client {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// The configured API base is not a usable URL.
    #[error("invalid API base URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The session cookie contains characters not allowed in a header.
    #[error("session cookie is not a valid header value")]
    InvalidSessionCookie,

    /// Network-level error while opening a connection.
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The service answered the download request with a non-success status.
    #[error("HTTP {status} opening connection to {url}")]
    Connection {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The service answered successfully but declared no content.
    #[error("no file found for {id}")]
    EmptyResponse {
        /// The requested release identifier.
        id: String,
    },

    /// Reading the response stream failed mid-transfer.
    #[error("stream interrupted while writing {path}: {source}")]
    Stream {
        /// The file being written when the read failed.
        path: PathBuf,
        /// The underlying read error.
        #[source]
        source: std::io::Error,
    },

    /// File system error (create, write, rename, delete).
    #[error("IO error at {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The release stream is not a readable zip archive.
    #[error("malformed release archive for {id}: {source}")]
    Archive {
        /// The release identifier.
        id: String,
        /// The underlying read or format error.
        #[source]
        source: std::io::Error,
    },

    /// A transfer step ran without an open connection.
    #[error("no open connection for {id}")]
    NotConnected {
        /// The item identifier.
        id: String,
    },

    /// Catalog lookup required before the transfer failed.
    #[error("catalog lookup failed: {0}")]
    Catalog(#[from] CatalogError),

    /// The worker running the job stopped without reporting an outcome.
    #[error("download worker stopped unexpectedly: {reason}")]
    Worker {
        /// Why the worker stopped.
        reason: String,
    },
}

impl DownloadError {
    /// Creates a client build error.
    pub fn client(source: reqwest::Error) -> Self {
        Self::Client { source }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a connection (non-success status) error.
    pub fn connection(url: impl Into<String>, status: u16) -> Self {
        Self::Connection {
            url: url.into(),
            status,
        }
    }

    /// Creates an empty-response error naming the requested identifier.
    pub fn empty_response(id: impl Into<String>) -> Self {
        Self::EmptyResponse { id: id.into() }
    }

    /// Creates a stream read error.
    pub fn stream(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Stream {
            path: path.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an archive error.
    pub fn archive(id: impl Into<String>, source: std::io::Error) -> Self {
        Self::Archive {
            id: id.into(),
            source,
        }
    }

    /// Creates a not-connected error.
    pub fn not_connected(id: impl Into<String>) -> Self {
        Self::NotConnected { id: id.into() }
    }

    /// Creates a worker error.
    pub fn worker(reason: impl Into<String>) -> Self {
        Self::Worker {
            reason: reason.into(),
        }
    }
}

// Note on From trait implementations:
// `From<reqwest::Error>` and `From<std::io::Error>` are intentionally absent;
// the variants need a URL or path the source errors do not carry.
