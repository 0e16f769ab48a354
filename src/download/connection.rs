//! Streaming connection to the download endpoint.
//!
//! A [`Connection`] wraps one open download response. Its body is exposed as
//! a blocking [`Read`] so the job worker and the zip reader can consume it
//! from a blocking thread and keeps a running byte count. Once the
//! job's [`CancelFlag`] is set, further reads fail instead of blocking on the
//! network.

use std::io::{self, Read};

use futures_util::TryStreamExt;
use tokio::io::AsyncRead;
use tokio::runtime::Handle;
use tokio_util::io::{StreamReader, SyncIoBridge};
use tracing::{debug, instrument};

use super::client::ApiClient;
use super::error::DownloadError;
use super::job::CancelFlag;

type BodyReader = SyncIoBridge<Box<dyn AsyncRead + Send + Unpin>>;

/// Reader adapter counting every byte that passes through it.
#[derive(Debug)]
pub struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R> CountingReader<R> {
    /// Wraps `inner`, starting the count at zero.
    pub fn new(inner: R) -> Self {
        Self { inner, count: 0 }
    }

    /// Bytes read so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.count += read as u64;
        Ok(read)
    }
}

/// One open download request.
pub struct Connection {
    id: String,
    length: u64,
    body: Option<CountingReader<BodyReader>>,
    stop: Option<CancelFlag>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("length", &self.length)
            .field("open", &self.body.is_some())
            .finish()
    }
}

impl Connection {
    /// Opens a download connection for `release_id`, blocking until headers arrive.
    ///
    /// Must be called from a blocking worker thread; `handle` drives the
    /// request and later body reads.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Network`] or [`DownloadError::Connection`] if the
    /// request fails, and [`DownloadError::EmptyResponse`] if the response
    /// declares no content.
    #[instrument(level = "debug", skip(api, handle, extra))]
    pub fn open(
        api: &ApiClient,
        handle: &Handle,
        release_id: &str,
        quality: &str,
        extra: &[(&str, &str)],
    ) -> Result<Self, DownloadError> {
        let response = handle.block_on(api.open_download(release_id, quality, extra))?;
        let length = response.content_length().unwrap_or(0);
        if length == 0 {
            return Err(DownloadError::empty_response(release_id));
        }
        debug!(length, "connection established");

        let stream = Box::pin(response.bytes_stream().map_err(io::Error::other));
        let reader: Box<dyn AsyncRead + Send + Unpin> = Box::new(StreamReader::new(stream));
        Ok(Self {
            id: release_id.to_string(),
            length,
            body: Some(CountingReader::new(SyncIoBridge::new_with_handle(
                reader,
                handle.clone(),
            ))),
            stop: None,
        })
    }

    /// Makes reads fail with `ConnectionAborted` once `flag` is set.
    pub fn stop_on(&mut self, flag: CancelFlag) {
        self.stop = Some(flag);
    }

    /// Identifier the connection was opened for.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Declared content length; never zero.
    #[must_use]
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Bytes read from the body so far.
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.body.as_ref().map_or(0, CountingReader::count)
    }

    /// Whether the body is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.body.is_some()
    }

    /// Releases the underlying network resource. Safe to call repeatedly.
    pub fn abort(&mut self) {
        if let Some(body) = self.body.take() {
            debug!(id = %self.id, bytes = body.count(), "aborting connection");
        }
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.stop.as_ref().is_some_and(CancelFlag::is_cancelled) {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionAborted,
                format!("download of {} was cancelled", self.id),
            ));
        }
        match self.body.as_mut() {
            Some(body) => body.read(buf),
            None => Err(io::Error::new(
                io::ErrorKind::ConnectionAborted,
                format!("connection for {} was aborted", self.id),
            )),
        }
    }
}
