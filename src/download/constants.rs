//! Constants for the download module (timeouts, buffers, archive markers).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP idle read timeout (5 minutes for slow archive streams).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Copy buffer size; cancellation is polled once per filled buffer.
pub(crate) const COPY_BUFFER_SIZE: usize = 8 * 1024;

/// Suffix of in-progress files and release folders.
pub const PART_SUFFIX: &str = ".part";

/// Artist credit used when a release has none.
pub(crate) const DEFAULT_ARTIST: &str = "Monstercat";

/// Session cookie name understood by the remote service.
pub(crate) const SESSION_COOKIE: &str = "connect.sid";

/// Archive entry name marking cover art.
pub(crate) const COVER_MARKER: &str = "cover.";

/// Archive entry the service ships when a release has no cover art.
pub(crate) const COVER_SENTINEL: &str = "cover.false";

/// Archive entry name marking an album mix.
pub(crate) const ALBUM_MIX_MARKER: &str = "Album Mix";

/// Root-level folder collecting album mixes under the separate policy.
pub(crate) const SHARED_MIXES_FOLDER: &str = "Mixes";
