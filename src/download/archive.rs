//! Release archive extraction.
//!
//! Releases are served as zip archives. Entries are read in stream order
//! straight off the connection; each one is routed by [`route_entry`] and
//! written with the same part-file discipline as a single track.

use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::constants::{ALBUM_MIX_MARKER, COPY_BUFFER_SIZE, COVER_MARKER, COVER_SENTINEL};
use super::error::DownloadError;
use super::filename::sanitize_filename;
use super::job::{FileTransfer, Reporter, write_file};
use super::paths;
use super::zip_stream::ArchiveReader;
use crate::catalog::Release;
use crate::settings::{AlbumMixPolicy, Settings};

/// Where an archive entry goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryRoute {
    /// The entry is dropped.
    Skip,
    /// The entry is written to this path.
    Write(PathBuf),
}

/// Routes the entry named `name` (its base name) of `release`.
///
/// `folder` is the directory the release is being extracted into.
#[must_use]
pub fn route_entry(name: &str, release: &Release, settings: &Settings, folder: &Path) -> EntryRoute {
    let is_cover = name.contains(COVER_MARKER);
    if name == COVER_SENTINEL || (is_cover && !settings.cover_art.includes(release.is_multi)) {
        return EntryRoute::Skip;
    }
    if is_cover {
        return EntryRoute::Write(folder.join(sanitize_filename(name)));
    }
    if name.contains(ALBUM_MIX_MARKER) {
        return match settings.album_mixes {
            AlbumMixPolicy::Separate => EntryRoute::Write(paths::entry_path(
                name,
                release,
                settings,
                &paths::shared_mixes_folder(settings),
            )),
            AlbumMixPolicy::Exclude => EntryRoute::Skip,
            AlbumMixPolicy::Include => {
                EntryRoute::Write(paths::entry_path(name, release, settings, folder))
            }
        };
    }
    EntryRoute::Write(paths::entry_path(name, release, settings, folder))
}

/// What an extraction wrote before it ended.
#[derive(Debug, Default)]
pub(crate) struct Extraction {
    pub(crate) files: Vec<PathBuf>,
    pub(crate) bytes: u64,
    pub(crate) cancelled: bool,
}

/// Extracts the archive in `source` into `folder`.
///
/// Stops early once cancellation is requested; `cancelled` is set in that case.
pub(crate) fn extract<R: Read>(
    source: &mut R,
    release: &Release,
    settings: &Settings,
    folder: &Path,
    reporter: &Reporter,
) -> Result<Extraction, DownloadError> {
    let mut extraction = Extraction::default();
    let mut archive = ArchiveReader::new(BufReader::with_capacity(COPY_BUFFER_SIZE, source));

    while !reporter.is_cancelled() {
        let mut entry = match archive.next_entry() {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(_) if reporter.is_cancelled() => break,
            Err(e) => return Err(DownloadError::archive(&release.id, e)),
        };

        let name = entry
            .name()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        let route = if entry.is_dir() {
            EntryRoute::Skip
        } else {
            route_entry(&name, release, settings, folder)
        };
        match route {
            EntryRoute::Skip => {
                debug!(entry = %entry.name(), "skipping archive entry");
                match entry.skip() {
                    Ok(()) => {}
                    Err(_) if reporter.is_cancelled() => break,
                    Err(e) => return Err(DownloadError::archive(&release.id, e)),
                }
            }
            EntryRoute::Write(path) => {
                let size = entry.size();
                trace!(entry = %name, ?size, path = %path.display(), "extracting entry");
                match write_file(reporter, &mut entry, size, &path)? {
                    FileTransfer::Written(bytes) => {
                        extraction.bytes += bytes;
                        extraction.files.push(path);
                    }
                    FileTransfer::Cancelled => break,
                }
            }
        }
    }

    extraction.cancelled = reporter.is_cancelled();
    Ok(extraction)
}
