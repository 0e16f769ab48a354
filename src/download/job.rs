//! Download jobs: one item's transfer from connection open to final files.
//!
//! A job moves through `Pending → Connected → Transferring` and ends in
//! exactly one of `Completed`, `Cancelled` or `Failed`. It runs on its own
//! blocking worker; the caller keeps a [`JobHandle`] to observe events,
//! request cancellation and await the outcome.
//!
//! # File protocol
//!
//! Every file is written to `<path>.part` first. Only a completed,
//! non-cancelled copy replaces `<path>`, so readers of the destination never
//! see a truncated file. Cancelled and failed copies delete their part file.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::archive;
use super::client::ApiClient;
use super::connection::{Connection, CountingReader};
use super::constants::COPY_BUFFER_SIZE;
use super::error::DownloadError;
use super::filename::part_path;
use super::paths;
use crate::catalog::{Catalog, MusicItem, Release, Track};
use crate::settings::Settings;

/// Cooperative cancellation flag shared between a job and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Returns immediately.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Lifecycle states of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Created, nothing requested yet.
    Pending,
    /// The download connection answered with a declared length.
    Connected,
    /// Bytes are being copied to disk.
    Transferring,
    /// All files were written and moved into place.
    Completed,
    /// Stopped on request; partial artifacts were removed.
    Cancelled,
    /// Stopped by an error; partial artifacts were removed.
    Failed,
}

impl JobState {
    /// Whether the state is terminal.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// Updates a job publishes for its owner's display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    /// Display title, sent once at creation.
    Title(String),
    /// State transition.
    State(JobState),
    /// Bytes copied so far out of the declared total.
    Progress {
        /// Bytes copied so far.
        current: u64,
        /// Declared total for the current file or stream.
        total: u64,
    },
    /// Name of the file currently being written.
    Message(String),
}

/// What a completed job produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSummary {
    /// Final paths of every file written.
    pub files: Vec<PathBuf>,
    /// Total bytes written across all files.
    pub bytes: u64,
    /// Cover-art URL of the item's release, possibly empty.
    pub cover_url: String,
}

/// Terminal outcome of a job.
#[derive(Debug)]
pub enum JobOutcome {
    /// Every file was written.
    Completed(JobSummary),
    /// The owner cancelled the job.
    Cancelled,
    /// The job stopped on an error.
    Failed(DownloadError),
}

impl JobOutcome {
    /// Terminal state matching this outcome.
    #[must_use]
    pub fn state(&self) -> JobState {
        match self {
            Self::Completed(_) => JobState::Completed,
            Self::Cancelled => JobState::Cancelled,
            Self::Failed(_) => JobState::Failed,
        }
    }
}

/// Collaborators a job needs: the API client, a catalog and the settings.
#[derive(Clone)]
pub struct JobContext {
    api: ApiClient,
    catalog: Arc<dyn Catalog>,
    settings: Arc<Settings>,
}

impl JobContext {
    /// Uses `api` for both downloads and catalog lookups.
    #[must_use]
    pub fn new(api: ApiClient, settings: Settings) -> Self {
        Self {
            catalog: Arc::new(api.clone()),
            api,
            settings: Arc::new(settings),
        }
    }

    /// Replaces the catalog used for metadata lookups.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<dyn Catalog>) -> Self {
        self.catalog = catalog;
        self
    }
}

/// Owner side of a running job.
#[derive(Debug)]
pub struct JobHandle {
    title: String,
    cancel: CancelFlag,
    events: UnboundedReceiver<JobEvent>,
    worker: JoinHandle<JobOutcome>,
}

impl JobHandle {
    /// Display title of the job's item.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Requests cancellation; the job stops at its next poll point.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Flag that cancels this job when set, e.g. from a signal handler.
    #[must_use]
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Next event, or `None` once the job has finished and all events were consumed.
    pub async fn next_event(&mut self) -> Option<JobEvent> {
        self.events.recv().await
    }

    /// Waits for the terminal outcome, discarding unread events.
    pub async fn outcome(self) -> JobOutcome {
        join_worker(self.worker).await
    }

    /// Waits for the terminal outcome and returns it with every unread event.
    pub async fn finish(self) -> (Vec<JobEvent>, JobOutcome) {
        let Self {
            mut events, worker, ..
        } = self;
        let outcome = join_worker(worker).await;
        let mut collected = Vec::new();
        while let Ok(event) = events.try_recv() {
            collected.push(event);
        }
        (collected, outcome)
    }
}

async fn join_worker(worker: JoinHandle<JobOutcome>) -> JobOutcome {
    match worker.await {
        Ok(outcome) => outcome,
        Err(join_error) => {
            warn!(error = %join_error, "download worker panicked");
            JobOutcome::Failed(DownloadError::worker(join_error.to_string()))
        }
    }
}

/// Worker-side event publisher and cancellation check.
#[derive(Debug, Clone)]
pub(crate) struct Reporter {
    events: UnboundedSender<JobEvent>,
    cancel: CancelFlag,
}

impl Reporter {
    pub(crate) fn channel(cancel: CancelFlag) -> (Self, UnboundedReceiver<JobEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (Self { events, cancel }, receiver)
    }

    fn emit(&self, event: JobEvent) {
        // The owner may stop listening; the job still runs to its outcome.
        let _ = self.events.send(event);
    }

    pub(crate) fn progress(&self, current: u64, total: u64) {
        self.emit(JobEvent::Progress {
            current: current.min(total),
            total,
        });
    }

    pub(crate) fn message(&self, message: impl Into<String>) {
        self.emit(JobEvent::Message(message.into()));
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Result of writing one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileTransfer {
    /// The file was moved into place with this many bytes.
    Written(u64),
    /// Cancellation stopped the copy; the part file is gone.
    Cancelled,
}

/// Copies `source` into `<path>.part`, then moves it over `path`.
///
/// Progress is reported against `total` after every buffer, or against the
/// bytes copied so far when the size is not known up front. The
/// cancellation flag is polled right after each report. On cancellation or
/// error the part file is deleted and an existing file at `path` is left
/// untouched.
pub(crate) fn write_file<R: Read>(
    reporter: &Reporter,
    source: &mut R,
    total: Option<u64>,
    path: &Path,
) -> Result<FileTransfer, DownloadError> {
    trace!(path = %path.display(), ?total, "downloading file");
    reporter.message(
        path.file_name()
            .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned()),
    );
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| DownloadError::io(parent, e))?;
    }

    let part = part_path(path);
    match copy_to_part(reporter, source, total, path, &part) {
        Err(error) => {
            remove_part_file(&part);
            Err(error)
        }
        Ok(_) if reporter.is_cancelled() => {
            remove_part_file(&part);
            trace!(part = %part.display(), "download cancelled, partial file deleted");
            Ok(FileTransfer::Cancelled)
        }
        Ok(bytes) => {
            if path.is_file() {
                fs::remove_file(path).map_err(|e| DownloadError::io(path, e))?;
            }
            if let Err(e) = fs::rename(&part, path) {
                remove_part_file(&part);
                return Err(DownloadError::io(path, e));
            }
            trace!(part = %part.display(), path = %path.display(), "renamed partial file");
            Ok(FileTransfer::Written(bytes))
        }
    }
}

fn copy_to_part<R: Read>(
    reporter: &Reporter,
    source: &mut R,
    total: Option<u64>,
    path: &Path,
    part: &Path,
) -> Result<u64, DownloadError> {
    let file = File::create(part).map_err(|e| DownloadError::io(part, e))?;
    let mut writer = BufWriter::new(file);
    let mut reader = CountingReader::new(source);
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];

    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) if reporter.is_cancelled() => break,
            Err(e) => return Err(DownloadError::stream(path, e)),
        };
        writer
            .write_all(&buffer[..read])
            .map_err(|e| DownloadError::io(part, e))?;
        reporter.progress(reader.count(), total.unwrap_or_else(|| reader.count()));
        if reporter.is_cancelled() {
            break;
        }
    }

    writer.flush().map_err(|e| DownloadError::io(part, e))?;
    Ok(reader.count())
}

fn remove_part_file(part: &Path) {
    if let Err(e) = fs::remove_file(part)
        && e.kind() != io::ErrorKind::NotFound
    {
        warn!(part = %part.display(), error = %e, "failed to delete partial file");
    }
}

/// How a transfer ended when it did not fail.
enum Transfer {
    Completed(JobSummary),
    Cancelled,
}

/// Working directory of a release download.
///
/// Multi releases whose folder does not exist yet are extracted into
/// `<folder>.part`, which replaces the folder once every entry is written.
/// An existing folder is reused as is, and non-multi releases write straight
/// into their shared category folder.
struct ReleaseWorkspace {
    folder: PathBuf,
    part: Option<PathBuf>,
}

impl ReleaseWorkspace {
    fn prepare(release: &Release, folder: PathBuf) -> Result<Self, DownloadError> {
        if !release.is_multi || folder.exists() {
            fs::create_dir_all(&folder).map_err(|e| DownloadError::io(&folder, e))?;
            return Ok(Self { folder, part: None });
        }
        let part = part_path(&folder);
        fs::create_dir_all(&part).map_err(|e| DownloadError::io(&part, e))?;
        Ok(Self {
            folder,
            part: Some(part),
        })
    }

    fn dir(&self) -> &Path {
        self.part.as_deref().unwrap_or(&self.folder)
    }

    fn discard(&self) {
        if let Some(part) = &self.part
            && let Err(e) = fs::remove_dir_all(part)
            && e.kind() != io::ErrorKind::NotFound
        {
            warn!(part = %part.display(), error = %e, "failed to delete partial folder");
        }
    }

    fn commit(&self) -> Result<(), DownloadError> {
        let Some(part) = &self.part else {
            return Ok(());
        };
        if self.folder.exists() {
            fs::remove_dir_all(&self.folder).map_err(|e| DownloadError::io(&self.folder, e))?;
        }
        fs::rename(part, &self.folder).map_err(|e| DownloadError::io(&self.folder, e))?;
        debug!(folder = %self.folder.display(), "moved partial folder into place");
        Ok(())
    }

    fn final_path(&self, written: &Path) -> PathBuf {
        match &self.part {
            Some(part) => written
                .strip_prefix(part)
                .map_or_else(|_| written.to_path_buf(), |rel| self.folder.join(rel)),
            None => written.to_path_buf(),
        }
    }
}

/// One item's download.
pub struct DownloadJob {
    item: MusicItem,
    cover_url: String,
    ctx: JobContext,
    reporter: Reporter,
    state: JobState,
    length: u64,
    connection: Option<Connection>,
    handle: Handle,
}

impl DownloadJob {
    /// Creates a job for `item` and starts it on a dedicated blocking worker.
    ///
    /// Returns immediately; the title event is already queued on the handle.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn spawn(item: MusicItem, ctx: JobContext) -> JobHandle {
        let handle = Handle::current();
        let cancel = CancelFlag::new();
        let (reporter, events) = Reporter::channel(cancel.clone());
        let title = item.to_string();
        reporter.emit(JobEvent::Title(title.clone()));

        let cover_url = match &item {
            MusicItem::Release(release) => release.cover_url.clone(),
            MusicItem::Track(_) => String::new(),
        };
        let job = Self {
            item,
            cover_url,
            ctx,
            reporter,
            state: JobState::Pending,
            length: 0,
            connection: None,
            handle: handle.clone(),
        };
        let worker = handle.spawn_blocking(move || job.run());

        JobHandle {
            title,
            cancel,
            events,
            worker,
        }
    }

    fn run(mut self) -> JobOutcome {
        let item = self.item.clone();
        debug!(item = %item, "download job started");

        let result = if self.reporter.is_cancelled() {
            Ok(Transfer::Cancelled)
        } else {
            match &item {
                MusicItem::Track(track) => self.download_track(track),
                MusicItem::Release(release) => self.download_release(release),
            }
        };
        self.abort();

        match result {
            Ok(Transfer::Completed(summary)) => {
                self.set_state(JobState::Completed);
                info!(
                    item = %item,
                    files = summary.files.len(),
                    bytes = summary.bytes,
                    "download complete"
                );
                JobOutcome::Completed(summary)
            }
            Ok(Transfer::Cancelled) => {
                self.set_state(JobState::Cancelled);
                info!(item = %item, "download cancelled");
                JobOutcome::Cancelled
            }
            Err(error) => {
                self.set_state(JobState::Failed);
                warn!(item = %item, error = %error, "download failed");
                JobOutcome::Failed(error)
            }
        }
    }

    fn download_track(&mut self, track: &Track) -> Result<Transfer, DownloadError> {
        let release = self
            .handle
            .block_on(self.ctx.catalog.release(&track.album_id))?;
        self.cover_url = release.cover_url;
        if self.reporter.is_cancelled() {
            return Ok(Transfer::Cancelled);
        }

        let path = paths::track_path(track, &self.ctx.settings);
        self.open_connection(&track.album_id, &[("track", track.id.as_str())])?;
        let written = self.transfer_to(&path);
        self.abort();

        Ok(match written? {
            FileTransfer::Written(bytes) => Transfer::Completed(JobSummary {
                files: vec![path],
                bytes,
                cover_url: self.cover_url.clone(),
            }),
            FileTransfer::Cancelled => Transfer::Cancelled,
        })
    }

    fn download_release(&mut self, release: &Release) -> Result<Transfer, DownloadError> {
        let settings = Arc::clone(&self.ctx.settings);
        self.open_connection(&release.id, &[])?;
        let workspace = ReleaseWorkspace::prepare(release, paths::release_folder(release, &settings))?;
        self.set_state(JobState::Transferring);

        let extraction = {
            let Self {
                connection,
                reporter,
                ..
            } = self;
            match connection.as_mut() {
                Some(connection) => {
                    archive::extract(connection, release, &settings, workspace.dir(), reporter)
                }
                None => Err(DownloadError::not_connected(&release.id)),
            }
        };
        let extraction = match extraction {
            Ok(extraction) if !extraction.cancelled => extraction,
            Ok(_) => {
                workspace.discard();
                return Ok(Transfer::Cancelled);
            }
            Err(error) => {
                workspace.discard();
                return Err(error);
            }
        };

        if let Err(error) = workspace.commit() {
            workspace.discard();
            return Err(error);
        }
        Ok(Transfer::Completed(JobSummary {
            files: extraction
                .files
                .iter()
                .map(|written| workspace.final_path(written))
                .collect(),
            bytes: extraction.bytes,
            cover_url: self.cover_url.clone(),
        }))
    }

    fn open_connection(
        &mut self,
        release_id: &str,
        extra: &[(&str, &str)],
    ) -> Result<(), DownloadError> {
        let mut connection = Connection::open(
            &self.ctx.api,
            &self.handle,
            release_id,
            &self.ctx.settings.quality,
            extra,
        )?;
        connection.stop_on(self.reporter.cancel.clone());
        self.length = connection.length();
        self.connection = Some(connection);
        self.set_state(JobState::Connected);
        self.reporter.progress(0, self.length);
        Ok(())
    }

    fn transfer_to(&mut self, path: &Path) -> Result<FileTransfer, DownloadError> {
        self.set_state(JobState::Transferring);
        let Self {
            connection,
            reporter,
            length,
            item,
            ..
        } = self;
        let connection = connection
            .as_mut()
            .ok_or_else(|| DownloadError::not_connected(item.id()))?;
        write_file(reporter, connection, Some(*length), path)
    }

    fn set_state(&mut self, state: JobState) {
        trace!(from = ?self.state, to = ?state, "job state change");
        self.state = state;
        self.reporter.emit(JobEvent::State(state));
    }

    fn abort(&mut self) {
        if let Some(connection) = self.connection.as_mut() {
            connection.abort();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Reader yielding `chunks` one per call, optionally cancelling after the first.
    struct ChunkedReader {
        chunks: Vec<Vec<u8>>,
        cancel_after_first: Option<CancelFlag>,
        fail_at_end: bool,
    }

    impl ChunkedReader {
        fn new(chunks: &[&[u8]]) -> Self {
            Self {
                chunks: chunks.iter().rev().map(|c| c.to_vec()).collect(),
                cancel_after_first: None,
                fail_at_end: false,
            }
        }
    }

    impl Read for ChunkedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let Some(chunk) = self.chunks.pop() else {
                if self.fail_at_end {
                    return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
                }
                return Ok(0);
            };
            buf[..chunk.len()].copy_from_slice(&chunk);
            if let Some(flag) = self.cancel_after_first.take() {
                flag.cancel();
            }
            Ok(chunk.len())
        }
    }

    fn progress_events(receiver: &mut UnboundedReceiver<JobEvent>) -> Vec<(u64, u64)> {
        let mut progress = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            if let JobEvent::Progress { current, total } = event {
                progress.push((current, total));
            }
        }
        progress
    }

    #[test]
    fn test_write_file_moves_part_into_place() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Tracks").join("Alive.mp3");
        let (reporter, mut events) = Reporter::channel(CancelFlag::new());
        let mut source = ChunkedReader::new(&[b"abc", b"defg"]);

        let result = write_file(&reporter, &mut source, Some(7), &path).unwrap();

        assert_eq!(result, FileTransfer::Written(7));
        assert_eq!(fs::read(&path).unwrap(), b"abcdefg");
        assert!(!part_path(&path).exists(), "part file must be gone");
        assert_eq!(events.try_recv().unwrap(), JobEvent::Message("Alive.mp3".to_string()));
        assert_eq!(progress_events(&mut events), vec![(3, 7), (7, 7)]);
    }

    #[test]
    fn test_write_file_unknown_size_reports_running_total() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Alive.mp3");
        let (reporter, mut events) = Reporter::channel(CancelFlag::new());
        let mut source = ChunkedReader::new(&[b"ab", b"cde"]);

        let result = write_file(&reporter, &mut source, None, &path).unwrap();

        assert_eq!(result, FileTransfer::Written(5));
        assert_eq!(events.try_recv().unwrap(), JobEvent::Message("Alive.mp3".to_string()));
        assert_eq!(progress_events(&mut events), vec![(2, 2), (5, 5)]);
    }

    #[test]
    fn test_write_file_replaces_existing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Alive.mp3");
        fs::write(&path, b"old content that is longer").unwrap();
        let (reporter, _events) = Reporter::channel(CancelFlag::new());
        let mut source = ChunkedReader::new(&[b"new"]);

        write_file(&reporter, &mut source, Some(3), &path).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_write_file_cancelled_keeps_existing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Alive.mp3");
        fs::write(&path, b"previous download").unwrap();
        let cancel = CancelFlag::new();
        let (reporter, mut events) = Reporter::channel(cancel.clone());
        let mut source = ChunkedReader::new(&[b"abc", b"def", b"ghi"]);
        source.cancel_after_first = Some(cancel);

        let result = write_file(&reporter, &mut source, Some(9), &path).unwrap();

        assert_eq!(result, FileTransfer::Cancelled);
        assert_eq!(fs::read(&path).unwrap(), b"previous download");
        assert!(!part_path(&path).exists(), "part file must be deleted");
        assert_eq!(progress_events(&mut events), vec![(3, 9)], "copy stops after the poll");
        assert_eq!(source.chunks.len(), 2, "no further reads after cancellation");
    }

    #[test]
    fn test_write_file_read_error_fails_and_cleans_up() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Alive.mp3");
        let (reporter, _events) = Reporter::channel(CancelFlag::new());
        let mut source = ChunkedReader::new(&[b"abc"]);
        source.fail_at_end = true;

        let result = write_file(&reporter, &mut source, Some(10), &path);

        assert!(
            matches!(result, Err(DownloadError::Stream { .. })),
            "Expected stream error, got: {result:?}"
        );
        assert!(!path.exists());
        assert!(!part_path(&path).exists());
    }

    #[test]
    fn test_write_file_unwritable_parent_is_io_error() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("Tracks");
        fs::write(&blocker, b"a file where a folder should be").unwrap();
        let path = blocker.join("Alive.mp3");
        let (reporter, _events) = Reporter::channel(CancelFlag::new());
        let mut source = ChunkedReader::new(&[b"abc"]);

        let result = write_file(&reporter, &mut source, Some(3), &path);

        assert!(
            matches!(result, Err(DownloadError::Io { .. })),
            "Expected IO error, got: {result:?}"
        );
    }

    #[test]
    fn test_progress_never_exceeds_total() {
        let (reporter, mut events) = Reporter::channel(CancelFlag::new());
        reporter.progress(12, 10);
        assert_eq!(progress_events(&mut events), vec![(10, 10)]);
    }

    #[test]
    fn test_release_workspace_uses_part_folder_for_new_multi_release() {
        let temp = TempDir::new().unwrap();
        let folder = temp.path().join("Albums").join("Uncaged");
        let release = Release {
            id: "r1".to_string(),
            title: "Uncaged".to_string(),
            release_type: "Album".to_string(),
            rendered_artists: String::new(),
            cover_url: String::new(),
            is_multi: true,
        };

        let workspace = ReleaseWorkspace::prepare(&release, folder.clone()).unwrap();
        assert_eq!(workspace.dir(), part_path(&folder));
        fs::write(workspace.dir().join("01 Intro.mp3"), b"x").unwrap();
        assert_eq!(
            workspace.final_path(&workspace.dir().join("01 Intro.mp3")),
            folder.join("01 Intro.mp3")
        );

        workspace.commit().unwrap();
        assert!(folder.join("01 Intro.mp3").exists());
        assert!(!part_path(&folder).exists());
    }

    #[test]
    fn test_release_workspace_reuses_existing_folder() {
        let temp = TempDir::new().unwrap();
        let folder = temp.path().join("Albums").join("Uncaged");
        fs::create_dir_all(&folder).unwrap();
        let release = Release {
            id: "r1".to_string(),
            title: "Uncaged".to_string(),
            release_type: "Album".to_string(),
            rendered_artists: String::new(),
            cover_url: String::new(),
            is_multi: true,
        };

        let workspace = ReleaseWorkspace::prepare(&release, folder.clone()).unwrap();
        assert_eq!(workspace.dir(), folder.as_path());
        workspace.discard();
        assert!(folder.exists(), "discarding never touches a reused folder");
    }

    #[test]
    fn test_job_outcome_state() {
        assert_eq!(JobOutcome::Cancelled.state(), JobState::Cancelled);
        assert!(JobOutcome::Cancelled.state().is_terminal());
        assert!(!JobState::Transferring.is_terminal());
        assert_eq!(
            JobOutcome::Failed(DownloadError::empty_response("x")).state(),
            JobState::Failed
        );
    }
}
