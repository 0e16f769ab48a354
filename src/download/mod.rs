//! Download engine: connections, jobs, archive extraction and path rules.
//!
//! A [`DownloadJob`] takes one [`MusicItem`](crate::MusicItem) from request to
//! final files. Tracks stream into a single file; releases stream a zip
//! archive whose entries are routed and written one at a time.
//!
//! # Example
//!
//! ```no_run
//! use mcat_core::{ApiClient, Catalog, DownloadJob, JobContext, JobOutcome, Settings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::default();
//! let api = ApiClient::new(&settings)?;
//! let release = api.release("742779548588").await?;
//!
//! let mut job = DownloadJob::spawn(release.into(), JobContext::new(api, settings));
//! while let Some(event) = job.next_event().await {
//!     println!("{event:?}");
//! }
//! if let JobOutcome::Completed(summary) = job.outcome().await {
//!     println!("wrote {} files", summary.files.len());
//! }
//! # Ok(())
//! # }
//! ```

mod archive;
mod client;
mod connection;
mod constants;
mod error;
mod filename;
mod job;
mod paths;
mod zip_stream;

pub use archive::{EntryRoute, route_entry};
pub use client::ApiClient;
pub use connection::{Connection, CountingReader};
pub use constants::{CONNECT_TIMEOUT_SECS, PART_SUFFIX, READ_TIMEOUT_SECS};
pub use error::DownloadError;
pub use filename::{ReleaseFile, part_path, sanitize_filename};
pub use job::{
    CancelFlag, DownloadJob, JobContext, JobEvent, JobHandle, JobOutcome, JobState, JobSummary,
};
pub use paths::{
    destination, entry_path, folder, release_folder, release_path, shared_mixes_folder,
    track_path,
};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
