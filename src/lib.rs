//! Monstercat Downloader Core Library
//!
//! This library provides the download engine behind the `mcat-dl` tool:
//! given catalog metadata for a track or a release, it streams the payload
//! from the remote service, unpacks release archives entry by entry, places
//! files according to the configured naming rules and reports progress while
//! remaining cancellable mid-transfer.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`catalog`] - Track/release model and the catalog lookup seam
//! - [`download`] - Path resolution, streaming connections, download jobs and
//!   archive extraction
//! - [`settings`] - User-configurable download settings

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod download;
pub mod settings;
mod user_agent;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogError, MusicItem, Release, Track, group_by_type};
pub use download::{
    ApiClient, CancelFlag, DownloadError, DownloadJob, JobContext, JobEvent, JobHandle,
    JobOutcome, JobState, JobSummary,
};
pub use settings::{AlbumMixPolicy, CoverArtPolicy, FolderTemplates, Settings};
