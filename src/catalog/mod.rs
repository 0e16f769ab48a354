//! Catalog model: tracks, releases and the lookup seam used by downloads.
//!
//! Records are owned by the catalog service and treated as read-only by the
//! download engine. The [`Catalog`] trait is the only place the engine asks
//! the service for metadata (a track's parent release, to learn its cover).

mod error;

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;

pub use error::CatalogError;

/// Release types that are albums or compilations rather than singles.
const MULTI_RELEASE_TYPES: &[&str] = &["Album", "Compilation", "EP"];

/// A single track within a release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Track identifier.
    pub id: String,
    /// Track title.
    pub title: String,
    /// Rendered artist credit, possibly empty.
    #[serde(default)]
    pub artists_title: String,
    /// Identifier of the parent release.
    pub album_id: String,
}

/// A release (single, album, compilation, podcast episode, mix).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", from = "ReleaseRecord")]
pub struct Release {
    /// Release identifier.
    pub id: String,
    /// Release title.
    pub title: String,
    /// Release type as reported by the catalog (`Single`, `Album`, `Podcast`, `Mixes`, ...).
    #[serde(rename = "type")]
    pub release_type: String,
    /// Rendered artist credit, possibly empty.
    pub rendered_artists: String,
    /// Cover-art URL, possibly empty.
    pub cover_url: String,
    /// True for albums and compilations, false for singles.
    pub is_multi: bool,
}

/// Wire shape of a release record; the multi flag is derived from the type
/// when the service does not send it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReleaseRecord {
    #[serde(alias = "_id")]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "type", default)]
    release_type: String,
    #[serde(default)]
    rendered_artists: String,
    #[serde(default)]
    cover_url: String,
    #[serde(default)]
    is_multi: Option<bool>,
}

impl From<ReleaseRecord> for Release {
    fn from(record: ReleaseRecord) -> Self {
        let is_multi = record
            .is_multi
            .unwrap_or_else(|| MULTI_RELEASE_TYPES.contains(&record.release_type.as_str()));
        Self {
            id: record.id,
            title: record.title.trim().to_string(),
            release_type: record.release_type,
            rendered_artists: record.rendered_artists,
            cover_url: record.cover_url,
            is_multi,
        }
    }
}

/// The unit of download: either a single track or a whole release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MusicItem {
    /// A track, downloaded as one file scoped to its parent release.
    Track(Track),
    /// A release, downloaded as one archive.
    Release(Release),
}

impl MusicItem {
    /// Identifier of the item.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Track(track) => &track.id,
            Self::Release(release) => &release.id,
        }
    }

    /// Title of the item.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Track(track) => &track.title,
            Self::Release(release) => &release.title,
        }
    }
}

impl From<Track> for MusicItem {
    fn from(track: Track) -> Self {
        Self::Track(track)
    }
}

impl From<Release> for MusicItem {
    fn from(release: Release) -> Self {
        Self::Release(release)
    }
}

impl fmt::Display for MusicItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (artists, title) = match self {
            Self::Track(track) => (track.artists_title.as_str(), track.title.as_str()),
            Self::Release(release) => (release.rendered_artists.as_str(), release.title.as_str()),
        };
        if artists.is_empty() {
            write!(f, "{title}")
        } else {
            write!(f, "{artists} - {title}")
        }
    }
}

/// Metadata lookups the download engine depends on.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetches the release record with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the lookup fails or the record cannot be decoded.
    async fn release(&self, id: &str) -> Result<Release, CatalogError>;
}

/// Groups releases by their type, keeping the order in which types first appear.
#[must_use]
pub fn group_by_type(releases: Vec<Release>) -> Vec<(String, Vec<Release>)> {
    let mut groups: Vec<(String, Vec<Release>)> = Vec::new();
    for release in releases {
        match groups
            .iter_mut()
            .find(|(kind, _)| *kind == release.release_type)
        {
            Some((_, members)) => members.push(release),
            None => groups.push((release.release_type.clone(), vec![release])),
        }
    }
    groups
}
