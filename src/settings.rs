//! Download settings supplied by the configuration layer.
//!
//! These are plain values; loading them from disk and merging CLI overrides
//! happens in the binary. The download engine only ever reads them.

use std::path::PathBuf;

use crate::download::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};

/// Default base URL of the remote catalog/download API.
pub const DEFAULT_API_BASE: &str = "https://connect.monstercat.com/v2";

/// Default quality/format token requested from the service.
pub const DEFAULT_QUALITY: &str = "mp3_320";

/// Which cover-art entries of a release archive are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoverArtPolicy {
    /// Never write cover art.
    Exclude,
    /// Write cover art only for multi releases (albums, compilations).
    ExcludeForSingles,
    /// Always write cover art.
    #[default]
    Include,
}

impl CoverArtPolicy {
    /// Parses a configuration label.
    ///
    /// Accepts the stable labels returned by [`as_str`](Self::as_str) as well
    /// as the legacy numeric settings `0`, `1` and `2`.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "0" | "exclude" => Some(Self::Exclude),
            "1" | "exclude-singles" => Some(Self::ExcludeForSingles),
            "2" | "include" => Some(Self::Include),
            _ => None,
        }
    }

    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exclude => "exclude",
            Self::ExcludeForSingles => "exclude-singles",
            Self::Include => "include",
        }
    }

    /// Whether cover art is written for a release with the given multi flag.
    #[must_use]
    pub fn includes(self, is_multi: bool) -> bool {
        match self {
            Self::Exclude => false,
            Self::ExcludeForSingles => is_multi,
            Self::Include => true,
        }
    }
}

/// Where "Album Mix" entries of a release archive end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlbumMixPolicy {
    /// Collect album mixes in a shared root-level `Mixes` folder.
    Separate,
    /// Skip album mixes entirely.
    Exclude,
    /// Keep album mixes next to the other release entries.
    #[default]
    Include,
}

impl AlbumMixPolicy {
    /// Parses a configuration label. Unrecognized labels keep mixes with the release.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "separate" => Self::Separate,
            "exclude" => Self::Exclude,
            _ => Self::Include,
        }
    }

    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Separate => "separate",
            Self::Exclude => "exclude",
            Self::Include => "include",
        }
    }
}

/// Folder name templates per item category, relative to the download root.
///
/// Templates may contain `/` to nest folders and the placeholders `{artists}`,
/// `{title}`, `{type}` and `{id}`, which are filled from the release record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderTemplates {
    /// Folder for single tracks.
    pub tracks: String,
    /// Folder for multi releases (albums, compilations).
    pub albums: String,
    /// Folder for podcast releases.
    pub podcasts: String,
    /// Folder for mix releases.
    pub mixes: String,
    /// Folder for everything else (singles, EPs without the multi flag).
    pub singles: String,
}

impl Default for FolderTemplates {
    fn default() -> Self {
        Self {
            tracks: "Tracks".to_string(),
            albums: "Albums/{artists} - {title}".to_string(),
            podcasts: "Podcast".to_string(),
            mixes: "Mixes".to_string(),
            singles: "Singles".to_string(),
        }
    }
}

/// Resolved settings for a download run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Root directory all downloads are placed under.
    pub download_dir: PathBuf,
    /// Base URL of the remote API.
    pub api_base: String,
    /// Session cookie value for authenticated downloads.
    pub session_cookie: Option<String>,
    /// Quality/format token, e.g. `mp3_320` or `flac`.
    pub quality: String,
    /// Cover-art inclusion policy for release archives.
    pub cover_art: CoverArtPolicy,
    /// Album-mix routing policy for release archives.
    pub album_mixes: AlbumMixPolicy,
    /// Folder templates per item category.
    pub folders: FolderTemplates,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// HTTP idle read timeout in seconds.
    pub read_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("."),
            api_base: DEFAULT_API_BASE.to_string(),
            session_cookie: None,
            quality: DEFAULT_QUALITY.to_string(),
            cover_art: CoverArtPolicy::default(),
            album_mixes: AlbumMixPolicy::default(),
            folders: FolderTemplates::default(),
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// File extension derived from the first `_`-separated token of the quality.
    ///
    /// `mp3_320` yields `mp3`, `flac` yields `flac`.
    #[must_use]
    pub fn format_extension(&self) -> &str {
        self.quality.split('_').next().unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_extension_uses_first_quality_token() {
        let mut settings = Settings::default();
        assert_eq!(settings.format_extension(), "mp3");

        settings.quality = "flac".to_string();
        assert_eq!(settings.format_extension(), "flac");

        settings.quality = "wav_24_48".to_string();
        assert_eq!(settings.format_extension(), "wav");
    }

    #[test]
    fn test_cover_art_policy_parse_accepts_labels_and_legacy_numbers() {
        assert_eq!(CoverArtPolicy::parse("exclude"), Some(CoverArtPolicy::Exclude));
        assert_eq!(CoverArtPolicy::parse("0"), Some(CoverArtPolicy::Exclude));
        assert_eq!(
            CoverArtPolicy::parse("Exclude-Singles"),
            Some(CoverArtPolicy::ExcludeForSingles)
        );
        assert_eq!(CoverArtPolicy::parse("1"), Some(CoverArtPolicy::ExcludeForSingles));
        assert_eq!(CoverArtPolicy::parse(" include "), Some(CoverArtPolicy::Include));
        assert_eq!(CoverArtPolicy::parse("sometimes"), None);
    }

    #[test]
    fn test_cover_art_policy_includes() {
        assert!(!CoverArtPolicy::Exclude.includes(true));
        assert!(!CoverArtPolicy::Exclude.includes(false));
        assert!(CoverArtPolicy::ExcludeForSingles.includes(true));
        assert!(!CoverArtPolicy::ExcludeForSingles.includes(false));
        assert!(CoverArtPolicy::Include.includes(false));
    }

    #[test]
    fn test_album_mix_policy_unknown_label_keeps_mixes() {
        assert_eq!(AlbumMixPolicy::from_label("Separate"), AlbumMixPolicy::Separate);
        assert_eq!(AlbumMixPolicy::from_label("Exclude"), AlbumMixPolicy::Exclude);
        assert_eq!(AlbumMixPolicy::from_label("Include"), AlbumMixPolicy::Include);
        assert_eq!(AlbumMixPolicy::from_label("whatever"), AlbumMixPolicy::Include);
    }

    #[test]
    fn test_policy_labels_round_trip_through_parsers() {
        for policy in [
            CoverArtPolicy::Exclude,
            CoverArtPolicy::ExcludeForSingles,
            CoverArtPolicy::Include,
        ] {
            assert_eq!(CoverArtPolicy::parse(policy.as_str()).unwrap(), policy);
        }
        for policy in [
            AlbumMixPolicy::Separate,
            AlbumMixPolicy::Exclude,
            AlbumMixPolicy::Include,
        ] {
            assert_eq!(AlbumMixPolicy::from_label(policy.as_str()), policy);
        }
    }
}
