//! Filename sanitization and release-entry naming.
//!
//! Every name the engine writes passes through [`sanitize_filename`] and gets
//! the configured format suffix appended. Archive entry names are normalized
//! through [`ReleaseFile`] so files of one release read uniformly.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use super::constants::PART_SUFFIX;

/// Longest trailing segment still treated as a file extension.
const MAX_EXTENSION_LEN: usize = 4;

/// Parsed form of a release entry name: `Artists - [Album - ]NN Title`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFile {
    artists: Option<String>,
    track_number: Option<u32>,
    title: String,
    numbered: bool,
}

impl ReleaseFile {
    /// Parses an entry name (extension included or not).
    ///
    /// When `album` is given the release is multi-part: a leading album
    /// segment equal to it is dropped and the rendered name keeps the track
    /// number in front so compilation tracks sort in release order.
    #[must_use]
    pub fn parse(entry_name: &str, album: Option<&str>) -> Self {
        let stem = strip_extension(entry_name);
        let mut parts: Vec<&str> = stem.split(" - ").map(str::trim).collect();
        let artists = if parts.len() > 1 {
            Some(parts.remove(0).to_string()).filter(|a| !a.is_empty())
        } else {
            None
        };
        if let Some(album) = album
            && parts.len() > 1
            && parts[0] == album.trim()
        {
            parts.remove(0);
        }
        let (track_number, title) = split_track_number(&parts.join(" - "));
        Self {
            artists,
            track_number,
            title,
            numbered: album.is_some(),
        }
    }

    /// Renders the sanitized file name, without format suffix.
    #[must_use]
    pub fn to_file_name(&self) -> String {
        let base = match &self.artists {
            Some(artists) => format!("{artists} - {}", self.title),
            None => self.title.clone(),
        };
        let name = match (self.numbered, self.track_number) {
            (true, Some(number)) => format!("{number:02} {base}"),
            _ => base,
        };
        sanitize_filename(&name)
    }
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot)
            if dot > 0
                && (1..=MAX_EXTENSION_LEN).contains(&(name.len() - dot - 1))
                && name[dot + 1..].chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            &name[..dot]
        }
        _ => name,
    }
}

fn split_track_number(value: &str) -> (Option<u32>, String) {
    if let Some((digits, rest)) = value.split_once(' ')
        && !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && !rest.trim().is_empty()
        && let Ok(number) = digits.parse::<u32>()
    {
        return (Some(number), rest.trim().to_string());
    }
    (None, value.to_string())
}

/// Appends the format suffix derived from the quality token.
#[must_use]
pub(crate) fn with_format_suffix(name: &str, extension: &str) -> String {
    format!("{name}.{extension}")
}

/// Path of the in-progress sibling of `path` (`<name>.part`).
#[must_use]
pub fn part_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_else(OsString::new);
    name.push(PART_SUFFIX);
    path.with_file_name(name)
}

/// Sanitizes a single path component for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
/// and strips trailing dots and spaces, which some filesystems drop silently.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            // Also handle null and control characters
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let sanitized = sanitized.trim_end_matches(['.', ' ']).trim_start();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(sanitized) {
        sanitized.to_string()
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
