//! Destination resolution for tracks, releases and archive entries.
//!
//! Pure functions: nothing here touches the filesystem. Directories are
//! created by the job right before a file is written, so creation failures
//! surface as [`DownloadError::Io`](super::DownloadError::Io) from the job.

use std::path::{Path, PathBuf};

use super::constants::{DEFAULT_ARTIST, SHARED_MIXES_FOLDER};
use super::filename::{ReleaseFile, sanitize_filename, with_format_suffix};
use crate::catalog::{MusicItem, Release, Track};
use crate::settings::Settings;

/// Destination folder of an item.
///
/// Tracks go to the tracks folder; multi releases to their album folder;
/// podcast and mix releases to their type folders; everything else to the
/// singles folder.
#[must_use]
pub fn folder(item: &MusicItem, settings: &Settings) -> PathBuf {
    match item {
        MusicItem::Track(_) => render_folder(&settings.folders.tracks, None, settings),
        MusicItem::Release(release) => release_folder(release, settings),
    }
}

/// Destination folder of a release.
#[must_use]
pub fn release_folder(release: &Release, settings: &Settings) -> PathBuf {
    let folders = &settings.folders;
    let template = if release.is_multi {
        &folders.albums
    } else {
        match release.release_type.as_str() {
            "Podcast" => &folders.podcasts,
            "Mixes" => &folders.mixes,
            _ => &folders.singles,
        }
    };
    render_folder(template, Some(release), settings)
}

/// Final path of a release download.
///
/// Non-multi releases resolve to a single file named
/// `<artists or "Monstercat"> - <title>.<ext>`; multi releases resolve to
/// their folder, which extraction fills entry by entry.
#[must_use]
pub fn release_path(release: &Release, settings: &Settings) -> PathBuf {
    let folder = release_folder(release, settings);
    if release.is_multi {
        return folder;
    }
    let artists = if release.rendered_artists.trim().is_empty() {
        DEFAULT_ARTIST
    } else {
        release.rendered_artists.trim()
    };
    let name = ReleaseFile::parse(&format!("{artists} - 1 {}", release.title), None).to_file_name();
    folder.join(with_format_suffix(&name, settings.format_extension()))
}

/// Final path of a track download: `<tracks folder>/<title>.<ext>`.
#[must_use]
pub fn track_path(track: &Track, settings: &Settings) -> PathBuf {
    let name = sanitize_filename(track.title.trim());
    render_folder(&settings.folders.tracks, None, settings)
        .join(with_format_suffix(&name, settings.format_extension()))
}

/// Final path of any item (track file, single-release file or release folder).
#[must_use]
pub fn destination(item: &MusicItem, settings: &Settings) -> PathBuf {
    match item {
        MusicItem::Track(track) => track_path(track, settings),
        MusicItem::Release(release) => release_path(release, settings),
    }
}

/// Path of a renamed archive entry inside `folder`.
///
/// Entries of multi releases are renamed against the release title so that
/// every track of a compilation follows the same pattern.
#[must_use]
pub fn entry_path(entry_name: &str, release: &Release, settings: &Settings, folder: &Path) -> PathBuf {
    let album = release.is_multi.then_some(release.title.as_str());
    let name = ReleaseFile::parse(entry_name, album).to_file_name();
    folder.join(with_format_suffix(&name, settings.format_extension()))
}

/// Root-level folder shared by album mixes of every release.
#[must_use]
pub fn shared_mixes_folder(settings: &Settings) -> PathBuf {
    settings.download_dir.join(SHARED_MIXES_FOLDER)
}

fn render_folder(template: &str, release: Option<&Release>, settings: &Settings) -> PathBuf {
    let rendered = match release {
        Some(release) => {
            let artists = if release.rendered_artists.trim().is_empty() {
                DEFAULT_ARTIST
            } else {
                release.rendered_artists.trim()
            };
            template
                .replace("{artists}", &sanitize_filename(artists))
                .replace("{title}", &sanitize_filename(&release.title))
                .replace("{type}", &sanitize_filename(&release.release_type))
                .replace("{id}", &sanitize_filename(&release.id))
        }
        None => template.to_string(),
    };
    rendered
        .split(['/', '\\'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .fold(settings.download_dir.clone(), |path, segment| {
            path.join(sanitize_filename(segment))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(root: &str) -> Settings {
        Settings {
            download_dir: PathBuf::from(root),
            ..Settings::default()
        }
    }

    fn release(kind: &str, is_multi: bool) -> Release {
        Release {
            id: "r1".to_string(),
            title: "Uncaged: Vol. 1".to_string(),
            release_type: kind.to_string(),
            rendered_artists: "Various Artists".to_string(),
            cover_url: String::new(),
            is_multi,
        }
    }

    fn track() -> Track {
        Track {
            id: "t1".to_string(),
            title: "Alive?".to_string(),
            artists_title: "Rootkit".to_string(),
            album_id: "a1".to_string(),
        }
    }

    #[test]
    fn test_folder_for_track_is_tracks_folder() {
        let settings = settings("/music");
        assert_eq!(
            folder(&MusicItem::from(track()), &settings),
            PathBuf::from("/music/Tracks")
        );
    }

    #[test]
    fn test_release_folder_per_category() {
        let settings = settings("/music");
        assert_eq!(
            release_folder(&release("Album", true), &settings),
            PathBuf::from("/music/Albums/Various Artists - Uncaged_ Vol. 1")
        );
        assert_eq!(
            release_folder(&release("Podcast", false), &settings),
            PathBuf::from("/music/Podcast")
        );
        assert_eq!(
            release_folder(&release("Mixes", false), &settings),
            PathBuf::from("/music/Mixes")
        );
        assert_eq!(
            release_folder(&release("Single", false), &settings),
            PathBuf::from("/music/Singles")
        );
    }

    #[test]
    fn test_release_path_for_single_uses_default_artist_when_empty() {
        let settings = settings("/music");
        let mut single = release("Single", false);
        single.rendered_artists = String::new();
        single.title = "Alive".to_string();
        assert_eq!(
            release_path(&single, &settings),
            PathBuf::from("/music/Singles/Monstercat - Alive.mp3")
        );
    }

    #[test]
    fn test_release_path_for_multi_is_folder() {
        let settings = settings("/music");
        let album = release("Album", true);
        assert_eq!(release_path(&album, &settings), release_folder(&album, &settings));
    }

    #[test]
    fn test_track_path_sanitizes_title_and_appends_suffix() {
        let settings = settings("/music");
        assert_eq!(
            track_path(&track(), &settings),
            PathBuf::from("/music/Tracks/Alive_.mp3")
        );
    }

    #[test]
    fn test_track_path_is_deterministic() {
        let settings = settings("/music");
        let item = MusicItem::from(track());
        assert_eq!(destination(&item, &settings), destination(&item, &settings));
    }

    #[test]
    fn test_suffix_follows_quality_token() {
        let mut settings = settings("/music");
        settings.quality = "flac".to_string();
        assert_eq!(
            track_path(&track(), &settings),
            PathBuf::from("/music/Tracks/Alive_.flac")
        );
    }

    #[test]
    fn test_folder_template_placeholders_are_sanitized() {
        let mut settings = settings("/music");
        settings.folders.albums = "Albums/{type}/{artists} - {title} [{id}]".to_string();
        let mut album = release("Album", true);
        album.rendered_artists = "AC/DC".to_string();
        assert_eq!(
            release_folder(&album, &settings),
            PathBuf::from("/music/Albums/Album/AC_DC - Uncaged_ Vol. 1 [r1]")
        );
    }

    #[test]
    fn test_entry_path_renames_multi_entries_only() {
        let settings = settings("/music");
        let folder = Path::new("/music/work");
        let album = release("Album", true);
        assert_eq!(
            entry_path("Rootkit - Uncaged: Vol. 1 - 2 Alive.wav", &album, &settings, folder),
            PathBuf::from("/music/work/02 Rootkit - Alive.mp3")
        );
        assert_eq!(
            entry_path("Rootkit - Other - 2 Alive.wav", &album, &settings, folder),
            PathBuf::from("/music/work/Rootkit - Other - 2 Alive.mp3")
        );

        let single = release("Single", false);
        assert_eq!(
            entry_path("Rootkit - 1 Alive.wav", &single, &settings, folder),
            PathBuf::from("/music/work/Rootkit - Alive.mp3")
        );
    }

    #[test]
    fn test_shared_mixes_folder_is_root_level() {
        let settings = settings("/music");
        assert_eq!(shared_mixes_folder(&settings), PathBuf::from("/music/Mixes"));
    }
}
