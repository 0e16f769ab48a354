//! Configuration file loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use mcat_core::{AlbumMixPolicy, CoverArtPolicy, Settings};

/// File configuration; every field is optional and overrides the default.
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    /// Root download directory.
    pub download_dir: Option<PathBuf>,
    /// Base URL of the remote API.
    pub api_base: Option<String>,
    /// Session cookie sent with every request.
    pub session_cookie: Option<String>,
    /// Quality/format token, e.g. `mp3_320` or `flac`.
    pub quality: Option<String>,
    /// Cover-art policy.
    pub cover_art: Option<CoverArtPolicy>,
    /// Album-mix policy.
    pub album_mixes: Option<AlbumMixPolicy>,
    /// Folder template for tracks.
    pub tracks_folder: Option<String>,
    /// Folder template for multi releases.
    pub albums_folder: Option<String>,
    /// Folder template for podcast releases.
    pub podcasts_folder: Option<String>,
    /// Folder template for mix releases.
    pub mixes_folder: Option<String>,
    /// Folder template for every other release.
    pub singles_folder: Option<String>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// HTTP idle read timeout in seconds.
    pub read_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates config values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        if let Some(quality) = &self.quality
            && quality.trim().is_empty()
        {
            bail!("Invalid config value for `quality`: expected a non-empty format token");
        }
        Ok(())
    }

    /// Applies the values present in the file on top of `settings`.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(dir) = &self.download_dir {
            settings.download_dir.clone_from(dir);
        }
        if let Some(base) = &self.api_base {
            settings.api_base.clone_from(base);
        }
        if let Some(cookie) = &self.session_cookie {
            settings.session_cookie = Some(cookie.clone());
        }
        if let Some(quality) = &self.quality {
            settings.quality.clone_from(quality);
        }
        if let Some(policy) = self.cover_art {
            settings.cover_art = policy;
        }
        if let Some(policy) = self.album_mixes {
            settings.album_mixes = policy;
        }
        let folders = &mut settings.folders;
        for (value, slot) in [
            (&self.tracks_folder, &mut folders.tracks),
            (&self.albums_folder, &mut folders.albums),
            (&self.podcasts_folder, &mut folders.podcasts),
            (&self.mixes_folder, &mut folders.mixes),
            (&self.singles_folder, &mut folders.singles),
        ] {
            if let Some(value) = value {
                slot.clone_from(value);
            }
        }
        if let Some(secs) = self.connect_timeout_secs {
            settings.connect_timeout_secs = secs;
        }
        if let Some(secs) = self.read_timeout_secs {
            settings.read_timeout_secs = secs;
        }
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/mcat-dl/config.toml`
/// 2. `$HOME/.config/mcat-dl/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join("mcat-dl").join("config.toml"));
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("mcat-dl")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config at `path`, or the default path when `None`.
///
/// A missing default file yields an empty config; a missing explicit file is
/// an error.
pub fn load_file_config(path: Option<&Path>) -> Result<FileConfig> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => match resolve_default_config_path() {
            Some(path) => (path, false),
            None => return Ok(FileConfig::default()),
        },
    };
    if !explicit && !path.exists() {
        return Ok(FileConfig::default());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!(
                "Invalid config syntax on line {}: expected key = value",
                line_index + 1
            );
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let line_number = line_index + 1;
        let string_value = || {
            parse_string_literal(value)
                .with_context(|| format!("Invalid `{key}` value on line {line_number}"))
        };

        match key {
            "download_dir" => cfg.download_dir = Some(PathBuf::from(string_value()?)),
            "api_base" => cfg.api_base = Some(string_value()?),
            "session_cookie" => cfg.session_cookie = Some(string_value()?),
            "quality" => cfg.quality = Some(string_value()?),
            "cover_art" => {
                // Accepts the quoted label or the bare legacy number.
                let label = parse_string_literal(value).unwrap_or_else(|_| value.to_string());
                cfg.cover_art = Some(CoverArtPolicy::parse(&label).with_context(|| {
                    format!(
                        "Invalid `cover_art` value '{label}' on line {line_number}: expected one of exclude, exclude-singles, include"
                    )
                })?);
            }
            "album_mixes" => cfg.album_mixes = Some(AlbumMixPolicy::from_label(&string_value()?)),
            "tracks_folder" => cfg.tracks_folder = Some(string_value()?),
            "albums_folder" => cfg.albums_folder = Some(string_value()?),
            "podcasts_folder" => cfg.podcasts_folder = Some(string_value()?),
            "mixes_folder" => cfg.mixes_folder = Some(string_value()?),
            "singles_folder" => cfg.singles_folder = Some(string_value()?),
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_integer_u64(value).with_context(|| {
                    format!("Invalid `connect_timeout_secs` value on line {line_number}")
                })?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(parse_integer_u64(value).with_context(|| {
                    format!("Invalid `read_timeout_secs` value on line {line_number}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}
