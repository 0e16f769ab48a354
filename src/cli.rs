//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Download tracks and releases from the Monstercat catalog.
///
/// Files are placed under the download directory following the configured
/// folder templates. Interrupt with Ctrl-C to cancel; partial files are
/// removed and earlier downloads are left untouched.
#[derive(Parser, Debug)]
#[command(name = "mcat-dl")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/mcat-dl/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Root download directory
    #[arg(short = 'd', long = "dir", global = true)]
    pub download_dir: Option<PathBuf>,

    /// Quality/format token (e.g. mp3_320, flac, wav)
    #[arg(long, global = true)]
    pub quality: Option<String>,

    /// Cover art policy: exclude, exclude-singles or include
    #[arg(long, global = true)]
    pub covers: Option<String>,

    /// Album mix policy: Separate, Exclude or Include
    #[arg(long, global = true)]
    pub album_mixes: Option<String>,

    /// Download even if the destination already exists
    #[arg(short, long, global = true)]
    pub force: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// What to download.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Download a single track of a release
    Track {
        /// Track identifier
        id: String,
        /// Identifier of the release the track belongs to
        #[arg(long = "album")]
        album_id: String,
        /// Track title, used for the file name
        #[arg(long)]
        title: String,
        /// Artist credit shown in progress output
        #[arg(long, default_value = "")]
        artists: String,
    },
    /// Download a whole release
    Release {
        /// Release identifier
        id: String,
    },
    /// List the catalog's releases grouped by type
    List,
}
