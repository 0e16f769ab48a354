//! CLI entry point for the mcat-dl tool.

use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use mcat_core::download::destination;
use mcat_core::{
    AlbumMixPolicy, ApiClient, Catalog, CoverArtPolicy, DownloadJob, JobContext, JobOutcome,
    MusicItem, Settings, Track, group_by_type,
};
use tracing::{debug, info, warn};

mod app_config;
mod cli;
mod progress;

use cli::{Args, Command};
use progress::JobProgress;

/// Exit code reported when the user interrupts a download.
const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let file_config = app_config::load_file_config(args.config.as_deref())?;
    let settings = build_settings(&args, &file_config)?;
    let api = ApiClient::new(&settings).context("Failed to create API client")?;
    debug!(api = %api.base(), dir = %settings.download_dir.display(), "settings resolved");

    match &args.command {
        Command::List => {
            list_releases(&api).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Release { id } => {
            let release = api
                .release(id)
                .await
                .with_context(|| format!("Failed to look up release '{id}'"))?;
            download(release.into(), api, settings, &args).await
        }
        Command::Track {
            id,
            album_id,
            title,
            artists,
        } => {
            let track = Track {
                id: id.clone(),
                title: title.clone(),
                artists_title: artists.clone(),
                album_id: album_id.clone(),
            };
            download(track.into(), api, settings, &args).await
        }
    }
}

/// Defaults, then the config file, then CLI flags.
fn build_settings(args: &Args, file_config: &app_config::FileConfig) -> Result<Settings> {
    let mut settings = Settings::default();
    file_config.apply_to(&mut settings);

    if let Some(dir) = &args.download_dir {
        settings.download_dir.clone_from(dir);
    }
    if let Some(quality) = &args.quality {
        if quality.trim().is_empty() {
            bail!("--quality must not be empty");
        }
        settings.quality = quality.trim().to_string();
    }
    if let Some(label) = &args.covers {
        let Some(policy) = CoverArtPolicy::parse(label) else {
            bail!("Invalid --covers value '{label}'. Expected one of: exclude, exclude-singles, include");
        };
        settings.cover_art = policy;
    }
    if let Some(label) = &args.album_mixes {
        settings.album_mixes = AlbumMixPolicy::from_label(label);
    }
    Ok(settings)
}

async fn list_releases(api: &ApiClient) -> Result<()> {
    let releases = api.releases().await.context("Failed to list releases")?;
    info!(releases = releases.len(), "catalog loaded");
    for (kind, group) in group_by_type(releases) {
        println!("{kind}");
        for release in group {
            let id = release.id.clone();
            println!("  {id}  {}", MusicItem::from(release));
        }
    }
    Ok(())
}

async fn download(
    item: MusicItem,
    api: ApiClient,
    settings: Settings,
    args: &Args,
) -> Result<ExitCode> {
    let target = destination(&item, &settings);
    if target.exists() && !args.force {
        info!(
            item = %item,
            path = %target.display(),
            "already downloaded, skipping (use --force to download again)"
        );
        return Ok(ExitCode::SUCCESS);
    }

    let mut job = DownloadJob::spawn(item, JobContext::new(api, settings));
    let cancel = job.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling download");
            cancel.cancel();
        }
    });

    let progress = JobProgress::new(!args.quiet);
    while let Some(event) = job.next_event().await {
        progress.apply(&event);
    }
    let title = job.title().to_string();
    let outcome = job.outcome().await;
    progress.finish();

    match outcome {
        JobOutcome::Completed(summary) => {
            info!(
                item = %title,
                files = summary.files.len(),
                bytes = summary.bytes,
                "download complete"
            );
            for file in &summary.files {
                println!("{}", file.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        JobOutcome::Cancelled => {
            warn!(item = %title, "download cancelled");
            Ok(ExitCode::from(EXIT_CANCELLED))
        }
        JobOutcome::Failed(error) => {
            Err(error).with_context(|| format!("Failed to download '{title}'"))
        }
    }
}
