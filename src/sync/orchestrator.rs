use chrono::Local;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::auth::{AuthorizationFlow, DEFAULT_AUTH_TIMEOUT, PLAYLIST_SCOPES};
use crate::catalog::{AccessToken, CatalogApi};
use crate::error::{AppError, Result};
use crate::extractor::{SongEntry, extract_songs};
use crate::generator::{PlaylistRequest, SongGenerator, build_prompt};
use crate::sync::reconciler::{PlaylistReconciler, ReconcileStrategy};
use crate::sync::report::SyncReport;

pub const DEFAULT_PLAYLIST_NAME: &str = "MyDailyTrain";
pub const RESULTS_DIR: &str = "sync_results";

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub playlist_name: String,
    pub redirect_uri: String,
    pub auth_timeout: Duration,
    pub strategy: ReconcileStrategy,
    pub show_progress: bool,
}

impl SyncOptions {
    pub fn new(redirect_uri: impl Into<String>) -> Self {
        Self {
            playlist_name: DEFAULT_PLAYLIST_NAME.to_string(),
            redirect_uri: redirect_uri.into(),
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
            strategy: ReconcileStrategy::default(),
            show_progress: true,
        }
    }
}

/// Runs the whole pipeline: generate, extract, search, authorize, reconcile.
///
/// Songs are searched one at a time in the order the model listed them.
pub struct PlaylistSync<'a> {
    generator: &'a dyn SongGenerator,
    catalog: &'a dyn CatalogApi,
    flow: AuthorizationFlow<'a>,
    options: SyncOptions,
}

impl<'a> PlaylistSync<'a> {
    pub fn new(
        generator: &'a dyn SongGenerator,
        catalog: &'a dyn CatalogApi,
        flow: AuthorizationFlow<'a>,
        options: SyncOptions,
    ) -> Self {
        Self {
            generator,
            catalog,
            flow,
            options,
        }
    }

    pub async fn run(&mut self, request: &PlaylistRequest) -> Result<SyncReport> {
        info!("Generating song list for: {}", request.description);
        let prompt = build_prompt(request);
        let response = self.generator.generate(&prompt).await?;

        let songs = extract_songs(&response);
        if songs.is_empty() {
            return Err(AppError::Pipeline(
                "No songs could be extracted from the Gemini response".into(),
            ));
        }
        info!("Extracted {} songs", songs.len());

        let mut report = SyncReport::new(self.options.playlist_name.clone(), songs);

        let search_token = self
            .catalog
            .client_credentials_token()
            .await?
            .ok_or_else(|| AppError::Pipeline("Failed to obtain Spotify search access token".into()))?;

        self.search_tracks(&search_token, &mut report).await?;
        report.calculate_match_rate();

        if report.matched_track_ids.is_empty() {
            return Err(AppError::Pipeline(
                "No Spotify track IDs could be found for the generated songs".into(),
            ));
        }

        let user_token = self
            .flow
            .authorize(
                PLAYLIST_SCOPES,
                &self.options.redirect_uri,
                self.options.auth_timeout,
            )
            .await?;

        let reconcile = PlaylistReconciler::new(self.catalog)
            .with_strategy(self.options.strategy)
            .reconcile(
                &self.options.playlist_name,
                &report.matched_track_ids,
                &user_token,
            )
            .await?;
        report.reconcile = Some(reconcile);

        info!(
            "Playlist '{}' synced: {}/{} songs matched ({:.1}% match rate)",
            report.playlist_name,
            report.matched_track_ids.len(),
            report.songs.len(),
            report.match_rate
        );

        Ok(report)
    }

    async fn search_tracks(&self, token: &AccessToken, report: &mut SyncReport) -> Result<()> {
        let pb = if self.options.show_progress {
            ProgressBar::new(report.songs.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) =
            ProgressStyle::default_bar().template("  {spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }

        let songs: Vec<SongEntry> = report.songs.clone();
        for song in &songs {
            pb.set_message(format!("{} - {}", song.artist, song.title));
            match self
                .catalog
                .search_track(&song.title, &song.artist, token)
                .await?
            {
                Some(id) => report.matched_track_ids.push(id),
                None => {
                    warn!(
                        "Could not find Spotify track ID for: {} - {}",
                        song.artist, song.title
                    );
                    report.unmatched.push(song.clone());
                }
            }
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(())
    }
}

/// Write the report as pretty JSON to `<dir>/sync_<timestamp>.json`.
pub fn save_report(report: &SyncReport, dir: &Path) -> Result<PathBuf> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    fs::create_dir_all(dir)?;

    let filename = dir.join(format!("sync_{}.json", timestamp));
    let json = serde_json::to_string_pretty(report)?;

    fs::write(&filename, json)?;

    info!("Sync results saved to: {}", filename.display());

    Ok(filename)
}

pub fn print_summary(report: &SyncReport) {
    println!();
    println!("{}", "=".repeat(60));
    println!("{}", "PLAYLIST SYNC SUMMARY".bold());
    println!("{}", "=".repeat(60));
    println!("Playlist: {}", report.playlist_name.cyan());
    println!("Songs generated: {}", report.songs.len());
    println!(
        "Matched on Spotify: {}",
        report.matched_track_ids.len().to_string().green()
    );
    println!("Not found: {}", report.unmatched.len().to_string().red());

    let rate = format!("{:.1}%", report.match_rate);
    let rate = if report.match_rate >= 90.0 {
        rate.green()
    } else if report.match_rate >= 70.0 {
        rate.yellow()
    } else {
        rate.red()
    };
    println!("Match rate: {}", rate);

    if let Some(reconcile) = &report.reconcile {
        let action = if reconcile.created { "created" } else { "updated" };
        println!(
            "Playlist {} ({}): removed {}, added {}",
            action, reconcile.playlist.id, reconcile.removed, reconcile.added
        );
    }
    println!("{}", "=".repeat(60));

    if !report.unmatched.is_empty() {
        println!("\nSongs not found:");
        for song in &report.unmatched {
            println!("  {} - {}", song.artist, song.title.yellow());
        }
    }
}
