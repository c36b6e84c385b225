use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use trainlist::generator::prompt::{DEFAULT_DESCRIPTION, DEFAULT_DURATION, DEFAULT_GENRES};
use trainlist::sync::{DEFAULT_PLAYLIST_NAME, RESULTS_DIR, print_summary, save_report};
use trainlist::{
    AuthorizationFlow, CatalogClient, Config, GeminiClient, PlaylistRequest, PlaylistSync,
    ReconcileStrategy, SyncOptions,
};

#[derive(Parser)]
#[command(name = "trainlist")]
#[command(about = "Generate a running training playlist with Gemini and sync it to Spotify")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a playlist for a training session and write it to Spotify
    Generate {
        /// Total session duration
        #[arg(long, default_value = DEFAULT_DURATION)]
        duration: String,

        /// Session breakdown, e.g. "10 min zone1, 40 min zone2, 10 min zone1"
        #[arg(long, default_value = DEFAULT_DESCRIPTION)]
        description: String,

        /// Preferred genres
        #[arg(long, default_value = DEFAULT_GENRES)]
        genres: String,

        /// Name of the Spotify playlist to create or overwrite
        #[arg(long, default_value = DEFAULT_PLAYLIST_NAME)]
        playlist: String,

        /// Only remove and add the tracks that differ instead of replacing everything
        #[arg(long)]
        minimal_diff: bool,

        /// Seconds to wait for the Spotify authorization redirect
        #[arg(long)]
        auth_timeout: Option<u64>,

        /// Do not try to open the consent page in a browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Show setup guide
    Setup,
}

fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            duration,
            description,
            genres,
            playlist,
            minimal_diff,
            auth_timeout,
            no_browser,
        } => {
            let request = PlaylistRequest {
                duration,
                description,
                genres,
            };
            let strategy = if minimal_diff {
                ReconcileStrategy::Minimal
            } else {
                ReconcileStrategy::FullReplace
            };
            generate(
                &request,
                playlist,
                strategy,
                auth_timeout.map(Duration::from_secs),
                !no_browser,
            )
            .await?;
        }
        Commands::Setup => {
            show_setup_guide();
        }
    }

    Ok(())
}

async fn generate(
    request: &PlaylistRequest,
    playlist: String,
    strategy: ReconcileStrategy,
    auth_timeout: Option<Duration>,
    open_browser: bool,
) -> Result<()> {
    println!("{}", "Training Playlist Generator".cyan().bold());
    println!("{}", "=".repeat(50));
    println!("Duration: {}", request.duration);
    println!("Session: {}", request.description);
    println!("Genres: {}", request.genres);

    let config = Config::from_env().context("Failed to load configuration")?;

    let missing = config.get_missing_config();
    if !missing.is_empty() {
        println!("{}", "Missing configuration:".red());
        for item in &missing {
            println!("   - {}", item);
        }
        println!(
            "\n{}",
            "Please create a .env file with your credentials (see `trainlist setup`).".yellow()
        );
        std::process::exit(1);
    }

    let generator = GeminiClient::new(&config.generator, config.http_timeout)
        .context("Failed to initialize Gemini client")?;
    let catalog = CatalogClient::new(&config.catalog, config.http_timeout)
        .context("Failed to initialize Spotify client")?;

    let flow = AuthorizationFlow::new(&catalog, &config.catalog).with_presenter(
        move |consent_url: &str| {
            println!("\n{}", "Authorize Spotify access in your browser:".yellow());
            println!("   {}", consent_url.cyan());
            if open_browser {
                if let Err(e) = webbrowser::open(consent_url) {
                    warn!("Could not open a browser: {}", e);
                }
            }
        },
    );

    let options = SyncOptions {
        playlist_name: playlist,
        auth_timeout: auth_timeout.unwrap_or(config.auth_timeout),
        strategy,
        ..SyncOptions::new(config.catalog.redirect_uri.clone())
    };

    let mut sync = PlaylistSync::new(&generator, &catalog, flow, options);
    let report = sync
        .run(request)
        .await
        .context("Failed to sync training playlist")?;

    print_summary(&report);

    if let Err(e) = save_report(&report, Path::new(RESULTS_DIR)) {
        warn!("Failed to save sync results: {}", e);
    }

    println!("\n{}", "Playlist ready!".green());

    Ok(())
}

fn show_setup_guide() {
    println!("{}", "Training Playlist Generator Setup Guide".cyan().bold());
    println!("{}", "=".repeat(50));

    println!("\n{}", "1. Spotify API Setup".yellow());
    println!("   - Go to https://developer.spotify.com/dashboard/");
    println!("   - Create a new app");
    println!("   - Copy your Client ID and Client Secret");
    println!("   - Add 'http://127.0.0.1:8888/callback' as a redirect URI");

    println!("\n{}", "2. Gemini API Setup".yellow());
    println!("   - Go to https://aistudio.google.com/app/apikey");
    println!("   - Create an API key");

    println!("\n{}", "3. Configuration".yellow());
    println!("   - Create a .env file with:");
    println!("     SPOTIFY_CLIENT_ID=your_spotify_client_id");
    println!("     SPOTIFY_CLIENT_SECRET=your_spotify_client_secret");
    println!("     SPOTIFY_REDIRECT_URI=http://127.0.0.1:8888/callback");
    println!("     GEMINI_API_KEY=your_gemini_api_key");
    println!("   - Optional: AUTH_TIMEOUT_SECS (default 300), HTTP_TIMEOUT_SECS (default 30)");

    println!("\n{}", "4. Usage".yellow());
    println!("   - trainlist generate                              (60 minutes zone2, rock)");
    println!("   - trainlist generate --duration \"45 minutes\" \\");
    println!("       --description \"10 min zone1, 30 min zone3, 5 min zone1\" \\");
    println!("       --genres \"Punk, grunge\" --playlist \"Tempo Tuesday\"");
    println!("   - trainlist generate --minimal-diff               (keep tracks already present)");

    println!("\n{}", "Ready to train!".green());
}
