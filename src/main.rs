mod db;
mod model;
mod output;
mod parser;
mod scraper;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use model::{Castaway, CastawayCollection, DEFAULT_MAX_TRACKS};
use parser::extract::ExtractConfig;

/// Upper bound for `--max-tracks`; it sizes every track list and TSV row.
const MAX_TRACKS_LIMIT: usize = 64;

#[derive(Parser)]
#[command(
    name = "castaway_scraper",
    about = "Desert Island Discs castaway choices scraper"
)]
struct Cli {
    /// Page cache database
    #[arg(long, global = true, default_value = db::DEFAULT_DB_PATH)]
    db: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk episode listing pages and write every castaway as tab-separated rows
    Run {
        /// First listing page
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        start_page: u32,
        /// Last listing page (inclusive)
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        end_page: u32,
        /// Seconds to pause between network requests
        #[arg(long, default_value_t = scraper::DEFAULT_SLEEP_SECS)]
        sleep: u64,
        /// Output file, appended to if it exists (default: stdout)
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Tracks kept per castaway
        #[arg(long, default_value_t = DEFAULT_MAX_TRACKS, value_parser = parse_max_tracks)]
        max_tracks: usize,
        /// Always fetch episode pages from the network
        #[arg(long)]
        no_cache: bool,
    },
    /// Extract a single episode page and print it
    Episode {
        #[command(flatten)]
        source: EpisodeSource,
        /// Castaway name, used to tell presenter and guest apart
        #[arg(long, default_value = "")]
        castaway: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every artist in a previously written output file
    Artists {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Show page cache statistics
    Stats,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct EpisodeSource {
    /// Episode page URL
    #[arg(long)]
    url: Option<String>,
    /// Saved episode page
    #[arg(long)]
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            start_page,
            end_page,
            sleep,
            csv,
            max_tracks,
            no_cache,
        } => {
            let cache = if no_cache {
                None
            } else {
                let conn = db::connect(&cli.db)?;
                db::init_schema(&conn)?;
                Some(conn)
            };
            let mut fetcher = scraper::Fetcher::new(cache, Duration::from_secs(sleep))?;
            let config = ExtractConfig { max_tracks };

            let castaways =
                scraper::walk_listing(&mut fetcher, start_page, end_page, &config).await?;
            if castaways.is_empty() {
                eprintln!("No castaways found; nothing written.");
                return Ok(());
            }
            write_output(csv.as_deref(), &castaways, max_tracks)?;
            eprintln!("Wrote {} castaways.", castaways.len());
            Ok(())
        }
        Commands::Episode {
            source,
            castaway,
            json,
        } => {
            let config = ExtractConfig::default();
            let (url, html) = match (source.url, source.file) {
                (Some(url), _) => {
                    let conn = db::connect(&cli.db)?;
                    db::init_schema(&conn)?;
                    let mut fetcher = scraper::Fetcher::new(Some(conn), Duration::ZERO)?;
                    let Some(html) = fetcher.episode_page(&url).await? else {
                        bail!("Could not fetch {}", url);
                    };
                    (url, html)
                }
                (None, Some(path)) => {
                    let html = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    (path.display().to_string(), html)
                }
                (None, None) => bail!("Either --url or --file is required"),
            };

            let episode = parser::episode_from_html(&html, &castaway, &config)
                .with_context(|| format!("extracting {}", url))?;
            if json {
                let castaway = Castaway {
                    name: if castaway.is_empty() {
                        episode.title.clone()
                    } else {
                        castaway
                    },
                    job: String::new(),
                    url,
                    episode,
                };
                println!("{}", serde_json::to_string_pretty(&castaway)?);
            } else {
                println!("{}", url);
                println!("{}", episode);
            }
            Ok(())
        }
        Commands::Artists { csv } => {
            let text = std::fs::read_to_string(&csv)
                .with_context(|| format!("reading {}", csv.display()))?;
            let artists = output::artists(&text);
            for a in &artists {
                println!("{}", a);
            }
            println!("Total rows: {}", artists.len());
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&cli.db)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Cached pages: {}", s.pages);
            println!("Cached bytes: {}", s.bytes);
            println!("Oldest:       {}", s.oldest.as_deref().unwrap_or("-"));
            println!("Newest:       {}", s.newest.as_deref().unwrap_or("-"));
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn write_output(
    path: Option<&Path>,
    castaways: &CastawayCollection,
    max_tracks: usize,
) -> anyhow::Result<()> {
    match path {
        Some(p) if p.as_os_str() != "-" => output::append_tsv(p, castaways, max_tracks),
        _ => {
            let stdout = std::io::stdout();
            output::write_tsv(stdout.lock(), castaways, max_tracks, true)?;
            Ok(())
        }
    }
}

fn parse_max_tracks(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|e| format!("{}", e))?;
    if (1..=MAX_TRACKS_LIMIT).contains(&n) {
        Ok(n)
    } else {
        Err(format!("must be between 1 and {}", MAX_TRACKS_LIMIT))
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

// ── Tests ──
