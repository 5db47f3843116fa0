use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use tracing::{info, warn};

use profile_scraper::error::{ExtractError, FetchError, ScrapeError};
use profile_scraper::fetch::{Fetcher, HttpFetcher};
use profile_scraper::output::{self, Format};
use profile_scraper::parser::{self, probe};
use profile_scraper::pipeline;
use profile_scraper::profile::Profile;
use profile_scraper::render;
use profile_scraper::settings::Settings;

const PREVIEW_CHARS: usize = 500;

#[derive(Parser)]
#[command(name = "profile_scraper", about = "Scrape public profile pages into Markdown")]
struct Cli {
    /// Config file (JSON, TOML or YAML); PROFILE_SCRAPER_* env vars override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch profiles and write one document per profile
    Scrape {
        /// Profile URLs
        #[arg(required = true)]
        urls: Vec<String>,
        /// Output directory (default: from config, else current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print documents to stdout instead of writing files
        #[arg(long)]
        stdout: bool,
        #[arg(short, long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
    },
    /// Extract profiles from saved HTML files
    Extract {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Profile URL recorded in the output (default: the file path)
        #[arg(short, long)]
        url: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        stdout: bool,
        #[arg(short, long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
    },
    /// Show which selector matched each field on a page
    Inspect {
        /// Profile URL to fetch
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        url: Option<String>,
        /// Saved HTML file instead of a URL
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Render a JSON profile record as Markdown
    Render {
        path: PathBuf,
    },
    /// Print the effective selector chains as JSON
    Selectors,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Scrape {
            urls,
            output,
            stdout,
            format,
        } => {
            let out_dir = output.unwrap_or_else(|| settings.output_dir.clone());
            scrape(&settings, urls, &out_dir, stdout, format).await
        }
        Commands::Extract {
            files,
            url,
            output,
            stdout,
            format,
        } => {
            let out_dir = output.unwrap_or_else(|| settings.output_dir.clone());
            extract_files(&settings, &files, url.as_deref(), &out_dir, stdout, format)
        }
        Commands::Inspect { url, file } => inspect(&settings, url, file).await,
        Commands::Render { path } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let profile: Profile = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a valid profile record", path.display()))?;
            print!("{}", render::render_markdown(&profile));
            Ok(())
        }
        Commands::Selectors => {
            let cfg = settings.selector_config()?;
            println!("{}", serde_json::to_string_pretty(&cfg)?);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("Done in {}", format_duration(elapsed));
    }

    result
}

async fn scrape(
    settings: &Settings,
    urls: Vec<String>,
    out_dir: &Path,
    stdout: bool,
    format: Format,
) -> Result<()> {
    let fetcher = Arc::new(HttpFetcher::new(settings)?);
    let selectors = Arc::new(settings.selectors()?);
    let single = urls.len() == 1;

    info!("Scraping {} profile(s)...", urls.len());
    let stats = pipeline::scrape_profiles_streaming(
        fetcher,
        selectors,
        urls,
        settings.concurrency,
        |url, result| match result {
            Ok(profile) => {
                let doc = format.render(&profile)?;
                emit(&profile, &doc, out_dir, stdout, format)?;
                if single && !stdout {
                    println!("\n{}\n", output::preview(&doc, PREVIEW_CHARS));
                }
                Ok(())
            }
            Err(e) => {
                report_failure(url, &e);
                Ok(())
            }
        },
    )
    .await?;

    if stats.total > 1 {
        println!(
            "Done: {} profiles ({} ok, {} errors).",
            stats.total, stats.ok, stats.errors
        );
    }
    if stats.ok == 0 {
        bail!("no profile could be scraped");
    }
    Ok(())
}

fn extract_files(
    settings: &Settings,
    files: &[PathBuf],
    url: Option<&str>,
    out_dir: &Path,
    stdout: bool,
    format: Format,
) -> Result<()> {
    let selectors = settings.selectors()?;

    // Independent pure calls: parse all files in parallel, emit in input order
    let results: Vec<_> = files
        .par_iter()
        .map(|path| {
            let source = url
                .map(str::to_string)
                .unwrap_or_else(|| path.display().to_string());
            let markup = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok::<_, anyhow::Error>(parser::extract_profile(&markup, &source, &selectors))
        })
        .collect();

    let mut ok = 0usize;
    for (path, result) in files.iter().zip(results) {
        match result? {
            Ok(profile) => {
                let doc = format.render(&profile)?;
                emit(&profile, &doc, out_dir, stdout, format)?;
                ok += 1;
            }
            Err(e) => report_failure(&path.display().to_string(), &ScrapeError::Extract(e)),
        }
    }

    if ok == 0 {
        bail!("no profile could be extracted");
    }
    Ok(())
}

async fn inspect(settings: &Settings, url: Option<String>, file: Option<PathBuf>) -> Result<()> {
    let selectors = settings.selectors()?;
    let markup = match (url, file) {
        (_, Some(path)) => {
            std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?
        }
        (Some(url), None) => {
            println!("Target URL: {}", url);
            HttpFetcher::new(settings)?.fetch(&url).await?.into_bytes()
        }
        (None, None) => bail!("give a URL or --file"),
    };

    println!("Content length: {} bytes\n", markup.len());
    let report = probe::probe(&markup, &selectors)?;
    print!("{}", report);

    if report.is_empty() {
        println!("\nNo profile fields matched. The page may be a login wall, a private");
        println!("profile, or a layout the selector chains do not cover yet.");
        println!("Run `profile_scraper selectors` to start a selector override file.");
    }
    Ok(())
}

fn emit(profile: &Profile, doc: &str, out_dir: &Path, stdout: bool, format: Format) -> Result<()> {
    if stdout {
        print!("{}", doc);
        return Ok(());
    }
    let filename = output::profile_filename(profile, format);
    let path = output::write_document(out_dir, &filename, doc)?;
    println!("✓ {} → {}", profile.profile_url, path.display());
    Ok(())
}

fn report_failure(source: &str, err: &ScrapeError) {
    warn!("{}: {}", source, err);
    match err {
        ScrapeError::Extract(ExtractError::ExtractionFailed)
        | ScrapeError::Fetch(FetchError::AuthWall(_)) => {
            eprintln!("✗ {}: could not extract profile data. This could be due to:", source);
            eprintln!("  - a private profile (not publicly visible)");
            eprintln!("  - a login wall or anti-automation page");
            eprintln!("  - a page layout the selector chains do not cover");
        }
        _ => eprintln!("✗ {}: {}", source, err),
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
