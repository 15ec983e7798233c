//! # Soccer Stats Crawler
//!
//! Crawls [soccerstats.com](https://www.soccerstats.com) for every league it
//! tracks, the recent seasons of each league, and the teams that played in
//! each season, producing a nested league → season → team tree.
//!
//! ## Usage
//!
//! ```sh
//! soccer_stats_crawler --skip 21 --take 29 -j ./json
//! ```
//!
//! ## Architecture
//!
//! The crawl runs in three phases, each finishing before the next starts:
//! 1. **Seed**: read the league menu from the site root
//! 2. **Seasons round**: fetch every league page concurrently, extract seasons
//! 3. **Teams round**: fetch every season page concurrently, extract teams
//!
//! All requests share one pooled HTTP client and at most `--workers` run at once.

use clap::Parser;
use std::error::Error;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use soccer_stats_crawler::cli::Cli;
use soccer_stats_crawler::config::{self, CrawlerConfig};
use soccer_stats_crawler::fetcher::HttpSource;
use soccer_stats_crawler::models::TreeCounts;
use soccer_stats_crawler::outputs::json;
use soccer_stats_crawler::pipeline::Crawler;
use soccer_stats_crawler::session::{Routing, new_session};
use soccer_stats_crawler::utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("soccer_stats_crawler starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // Early check: ensure JSON output dir is writable before crawling
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "JSON output directory is not writable");
            return Err(e);
        }
    }

    let routing = Routing {
        country_code: args.country_code.clone(),
        proxy_template: args.proxy.clone(),
    };
    let client = new_session(&args.base_url, &routing)?;

    let config = CrawlerConfig::new(
        &args.base_url,
        args.workers,
        args.season.clone().unwrap_or_else(config::current_season),
    );
    let crawler = Crawler::new(HttpSource::new(client), config);

    let leagues = match crawler.run(args.skip, args.take).await {
        Ok(leagues) => leagues,
        Err(e) => {
            error!(error = %e, "Crawl aborted");
            return Ok(ExitCode::FAILURE);
        }
    };

    if leagues.is_empty() {
        warn!("No leagues retrieved; try again later");
        return Ok(ExitCode::FAILURE);
    }

    let counts = TreeCounts::of(&leagues);
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = json::write_leagues(&leagues, dir).await {
            error!(error = %e, "Failed to write JSON");
            return Err(e);
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        leagues = counts.leagues,
        seasons = counts.seasons,
        teams = counts.teams,
        "Execution complete"
    );

    Ok(ExitCode::SUCCESS)
}
