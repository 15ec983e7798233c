//! Command-line interface definitions for the crawler.
//!
//! All options can be given as flags; the site, routing and proxy options
//! also fall back to environment variables.

use crate::config::{SOCCER_STATS_URL, WORKERS};
use clap::Parser;

/// Command-line arguments for the soccerstats.com crawler.
///
/// # Examples
///
/// ```sh
/// # Crawl everything and print a summary
/// soccer_stats_crawler
///
/// # Crawl leagues 21..50 through a UK proxy and keep the JSON
/// soccer_stats_crawler --skip 21 --take 29 -c gb \
///     --proxy 'http://user-country-{country}:pw@proxy:8000' -j ./json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Site root, also the page holding the league menu
    #[arg(long, env = "SOCCER_STATS_URL", default_value = SOCCER_STATS_URL)]
    pub base_url: String,

    /// Two-letter country code selecting the proxy exit
    #[arg(short, long, env = "CRAWLER_COUNTRY")]
    pub country_code: Option<String>,

    /// Proxy URL template; `{country}` is replaced by the country code
    #[arg(long, env = "CRAWLER_PROXY")]
    pub proxy: Option<String>,

    /// Maximum concurrent requests per fetch round
    #[arg(short, long, default_value_t = WORKERS)]
    pub workers: usize,

    /// Year label for leagues that only list their current season
    #[arg(long)]
    pub season: Option<String>,

    /// Number of leagues to skip from the start of the menu
    #[arg(long, default_value_t = 0)]
    pub skip: usize,

    /// Number of leagues to analyse after skipping
    #[arg(long)]
    pub take: Option<usize>,

    /// Output directory for the JSON file
    #[arg(short, long)]
    pub json_output_dir: Option<String>,
}
