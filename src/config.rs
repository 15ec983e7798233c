//! Site constants and runtime configuration for the crawler.
//!
//! The constants describe the markup conventions of
//! [soccerstats.com](https://www.soccerstats.com) that the extractors rely on.
//! [`CrawlerConfig`] carries the values that may be overridden from the CLI.

use chrono::{Datelike, Local};

/// Root of the site; also the seed page holding the league menu.
pub const SOCCER_STATS_URL: &str = "https://www.soccerstats.com";

/// Default number of requests in flight per fetch round.
pub const WORKERS: usize = 10;

/// Menu group that repeats leagues listed under their own country.
pub const FAVOURITES_GROUP: &str = "Favourite leagues";

/// Season links carrying this marker point at recent seasons.
pub const LATEST_MARKER: &str = "latest";

/// User agent sent with every request.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Runtime configuration shared by the fetcher, extractors and pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlerConfig {
    /// Site root without a trailing slash. Relative links are appended to it.
    pub base_url: String,
    /// Upper bound on concurrent requests within one fetch round.
    pub workers: usize,
    /// Year label given to the synthetic season of a league without archives.
    pub current_season: String,
}

impl CrawlerConfig {
    pub fn new(base_url: &str, workers: usize, current_season: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            workers: workers.max(1),
            current_season,
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self::new(SOCCER_STATS_URL, WORKERS, current_season())
    }
}

/// The current calendar year, used as the season label when none is given.
pub fn current_season() -> String {
    Local::now().year().to_string()
}
