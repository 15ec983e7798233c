//! Data models for the crawled league tree.
//!
//! A crawl produces an ordered list of [`League`]s, each holding its
//! [`Season`]s, each holding the [`Team`]s that played in it:
//!
//! ```text
//! League ─┬─ Season ─┬─ Team
//!         │          └─ Team
//!         └─ Season ── Team
//! ```
//!
//! Extractors create leagues and seasons with empty children; the pipeline
//! fills `seasons` and `teams` once the matching fetch round has completed.

use serde::{Deserialize, Serialize};

/// A competition listed in the site menu.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct League {
    /// Country label of the menu group the league was listed under.
    pub country: String,
    /// Display name, e.g. "Premier League".
    pub name: String,
    /// Absolute URL of the league's main page.
    pub url: String,
    /// Seasons in extraction order, most recent first.
    #[serde(default)]
    pub seasons: Vec<Season>,
}

/// One year's run of a league.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Season {
    /// Year label as shown by the site, e.g. "2022/23".
    pub year: String,
    /// Absolute URL of the season's main page.
    pub url: String,
    /// Teams in order of first appearance on the season page.
    #[serde(default)]
    pub teams: Vec<Team>,
}

/// A team that played in a season.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Team {
    pub name: String,
    pub url: String,
}

impl League {
    pub fn new(country: &str, name: &str, url: String) -> Self {
        Self {
            country: country.to_string(),
            name: name.to_string(),
            url,
            seasons: Vec::new(),
        }
    }
}

impl Season {
    pub fn new(year: &str, url: String) -> Self {
        Self {
            year: year.to_string(),
            url,
            teams: Vec::new(),
        }
    }
}

/// Totals over a league tree, used for progress logging.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TreeCounts {
    pub leagues: usize,
    pub seasons: usize,
    pub teams: usize,
}

impl TreeCounts {
    pub fn of(leagues: &[League]) -> Self {
        let seasons = leagues.iter().flat_map(|l| l.seasons.iter());
        Self {
            leagues: leagues.len(),
            seasons: seasons.clone().count(),
            teams: seasons.map(|s| s.teams.len()).sum(),
        }
    }
}
