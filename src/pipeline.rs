//! The crawl pipeline: seed, seasons round, teams round.
//!
//! ```text
//! seed page ──extract_leagues──▶ leagues
//!    leagues' pages ──fetch round──▶ extract_seasons ──▶ league.seasons
//!    seasons' pages ──fetch round──▶ extract_teams   ──▶ season.teams
//! ```
//!
//! Each round fully completes before the next starts. Every request carries
//! the position of the league (or league and season) it belongs to, and
//! results are written back through that key rather than by counting through
//! a flat list.
//!
//! # Failure policy
//!
//! - The seed page failing yields an empty league list. Callers should read
//!   that as "try again later".
//! - Any page failing in a later round aborts the crawl with
//!   [`CrawlError::FetchRound`]; no partial tree is returned.

use crate::config::CrawlerConfig;
use crate::error::{CrawlError, Round};
use crate::extract::{extract_leagues, extract_seasons, extract_teams};
use crate::fetcher::{FetchResult, PageSource, fetch_keyed};
use crate::models::{League, TreeCounts};
use tracing::{error, info, instrument};

/// Position of a season in the tree: `(league index, season index)`.
type SeasonKey = (usize, usize);

/// Crawler for one site, owning its page source and configuration.
#[derive(Debug)]
pub struct Crawler<S> {
    source: S,
    config: CrawlerConfig,
}

impl<S: PageSource> Crawler<S> {
    pub fn new(source: S, config: CrawlerConfig) -> Self {
        info!(
            base_url = %config.base_url,
            workers = config.workers,
            "successfully initialized crawler"
        );
        Self { source, config }
    }

    /// Fetch the seed page and list every league on the site.
    ///
    /// Returns an empty list if the seed page cannot be fetched.
    #[instrument(level = "info", skip_all)]
    pub async fn get_leagues(&self) -> Vec<League> {
        let seed_url = &self.config.base_url;
        let page = match self.source.get(seed_url).await {
            Ok(page) => page,
            Err(e) => {
                error!(url = %seed_url, error = %e, "problems connecting to seed page; aborting");
                return Vec::new();
            }
        };

        let leagues = extract_leagues(&page, &self.config.base_url);
        info!(count = leagues.len(), "successfully retrieved all leagues");
        leagues
    }

    /// Fill in the seasons of every league and the teams of every season.
    ///
    /// The input leagues are consumed; the completed tree is returned only if
    /// both fetch rounds succeed.
    #[instrument(level = "info", skip_all, fields(leagues = leagues.len()))]
    pub async fn analyze_leagues(
        &self,
        mut leagues: Vec<League>,
    ) -> Result<Vec<League>, CrawlError> {
        let requests = leagues
            .iter()
            .enumerate()
            .map(|(i, league)| (i, league.url.clone()))
            .collect();
        let pages = self.fetch_round(Round::Seasons, requests).await?;

        for (i, page) in pages {
            let league = &mut leagues[i];
            league.seasons = extract_seasons(
                &page,
                &self.config.base_url,
                &league.url,
                &self.config.current_season,
            );
        }
        let counts = TreeCounts::of(&leagues);
        info!(leagues = counts.leagues, seasons = counts.seasons, "Seasons round complete");

        let requests = season_requests(&leagues);
        let pages = self.fetch_round(Round::Teams, requests).await?;

        for ((li, si), page) in pages {
            leagues[li].seasons[si].teams = extract_teams(&page, &self.config.base_url);
        }
        let counts = TreeCounts::of(&leagues);
        info!(
            leagues = counts.leagues,
            seasons = counts.seasons,
            teams = counts.teams,
            "successfully retrieved all seasons and teams"
        );

        Ok(leagues)
    }

    /// Seed the crawl, keep `take` leagues after skipping `skip`, and analyse them.
    ///
    /// An unreachable seed page gives `Ok` with no leagues.
    #[instrument(level = "info", skip(self))]
    pub async fn run(&self, skip: usize, take: Option<usize>) -> Result<Vec<League>, CrawlError> {
        let leagues = self.get_leagues().await;
        if leagues.is_empty() {
            return Ok(leagues);
        }
        let selected: Vec<League> = leagues
            .into_iter()
            .skip(skip)
            .take(take.unwrap_or(usize::MAX))
            .collect();
        info!(selected = selected.len(), skip, ?take, "Analyzing leagues");
        self.analyze_leagues(selected).await
    }

    /// Run one fetch round. Any failed page fails the whole round.
    async fn fetch_round<K>(
        &self,
        round: Round,
        requests: Vec<(K, String)>,
    ) -> Result<Vec<(K, String)>, CrawlError> {
        let urls: Vec<String> = requests.iter().map(|(_, url)| url.clone()).collect();
        let results: Vec<(K, FetchResult)> =
            fetch_keyed(&self.source, requests, self.config.workers).await;

        let mut pages = Vec::with_capacity(results.len());
        for ((key, result), url) in results.into_iter().zip(urls) {
            match result {
                Ok(page) => pages.push((key, page)),
                Err(source) => {
                    error!(%round, %url, error = %source, "failed to retrieve all pages of round");
                    return Err(CrawlError::FetchRound { round, url, source });
                }
            }
        }
        info!(%round, count = pages.len(), "successfully retrieved all pages of round");
        Ok(pages)
    }
}

/// One request per season, leagues in order then seasons in order.
fn season_requests(leagues: &[League]) -> Vec<(SeasonKey, String)> {
    leagues
        .iter()
        .enumerate()
        .flat_map(|(li, league)| {
            league
                .seasons
                .iter()
                .enumerate()
                .map(move |(si, season)| ((li, si), season.url.clone()))
        })
        .collect()
}
