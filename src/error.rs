//! Error types for fetching, session setup and the crawl pipeline.

use reqwest::StatusCode;
use thiserror::Error;

/// Why a single page could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connecting, sending or reading the body failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },

    /// Produced by in-memory page sources.
    #[error("{0}")]
    Other(String),
}

/// The fetch round that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Round {
    Seasons,
    Teams,
}

impl std::fmt::Display for Round {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Round::Seasons => f.write_str("leagues' main pages"),
            Round::Teams => f.write_str("seasons' main pages"),
        }
    }
}

/// A crawl that could not complete. Partial trees are never returned alongside it.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("failed to retrieve all {round}: {url}: {source}")]
    FetchRound {
        round: Round,
        url: String,
        #[source]
        source: FetchError,
    },
}

/// Problems building the shared HTTP session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("bad country_code: {0}")]
    InvalidCountryCode(String),

    #[error("country code {0} given but no proxy template configured")]
    MissingProxy(String),

    #[error("invalid base url {0}")]
    InvalidBaseUrl(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}
