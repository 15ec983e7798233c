//! Crawler for the league → season → team tree of
//! [soccerstats.com](https://www.soccerstats.com).
//!
//! The pipeline is built from three parts:
//!
//! - [`fetcher`]: concurrent, order-stable page fetching behind the
//!   [`fetcher::PageSource`] trait
//! - [`extract`]: pure functions turning page text into leagues, seasons and teams
//! - [`pipeline`]: the [`pipeline::Crawler`] driving the seed, seasons and teams rounds
//!
//! The HTTP client is built by [`session::new_session`] and injected through
//! [`fetcher::HttpSource`]; no logging subscriber is installed here.

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod models;
pub mod outputs;
pub mod pipeline;
pub mod session;
pub mod utils;
