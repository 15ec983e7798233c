//! Extraction of leagues, seasons and teams from soccerstats.com pages.
//!
//! These functions are pure: they take page text that has already been
//! fetched and return descriptors for the next level of the tree. They never
//! fail. Markup that is missing or malformed yields an empty list or, for
//! seasons, a single synthetic entry.
//!
//! # Page formats
//!
//! | Page | Source of children |
//! |------|--------------------|
//! | Site root | `<form name="MenuList">` with one `<optgroup label="Country">` per country |
//! | League | `<div class="dropdown-content">` of season links; `og:url` meta as fallback |
//! | Season | `&nbsp;<a href='…' target='_top'>Team</a>` anchors in the standings |

use crate::config::{FAVOURITES_GROUP, LATEST_MARKER};
use crate::models::{League, Season, Team};
use crate::utils::{join_url, truncate_for_log};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

static MENU_FORM: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"form[name="MenuList"]"#).unwrap());
static OPTGROUP: Lazy<Selector> = Lazy::new(|| Selector::parse("optgroup").unwrap());
static OPTION: Lazy<Selector> = Lazy::new(|| Selector::parse("option").unwrap());
static SEASON_DROPDOWN: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.dropdown-content").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static CANONICAL_URL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:url"]"#).unwrap());
static TEAM_ANCHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"nbsp;<a href='(.*)' target='_top'>(.*)</a>").unwrap());

/// Text of the first child node, like the label of an `<option>`.
fn first_text<'a>(element: &ElementRef<'a>) -> Option<&'a str> {
    element
        .text()
        .next()
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Parse the site root that page links are resolved against.
fn site_root(base_url: &str) -> Option<Url> {
    match Url::parse(base_url) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(%base_url, error = %e, "Cannot resolve links against base url");
            None
        }
    }
}

/// List every league in the site menu.
///
/// Groups are labelled by country. The favourites group repeats leagues
/// listed elsewhere and is skipped. Options without a label or a value are
/// ignored, as are options whose link cannot be resolved.
pub fn extract_leagues(menu_page: &str, base_url: &str) -> Vec<League> {
    let Some(base) = site_root(base_url) else {
        return Vec::new();
    };
    let document = Html::parse_document(menu_page);
    let Some(form) = document.select(&MENU_FORM).next() else {
        warn!(
            preview = %truncate_for_log(menu_page, 200),
            "League menu not found on seed page"
        );
        return Vec::new();
    };

    let mut leagues = Vec::new();
    for group in form.select(&OPTGROUP) {
        let Some(country) = group.value().attr("label") else {
            continue;
        };
        if country == FAVOURITES_GROUP {
            continue;
        }
        for option in group.select(&OPTION) {
            let Some(name) = first_text(&option) else {
                continue;
            };
            let Some(url) = option.value().attr("value").and_then(|v| join_url(&base, v)) else {
                continue;
            };
            leagues.push(League::new(country, name, url));
        }
    }

    debug!(count = leagues.len(), "Extracted leagues");
    leagues
}

/// List the recent seasons of a league, most recent first.
///
/// Only dropdown links whose URL contains the `latest` marker are kept. A
/// league page without such links covers the current season only; it then
/// yields one season labelled `current_season` whose URL is the page's
/// `og:url`, or `page_url` when the page has none.
pub fn extract_seasons(
    league_page: &str,
    base_url: &str,
    page_url: &str,
    current_season: &str,
) -> Vec<Season> {
    let document = Html::parse_document(league_page);
    let base = site_root(base_url);

    let mut seasons = Vec::new();
    let dropdown = document.select(&SEASON_DROPDOWN).next();
    if let (Some(dropdown), Some(base)) = (dropdown, &base) {
        for link in dropdown.select(&LINK) {
            let Some(url) = link.value().attr("href").and_then(|h| join_url(base, h)) else {
                continue;
            };
            if !url.contains(LATEST_MARKER) {
                continue;
            }
            let year = first_text(&link).unwrap_or_default();
            seasons.push(Season::new(year, url));
        }
    }

    if seasons.is_empty() {
        let url = document
            .select(&CANONICAL_URL)
            .next()
            .and_then(|meta| meta.value().attr("content"))
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(page_url);
        debug!(%url, "No season archive; using current season only");
        seasons.push(Season::new(current_season, url.to_string()));
    }

    seasons
}

/// List the teams that played in a season, in order of first appearance.
///
/// Team anchors on current-season pages carry a `title` attribute and a
/// site-relative link; archived pages link with an absolute URL and no title.
/// Abbreviated names (containing a `.`) duplicate full names and are dropped,
/// as are exact repeats and links that cannot be resolved.
pub fn extract_teams(season_page: &str, base_url: &str) -> Vec<Team> {
    let Some(base) = site_root(base_url) else {
        return Vec::new();
    };
    TEAM_ANCHOR
        .captures_iter(season_page)
        .filter_map(|caps| {
            let href = caps.get(1)?.as_str();
            let name = caps.get(2)?.as_str();
            if name.contains('.') {
                return None;
            }
            let href = if href.contains("title") {
                href.split("' title").next().unwrap_or(href)
            } else {
                href
            };
            let url = join_url(&base, href)?;
            Some(Team {
                name: name.to_string(),
                url,
            })
        })
        .unique()
        .collect()
}
