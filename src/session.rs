//! Construction of the shared HTTP session.
//!
//! Every fetch in a crawl goes through one [`reqwest::Client`] so that
//! connections to the site are pooled across rounds. The client carries the
//! headers the site expects and the cookie that dismisses its consent banner.
//! When a country code is given, traffic is routed through a proxy built from
//! a template such as `http://user-country-{country}:pw@proxy.example:8000`.

use crate::config::USER_AGENT;
use crate::error::SessionError;
use reqwest::cookie::Jar;
use reqwest::header::{HOST, HeaderMap, HeaderValue, PRAGMA};
use reqwest::{Client, Proxy};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Lifetime of the consent cookie: one year.
const CONSENT_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

/// Outbound routing for the session.
#[derive(Debug, Clone, Default)]
pub struct Routing {
    /// Two-letter country code selecting the proxy exit.
    pub country_code: Option<String>,
    /// Proxy URL template; `{country}` is replaced by the country code.
    pub proxy_template: Option<String>,
}

/// Check a country code and normalise it to lowercase.
pub fn validate_country_code(code: &str) -> Result<String, SessionError> {
    let code = code.trim();
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_lowercase())
    } else {
        Err(SessionError::InvalidCountryCode(code.to_string()))
    }
}

fn site_url(base_url: &str) -> Result<Url, SessionError> {
    Url::parse(base_url)
        .ok()
        .filter(|u| u.host_str().is_some())
        .ok_or_else(|| SessionError::InvalidBaseUrl(base_url.to_string()))
}

fn default_headers(site: &Url) -> Result<HeaderMap, SessionError> {
    let host = site.host_str().unwrap_or_default();
    let host = HeaderValue::from_str(host)
        .map_err(|_| SessionError::InvalidBaseUrl(site.to_string()))?;

    let mut headers = HeaderMap::new();
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(HOST, host);
    Ok(headers)
}

/// Cookie jar seeded with the consent cookie for the site host.
///
/// Cookies the site sets during the crawl are kept alongside it.
fn consent_jar(site: &Url) -> Jar {
    let jar = Jar::default();
    jar.add_cookie_str(
        &format!("cookiesok=no; Path=/; Max-Age={CONSENT_MAX_AGE_SECS}"),
        site,
    );
    jar
}

/// Build the pooled client used for a whole crawl.
#[instrument(level = "info", skip(routing), fields(country = ?routing.country_code))]
pub fn new_session(base_url: &str, routing: &Routing) -> Result<Client, SessionError> {
    let site = site_url(base_url)?;
    let mut builder = Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(default_headers(&site)?)
        .cookie_provider(Arc::new(consent_jar(&site)))
        .gzip(true)
        .timeout(REQUEST_TIMEOUT);

    if let Some(code) = &routing.country_code {
        let code = validate_country_code(code)?;
        let template = routing
            .proxy_template
            .as_deref()
            .ok_or_else(|| SessionError::MissingProxy(code.clone()))?;
        builder = builder.proxy(Proxy::all(template.replace("{country}", &code))?);
        info!(%code, "Routing requests through proxy");
    }

    let client = builder.build()?;
    info!("successfully created new session");
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::cookie::CookieStore;

    #[test]
    fn test_validate_country_code_normalises_case() {
        assert_eq!(validate_country_code("GB").unwrap(), "gb");
        assert_eq!(validate_country_code(" de ").unwrap(), "de");
    }

    #[test]
    fn test_validate_country_code_rejects_bad_codes() {
        assert!(validate_country_code("gbr").is_err());
        assert!(validate_country_code("g1").is_err());
        assert!(validate_country_code("").is_err());
    }

    #[test]
    fn test_default_headers_carry_host() {
        let site = site_url("https://www.soccerstats.com").unwrap();
        let headers = default_headers(&site).unwrap();
        assert_eq!(headers[HOST], "www.soccerstats.com");
        assert_eq!(headers[PRAGMA], "no-cache");
    }

    #[test]
    fn test_site_url_rejects_relative_base() {
        assert!(matches!(
            site_url("not a url"),
            Err(SessionError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_consent_jar_serves_cookie_to_site_only() {
        let site = site_url("https://www.soccerstats.com").unwrap();
        let jar = consent_jar(&site);

        let page = Url::parse("https://www.soccerstats.com/latest.asp?league=england").unwrap();
        assert_eq!(jar.cookies(&page).unwrap(), "cookiesok=no");

        let other = Url::parse("https://example.com/").unwrap();
        assert!(jar.cookies(&other).is_none());
    }

    #[test]
    fn test_consent_jar_keeps_cookies_set_by_site() {
        let site = site_url("https://www.soccerstats.com").unwrap();
        let jar = consent_jar(&site);
        jar.set_cookies(
            &mut [HeaderValue::from_static("session=abc; Path=/")].iter(),
            &site,
        );

        let cookies = jar.cookies(&site).unwrap();
        let cookies = cookies.to_str().unwrap();
        assert!(cookies.contains("cookiesok=no"));
        assert!(cookies.contains("session=abc"));
    }

    #[test]
    fn test_new_session_without_routing() {
        assert!(new_session("https://www.soccerstats.com", &Routing::default()).is_ok());
    }

    #[test]
    fn test_new_session_country_requires_proxy() {
        let routing = Routing {
            country_code: Some("gb".to_string()),
            proxy_template: None,
        };
        assert!(matches!(
            new_session("https://www.soccerstats.com", &routing),
            Err(SessionError::MissingProxy(code)) if code == "gb"
        ));
    }

    #[test]
    fn test_new_session_with_proxy_template() {
        let routing = Routing {
            country_code: Some("GB".to_string()),
            proxy_template: Some("http://user-{country}@127.0.0.1:8080".to_string()),
        };
        assert!(new_session("https://www.soccerstats.com", &routing).is_ok());
    }
}
