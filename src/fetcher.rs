//! Concurrent page fetching with order-stable results.
//!
//! A fetch round submits every URL up front and lets at most `workers`
//! requests run at once. Requests complete in any order; each one is tagged
//! with the key it was submitted with and results are put back in submission
//! order before being returned, so `result[i]` always answers `urls[i]`.
//!
//! A failure on one URL is recorded in its slot and never cancels the others.
//! Deciding what a failed slot means for the crawl is left to the caller.

use crate::error::FetchError;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Outcome of fetching one URL: the page text or why it failed.
pub type FetchResult = Result<String, FetchError>;

/// Something that can turn a URL into page text.
///
/// [`HttpSource`] is the production implementation; tests provide in-memory
/// doubles.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn get(&self, url: &str) -> FetchResult;
}

/// [`PageSource`] backed by a pooled [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl PageSource for HttpSource {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, url: &str) -> FetchResult {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        let body = resp.text().await?;
        debug!(bytes = body.len(), "Fetched page");
        Ok(body)
    }
}

/// Fetch every URL concurrently, keeping each result with the key it was
/// submitted under.
///
/// The returned vector has one entry per request, in submission order.
#[instrument(level = "info", skip_all, fields(count = requests.len(), workers = workers))]
pub async fn fetch_keyed<S, K>(
    source: &S,
    requests: Vec<(K, String)>,
    workers: usize,
) -> Vec<(K, FetchResult)>
where
    S: PageSource,
{
    let t0 = Instant::now();
    let total = requests.len();

    let mut tagged: Vec<(usize, K, FetchResult)> = stream::iter(requests.into_iter().enumerate())
        .map(|(index, (key, url))| async move {
            let result = source.get(&url).await;
            if let Err(e) = &result {
                warn!(index, %url, error = %e, "Fetch failed");
            }
            (index, key, result)
        })
        .buffer_unordered(workers.max(1))
        .collect()
        .await;

    // Completion order is arbitrary; restore submission order.
    tagged.sort_by_key(|(index, _, _)| *index);

    let failed = tagged.iter().filter(|(_, _, r)| r.is_err()).count();
    info!(
        total,
        failed,
        elapsed_ms = t0.elapsed().as_millis(),
        "Fetch round complete"
    );

    tagged
        .into_iter()
        .map(|(_, key, result)| (key, result))
        .collect()
}

/// Fetch every URL concurrently; `result[i]` corresponds to `urls[i]`.
pub async fn fetch_all<S>(source: &S, urls: &[String], workers: usize) -> Vec<FetchResult>
where
    S: PageSource,
{
    let requests = urls.iter().cloned().enumerate().collect();
    fetch_keyed(source, requests, workers)
        .await
        .into_iter()
        .map(|(_, result)| result)
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::time::sleep;

    /// In-memory site. URLs missing from `pages` fail; `delays` holds per-URL
    /// latency in milliseconds.
    #[derive(Debug, Default)]
    pub struct FakeSite {
        pub pages: HashMap<String, String>,
        pub delays: HashMap<String, u64>,
        pub requested: Mutex<Vec<String>>,
    }

    impl FakeSite {
        pub fn with_page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }

        pub fn with_delay(mut self, url: &str, millis: u64) -> Self {
            self.delays.insert(url.to_string(), millis);
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    impl PageSource for FakeSite {
        async fn get(&self, url: &str) -> FetchResult {
            self.requested.lock().unwrap().push(url.to_string());
            if let Some(ms) = self.delays.get(url) {
                sleep(Duration::from_millis(*ms)).await;
            }
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Other(format!("connection refused: {url}")))
        }
    }

    /// Serve `pages` (path → body) over HTTP on a local port; other paths
    /// answer 404. Returns the server root, e.g. `http://127.0.0.1:40000`.
    pub async fn serve_pages(pages: Vec<(&str, String)>) -> String {
        let pages: HashMap<String, String> = pages
            .into_iter()
            .map(|(path, body)| (path.to_string(), body))
            .collect();
        let pages = Arc::new(pages);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(answer(stream, Arc::clone(&pages)));
            }
        });

        format!("http://{addr}")
    }

    async fn answer(mut stream: TcpStream, pages: Arc<HashMap<String, String>>) {
        let mut request: Vec<u8> = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
        let request = String::from_utf8_lossy(&request);
        let path = request.split_whitespace().nth(1).unwrap_or("/");

        let (status, body) = match pages.get(path) {
            Some(body) => ("200 OK", body.as_str()),
            None => ("404 Not Found", "not found"),
        };
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\
             Connection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
    }

    /// Client for the local server, bypassing any proxy set in the environment.
    pub fn local_client() -> Client {
        Client::builder().no_proxy().build().unwrap()
    }

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://example.com/{i}")).collect()
    }

    #[tokio::test]
    async fn test_fetch_all_preserves_order_under_scrambled_latency() {
        let urls = urls(8);
        let mut site = FakeSite::default();
        for (i, url) in urls.iter().enumerate() {
            // Earlier URLs finish last.
            site = site
                .with_page(url, &format!("page {i}"))
                .with_delay(url, (8 - i as u64) * 15);
        }

        let results = fetch_all(&site, &urls, 8).await;

        assert_eq!(results.len(), urls.len());
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.as_ref().unwrap(), &format!("page {i}"));
        }
    }

    #[tokio::test]
    async fn test_fetch_all_with_single_worker() {
        let urls = urls(3);
        let mut site = FakeSite::default();
        for (i, url) in urls.iter().enumerate() {
            site = site.with_page(url, &i.to_string());
        }

        let results = fetch_all(&site, &urls, 1).await;
        let bodies: Vec<_> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(bodies, vec!["0", "1", "2"]);
    }

    #[tokio::test]
    async fn test_fetch_all_records_failures_per_slot() {
        let urls = urls(3);
        let site = FakeSite::default()
            .with_page(&urls[0], "first")
            .with_page(&urls[2], "third");

        let results = fetch_all(&site, &urls, 4).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap(), "first");
        assert!(matches!(results[1], Err(FetchError::Other(_))));
        assert_eq!(results[2].as_ref().unwrap(), "third");
        assert_eq!(site.requested().len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_all_empty_input() {
        let site = FakeSite::default();
        assert!(fetch_all(&site, &[], 4).await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_keyed_returns_keys_with_results() {
        let site = FakeSite::default()
            .with_page("https://example.com/a", "A")
            .with_page("https://example.com/b", "B")
            .with_delay("https://example.com/a", 30);

        let requests = vec![
            (("league", 0), "https://example.com/a".to_string()),
            (("league", 1), "https://example.com/b".to_string()),
        ];
        let results = fetch_keyed(&site, requests, 2).await;

        assert_eq!(results[0].0, ("league", 0));
        assert_eq!(results[0].1.as_ref().unwrap(), "A");
        assert_eq!(results[1].0, ("league", 1));
        assert_eq!(results[1].1.as_ref().unwrap(), "B");
    }

    #[tokio::test]
    async fn test_http_source_maps_status_per_slot() {
        let root = serve_pages(vec![("/eng.htm", "<html>England</html>".to_string())]).await;
        let source = HttpSource::new(local_client());
        let urls = vec![format!("{root}/eng.htm"), format!("{root}/missing.htm")];

        let results = fetch_all(&source, &urls, 2).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap(), "<html>England</html>");
        assert!(matches!(
            &results[1],
            Err(FetchError::Status { url, status })
                if *status == StatusCode::NOT_FOUND && url == &urls[1]
        ));
    }

    #[tokio::test]
    async fn test_http_source_connection_refused_is_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let source = HttpSource::new(local_client());

        let result = source.get(&format!("http://{addr}/")).await;

        assert!(matches!(result, Err(FetchError::Http(_))));
    }
}
