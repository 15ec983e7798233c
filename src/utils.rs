//! Small helpers for URL handling, logging and output directories.

use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

/// Resolve a link found on a page against the site root.
///
/// The site emits links with and without a leading slash
/// (`/england.htm`, `latest.asp?league=england`) as well as absolute URLs;
/// all of them resolve the way a browser would. Returns `None` for links
/// that cannot be resolved.
///
/// # Examples
///
/// ```ignore
/// let base = Url::parse("https://a.com")?;
/// assert_eq!(join_url(&base, "eng.htm").as_deref(), Some("https://a.com/eng.htm"));
/// assert_eq!(join_url(&base, "../eng.htm").as_deref(), Some("https://a.com/eng.htm"));
/// ```
pub fn join_url(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(String::from)
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at `max` bytes (backing off to a char boundary) with
/// an ellipsis and the number of dropped bytes appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a scratch file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let scratch_path = format!("{}/..__write_check__", path.trim_end_matches('/'));
    match stdfs::File::create(&scratch_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&scratch_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
