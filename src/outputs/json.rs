//! JSON output of a finished crawl.
//!
//! Files are organised by crawl date:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     └── leagues.json
//! ```
//!
//! A later crawl on the same day replaces that day's file.

use crate::models::League;
use chrono::Local;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write the league tree to `{json_output_dir}/{date}/leagues.json`.
///
/// Returns the path written.
#[instrument(
    level = "info",
    skip_all,
    fields(json_output_dir = %json_output_dir, leagues = leagues.len())
)]
pub async fn write_leagues(
    leagues: &[League],
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let local_date = Local::now().date_naive().to_string();
    write_leagues_for_date(leagues, json_output_dir, &local_date).await
}

async fn write_leagues_for_date(
    leagues: &[League],
    json_output_dir: &str,
    local_date: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(leagues)?;

    let full_json_dir = Path::new(json_output_dir).join(local_date);
    info!(full_json_dir = %full_json_dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(full_json_dir = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename = full_json_dir.join("leagues.json");
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename.display(), "Wrote leagues JSON file");

    Ok(output_json_filename)
}
