use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use serde_json::Value;
use tracing::info;

use crate::config::{LeagueConfig, SEASON_ID_PLACEHOLDER};

const REQUEST_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

/// Fetch one season's schedule from the configured feed and save the match
/// list as `season_<id>.json` in the raw output directory.
pub fn fetch_season(config: &LeagueConfig, season_id: &str) -> Result<PathBuf> {
    let client = http_client()?;
    let (url, params) = season_request(config, season_id);

    info!(%url, season_id, "fetching season schedule");
    let resp = client
        .get(&url)
        .query(&params)
        .header(USER_AGENT, "Mozilla/5.0")
        .send()
        .context("schedule request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading schedule body")?;
    if !status.is_success() {
        return Err(anyhow!("http {}: {}", status, body));
    }

    let payload: Value = serde_json::from_str(body.trim()).context("invalid schedule json")?;
    let matches = drill_down(&config.matches_path, &payload).ok_or_else(|| {
        anyhow!(
            "schedule payload missing match list at {:?}",
            config.matches_path
        )
    })?;

    let output_path = config.output_path.join(format!("season_{season_id}.json"));
    fs::create_dir_all(&config.output_path)
        .with_context(|| format!("create {}", config.output_path.display()))?;
    let tmp = output_path.with_extension("json.tmp");
    let json = serde_json::to_string(matches).context("serialize season matches")?;
    fs::write(&tmp, json).context("write season file")?;
    fs::rename(&tmp, &output_path).context("swap season file")?;

    Ok(output_path)
}

/// Resolve the request URL and query parameters for a season. The season id
/// either replaces the url placeholder or rides along as `season_id`.
fn season_request(config: &LeagueConfig, season_id: &str) -> (String, Vec<(String, String)>) {
    let mut url = config.url.clone();
    let mut params: Vec<(String, String)> = config
        .params
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    if config.url_contains_id {
        url = url.replace(SEASON_ID_PLACEHOLDER, season_id);
    } else if config.param_id {
        params.push(("season_id".to_string(), season_id.to_string()));
    }
    (url, params)
}

/// For a list of keys, drill into a payload and return the value at the last
/// key, or None as soon as a key is absent.
pub fn drill_down<'a>(keys: &[String], data: &'a Value) -> Option<&'a Value> {
    let mut current = data;
    for key in keys {
        current = current.get(key)?;
    }
    Some(current)
}
