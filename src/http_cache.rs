use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "club_stats_terminal";
const CACHE_FILE: &str = "provider_cache.json";
// League tables and season stats move slowly; a few hours is plenty.
const DEFAULT_TTL_SECS: u64 = 6 * 60 * 60;

static CACHE: Mutex<Option<CacheFile>> = Mutex::new(None);

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct CacheFile {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    body: String,
    fetched_at: u64,
}

/// Fetch a JSON body, serving from the on-disk cache when a fresh entry
/// exists. The key is the URL, which encodes source, league and season.
/// Cache IO failures degrade to a plain fetch; they never fail the call.
pub fn fetch_json_cached(client: &Client, url: &str) -> Result<String> {
    if let Some(body) = fresh_cached_body(url) {
        return Ok(body);
    }

    let resp = client
        .get(url)
        .header(USER_AGENT, "Mozilla/5.0")
        .send()
        .context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {}: {}", status, body));
    }

    store_entry(url, &body);
    Ok(body)
}

fn fresh_cached_body(url: &str) -> Option<String> {
    let now = now_secs();
    let mut guard = CACHE.lock().expect("provider cache lock poisoned");
    let cache = guard.get_or_insert_with(load_cache_file);
    let entry = cache.entries.get(url)?;
    if now.saturating_sub(entry.fetched_at) > cache_ttl_secs() {
        return None;
    }
    Some(entry.body.clone())
}

fn store_entry(url: &str, body: &str) {
    let mut guard = CACHE.lock().expect("provider cache lock poisoned");
    let cache = guard.get_or_insert_with(load_cache_file);
    cache.version = CACHE_VERSION;
    cache.entries.insert(
        url.to_string(),
        CacheEntry {
            body: body.to_string(),
            fetched_at: now_secs(),
        },
    );
    let _ = save_cache_file(cache);
}

fn cache_ttl_secs() -> u64 {
    std::env::var("PROVIDER_CACHE_TTL_SECS")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TTL_SECS)
}

fn load_cache_file() -> CacheFile {
    let Some(path) = cache_path() else {
        return CacheFile::default();
    };
    let Ok(raw) = fs::read_to_string(path) else {
        return CacheFile::default();
    };
    let cache = serde_json::from_str::<CacheFile>(&raw).unwrap_or_default();
    if cache.version != CACHE_VERSION {
        return CacheFile::default();
    }
    cache
}

fn save_cache_file(cache: &CacheFile) -> Result<()> {
    let Some(path) = cache_path() else {
        return Ok(());
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok();
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).context("serialize provider cache")?;
    fs::write(&tmp, json).context("write provider cache")?;
    fs::rename(&tmp, &path).context("swap provider cache")?;
    Ok(())
}

fn cache_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(CACHE_FILE),
    )
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
