use std::collections::HashMap;
use std::env;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::http_cache::fetch_json_cached;
use crate::http_client::http_client;

const FAST_TABLE_URL: &str = "https://api.fastfooty.example.com/v2/league-table";
const DETAILED_STATS_URL: &str = "https://api.statsheet.example.com/v1/team-season-stats";

/// Stat categories offered by the detailed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatType {
    Standard,
    Possession,
    Shooting,
}

impl StatType {
    pub fn as_query_str(self) -> &'static str {
        match self {
            StatType::Standard => "standard",
            StatType::Possession => "possession",
            StatType::Shooting => "shooting",
        }
    }
}

/// One league-table row as the fast source returns it. Stat cells stay loosely
/// typed here; the fetcher coerces them (unparseable cells become zero).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FastRow {
    #[serde(default)]
    pub team: String,
    #[serde(default, rename = "mp")]
    pub played: Value,
    #[serde(default, rename = "w")]
    pub wins: Value,
    #[serde(default, rename = "d")]
    pub draws: Value,
    #[serde(default, rename = "l")]
    pub losses: Value,
    #[serde(default, rename = "gf")]
    pub goals_for: Value,
    #[serde(default, rename = "ga")]
    pub goals_against: Value,
    #[serde(default, rename = "gd")]
    pub goal_diff: Value,
    #[serde(default, rename = "pts")]
    pub points: Value,
}

/// One row from a detailed-source stat table, keyed by (league, season, team).
/// The league uses the bare name and the season the dash format.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DetailedRow {
    #[serde(default)]
    pub league: String,
    #[serde(default)]
    pub season: String,
    #[serde(default)]
    pub team: String,
    #[serde(flatten)]
    pub stats: HashMap<String, Value>,
}

/// Fast summary provider: quick, basic league-table standings.
/// `Sync` so per-season fetches can run from the rayon pool.
pub trait FastSource: Sync {
    fn read_league_table(&self, league_code: &str, season: &str) -> Result<Vec<FastRow>>;
}

/// Detailed provider: slower, richer per-category statistics. One call returns
/// the whole multi-league, multi-season table for a category.
pub trait DetailedSource: Sync {
    fn read_season_stats(&self, stat_type: StatType) -> Result<Vec<DetailedRow>>;
}

pub fn parse_league_table_json(raw: &str) -> Result<Vec<FastRow>> {
    let root: Value = serde_json::from_str(raw).context("league table body is not json")?;
    if root.is_null() {
        return Ok(Vec::new());
    }
    let rows = root
        .get("table")
        .cloned()
        .unwrap_or(Value::Array(Vec::new()));
    let rows: Vec<FastRow> =
        serde_json::from_value(rows).context("league table rows have unexpected shape")?;
    Ok(rows.into_iter().filter(|r| !r.team.is_empty()).collect())
}

pub fn parse_season_stats_json(raw: &str) -> Result<Vec<DetailedRow>> {
    let root: Value = serde_json::from_str(raw).context("season stats body is not json")?;
    if root.is_null() {
        return Ok(Vec::new());
    }
    let rows = root
        .get("rows")
        .cloned()
        .unwrap_or(Value::Array(Vec::new()));
    let rows: Vec<DetailedRow> =
        serde_json::from_value(rows).context("season stats rows have unexpected shape")?;
    Ok(rows.into_iter().filter(|r| !r.team.is_empty()).collect())
}

/// HTTP-backed fast source.
pub struct HttpFastSource;

impl FastSource for HttpFastSource {
    fn read_league_table(&self, league_code: &str, season: &str) -> Result<Vec<FastRow>> {
        let client = http_client()?;
        let base = env::var("FAST_SOURCE_URL").unwrap_or_else(|_| FAST_TABLE_URL.to_string());
        let url = Url::parse_with_params(&base, &[("league", league_code), ("season", season)])
            .context("bad fast source url")?;
        let body = fetch_json_cached(client, url.as_str())
            .with_context(|| format!("league table fetch failed for {league_code} {season}"))?;
        parse_league_table_json(&body)
    }
}

/// HTTP-backed detailed source.
pub struct HttpDetailedSource;

impl DetailedSource for HttpDetailedSource {
    fn read_season_stats(&self, stat_type: StatType) -> Result<Vec<DetailedRow>> {
        let client = http_client()?;
        let base =
            env::var("DETAILED_SOURCE_URL").unwrap_or_else(|_| DETAILED_STATS_URL.to_string());
        let url = Url::parse_with_params(&base, &[("stat", stat_type.as_query_str())])
            .context("bad detailed source url")?;
        let body = fetch_json_cached(client, url.as_str())
            .with_context(|| format!("{} stats fetch failed", stat_type.as_query_str()))?;
        parse_season_stats_json(&body)
    }
}
