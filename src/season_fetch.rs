use std::env;

use rayon::prelude::*;
use serde_json::Value;
use tracing::{info, warn};

use crate::leagues::{detailed_season, LeagueInfo, SEASONS};
use crate::sources::{DetailedRow, DetailedSource, FastRow, FastSource, StatType};

/// One season's fast-source row with every cell coerced to a number.
/// A cell the provider sends as junk becomes zero rather than killing the
/// season.
#[derive(Debug, Clone)]
pub struct SeasonRow {
    pub season: String,
    pub team: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_diff: i32,
    pub points: u32,
}

/// Detailed-source values for one season, already normalized to per-game
/// where applicable. Each field is individually optional; the merger
/// estimates whatever is missing.
#[derive(Debug, Clone, Default)]
pub struct DetailedSeason {
    pub possession: Option<f64>,
    pub shots_per_game: Option<f64>,
    pub shots_on_target_per_game: Option<f64>,
}

/// The detailed source's three category tables, fetched once per report.
/// Any table that fails to fetch is just empty; the merger fills the gaps.
#[derive(Debug, Default)]
pub struct DetailedTables {
    pub standard: Vec<DetailedRow>,
    pub possession: Vec<DetailedRow>,
    pub shooting: Vec<DetailedRow>,
}

#[derive(Debug, Clone)]
pub struct SeasonFetch {
    pub fast: SeasonRow,
    pub detailed: Option<DetailedSeason>,
}

pub fn fetch_detailed_tables(detailed: &dyn DetailedSource) -> DetailedTables {
    let read = |stat_type: StatType| match detailed.read_season_stats(stat_type) {
        Ok(rows) => rows,
        Err(err) => {
            warn!("{} stats unavailable: {err:#}", stat_type.as_query_str());
            Vec::new()
        }
    };
    DetailedTables {
        standard: read(StatType::Standard),
        possession: read(StatType::Possession),
        shooting: read(StatType::Shooting),
    }
}

/// Fetch one fast-source row per season in the fixed window, newest first.
/// Seasons run in parallel; a season whose fetch fails or whose table has no
/// row for the team is skipped and logged, never fatal to its siblings.
pub fn fetch_seasons(
    fast: &dyn FastSource,
    detailed: Option<&DetailedTables>,
    league: &LeagueInfo,
    team: &str,
) -> Vec<SeasonFetch> {
    let rows: Vec<Option<SeasonRow>> = with_fetch_pool(|| {
        SEASONS
            .par_iter()
            .map(|season| fetch_fast_season(fast, league, team, season))
            .collect()
    });

    rows.into_iter()
        .flatten()
        .map(|row| {
            let detailed = detailed.and_then(|tables| lookup_detailed(tables, league, &row));
            SeasonFetch {
                fast: row,
                detailed,
            }
        })
        .collect()
}

fn fetch_fast_season(
    fast: &dyn FastSource,
    league: &LeagueInfo,
    team: &str,
    season: &str,
) -> Option<SeasonRow> {
    info!(season, team, "fetching league table");
    let table = match fast.read_league_table(league.fast_code, season) {
        Ok(table) => table,
        Err(err) => {
            warn!(season, "season fetch failed, skipping: {err:#}");
            return None;
        }
    };

    // Exact canonical-name filter; with duplicate rows the first one wins.
    let Some(raw) = table.iter().find(|r| r.team == team) else {
        warn!(season, team, "team not in season table, skipping");
        return None;
    };

    let row = coerce_row(season, raw);
    let sourced_diff = row.goals_for as i32 - row.goals_against as i32;
    if row.goal_diff != sourced_diff {
        // Provider data is trusted as-is; flag the inconsistency and move on.
        warn!(
            season,
            team,
            reported = row.goal_diff,
            computed = sourced_diff,
            "goal difference does not match goals for/against"
        );
    }
    Some(row)
}

fn coerce_row(season: &str, raw: &FastRow) -> SeasonRow {
    SeasonRow {
        season: season.to_string(),
        team: raw.team.clone(),
        played: coerce_u32(&raw.played),
        wins: coerce_u32(&raw.wins),
        draws: coerce_u32(&raw.draws),
        losses: coerce_u32(&raw.losses),
        goals_for: coerce_u32(&raw.goals_for),
        goals_against: coerce_u32(&raw.goals_against),
        goal_diff: coerce_i64(&raw.goal_diff) as i32,
        points: coerce_u32(&raw.points),
    }
}

fn lookup_detailed(
    tables: &DetailedTables,
    league: &LeagueInfo,
    row: &SeasonRow,
) -> Option<DetailedSeason> {
    let season_key = detailed_season(&row.season);
    let find = |rows: &[DetailedRow]| -> Option<DetailedRow> {
        rows.iter()
            .find(|r| {
                r.league == league.detailed_code
                    && r.season == season_key
                    && r.team.to_lowercase().contains(&row.team.to_lowercase())
            })
            .cloned()
    };

    let standard = find(&tables.standard);
    let possession = find(&tables.possession);
    let shooting = find(&tables.shooting);
    if standard.is_none() && possession.is_none() && shooting.is_none() {
        return None;
    }

    // Per-game conversion prefers the detailed source's own matches-played.
    let played = standard
        .as_ref()
        .and_then(|r| stat_f64(r, "mp"))
        .filter(|mp| *mp > 0.0)
        .unwrap_or(row.played as f64);

    let per_game = |total: Option<f64>| -> Option<f64> {
        if played > 0.0 {
            total.map(|t| t / played)
        } else {
            None
        }
    };

    Some(DetailedSeason {
        possession: possession.as_ref().and_then(|r| stat_f64(r, "poss")),
        shots_per_game: per_game(shooting.as_ref().and_then(|r| stat_f64(r, "sh"))),
        shots_on_target_per_game: per_game(shooting.as_ref().and_then(|r| stat_f64(r, "sot"))),
    })
}

fn stat_f64(row: &DetailedRow, key: &str) -> Option<f64> {
    row.stats.get(key).and_then(coerce_f64_opt)
}

/// Parse-or-zero coercion for fast-source cells.
pub fn coerce_u32(value: &Value) -> u32 {
    coerce_f64_opt(value).map(|v| v.max(0.0) as u32).unwrap_or(0)
}

pub fn coerce_i64(value: &Value) -> i64 {
    coerce_f64_opt(value).map(|v| v as i64).unwrap_or(0)
}

fn coerce_f64_opt(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim().trim_end_matches('%').replace(',', "");
            if s.is_empty() || s == "-" {
                return None;
            }
            s.parse::<f64>().ok()
        }
        _ => None,
    }
}

fn with_fetch_pool<T>(action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    let threads = fetch_parallelism();
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}

fn fetch_parallelism() -> usize {
    env::var("FETCH_PARALLELISM")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(SEASONS.len())
        .clamp(1, 16)
}
