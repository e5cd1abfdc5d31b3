use std::collections::HashMap;

use anyhow::Result;
use serde_json::json;

use club_stats_terminal::aggregator::Aggregator;
use club_stats_terminal::error::StatsError;
use club_stats_terminal::merge::Provenance;
use club_stats_terminal::sources::{DetailedRow, DetailedSource, FastRow, FastSource, StatType};

struct FakeFast {
    // (league code, season) -> table
    tables: HashMap<(String, String), Vec<FastRow>>,
}

impl FakeFast {
    fn new() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    fn with_table(mut self, league: &str, season: &str, rows: Vec<FastRow>) -> Self {
        self.tables
            .insert((league.to_string(), season.to_string()), rows);
        self
    }
}

impl FastSource for FakeFast {
    fn read_league_table(&self, league_code: &str, season: &str) -> Result<Vec<FastRow>> {
        match self
            .tables
            .get(&(league_code.to_string(), season.to_string()))
        {
            Some(rows) => Ok(rows.clone()),
            None => anyhow::bail!("no table for {league_code} {season}"),
        }
    }
}

struct FakeDetailed {
    rows: Vec<DetailedRow>,
}

impl DetailedSource for FakeDetailed {
    fn read_season_stats(&self, stat_type: StatType) -> Result<Vec<DetailedRow>> {
        let key = match stat_type {
            StatType::Standard => "mp",
            StatType::Possession => "poss",
            StatType::Shooting => "sh",
        };
        Ok(self
            .rows
            .iter()
            .filter(|r| r.stats.contains_key(key))
            .cloned()
            .collect())
    }
}

fn fast_row(team: &str, played: u32, wins: u32, gf: u32, ga: u32, pts: u32) -> FastRow {
    FastRow {
        team: team.to_string(),
        played: json!(played),
        wins: json!(wins),
        draws: json!(played.saturating_sub(wins)),
        losses: json!(0),
        goals_for: json!(gf),
        goals_against: json!(ga),
        goal_diff: json!(gf as i64 - ga as i64),
        points: json!(pts),
    }
}

fn detailed_row(league: &str, season: &str, team: &str, stats: &[(&str, f64)]) -> DetailedRow {
    DetailedRow {
        league: league.to_string(),
        season: season.to_string(),
        team: team.to_string(),
        stats: stats
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect(),
    }
}

#[test]
fn three_of_five_seasons_newest_first() {
    // Barcelona present in three of the five requested seasons; one season's
    // fetch errors entirely, one has no Barcelona row.
    let fast = FakeFast::new()
        .with_table(
            "ESP-La Liga",
            "2024/2025",
            vec![fast_row("Barcelona", 38, 28, 102, 39, 88)],
        )
        .with_table(
            "ESP-La Liga",
            "2022/2023",
            vec![fast_row("Barcelona", 38, 28, 70, 20, 88)],
        )
        .with_table(
            "ESP-La Liga",
            "2021/2022",
            vec![fast_row("Real Madrid", 38, 26, 80, 31, 86)],
        )
        .with_table(
            "ESP-La Liga",
            "2020/2021",
            vec![fast_row("Barcelona", 38, 24, 85, 38, 79)],
        );

    let mut aggregator = Aggregator::with_seed(&fast, None, 99);
    let report = aggregator.team_report("spain", "Barcelona").unwrap();

    let seasons: Vec<&str> = report.seasons.iter().map(|s| s.season.as_str()).collect();
    assert_eq!(seasons, vec!["2024/2025", "2022/2023", "2020/2021"]);
    assert!((report.summary.avg_points - (88.0 + 88.0 + 79.0) / 3.0).abs() < 1e-9);
    assert_eq!(report.summary.worst_season, ("2020/2021".to_string(), 79));
}

#[test]
fn nickname_and_league_alias_resolve_to_canonical() {
    let fast = FakeFast::new().with_table(
        "ESP-La Liga",
        "2024/2025",
        vec![
            fast_row("Real Madrid", 38, 26, 78, 38, 84),
            fast_row("Barcelona", 38, 28, 102, 39, 88),
        ],
    );

    let mut aggregator = Aggregator::with_seed(&fast, None, 1);
    let report = aggregator.team_report("la liga", "barca").unwrap();
    assert_eq!(report.team, "Barcelona");
    assert_eq!(report.league, "La Liga");
}

#[test]
fn hybrid_merge_marks_provenance_per_season() {
    let fast = FakeFast::new()
        .with_table(
            "ENG-Premier League",
            "2024/2025",
            vec![fast_row("Arsenal", 38, 20, 69, 34, 74)],
        )
        .with_table(
            "ENG-Premier League",
            "2023/2024",
            vec![fast_row("Arsenal", 38, 28, 91, 29, 89)],
        );
    // Detailed source only covers the newest season.
    let detailed = FakeDetailed {
        rows: vec![
            detailed_row("Premier League", "2024-2025", "Arsenal", &[("mp", 38.0)]),
            detailed_row("Premier League", "2024-2025", "Arsenal", &[("poss", 57.9)]),
            detailed_row(
                "Premier League",
                "2024-2025",
                "Arsenal",
                &[("sh", 570.0), ("sot", 190.0)],
            ),
        ],
    };

    let mut aggregator = Aggregator::with_seed(&fast, Some(&detailed), 5);
    let report = aggregator.team_report("england", "arsenal").unwrap();
    assert_eq!(report.seasons.len(), 2);

    let newest = &report.seasons[0];
    assert_eq!(newest.possession.provenance, Provenance::Sourced);
    assert_eq!(newest.possession.value, 57.9);
    assert_eq!(newest.shots_per_game.value, 15.0);
    assert_eq!(newest.shots_on_target_per_game.value, 5.0);
    assert!(newest.xg_for.is_none());

    let older = &report.seasons[1];
    assert_eq!(older.possession.provenance, Provenance::Estimated);
    assert!(older.shots_per_game.provenance == Provenance::Estimated);
    // Hybrid fallback: shots = gpg * 6 with no noise. gpg for 91 in 38 = 2.39.
    assert!((older.shots_per_game.value - 14.4).abs() < 0.11);
}

#[test]
fn null_cells_coerce_to_zero_and_unknown_team_carries_roster() {
    // Only the current season table exists; its one row has null stat cells.
    let fast = FakeFast::new().with_table(
        "ENG-Premier League",
        "2024/2025",
        vec![FastRow {
            team: "Sunderland".to_string(),
            ..FastRow::default()
        }],
    );

    let mut aggregator = Aggregator::with_seed(&fast, None, 3);
    let report = aggregator.team_report("england", "sunderland").unwrap();
    assert_eq!(report.seasons.len(), 1);
    assert_eq!(report.seasons[0].played, 0);
    assert_eq!(report.seasons[0].win_pct, 0.0);

    let err = aggregator.team_report("england", "zenith").unwrap_err();
    match err {
        StatsError::TeamNotFound { roster, .. } => assert_eq!(roster, vec!["Sunderland"]),
        other => panic!("expected TeamNotFound, got {other:?}"),
    }
}

/// Serves the roster once, then every season fetch fails: zero seasons
/// survive and the report as a whole is `NoDataFound`.
struct RosterThenOutage {
    calls: std::sync::Mutex<u32>,
}

impl FastSource for RosterThenOutage {
    fn read_league_table(&self, _league_code: &str, _season: &str) -> Result<Vec<FastRow>> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if *calls == 1 {
            Ok(vec![fast_row("Arsenal", 38, 20, 69, 34, 74)])
        } else {
            anyhow::bail!("provider outage")
        }
    }
}

#[test]
fn all_seasons_failing_is_no_data_found() {
    let fast = RosterThenOutage {
        calls: std::sync::Mutex::new(0),
    };
    let mut aggregator = Aggregator::with_seed(&fast, None, 3);
    let err = aggregator.team_report("england", "arsenal").unwrap_err();
    assert!(matches!(err, StatsError::NoDataFound { .. }));
}

#[test]
fn unknown_league_fails_before_any_fetch() {
    let fast = FakeFast::new();
    let mut aggregator = Aggregator::with_seed(&fast, None, 3);
    let err = aggregator.team_report("superleague", "arsenal").unwrap_err();
    assert!(matches!(err, StatsError::LeagueNotFound { .. }));
}

#[test]
fn roster_outage_is_source_unavailable_not_not_found() {
    let fast = FakeFast::new(); // every fetch errors
    let mut aggregator = Aggregator::with_seed(&fast, None, 3);
    let err = aggregator.team_report("england", "arsenal").unwrap_err();
    assert!(matches!(err, StatsError::SourceUnavailable { .. }));
}

#[test]
fn basic_profile_estimates_stay_in_bounds() {
    let fast = FakeFast::new().with_table(
        "GER-Bundesliga",
        "2024/2025",
        vec![fast_row("Bayern München", 34, 25, 99, 32, 79)],
    );
    let mut aggregator = Aggregator::with_seed(&fast, None, 1234);
    let report = aggregator.team_report("germany", "bayern").unwrap();
    let season = &report.seasons[0];

    assert!((35.0..=65.0).contains(&season.possession.value));
    assert!((8.0..=20.0).contains(&season.shots_per_game.value));
    assert!(season.xg_for.unwrap().provenance == Provenance::Estimated);

    // Same seed, same estimates.
    let mut again = Aggregator::with_seed(&fast, None, 1234);
    let report2 = again.team_report("germany", "bayern").unwrap();
    assert_eq!(
        report.seasons[0].shots_per_game.value,
        report2.seasons[0].shots_per_game.value
    );
}
