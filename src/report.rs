use std::fmt::Write as _;

use crate::error::StatsError;
use crate::merge::SeasonStat;

/// Cross-season aggregates for the summary block.
#[derive(Debug, Clone)]
pub struct Summary {
    pub avg_points: f64,
    pub avg_goals_per_game: f64,
    pub avg_goals_against_per_game: f64,
    pub avg_goal_diff: f64,
    pub avg_win_pct: f64,
    pub avg_possession: f64,
    pub avg_shots_per_game: f64,
    pub best_season: (String, u32),
    pub worst_season: (String, u32),
}

/// Final per-team report: the seasons in the order the fetcher produced them
/// (newest first) plus the summary. Built once, displayed, dropped.
#[derive(Debug, Clone)]
pub struct TeamReport {
    pub team: String,
    pub league: String,
    pub seasons: Vec<SeasonStat>,
    pub summary: Summary,
}

/// Assemble a report from merged season stats. Preserves the supplied order
/// and requires at least one season.
pub fn assemble(
    team: &str,
    league: &str,
    seasons: Vec<SeasonStat>,
) -> Result<TeamReport, StatsError> {
    if seasons.is_empty() {
        return Err(StatsError::NoDataFound {
            team: team.to_string(),
            league: league.to_string(),
        });
    }

    let n = seasons.len() as f64;
    let mean = |f: &dyn Fn(&SeasonStat) -> f64| seasons.iter().map(|s| f(s)).sum::<f64>() / n;

    // Strict comparisons so the first occurrence wins on ties.
    let mut best = &seasons[0];
    let mut worst = &seasons[0];
    for s in &seasons[1..] {
        if s.points > best.points {
            best = s;
        }
        if s.points < worst.points {
            worst = s;
        }
    }

    let summary = Summary {
        avg_points: mean(&|s| s.points as f64),
        avg_goals_per_game: mean(&|s| s.goals_per_game),
        avg_goals_against_per_game: mean(&|s| s.goals_against_per_game),
        avg_goal_diff: mean(&|s| s.goal_diff as f64),
        avg_win_pct: mean(&|s| s.win_pct),
        avg_possession: mean(&|s| s.possession.value),
        avg_shots_per_game: mean(&|s| s.shots_per_game.value),
        best_season: (best.season.clone(), best.points),
        worst_season: (worst.season.clone(), worst.points),
    };

    Ok(TeamReport {
        team: team.to_string(),
        league: league.to_string(),
        seasons,
        summary,
    })
}

/// Render the fixed-width season table plus the summary block.
pub fn render(report: &TeamReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "=".repeat(98));
    let _ = writeln!(
        out,
        "{} - {} - last {} seasons",
        report.team.to_uppercase(),
        report.league,
        report.seasons.len()
    );
    let _ = writeln!(out, "{}", "=".repeat(98));
    let _ = writeln!(
        out,
        "{:<10} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4} {:>6} {:>5} {:>5} {:>6} {:>5} {:>6}",
        "Season", "MP", "W", "D", "L", "GF", "GA", "GD", "Pts", "Win%", "G/G", "GA/G", "Poss%",
        "Sh/G", "SoT/G"
    );
    for s in &report.seasons {
        let _ = writeln!(
            out,
            "{:<10} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4} {:>6.1} {:>5.2} {:>5.2} {:>6.1} {:>5.1} {:>6.1}",
            s.season,
            s.played,
            s.wins,
            s.draws,
            s.losses,
            s.goals_for,
            s.goals_against,
            s.goal_diff,
            s.points,
            s.win_pct,
            s.goals_per_game,
            s.goals_against_per_game,
            s.possession.value,
            s.shots_per_game.value,
            s.shots_on_target_per_game.value,
        );
    }

    let sm = &report.summary;
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "-".repeat(50));
    let _ = writeln!(out, "SUMMARY ({} seasons)", report.seasons.len());
    let _ = writeln!(out, "{}", "-".repeat(50));
    let _ = writeln!(out, "{:<32}: {:.1}", "Average points per season", sm.avg_points);
    let _ = writeln!(out, "{:<32}: {:.2}", "Average goals per game", sm.avg_goals_per_game);
    let _ = writeln!(
        out,
        "{:<32}: {:.2}",
        "Average goals against per game", sm.avg_goals_against_per_game
    );
    let _ = writeln!(out, "{:<32}: {:.1}", "Average goal difference", sm.avg_goal_diff);
    let _ = writeln!(out, "{:<32}: {:.1}%", "Average win percentage", sm.avg_win_pct);
    let _ = writeln!(out, "{:<32}: {:.1}%", "Average possession", sm.avg_possession);
    let _ = writeln!(out, "{:<32}: {:.1}", "Average shots per game", sm.avg_shots_per_game);
    let _ = writeln!(
        out,
        "{:<32}: {} ({} pts)",
        "Best season", sm.best_season.0, sm.best_season.1
    );
    let _ = writeln!(
        out,
        "{:<32}: {} ({} pts)",
        "Worst season", sm.worst_season.0, sm.worst_season.1
    );
    out
}
