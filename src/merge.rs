use rand::Rng;

use crate::season_fetch::{DetailedSeason, SeasonRow};

/// Where a derived value came from. Estimates are heuristic fills, not model
/// output, and must stay distinguishable from sourced numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Sourced,
    Estimated,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metric {
    pub value: f64,
    pub provenance: Provenance,
}

impl Metric {
    fn sourced(value: f64) -> Self {
        Self {
            value,
            provenance: Provenance::Sourced,
        }
    }

    fn estimated(value: f64) -> Self {
        Self {
            value,
            provenance: Provenance::Estimated,
        }
    }

    pub fn is_estimated(&self) -> bool {
        self.provenance == Provenance::Estimated
    }
}

/// The two estimation formulas the aggregator grew over time, kept as explicit
/// named strategies instead of one guessed canonical form.
///
/// `Basic`: the detailed source is never consulted. Possession gets a points
/// term, shots get bounded noise and a [8, 20] clamp, and xG fields are
/// estimated from actual goals.
///
/// `HybridFallback`: a detailed source was consulted but left gaps for this
/// season. No points term, no noise, no xG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateProfile {
    Basic,
    HybridFallback,
}

/// One season's reconciled record. Immutable once built; the assembler only
/// reads from it.
#[derive(Debug, Clone)]
pub struct SeasonStat {
    pub season: String,
    pub league: String,
    pub team: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_diff: i32,
    pub points: u32,
    pub win_pct: f64,
    pub goals_per_game: f64,
    pub goals_against_per_game: f64,
    pub possession: Metric,
    pub shots_per_game: Metric,
    /// Always estimated (shots x 0.35) under the Basic profile; only the
    /// hybrid path can source it from the shooting table.
    pub shots_on_target_per_game: Metric,
    pub xg_for: Option<Metric>,
    pub xg_against: Option<Metric>,
}

const POSSESSION_FLOOR: f64 = 35.0;
const POSSESSION_CEIL: f64 = 65.0;
const SHOTS_FLOOR: f64 = 8.0;
const SHOTS_CEIL: f64 = 20.0;
const SHOTS_PER_GOAL: f64 = 6.0;
const SOT_SHARE: f64 = 0.35;

/// Combine one season's fast row with whatever the detailed source had,
/// estimating the rest. Never fails: with `detailed == None` every
/// non-optional field is still populated, just marked estimated.
pub fn merge(
    fast: &SeasonRow,
    detailed: Option<&DetailedSeason>,
    league_name: &str,
    profile: EstimateProfile,
    rng: &mut impl Rng,
) -> SeasonStat {
    let played = fast.played as f64;

    // Division guards: a zero-match season yields zero rates, not a panic.
    let (win_pct, gpg, gapg) = if fast.played > 0 {
        (
            round1((fast.wins as f64 / played * 100.0).clamp(0.0, 100.0)),
            round2(fast.goals_for as f64 / played),
            round2(fast.goals_against as f64 / played),
        )
    } else {
        (0.0, 0.0, 0.0)
    };

    let possession = match detailed.and_then(|d| d.possession) {
        Some(v) => Metric::sourced(round1(v)),
        None => Metric::estimated(round1(estimate_possession(fast, profile))),
    };

    let shots_per_game = match detailed.and_then(|d| d.shots_per_game) {
        Some(v) => Metric::sourced(round1(v)),
        None => Metric::estimated(round1(estimate_shots(gpg, profile, rng))),
    };

    let shots_on_target_per_game = match detailed.and_then(|d| d.shots_on_target_per_game) {
        Some(v) => Metric::sourced(round1(v)),
        None => Metric::estimated(round1(shots_per_game.value * SOT_SHARE)),
    };

    let (xg_for, xg_against) = match profile {
        EstimateProfile::Basic => (
            Some(Metric::estimated(round1(
                fast.goals_for as f64 * (0.9 + noise(rng, 0.1)),
            ))),
            Some(Metric::estimated(round1(
                fast.goals_against as f64 * (0.9 + noise(rng, 0.1)),
            ))),
        ),
        EstimateProfile::HybridFallback => (None, None),
    };

    SeasonStat {
        season: fast.season.clone(),
        league: league_name.to_string(),
        team: fast.team.clone(),
        played: fast.played,
        wins: fast.wins,
        draws: fast.draws,
        losses: fast.losses,
        goals_for: fast.goals_for,
        goals_against: fast.goals_against,
        goal_diff: fast.goal_diff,
        points: fast.points,
        win_pct,
        goals_per_game: gpg,
        goals_against_per_game: gapg,
        possession,
        shots_per_game,
        shots_on_target_per_game,
        xg_for,
        xg_against,
    }
}

fn estimate_possession(fast: &SeasonRow, profile: EstimateProfile) -> f64 {
    let mut est = 50.0 + fast.goal_diff as f64 * 0.3;
    if profile == EstimateProfile::Basic {
        est += fast.points as f64 * 0.1;
    }
    est.clamp(POSSESSION_FLOOR, POSSESSION_CEIL)
}

fn estimate_shots(gpg: f64, profile: EstimateProfile, rng: &mut impl Rng) -> f64 {
    match profile {
        EstimateProfile::Basic => {
            (gpg * SHOTS_PER_GOAL + noise(rng, 1.0)).clamp(SHOTS_FLOOR, SHOTS_CEIL)
        }
        EstimateProfile::HybridFallback => gpg * SHOTS_PER_GOAL,
    }
}

// Bounded symmetric noise, mean zero.
fn noise(rng: &mut impl Rng, scale: f64) -> f64 {
    rng.gen_range(-scale..=scale)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
