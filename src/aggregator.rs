use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::error::StatsError;
use crate::leagues::{resolve_league, CURRENT_SEASON};
use crate::merge::{merge, EstimateProfile};
use crate::report::{assemble, TeamReport};
use crate::resolver::{league_roster, resolve_team};
use crate::season_fetch::{fetch_detailed_tables, fetch_seasons};
use crate::sources::{DetailedSource, FastSource};

/// Ties catalog, resolver, fetcher, merger and assembler together for one
/// report. Sources are injected so tests can run against in-memory fakes, and
/// the RNG behind estimate noise is seedable for the same reason.
pub struct Aggregator<'a> {
    fast: &'a dyn FastSource,
    detailed: Option<&'a dyn DetailedSource>,
    rng: StdRng,
}

impl<'a> Aggregator<'a> {
    pub fn new(fast: &'a dyn FastSource, detailed: Option<&'a dyn DetailedSource>) -> Self {
        Self {
            fast,
            detailed,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(
        fast: &'a dyn FastSource,
        detailed: Option<&'a dyn DetailedSource>,
        seed: u64,
    ) -> Self {
        Self {
            fast,
            detailed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Roster listing for the `teams <league>` command.
    pub fn roster(&self, league_query: &str) -> Result<Vec<String>, StatsError> {
        let league = resolve_league(league_query)?;
        league_roster(self.fast, league, CURRENT_SEASON)
    }

    /// Full pipeline: resolve the league and team, fetch the season window
    /// from both sources, merge, assemble.
    pub fn team_report(
        &mut self,
        league_query: &str,
        team_query: &str,
    ) -> Result<TeamReport, StatsError> {
        let league = resolve_league(league_query)?;
        let team = resolve_team(self.fast, league, team_query, CURRENT_SEASON)?;
        info!(team = %team, league = league.display_name, "resolved team, fetching seasons");

        // With no detailed source configured every advanced field is
        // estimated with the richer Basic formulas; otherwise gaps fall back
        // to the flatter hybrid estimates.
        let (tables, profile) = match self.detailed {
            Some(detailed) => (
                Some(fetch_detailed_tables(detailed)),
                EstimateProfile::HybridFallback,
            ),
            None => (None, EstimateProfile::Basic),
        };

        let fetched = fetch_seasons(self.fast, tables.as_ref(), league, &team);
        let stats = fetched
            .iter()
            .map(|f| {
                merge(
                    &f.fast,
                    f.detailed.as_ref(),
                    league.display_name,
                    profile,
                    &mut self.rng,
                )
            })
            .collect();

        assemble(&team, league.display_name, stats)
    }
}
