use tracing::debug;

use crate::error::StatsError;
use crate::leagues::LeagueInfo;
use crate::sources::FastSource;

/// Well-known nicknames and short forms. A hit here only counts when the
/// mapped canonical name actually appears in the fetched roster, so a stale
/// entry can never invent a team.
const TEAM_NICKNAMES: &[(&str, &str)] = &[
    ("man city", "Manchester City"),
    ("man united", "Manchester United"),
    ("man u", "Manchester United"),
    ("spurs", "Tottenham Hotspur"),
    ("tottenham", "Tottenham Hotspur"),
    ("real", "Real Madrid"),
    ("barca", "Barcelona"),
    ("bayern", "Bayern München"),
    ("dortmund", "Borussia Dortmund"),
    ("psg", "Paris Saint-Germain"),
    ("juve", "Juventus"),
    ("inter", "Inter Milan"),
    ("milan", "AC Milan"),
];

/// Nickname table sanity check, run once at startup alongside the league
/// catalog check. A nickname keyed twice would make resolution
/// order-dependent.
pub fn validate_nicknames() -> anyhow::Result<()> {
    for (i, (nick, _)) in TEAM_NICKNAMES.iter().enumerate() {
        if TEAM_NICKNAMES[i + 1..].iter().any(|(other, _)| other == nick) {
            anyhow::bail!("team nickname '{nick}' maps to more than one canonical name");
        }
    }
    Ok(())
}

/// Current roster of canonical team names for a league, from the fast source.
/// A provider failure here is `SourceUnavailable`, deliberately distinct from
/// "team not found".
pub fn league_roster(
    fast: &dyn FastSource,
    league: &LeagueInfo,
    season: &str,
) -> Result<Vec<String>, StatsError> {
    let rows = fast
        .read_league_table(league.fast_code, season)
        .map_err(|err| StatsError::SourceUnavailable {
            provider: "fast source",
            message: format!("{err:#}"),
        })?;
    Ok(rows.into_iter().map(|r| r.team).collect())
}

/// Resolve free-text input to the provider's canonical team name.
/// Exact match, then substring in either direction, then the nickname table.
pub fn resolve_team(
    fast: &dyn FastSource,
    league: &LeagueInfo,
    team_query: &str,
    season: &str,
) -> Result<String, StatsError> {
    let roster = league_roster(fast, league, season)?;
    let needle = team_query.trim().to_lowercase();

    if let Some(team) = roster.iter().find(|t| t.to_lowercase() == needle) {
        debug!(team = %team, "exact team match");
        return Ok(team.clone());
    }

    if let Some(team) = roster.iter().find(|t| {
        let lower = t.to_lowercase();
        lower.contains(&needle) || needle.contains(&lower)
    }) {
        debug!(team = %team, "substring team match");
        return Ok(team.clone());
    }

    if let Some((_, canonical)) = TEAM_NICKNAMES.iter().find(|(nick, _)| *nick == needle) {
        if let Some(team) = roster.iter().find(|t| t.as_str() == *canonical) {
            debug!(team = %team, "nickname team match");
            return Ok(team.clone());
        }
    }

    Err(StatsError::TeamNotFound {
        query: team_query.trim().to_string(),
        league: league.display_name.to_string(),
        roster,
    })
}
