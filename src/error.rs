use thiserror::Error;

/// Domain errors surfaced to the interactive shell. Per-season misses are not
/// represented here: the fetcher recovers from those locally by skipping the
/// season, and only a fully empty result becomes `NoDataFound`.
#[derive(Error, Debug)]
pub enum StatsError {
    #[error("league '{query}' not found. Available: {}", .aliases.join(", "))]
    LeagueNotFound { query: String, aliases: Vec<String> },

    #[error("team '{query}' not found in {league}. Available teams: {}", .roster.join(", "))]
    TeamNotFound {
        query: String,
        league: String,
        roster: Vec<String>,
    },

    #[error("{provider} unavailable: {message}")]
    SourceUnavailable {
        provider: &'static str,
        message: String,
    },

    #[error("no data found for team '{team}' in league '{league}'")]
    NoDataFound { team: String, league: String },
}
