use crate::error::StatsError;

/// One of the five supported competitions. The fast source addresses leagues
/// with a country-code prefix; the detailed source uses the bare name.
#[derive(Debug, Clone, Copy)]
pub struct LeagueInfo {
    pub display_name: &'static str,
    pub aliases: &'static [&'static str],
    pub fast_code: &'static str,
    pub detailed_code: &'static str,
}

pub const LEAGUES: &[LeagueInfo] = &[
    LeagueInfo {
        display_name: "Premier League",
        aliases: &["england", "premier league", "epl"],
        fast_code: "ENG-Premier League",
        detailed_code: "Premier League",
    },
    LeagueInfo {
        display_name: "La Liga",
        aliases: &["spain", "la liga"],
        fast_code: "ESP-La Liga",
        detailed_code: "La Liga",
    },
    LeagueInfo {
        display_name: "Bundesliga",
        aliases: &["germany", "bundesliga"],
        fast_code: "GER-Bundesliga",
        detailed_code: "Bundesliga",
    },
    LeagueInfo {
        display_name: "Serie A",
        aliases: &["italy", "serie a"],
        fast_code: "ITA-Serie A",
        detailed_code: "Serie A",
    },
    LeagueInfo {
        display_name: "Ligue 1",
        aliases: &["france", "ligue 1"],
        fast_code: "FRA-Ligue 1",
        detailed_code: "Ligue 1",
    },
];

/// Trailing five-season window, newest first. The fast source wants the
/// slash form; see `detailed_season` for the other one.
pub const SEASONS: &[&str] = &[
    "2024/2025",
    "2023/2024",
    "2022/2023",
    "2021/2022",
    "2020/2021",
];

pub const CURRENT_SEASON: &str = SEASONS[0];

pub fn resolve_league(query: &str) -> Result<&'static LeagueInfo, StatsError> {
    let needle = query.trim().to_lowercase();
    LEAGUES
        .iter()
        .find(|l| l.aliases.iter().any(|a| *a == needle))
        .ok_or_else(|| StatsError::LeagueNotFound {
            query: query.trim().to_string(),
            aliases: all_aliases(),
        })
}

pub fn all_aliases() -> Vec<String> {
    LEAGUES
        .iter()
        .flat_map(|l| l.aliases.iter().map(|a| a.to_string()))
        .collect()
}

/// "2024/2025" -> "2024-2025" (detailed-source season format).
pub fn detailed_season(season: &str) -> String {
    season.replace('/', "-")
}

/// Alias table sanity check, run once at startup. Duplicate aliases would make
/// lookups order-dependent, which we never want.
pub fn validate_catalog() -> anyhow::Result<()> {
    let aliases = all_aliases();
    for (i, a) in aliases.iter().enumerate() {
        if aliases[i + 1..].contains(a) {
            anyhow::bail!("league alias '{a}' maps to more than one league");
        }
    }
    Ok(())
}
