use std::io::{self, BufRead, Write};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use club_stats_terminal::aggregator::Aggregator;
use club_stats_terminal::leagues::{self, LEAGUES};
use club_stats_terminal::report::render;
use club_stats_terminal::resolver;
use club_stats_terminal::sources::{HttpDetailedSource, HttpFastSource};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    leagues::validate_catalog()?;
    resolver::validate_nicknames()?;

    banner();

    let fast = HttpFastSource;
    let detailed = HttpDetailedSource;
    let stdin = io::stdin();

    loop {
        let Some(league_input) = prompt(&stdin, "Enter league (or 'teams <league>'): ")? else {
            break;
        };
        if league_input.is_empty() {
            break;
        }

        if let Some(league) = league_input.strip_prefix("teams ") {
            show_roster(&fast, league.trim());
            continue;
        }

        let Some(team_input) = prompt(&stdin, "Enter team name: ")? else {
            break;
        };
        if team_input.is_empty() {
            break;
        }

        // One bad query must never take the shell down; print and move on.
        let mut aggregator = Aggregator::new(&fast, Some(&detailed));
        match aggregator.team_report(&league_input, &team_input) {
            Ok(report) => {
                if !report.team.eq_ignore_ascii_case(&team_input) {
                    println!(
                        "Found team: '{}' (searched for: '{}')",
                        report.team, team_input
                    );
                }
                println!("{}", render(&report));
            }
            Err(err) => {
                println!("Error: {err}");
                println!("Tip: use 'teams <league>' to list the teams in a league");
            }
        }

        let Some(again) = prompt(&stdin, "Look up another team? (y/n): ")? else {
            break;
        };
        if !matches!(again.to_lowercase().as_str(), "y" | "yes") {
            break;
        }
    }

    Ok(())
}

fn banner() {
    println!("CLUB STATS TERMINAL");
    println!("{}", "=".repeat(50));
    println!("Available leagues:");
    for league in LEAGUES {
        println!("- {}", league.aliases.join(" / "));
    }
    println!();
}

fn show_roster(fast: &HttpFastSource, league: &str) {
    let aggregator = Aggregator::new(fast, None);
    match aggregator.roster(league) {
        Ok(teams) if teams.is_empty() => println!("No teams found for {league}"),
        Ok(teams) => {
            println!("\nAvailable teams in {league}:");
            for (i, team) in teams.iter().enumerate() {
                println!("{:2}. {team}", i + 1);
            }
            println!();
        }
        Err(err) => println!("Error: {err}"),
    }
}

fn prompt(stdin: &io::Stdin, label: &str) -> Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    let read = stdin.lock().read_line(&mut line)?;
    if read == 0 {
        // EOF behaves like an explicit exit.
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
