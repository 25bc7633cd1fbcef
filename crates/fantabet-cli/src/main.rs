// Fantabet command-line entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log to file, not terminal)
// 3. Load config
// 4. Open the document store
// 5. Resolve the caller against the admin list
// 6. Dispatch the command

mod render;

use std::io::Write;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fantabet_core::auth::{require_admin, Caller};
use fantabet_core::config::{self, Config};
use fantabet_core::draw::{reveal_all, DrawState};
use fantabet_core::ingest::Role;
use fantabet_core::league::{by_giornata, compute_overview, StandingsColumn, StandingsSort};
use fantabet_core::service::League;
use fantabet_core::squads::squad_sheets;
use fantabet_core::stats::{player_table, LeaderboardRules, PlayerColumn, PlayerFilter, PlayerSort};
use fantabet_core::store::{self, DocumentStore};

#[derive(Debug, Parser)]
#[command(name = "fantabet", about = "Fantasy football league companion")]
struct Cli {
    /// User id of the caller; administrative commands need one listed in
    /// `[access] admin_ids`.
    #[arg(long, short, global = true)]
    user: Option<String>,

    /// Log at debug level (see `FANTABET_LOG` to override)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replace the rosters with a `squad;role;player;team;cost` CSV
    ImportRoster { file: PathBuf },
    /// Replace the player statistics with a 17-column CSV (header first)
    ImportStats { file: PathBuf },
    /// Replace the match calendar and results
    ImportCalendar { file: PathBuf },
    /// League table
    Standings {
        /// Sort column, repeatable: choosing the same column twice flips it
        #[arg(long = "sort", short)]
        sort: Vec<StandingsColumn>,
    },
    /// Results grouped by giornata, with league totals
    Results,
    /// League superlatives
    Records,
    /// Top scorers, assistmen, goalkeepers and fantasy averages
    Leaderboards,
    /// One squad's summary
    Team { squad: String },
    /// Roster aggregates and per-role squad sheets
    Squads,
    /// Player statistics table
    Players {
        /// Only this fantasy squad
        #[arg(long)]
        squad: Option<String>,
        /// Only this role (P, D, C, A)
        #[arg(long)]
        role: Option<String>,
        /// Sort column, repeatable: choosing the same column twice flips it
        #[arg(long = "sort", short)]
        sort: Vec<PlayerColumn>,
    },
    /// Run the cup draw
    Draw {
        /// Seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,
        /// Reveal every team at once
        #[arg(long)]
        no_delay: bool,
    },
    /// Delete every player statistic
    ClearStats,
    /// Delete every roster entry and squad aggregate
    ClearRosters,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Parse arguments
    let cli = Cli::parse();

    // 2. Initialize tracing (log to file, not terminal)
    init_tracing(cli.verbose)?;
    info!("fantabet starting: {:?}", cli.command);

    // 3. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!("config loaded: league={}", config.league.name);

    // 4. Open the document store
    let store = store::open(&config.store).context("failed to open the document store")?;
    let mut league = League::new(store, LeaderboardRules::from(&config.stats));

    // 5. Resolve the caller
    let caller = Caller::from_config(cli.user.as_deref(), &config.access);

    // 6. Dispatch
    run(cli.command, &mut league, &caller, &config).await
}

async fn run<S: DocumentStore>(
    command: Command,
    league: &mut League<S>,
    caller: &Caller,
    config: &Config,
) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    match command {
        Command::ImportRoster { file } => {
            let text = read_upload(&file).await?;
            let import = league
                .import_roster(caller, &text)
                .await
                .context("roster upload failed")?;
            render::parse_report(&mut out, &import.report)?;
            writeln!(out, "{} players in {} squads uploaded", import.players, import.squads)?;
        }
        Command::ImportStats { file } => {
            let text = read_upload(&file).await?;
            let import = league
                .import_player_stats(caller, &text, Utc::now())
                .await
                .context("statistics upload failed")?;
            render::parse_report(&mut out, &import.report)?;
            render::squad_upload_summary(&mut out, &import.squads)?;
        }
        Command::ImportCalendar { file } => {
            let text = read_upload(&file).await?;
            let import = league
                .import_calendar(caller, &text)
                .await
                .context("calendar upload failed")?;
            render::parse_report(&mut out, &import.report)?;
            writeln!(out, "{} matches uploaded", import.matches)?;
        }
        Command::Standings { sort } => {
            let mut rows = league.standings().await.context("failed to load results")?;
            let mut order = StandingsSort::default();
            for column in sort {
                order.select(column);
            }
            order.apply(&mut rows);
            render::standings(&mut out, &rows)?;
        }
        Command::Results => {
            let results = league.results().await.context("failed to load results")?;
            render::matchdays(&mut out, &by_giornata(&results))?;
            render::overview(&mut out, &compute_overview(&results))?;
        }
        Command::Records => {
            let records = league.league_records().await.context("failed to load results")?;
            render::records(&mut out, &records)?;
        }
        Command::Leaderboards => {
            let boards = league
                .leaderboards()
                .await
                .context("failed to load player statistics")?;
            render::leaderboards(&mut out, &boards)?;
        }
        Command::Team { squad } => {
            let summary = league
                .team_summary(&squad)
                .await
                .context("failed to load player statistics")?;
            render::team_summary(&mut out, &summary)?;
        }
        Command::Squads => {
            let squads = league.squads().await.context("failed to load squads")?;
            let roster = league.roster().await.context("failed to load rosters")?;
            render::squads(&mut out, &squads, &squad_sheets(&roster))?;
        }
        Command::Players { squad, role, sort } => {
            let filter = PlayerFilter {
                squad,
                role: role.as_deref().map(Role::from_code),
            };
            let mut order = PlayerSort::default();
            for column in sort {
                order.select(column);
            }
            let stats = league
                .player_stats()
                .await
                .context("failed to load player statistics")?;
            render::players(&mut out, &player_table(stats, &filter, &order))?;
        }
        Command::Draw { seed, no_delay } => {
            require_admin(caller, "run the cup draw")?;
            let teams = league.draw_teams().await.context("failed to load teams")?;
            let summaries = league
                .team_summaries(&teams)
                .await
                .context("failed to load team statistics")?;
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            let mut state = DrawState::new();
            state.start(teams, &mut rng)?;
            let delay = if no_delay {
                Duration::ZERO
            } else {
                config.draw.reveal_delay()
            };
            // A failed write aborts the draw; nothing is recorded.
            let mut write_error = None;
            reveal_all(&mut state, delay, |step| {
                match render::draw_step(&mut out, step, summaries.get(&step.team)) {
                    Ok(()) => ControlFlow::Continue(()),
                    Err(e) => {
                        write_error = Some(e);
                        ControlFlow::Break(())
                    }
                }
            })
            .await;
            if let Some(e) = write_error {
                return Err(e).context("cup draw interrupted");
            }

            if let Some(outcome) = state.outcome() {
                render::draw_outcome(&mut out, &outcome)?;
                league
                    .record_draw(caller, &outcome)
                    .await
                    .context("failed to save the cup draw")?;
            }
        }
        Command::ClearStats => {
            let deleted = league
                .clear_player_stats(caller)
                .await
                .context("failed to clear player statistics")?;
            writeln!(out, "{deleted} player statistics deleted")?;
        }
        Command::ClearRosters => {
            let deleted = league
                .clear_rosters(caller)
                .await
                .context("failed to clear rosters")?;
            writeln!(out, "{deleted} roster documents deleted")?;
        }
    }
    Ok(())
}

async fn read_upload(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

/// Overrides the default directives, e.g. `FANTABET_LOG=fantabet_core=trace`.
const LOG_ENV: &str = "FANTABET_LOG";

fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        "fantabet=debug,fantabet_core=debug,warn"
    } else {
        "fantabet=info,fantabet_core=info,warn"
    }
}

/// Each command runs as its own process, so the log is appended to rather
/// than truncated; `logs/fantabet.log` keeps the history of uploads and
/// draws. Stdout stays reserved for command output.
fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;
    let log_path = log_dir.join("fantabet.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_sort_columns() {
        let cli = Cli::try_parse_from([
            "fantabet", "--user", "root", "standings", "--sort", "points", "-s", "POINTS",
        ])
        .unwrap();
        assert_eq!(cli.user.as_deref(), Some("root"));
        match cli.command {
            Command::Standings { sort } => {
                assert_eq!(sort, vec![StandingsColumn::Points, StandingsColumn::Points]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_player_column() {
        assert!(Cli::try_parse_from(["fantabet", "players", "--sort", "height"]).is_err());
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["fantabet", "records", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Records));
        let quiet = Cli::try_parse_from(["fantabet", "records"]).unwrap();
        assert!(!quiet.verbose);
    }

    #[test]
    fn log_filter_follows_verbosity() {
        assert!(default_log_filter(true).starts_with("fantabet=debug"));
        assert!(default_log_filter(false).contains("fantabet_core=info"));
        assert!(default_log_filter(false).ends_with(",warn"));
    }

    #[test]
    fn draw_flags() {
        let cli = Cli::try_parse_from(["fantabet", "draw", "--seed", "7", "--no-delay"]).unwrap();
        match cli.command {
            Command::Draw { seed, no_delay } => {
                assert_eq!(seed, Some(7));
                assert!(no_delay);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
