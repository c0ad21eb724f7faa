// Dugout entry point.
//
// Startup sequence:
// 1. Parse the command line
// 2. Initialize tracing (stderr, so stdout stays machine-readable)
// 3. Load config (copying defaults on first run)
// 4. Open the stat store read-only
// 5. Run one query and render it

mod render;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dugout_baseball::dashboard::Dashboard;
use dugout_baseball::error::StatsError;
use dugout_baseball::metrics::PlayerType;
use dugout_core::config;
use dugout_core::db::Database;
use serde::Serialize;
use tracing::{info, warn};

use render::{OutputFormat, Table};

#[derive(Parser)]
#[command(name = "dugout")]
#[command(about = "Franchise performance analytics over a season-stat store", long_about = None)]
struct Cli {
    /// Directory containing config/ and defaults/
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    /// Output format: json, csv or table
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derived rates and league percentiles for the team's players
    Rates {
        /// batter or pitcher
        player_type: PlayerType,
        /// Show every player in the league, not just the team
        #[arg(long)]
        league: bool,
    },
    /// Mean percentile radar for a group (C, 1B, ..., DH, H; SP, RP, SP_L, ...)
    Profile {
        /// batter or pitcher
        player_type: PlayerType,
        group: String,
    },
    /// Salary vs OPS+ / FIP- quadrants for the team
    Contribution {
        /// batter or pitcher
        player_type: PlayerType,
        /// Positions (batters) or role keys such as "SP R" (pitchers)
        #[arg(long, value_delimiter = ',')]
        roles: Vec<String>,
    },
    /// Team players recommended for an action (retain, trade, extend, option)
    Players {
        player_type: String,
        action: String,
        /// Positions (batters) or role keys such as "SP R" (pitchers)
        #[arg(long, value_delimiter = ',')]
        roles: Vec<String>,
    },
    /// Team vs league headline metric per position or role
    Compare {
        /// batter or pitcher
        player_type: PlayerType,
        /// Positions (batters) or role keys (pitchers); all when omitted
        #[arg(long, value_delimiter = ',')]
        groups: Vec<String>,
    },
    /// Team vs league breakdown for SP, RP (by hand) or H (by position)
    Breakdown { group: String },
    /// Team FIP- / OPS+ tiles against the baseline
    Tiles,
    /// Team standings record
    Record,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    let config = config::load_config_in(&cli.base_dir).context("failed to load configuration")?;
    info!(
        "Config loaded: team={}, min_pa={}, min_ip={}",
        config.team.id, config.qualification.min_pa, config.qualification.min_ip
    );

    let db_path = config.db_path_in(&cli.base_dir);
    let db = Database::open_read_only(&db_path).context("failed to open stat store")?;
    info!("Database opened at {}", db_path.display());

    let dashboard = Dashboard::new(db, &config);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match run(&dashboard, &cli.command, cli.format, &mut out) {
        Ok(()) => {}
        Err(e) if e.is_no_data() => {
            warn!("{e}");
            let message = render::NoData {
                message: e.to_string(),
            };
            render::render(
                &mut out,
                cli.format,
                command_name(&cli.command),
                &message,
                &render::no_data_table(&message.message),
            )?;
        }
        Err(e) => return Err(e).context(format!("{} failed", command_name(&cli.command))),
    }

    out.flush()?;
    Ok(())
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Rates { .. } => "rates",
        Commands::Profile { .. } => "profile",
        Commands::Contribution { .. } => "contribution",
        Commands::Players { .. } => "players",
        Commands::Compare { .. } => "compare",
        Commands::Breakdown { .. } => "breakdown",
        Commands::Tiles => "tiles",
        Commands::Record => "record",
    }
}

/// Run one command against the dashboard and write its result. Render
/// failures surface as `StatsError::Source`.
fn run<W: Write>(
    dashboard: &Dashboard<Database>,
    command: &Commands,
    format: OutputFormat,
    out: &mut W,
) -> Result<(), StatsError> {
    let name = command_name(command);
    info!("running {name}");

    match command {
        Commands::Rates {
            player_type,
            league,
        } => match (player_type, league) {
            (PlayerType::Batter, true) => {
                let rows = dashboard.ranked_batters()?;
                emit(out, format, name, &rows, render::batters_table(&rows))
            }
            (PlayerType::Batter, false) => {
                let rows = dashboard.team_batters()?;
                emit(out, format, name, &rows, render::batters_table(&rows))
            }
            (PlayerType::Pitcher, true) => {
                let rows = dashboard.ranked_pitchers()?;
                emit(out, format, name, &rows, render::pitchers_table(&rows))
            }
            (PlayerType::Pitcher, false) => {
                let rows = dashboard.team_pitchers()?;
                emit(out, format, name, &rows, render::pitchers_table(&rows))
            }
        },
        Commands::Profile { player_type, group } => match player_type {
            PlayerType::Batter => {
                let profile = dashboard.batter_profile(group)?;
                emit(out, format, name, &profile, render::profile_table(&profile))
            }
            PlayerType::Pitcher => {
                let profile = dashboard.pitcher_profile(group)?;
                emit(out, format, name, &profile, render::profile_table(&profile))
            }
        },
        Commands::Contribution { player_type, roles } => {
            let report = dashboard.contribution(*player_type, roles)?;
            emit(out, format, name, &report, render::contribution_table(&report))
        }
        Commands::Players {
            player_type,
            action,
            roles,
        } => {
            let players = dashboard.player_list(player_type, action, roles)?;
            emit(out, format, name, &players, render::players_table(&players))
        }
        Commands::Compare {
            player_type,
            groups,
        } => {
            let cmp = dashboard.performance_comparison(*player_type, groups)?;
            emit(out, format, name, &cmp, render::comparison_table(&cmp))
        }
        Commands::Breakdown { group } => {
            let cmp = dashboard.overview_breakdown(group)?;
            emit(out, format, name, &cmp, render::comparison_table(&cmp))
        }
        Commands::Tiles => {
            let tiles = dashboard.overview_tiles()?;
            emit(out, format, name, &tiles, render::tiles_table(&tiles))
        }
        Commands::Record => {
            let record = dashboard.team_record()?;
            emit(out, format, name, &record, render::record_table(&record))
        }
    }
}

fn emit<T: Serialize, W: Write>(
    out: &mut W,
    format: OutputFormat,
    name: &str,
    data: &T,
    table: Table,
) -> Result<(), StatsError> {
    render::render(out, format, name, data, &table)?;
    Ok(())
}

/// Initialize tracing to stderr. `RUST_LOG` overrides the default filter.
fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose { "dugout=debug,warn" } else { "dugout=info,warn" };

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
