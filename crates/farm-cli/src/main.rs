use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use farm_api::{open_service, FarmConfig, FarmService, SqliteFarmStore};
use farm_core::economy::{field_expansion_cost, kitchen_expansion_cost};
use farm_core::progression::{tools_required_for_level, xp_required_for_level};
use farm_core::{Clock, GameBalance, SystemClock};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "pumpkin_patch=info,farm_api=info,farm_core=info";
const MANUAL_TIERS_SHOWN: u32 = 5;

#[derive(Debug, Parser)]
#[command(name = "pumpkin-patch", version, about = "Pumpkin Patch farming backend")]
struct Cli {
    /// TOML config file. Defaults to ./pumpkin-patch.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API.
    Serve {
        #[arg(long, env = "PUMPKIN_ADDR")]
        addr: Option<String>,
        #[arg(long, env = "PUMPKIN_SQLITE_PATH")]
        sqlite_path: Option<PathBuf>,
    },
    /// Print a player's refreshed state from the configured store.
    Inspect {
        player_id: String,
        #[arg(long, env = "PUMPKIN_SQLITE_PATH")]
        sqlite_path: Option<PathBuf>,
    },
    /// Print the XP curve and expansion cost tables.
    Curve,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run_server(config: FarmConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = config
        .server
        .addr
        .parse()
        .with_context(|| format!("invalid addr: {}", config.server.addr))?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let service = open_service(&config, clock)
        .await
        .context("failed to open farm store")?;

    tracing::debug!(sqlite = %config.server.sqlite_path.display(), "starting server");
    println!("serving api on http://{addr}");
    farm_api::serve(addr, service, config.server.debug_routes)
        .await
        .context("server error")
}

async fn inspect(config: FarmConfig, player_id: &str) -> anyhow::Result<()> {
    let store = SqliteFarmStore::open(&config.server.sqlite_path).with_context(|| {
        format!(
            "failed to open sqlite store {}",
            config.server.sqlite_path.display()
        )
    })?;
    let service = FarmService::new(Arc::new(store), Arc::new(SystemClock), config.balance);
    let farm = service
        .view(player_id)
        .await
        .with_context(|| format!("failed to load player {player_id}"))?;
    let daily = farm.daily_status(service.now(), service.balance());

    println!("{}", farm.player);
    println!(
        "daily: can_collect={} hours_until_next={}",
        daily.can_collect, daily.hours_until_next
    );
    for plot in farm.plots() {
        println!(
            "plot ({}, {}) state={} crop={} fertilized={}",
            plot.row,
            plot.col,
            serde_json::to_string(&plot.state)?,
            plot.crop_type
                .map(|crop| serde_json::to_string(&crop))
                .transpose()?
                .unwrap_or_else(|| "-".to_string()),
            plot.fertilized
        );
    }
    for oven in farm.ovens() {
        println!(
            "oven {} state={}",
            oven.slot_number,
            serde_json::to_string(&oven.state)?
        );
    }
    println!(
        "orders pending={} challenges={}",
        farm.pending_orders(),
        farm.challenges().count()
    );
    Ok(())
}

fn print_curve(balance: &GameBalance) {
    println!("level  total_xp");
    for level in 1..=balance.max_auto_level {
        println!("{level:>5}  {:>8}", xp_required_for_level(level));
    }

    println!();
    println!("level  tools");
    let first_manual = balance.max_auto_level + 1;
    for level in first_manual..first_manual + MANUAL_TIERS_SHOWN {
        if let Some(tools) = tools_required_for_level(level, balance.max_auto_level) {
            println!("{level:>5}  {tools:>5}");
        }
    }

    println!();
    println!("field  cost");
    for size in balance.starting_field_size + 1..=balance.max_field_size {
        println!("{:>5}  {:>5}", format!("{size}x{size}"), field_expansion_cost(size, balance));
    }

    println!();
    println!("ovens  cost");
    for slots in balance.starting_kitchen_slots + 1..=balance.max_kitchen_slots {
        println!("{slots:>5}  {:>5}", kitchen_expansion_cost(slots, balance));
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = FarmConfig::load(cli.config.as_deref()).context("failed to load config")?;

    match cli.command {
        Command::Serve { addr, sqlite_path } => {
            run_server(config.with_overrides(addr, sqlite_path)).await
        }
        Command::Inspect {
            player_id,
            sqlite_path,
        } => inspect(config.with_overrides(None, sqlite_path), &player_id).await,
        Command::Curve => {
            print_curve(&config.balance);
            Ok(())
        }
    }
}
