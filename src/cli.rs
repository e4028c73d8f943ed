//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use crate::adapters::clock::SystemClock;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::sqlite_store::SqliteStore;
use crate::adapters::web::{AppState, build_router};
use crate::domain::calendar::TradingCalendar;
use crate::domain::error::FundsimError;
use crate::domain::ledger::FundingKind;
use crate::domain::market::SimulationConfig;
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::StorePort;
use crate::services::ledger_service::LedgerService;
use crate::services::market_service::MarketService;
use crate::services::portfolio_service::PortfolioService;

#[derive(Parser, Debug)]
#[command(name = "fundsim", about = "Simulated fund trading ledger and market")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the API server and the price simulation loop
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Seed the fund catalogue (and optionally a demo account)
    Seed {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List the funds in the store
    Funds {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Serve { config } => run_serve(&config),
        Command::Seed { config } => run_seed(&config),
        Command::Funds { config } => run_funds(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = FundsimError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_calendar(config: &dyn ConfigPort) -> TradingCalendar {
    let defaults = TradingCalendar::default();
    TradingCalendar {
        open_hour: config.get_double("simulation", "trading_hours_start", defaults.open_hour),
        close_hour: config.get_double("simulation", "trading_hours_end", defaults.close_hour),
    }
}

fn open_store(config: &dyn ConfigPort) -> Result<SqliteStore, ExitCode> {
    let store = SqliteStore::from_config(config).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    store.initialize_schema().map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    Ok(store)
}

fn run_serve(config_path: &PathBuf) -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let store = match open_store(&config) {
        Ok(s) => Arc::new(s) as Arc<dyn StorePort + Send + Sync>,
        Err(code) => return code,
    };
    let clock = Arc::new(SystemClock);
    let calendar = build_calendar(&config);
    let sim_config = SimulationConfig::from_config(&config);

    let market = Arc::new(MarketService::new(
        store.clone(),
        clock.clone(),
        sim_config,
        calendar,
    ));
    if let Err(e) = market.seed_initial_funds() {
        eprintln!("error: {e}");
        return ExitCode::from(&e);
    }

    let ledger = Arc::new(LedgerService::new(store.clone(), clock, calendar));
    let portfolio = Arc::new(PortfolioService::new(store));

    let addr: std::net::SocketAddr = config
        .get_string("server", "listen")
        .unwrap_or_else(|| "127.0.0.1:3000".to_string())
        .parse()
        .unwrap_or_else(|_| "127.0.0.1:3000".parse().unwrap());

    eprintln!("Starting server on {}", addr);

    let router = build_router(AppState {
        ledger,
        market: market.clone(),
        portfolio,
    });

    tokio::runtime::Runtime::new().unwrap().block_on(async {
        market.spawn();
        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
        axum::serve(listener, router).await.unwrap();
    });

    ExitCode::SUCCESS
}

fn run_seed(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let store = match open_store(&config) {
        Ok(s) => Arc::new(s) as Arc<dyn StorePort + Send + Sync>,
        Err(code) => return code,
    };
    let clock = Arc::new(SystemClock);
    let calendar = build_calendar(&config);
    let sim_config = SimulationConfig::from_config(&config);

    let market = MarketService::new(store.clone(), clock.clone(), sim_config, calendar);
    let seeded = match market.seed_initial_funds() {
        Ok(funds) => funds,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };
    if seeded.is_empty() {
        eprintln!("Fund catalogue already seeded, nothing to do");
    } else {
        for fund in &seeded {
            println!("{}  {}", fund.id, fund.name);
        }
        eprintln!("{} funds seeded", seeded.len());
    }

    if let Some(username) = config.get_string("seed", "demo_user") {
        let capital = config.get_double("seed", "demo_capital", 100_000.0);
        let qualified = config.get_bool("seed", "demo_qualified", true);
        let ledger = LedgerService::new(store, clock, calendar);
        let result = ledger
            .create_account(&username, qualified)
            .and_then(|account| ledger.fund_account(&account.id, capital, FundingKind::Initial));
        match result {
            Ok(account) => {
                println!("{}  {} (balance {})", account.id, account.username, capital);
                eprintln!("demo account created");
            }
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::from(&e);
            }
        }
    }

    ExitCode::SUCCESS
}

fn run_funds(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let store = match open_store(&config) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let funds = match store.list_funds() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(&e);
        }
    };

    if funds.is_empty() {
        eprintln!("No funds in the store (run `fundsim seed` first)");
        return ExitCode::SUCCESS;
    }

    for fund in &funds {
        println!(
            "{}  {:<32} {:<13} {:<6} nav {:.4}  daily {:+.4}  return {:+.2}%",
            fund.id,
            fund.name,
            fund.fund_type.as_str(),
            fund.risk_level.as_str(),
            fund.current_nav,
            fund.daily_change,
            fund.total_return * 100.0,
        );
    }
    eprintln!("{} funds", funds.len());

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_defaults_without_config_keys() {
        let adapter = FileConfigAdapter::from_string("[simulation]\n").unwrap();
        let calendar = build_calendar(&adapter);
        assert_eq!(calendar, TradingCalendar::default());
    }

    #[test]
    fn calendar_reads_session_overrides() {
        let adapter = FileConfigAdapter::from_string(
            "[simulation]\ntrading_hours_start = 8.0\ntrading_hours_end = 16.5\n",
        )
        .unwrap();
        let calendar = build_calendar(&adapter);
        assert_eq!(calendar.open_hour, 8.0);
        assert_eq!(calendar.close_hour, 16.5);
    }
}
