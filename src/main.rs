use anyhow::Result;
use betbot::{Config, Engine, OddsTable, SchemeStore};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "betbot")]
#[command(about = "Channel betting bot with pluggable draw-rule strategies")]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot, reading channel messages from stdin
    ///
    /// One message per line: "<channel_id>|<text>", or
    /// "<channel_id>|@<reply_to>|<text>" for replies to our bet commands.
    Run,
    /// Validate the scheme store and odds table, then exit
    Check,
    /// Print per-scheme ledgers from the store
    Stats,
}

fn parse_line(line: &str) -> Option<betbot::InboundMessage> {
    let (channel, rest) = line.split_once('|')?;
    let channel_id: i64 = channel.trim().parse().ok()?;
    let (reply_to, text) = match rest.strip_prefix('@') {
        Some(tagged) => {
            let (id, text) = tagged.split_once('|')?;
            (Some(id.trim().parse().ok()?), text)
        }
        None => (None, rest),
    };
    Some(betbot::InboundMessage {
        channel_id,
        sender_id: 0,
        message_id: 0,
        reply_to,
        text: text.to_string(),
    })
}

fn load_odds(config: &Config) -> OddsTable {
    if config.odds_path.exists() {
        match OddsTable::load(&config.odds_path) {
            Ok(table) => return table,
            Err(e) => warn!("odds table unreadable, using defaults: {:#}", e),
        }
    }
    OddsTable::default()
}

async fn run(config: Config) -> Result<()> {
    let store = SchemeStore::load(&config.store_path)?;
    store.validate()?;
    let odds = load_odds(&config);

    let transport = Arc::new(betbot::transport::StdoutTransport::default());
    let mut engine = Engine::new(store, odds, transport, &config);
    let sweeper = engine.spawn_confirmation_sweeper();

    info!("betbot running, feeding messages from stdin (ctrl-d to stop)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(msg) => engine.handle_message(msg).await,
            None => warn!("unreadable input line: {}", line),
        }
    }
    sweeper.abort();

    // Persist scheme ledgers and show the session's figures
    let schemes = engine.schemes().lock().await.clone();
    let updated = SchemeStore {
        schemes,
        settings: SchemeStore::load(&config.store_path)?.settings,
    };
    updated.save(&config.store_path)?;

    let stats = engine.stats().await;
    let balance = engine.ledger().lock().await.balance;
    println!("\n=== Session ===");
    println!(
        "orders: {} ({} settled, {} failed), win rate {:.1}%",
        stats.total_orders, stats.settled_orders, stats.failed_orders, stats.win_rate()
    );
    println!("real:  profit {} / turnover {}", stats.real_profit, stats.real_turnover);
    println!("paper: profit {} / turnover {}", stats.sim_profit, stats.sim_turnover);
    println!("balance moved: {}", balance);
    Ok(())
}

fn check(config: &Config) -> Result<()> {
    let store = SchemeStore::load(&config.store_path)?;
    store.validate()?;
    let odds = load_odds(config);
    for scheme in &store.schemes {
        odds.require(scheme.family, scheme.play_mode)?;
    }
    println!("{} scheme(s) ok", store.schemes.len());
    Ok(())
}

fn stats(config: &Config) -> Result<()> {
    let store = SchemeStore::load(&config.store_path)?;
    println!("=== Schemes ===");
    for s in &store.schemes {
        println!(
            "#{} {} [{}] {} {}{}",
            s.id,
            s.name,
            if s.enabled { "on" } else { "off" },
            s.family,
            s.play_mode,
            if s.simulated { " (paper)" } else { "" }
        );
        println!(
            "    real:  profit {} / turnover {}",
            s.ledger.real_profit, s.ledger.real_turnover
        );
        println!(
            "    paper: profit {} / turnover {}",
            s.ledger.sim_profit, s.ledger.sim_turnover
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    match cli.command {
        Commands::Run => run(config).await,
        Commands::Check => check(&config),
        Commands::Stats => stats(&config),
    }
}
