use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "timewatcher")]
#[command(about = "Slack bot that replies with hour-bank balances", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: TIMEWATCHER_CONFIG_PATH or ~/.timewatcher/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Connect to Slack and reply to hour-bank queries until interrupted.
    Run {
        /// Config file path (default: TIMEWATCHER_CONFIG_PATH or ~/.timewatcher/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("timewatcher {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Run { config }) => {
            if let Err(e) = run_bot(config).await {
                log::error!("bot failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lib::config::default_config_path);
    let _dir = lib::config::init_config_dir(&path)?;
    println!("initialized configuration at {}", path.display());
    Ok(())
}

async fn run_bot(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let (config, path) = lib::config::load_config(config_path)?;
    let token = lib::config::resolve_api_token(&config).ok_or_else(|| {
        anyhow::anyhow!(
            "missing Slack API token: set BOT_API_KEY or bot.apiToken in {}",
            path.display()
        )
    })?;
    let bot_name = lib::config::resolve_bot_name(&config);
    let environment = lib::config::resolve_environment(&config);
    log::info!("starting {} ({:?} environment)", bot_name, environment);

    let connector = Arc::new(lib::channels::SlackConnector::new(token));
    let balance = lib::balance::BalanceClient::new(environment, &config.balance);
    let mut bot = lib::bot::HourBankBot::new(connector, balance, bot_name);

    tokio::select! {
        res = bot.run() => res.map_err(|e| anyhow::anyhow!(e)),
        _ = tokio::signal::ctrl_c() => {
            log::info!("interrupted, shutting down");
            Ok(())
        }
    }
}
