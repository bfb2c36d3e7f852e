use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use freshtracks::{cli, config, error, pipeline::SyncPolicy, schedule, server};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with the Spotify API
    Auth,

    /// Run the curation pipeline once
    Run(RunOptions),

    /// Show the releases a run would pick up, without touching any playlist
    Preview(PreviewOptions),

    /// Run the pipeline on a schedule
    Watch(WatchOptions),

    /// Serve the hosted OAuth endpoints for a browser-based frontend
    Serve,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct RunOptions {
    /// Playlist synchronization policy
    #[clap(long, value_enum, default_value_t = SyncPolicy::Replace)]
    pub policy: SyncPolicy,
}

#[derive(Parser, Debug, Clone)]
pub struct PreviewOptions {
    /// Override the configured lookback window in days
    #[clap(long)]
    pub days_back: Option<i64>,
}

#[derive(Parser, Debug, Clone)]
pub struct WatchOptions {
    /// Playlist synchronization policy
    #[clap(long, value_enum, default_value_t = SyncPolicy::Replace)]
    pub policy: SyncPolicy,

    /// Cadence: hourly, daily or weekly
    #[clap(long, default_value = "daily")]
    pub every: String,

    /// Time of day to run (HH:MM, for daily/weekly)
    #[clap(long)]
    pub at: Option<String>,

    /// Day of the week to run (for weekly)
    #[clap(long)]
    pub day: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    // Completions need no configuration; everything else does.
    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command_for_update();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let cfg = match config::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => error!("Configuration error: {}", e),
    };

    match cli.command {
        Command::Auth => cli::auth(&cfg).await,
        Command::Run(opt) => cli::run(&cfg, opt.policy).await,
        Command::Preview(opt) => cli::preview(&cfg, opt.days_back).await,
        Command::Watch(opt) => {
            let cadence =
                match schedule::parse_cadence(&opt.every, opt.at.as_deref(), opt.day.as_deref()) {
                    Ok(cadence) => cadence,
                    Err(e) => error!("Invalid schedule: {}", e),
                };
            if let Err(e) = schedule::watch(&cfg, opt.policy, cadence).await {
                error!("Watch loop failed: {}", e);
            }
        }
        Command::Serve => {
            if let Err(e) = server::start_hosted_server(cfg).await {
                error!("Server failed: {}", e);
            }
        }
        Command::Completions(_) => unreachable!(),
    }
}
