//! shelfmatch - recognise catalog products in retail visit transcripts.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod output;

use commands::{CheckCommand, EvalCommand, MatchCommand, ReplCommand, SetupCommand};
use config::Config;

/// shelfmatch - recognise catalog products in retail visit transcripts.
///
/// Products mentioned in a transcript are resolved against an Azure AI
/// Search catalog through Azure OpenAI function calling. Competitor
/// advantages and bad shelf placement are flagged as well.
///
/// Settings come from an optional YAML file overlaid by environment
/// variables (AZURE_OPENAI_ENDPOINT, AZURE_SEARCH_ENDPOINT, ...).
#[derive(Parser)]
#[command(name = "shelfmatch")]
#[command(about = "Match products in retail visit transcripts")]
#[command(version)]
pub struct Cli {
    /// Config file (YAML); values may reference $VARS
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Output as JSON instead of YAML
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate configuration and test connections
    Check(CheckCommand),
    /// Embed the product catalog and upload it to the search index
    Setup(SetupCommand),
    /// Run the sample transcripts and compare with expectations
    Eval(EvalCommand),
    /// Interactive mode: type transcripts, get summaries
    Repl(ReplCommand),
    /// Match a single transcript
    Match(MatchCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = Config::load(cli.config.as_deref())?;

    let level = if cli.verbose {
        "debug".to_string()
    } else {
        cfg.log_level.to_lowercase()
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Check(cmd) => cmd.run(&cli, &cfg).await,
        Commands::Setup(cmd) => cmd.run(&cli, &cfg).await,
        Commands::Eval(cmd) => cmd.run(&cli, &cfg).await,
        Commands::Repl(cmd) => cmd.run(&cli, &cfg).await,
        Commands::Match(cmd) => cmd.run(&cli, &cfg).await,
    }
}
