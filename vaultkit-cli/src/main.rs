//! Vaultkit CLI - ERC-4626 vault tools from the command line
//!
//! Lists the agent tool definitions and runs single tool calls against the
//! configured wallet.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use vaultkit::config::{
    self, ConfigError, IssueLevel, PRIVATE_KEY_ENV, PROVIDER_URL_ENV, VaultkitConfig,
};
use vaultkit::prelude::*;

/// Vaultkit - ERC-4626 vault and ERC-20 tools for on-chain agents
#[derive(Parser)]
#[command(name = "vaultkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "VAULTKIT_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default configuration file
    Init(InitArgs),

    /// Print the tool definitions as JSON
    Tools,

    /// Connect the wallet and run one tool
    Call(CallArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for the init command
#[derive(Args)]
struct InitArgs {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    force: bool,
}

/// Arguments for the call command
#[derive(Args)]
struct CallArgs {
    /// Tool name, e.g. get_total_assets
    tool: String,

    /// Tool arguments as a JSON object
    #[arg(short, long, default_value = "{}")]
    args: String,

    /// Submit transactions (deposit, withdraw, approve, transfers) without asking
    #[arg(short, long)]
    yes: bool,
}

/// Arguments for the config command
#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

/// Errors surfaced by the CLI.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration has {0} error(s)")]
    Invalid(usize),
}

type Result<T> = std::result::Result<T, CliError>;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "vaultkit={level},{}",
            if verbosity >= 2 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config_file = cli.config.unwrap_or_else(config::config_path);
    match cli.command {
        Commands::Init(args) => cmd_init(args, config_file).await,
        Commands::Tools => cmd_tools(config_file).await,
        Commands::Call(args) => cmd_call(args, config_file).await,
        Commands::Config(args) => cmd_config(args, config_file).await,
    }
}

async fn load(config_file: &Path) -> Result<VaultkitConfig> {
    Ok(config::load_config_from(config_file).await?.with_env())
}

/// Initialize configuration.
async fn cmd_init(args: InitArgs, config_file: PathBuf) -> Result<()> {
    if config_file.exists() && !args.force {
        println!("Configuration already exists at: {}", config_file.display());
        println!("Use --force to overwrite.");
        return Ok(());
    }

    if args.force {
        config::save_config_to(&VaultkitConfig::default(), &config_file).await?;
    } else {
        config::init_config(&config_file).await?;
    }

    println!("Configuration created: {}", config_file.display());
    println!();
    println!("Next steps:");
    println!("  1. add [[vaults]] and [[tokens]] entries to the file");
    println!("  2. export {PROVIDER_URL_ENV}=<rpc url> {PRIVATE_KEY_ENV}=<key>");
    println!("  3. vaultkit call get_total_assets --args '{{\"address\":\"<vault>\"}}'");

    Ok(())
}

/// Print tool definitions without connecting a wallet.
async fn cmd_tools(config_file: PathBuf) -> Result<()> {
    let config = load(&config_file).await?;
    let client: Arc<dyn EvmClient> = Arc::new(Offline);
    let toolbox = agent_toolbox(
        client,
        Arc::new(VaultRegistry::from_config(&config)),
        ToolExecutionPolicy::RequireConfirmation,
    );

    println!("{}", serde_json::to_string_pretty(&toolbox.definitions())?);
    Ok(())
}

/// Run one tool against the configured wallet.
async fn cmd_call(args: CallArgs, config_file: PathBuf) -> Result<()> {
    let tool_args: Value = serde_json::from_str(&args.args)?;
    let config = load(&config_file).await?;
    let wallet: Arc<dyn EvmClient> = Arc::new(config.connect_wallet().await?);

    let toolbox = agent_toolbox(
        wallet,
        Arc::new(VaultRegistry::from_config(&config)),
        ToolExecutionPolicy::RequireConfirmation,
    );

    let output = if args.yes {
        toolbox.call_with(&args.tool, tool_args, &AutoApproveHandler).await
    } else {
        toolbox.call_with(&args.tool, tool_args, &AlwaysDenyHandler).await
    };
    let output = match output {
        Err(ToolError::ConfirmationDenied(name)) => {
            println!("'{name}' sends a transaction; re-run with --yes to submit it.");
            return Err(ToolError::ConfirmationDenied(name).into());
        }
        other => other?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Configuration management.
async fn cmd_config(args: ConfigArgs, config_file: PathBuf) -> Result<()> {
    match args.command {
        ConfigCommands::Path => {
            println!("{}", config_file.display());
        }
        ConfigCommands::Show => {
            if config_file.exists() {
                let content = tokio::fs::read_to_string(&config_file)
                    .await
                    .map_err(ConfigError::from)?;
                println!("{content}");
            } else {
                println!("Configuration file does not exist.");
                println!("Run 'vaultkit init' to create one.");
            }
        }
        ConfigCommands::Validate => {
            let config = load(&config_file).await?;
            let issues = config.validate();
            for issue in &issues {
                println!("{issue}");
            }
            let errors = issues
                .iter()
                .filter(|i| i.level == IssueLevel::Error)
                .count();
            if errors > 0 {
                return Err(CliError::Invalid(errors));
            }
            println!("Configuration is valid");
        }
    }
    Ok(())
}

/// Stand-in client for listing tools; every call fails.
#[derive(Debug)]
struct Offline;

#[async_trait]
impl EvmClient for Offline {
    fn address(&self) -> Address {
        Address::ZERO
    }

    fn chain_id(&self) -> u64 {
        EvmChain::MantleSepolia.id()
    }

    async fn send_transaction(&self, _call: ContractCall) -> std::result::Result<String, WalletError> {
        Err(WalletError::config("no wallet connected"))
    }

    async fn read(&self, _call: ContractCall) -> std::result::Result<Bytes, WalletError> {
        Err(WalletError::config("no wallet connected"))
    }

    async fn transfer(&self, _to: Address, _value: U256) -> std::result::Result<String, WalletError> {
        Err(WalletError::config("no wallet connected"))
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_call_with_args() {
        let cli = Cli::parse_from([
            "vaultkit",
            "call",
            "deposit",
            "--args",
            r#"{"address":"SozuHausResidentVault","assets":1}"#,
            "--yes",
        ]);
        let Commands::Call(args) = cli.command else {
            unreachable!("parsed a different subcommand");
        };
        assert_eq!(args.tool, "deposit");
        assert!(args.yes);
    }

    #[test]
    fn tools_takes_no_arguments() {
        assert!(matches!(
            Cli::parse_from(["vaultkit", "tools"]).command,
            Commands::Tools
        ));
        assert!(Cli::try_parse_from(["vaultkit", "tools", "--chain-id", "1"]).is_err());
    }
}
