//! Gullak CLI
//!
//! Command-line interface for Gullak - personal finance from the
//! terminal. Without --email, commands run as a guest and show the demo
//! view; with --email, they act as that local user.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use gullak_core::{Config, DocumentStore, LocalStore, Session};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "gullak")]
#[command(about = "Gullak - personal finance from the terminal")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Act as this user (guest demo view when omitted)
    #[arg(long, global = true)]
    email: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show balance, monthly spend, and recent transactions
    Dashboard,
    /// Manage savings goals
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },
    /// Manage bills
    Bill {
        #[command(subcommand)]
        command: BillCommands,
    },
    /// Manage investments
    Invest {
        #[command(subcommand)]
        command: InvestCommands,
    },
    /// Ask the financial advisor
    Chat {
        /// The question to ask
        message: String,
    },
    /// Community channels
    Community {
        #[command(subcommand)]
        command: CommunityCommands,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum GoalCommands {
    /// List goals
    #[command(alias = "ls")]
    List,
    /// Create a goal
    #[command(alias = "add")]
    Create {
        /// Goal name
        name: String,
        /// Target amount in rupees
        target: i64,
        /// Deadline, e.g. 2026-12-31
        deadline: String,
    },
    /// Add savings toward a goal
    Save {
        /// Goal ID (full or prefix)
        id: String,
        /// Amount to add
        amount: i64,
    },
}

#[derive(Subcommand)]
enum BillCommands {
    /// List bills
    #[command(alias = "ls")]
    List,
    /// Create a bill
    #[command(alias = "add")]
    Create {
        /// Bill name
        name: String,
        /// Amount in rupees
        amount: i64,
        /// Due date, e.g. 2026-09-01
        due: String,
    },
    /// Mark a bill paid
    Pay {
        /// Bill ID (full or prefix)
        id: String,
    },
}

#[derive(Subcommand)]
enum InvestCommands {
    /// List holdings with totals
    #[command(alias = "ls")]
    List,
    /// Add a holding
    #[command(alias = "add")]
    Create {
        /// Holding name
        name: String,
        /// Invested amount in rupees
        invested: i64,
        /// Instrument type
        #[arg(short, long, default_value = "Mutual Fund")]
        kind: String,
        /// Current value (defaults to invested)
        #[arg(short, long)]
        current: Option<i64>,
        /// Risk tier: low, medium, high
        #[arg(short, long, default_value = "low")]
        risk: String,
    },
    /// Add to a holding
    Save {
        /// Investment ID (full or prefix)
        id: String,
        /// Amount to add
        amount: i64,
    },
    /// Sell part of a holding
    Sell {
        /// Investment ID (full or prefix)
        id: String,
        /// Amount to sell
        amount: i64,
    },
    /// Delete a holding
    #[command(alias = "rm")]
    Delete {
        /// Investment ID (full or prefix)
        id: String,
    },
    /// Fill an empty portfolio with demo holdings
    Demo,
    /// Ask the advisor about your portfolio
    Ask {
        /// The question to ask
        question: String,
    },
}

#[derive(Subcommand)]
enum CommunityCommands {
    /// List channels
    Channels,
    /// Create a channel
    Create {
        /// Channel name
        name: String,
    },
    /// Show a channel's messages
    Messages {
        /// Channel name or ID prefix
        channel: String,
    },
    /// Post a message to a channel
    Post {
        /// Channel name or ID prefix
        channel: String,
        /// Message text
        text: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, advisor_url, advisor_timeout_secs, notifications_enabled)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return commands::config::handle(command.clone(), &output);
    }

    let config = Config::load()?;

    // The CLI is single-user: the email names the local account, so data
    // stays attached to it across runs.
    let session = match &cli.email {
        Some(email) => Session::authenticated(email.clone(), email.clone(), None),
        None => Session::Guest,
    };

    match cli.command {
        Commands::Dashboard => {
            let store = open_store(&config)?;
            commands::dashboard::show(store, session, &output)
        }
        Commands::Goal { command } => {
            let store = open_store(&config)?;
            let mut page = commands::goals::open(store, session, &config, &output)?;
            match command {
                GoalCommands::List => commands::goals::list(&mut page, &output),
                GoalCommands::Create {
                    name,
                    target,
                    deadline,
                } => commands::goals::create(&mut page, &name, target, &deadline, &output),
                GoalCommands::Save { id, amount } => {
                    commands::goals::save(&mut page, &id, amount, &output)
                }
            }
        }
        Commands::Bill { command } => {
            let store = open_store(&config)?;
            let mut page = commands::goals::open(store, session, &config, &output)?;
            match command {
                BillCommands::List => commands::goals::bill_list(&mut page, &output),
                BillCommands::Create { name, amount, due } => {
                    commands::goals::bill_create(&mut page, &name, amount, &due, &output)
                }
                BillCommands::Pay { id } => commands::goals::bill_pay(&mut page, &id, &output),
            }
        }
        Commands::Invest { command } => {
            let store = open_store(&config)?;
            let mut page = commands::invest::open(store, session)?;
            match command {
                InvestCommands::List => commands::invest::list(&mut page, &output),
                InvestCommands::Create {
                    name,
                    invested,
                    kind,
                    current,
                    risk,
                } => commands::invest::create(
                    &mut page,
                    &name,
                    &kind,
                    invested,
                    current.unwrap_or(invested),
                    &risk,
                    &output,
                ),
                InvestCommands::Save { id, amount } => {
                    commands::invest::save(&mut page, &id, amount, &output)
                }
                InvestCommands::Sell { id, amount } => {
                    commands::invest::sell(&mut page, &id, amount, &output)
                }
                InvestCommands::Delete { id } => commands::invest::delete(&mut page, &id, &output),
                InvestCommands::Demo => commands::invest::demo(&mut page, &output),
                InvestCommands::Ask { question } => {
                    commands::invest::ask(&mut page, &config, &question, &output).await
                }
            }
        }
        Commands::Chat { message } => commands::chat::ask(&config, session, &message, &output).await,
        Commands::Community { command } => {
            let store = open_store(&config)?;
            let mut page = commands::community::open(store, session)?;
            match command {
                CommunityCommands::Channels => commands::community::channels(&mut page, &output),
                CommunityCommands::Create { name } => {
                    commands::community::create(&mut page, &name, &output)
                }
                CommunityCommands::Messages { channel } => {
                    commands::community::messages(&mut page, &channel, &output)
                }
                CommunityCommands::Post { channel, text } => {
                    commands::community::post(&mut page, &channel, &text, &output)
                }
            }
        }
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn open_store(config: &Config) -> Result<Arc<dyn DocumentStore>> {
    let store = LocalStore::open(&config.store_path())?;
    Ok(Arc::new(store))
}
