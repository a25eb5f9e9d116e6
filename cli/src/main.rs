use anyhow::Result;
use catalog_cli::{Command, ListCommand, QueryCommand, UpdateQtyCommand};
use catalog_sdk::{RuntimeArgs, init_logging};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Query and update a product catalog stored as JSON")]
struct Cli {
    #[command(flatten)]
    runtime: RuntimeArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every product ordered by name
    List {
        /// JSON file holding the products
        #[arg(long)]
        data: PathBuf,
    },
    /// Fetch one page with a lazy-loading descriptor
    Query {
        /// JSON file holding the products
        #[arg(long)]
        data: PathBuf,
        /// Descriptor as JSON, or @file
        #[arg(long)]
        descriptor: Option<String>,
    },
    /// Queue a quantity update and apply it
    UpdateQty {
        /// JSON file holding the products
        #[arg(long)]
        data: PathBuf,
        /// Product ID
        #[arg(long)]
        id: Uuid,
        #[arg(long, allow_negative_numbers = true)]
        quantity: i32,
        /// Write the result back to the data file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.runtime.debug);
    let config = cli.runtime.load_config()?;

    let command: Box<dyn Command> = match cli.command {
        Commands::List { data } => Box::new(ListCommand { data, config }),
        Commands::Query { data, descriptor } => Box::new(QueryCommand {
            data,
            descriptor,
            config,
        }),
        Commands::UpdateQty {
            data,
            id,
            quantity,
            save,
        } => Box::new(UpdateQtyCommand {
            data,
            id,
            quantity,
            save,
            config,
        }),
    };

    command.execute().await
}
