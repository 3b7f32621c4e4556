//! Command-line interface definitions and dispatch

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use crate::api::DatasetteClient;
use crate::config;

/// Upload and manage tabular data in a Datasette instance.
#[derive(Debug, Parser)]
#[command(name = "datasette-cli", version, about)]
pub struct Cli {
    /// Base URL of the Datasette instance
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// API token, sent as a bearer Authorization header
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Authorization header template, e.g. "Bearer dstok_{token}"
    #[arg(long, global = true)]
    pub token_template: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List databases on the instance
    Databases,
    /// List tables in a database
    Tables { database: String },
    /// Show the column schema of a table
    Schema { database: String, table: String },
    /// Fetch every row of a table
    Rows {
        database: String,
        table: String,
        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
    /// Create a new table from a CSV or Excel file
    Create {
        database: String,
        table: String,
        file: PathBuf,
    },
    /// Insert rows from a CSV or Excel file into an existing table
    Insert {
        database: String,
        table: String,
        file: PathBuf,
    },
    /// Update rows from a file, matching on primary key columns
    Update {
        database: String,
        table: String,
        file: PathBuf,
        /// Primary key column (repeat for compound keys; order matters)
        #[arg(long = "pk", required = true)]
        pk_columns: Vec<String>,
    },
    /// Delete the rows listed in a file, matching on primary key columns
    Delete {
        database: String,
        table: String,
        file: PathBuf,
        /// Primary key column (repeat for compound keys; order matters)
        #[arg(long = "pk", required = true)]
        pk_columns: Vec<String>,
    },
    /// Drop a table and all of its data
    Drop {
        database: String,
        table: String,
        /// Confirm the drop; without this flag nothing is sent
        #[arg(long)]
        yes: bool,
    },
}

/// Output format for fetched rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    JsonCompact,
    Csv,
}

/// Build the client from layered configuration and dispatch the subcommand.
pub async fn run(cli: Cli) -> Result<()> {
    let settings = config::resolve(cli.url, cli.token, cli.token_template)?;
    let client = DatasetteClient::new(settings.connection())?;

    match cli.command {
        Commands::Databases => commands::databases(&client).await,
        Commands::Tables { database } => commands::tables(&client, &database).await,
        Commands::Schema { database, table } => commands::schema(&client, &database, &table).await,
        Commands::Rows {
            database,
            table,
            format,
        } => commands::rows(&client, &database, &table, format).await,
        Commands::Create {
            database,
            table,
            file,
        } => commands::create(&client, &database, &table, &file).await,
        Commands::Insert {
            database,
            table,
            file,
        } => commands::insert(&client, &database, &table, &file).await,
        Commands::Update {
            database,
            table,
            file,
            pk_columns,
        } => commands::update(&client, &database, &table, &file, &pk_columns).await,
        Commands::Delete {
            database,
            table,
            file,
            pk_columns,
        } => commands::delete(&client, &database, &table, &file, &pk_columns).await,
        Commands::Drop {
            database,
            table,
            yes,
        } => commands::drop(&client, &database, &table, yes).await,
    }
}
