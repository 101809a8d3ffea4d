//! clientverse command line tool
//!
//! Parses, builds and round-trips queries with the query builder
//! controllers, and lists field options from a schema file.

use anyhow::Result;
use clap::{Parser, Subcommand};
use clientverse_cli::commands::{self, BuildArgs, SchemaFile};
use clientverse_cli::CliError;
use clientverse_sdk::BuilderConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Query builder command line tool
#[derive(Parser, Debug)]
#[command(name = "clientverse")]
#[command(version, about = "Parse and build record queries", long_about = None)]
struct Cli {
    /// Builder configuration file (default: config/clientverse.*)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the parts of a query as JSON
    Parse {
        query: String,

        /// Reject queries on any other object type
        #[arg(long, value_name = "OBJECT")]
        lock: Option<String>,
    },

    /// Build a query from its parts
    Build {
        #[arg(short, long = "object")]
        object_type: String,

        /// Selected field; `Relationship.Field` selects a child field
        #[arg(short, long = "field", required = true)]
        fields: Vec<String>,

        /// WHERE body joined from individual conditions
        #[arg(long = "where")]
        parent_where: Option<String>,

        /// WHERE body with custom logic; wins over --where
        #[arg(long)]
        full_where: Option<String>,

        /// Child condition as `Relationship.Field=value`
        #[arg(long)]
        child_where: Vec<String>,

        #[arg(long)]
        order_by: Option<String>,

        /// ASC or DESC
        #[arg(long)]
        direction: Option<String>,

        #[arg(long)]
        limit: Option<String>,
    },

    /// Parse a query and build it again
    Roundtrip { query: String },

    /// List field options of an object from a schema file
    Fields {
        /// JSON schema file
        #[arg(short, long)]
        schema: PathBuf,

        #[arg(short, long = "object")]
        object_type: String,

        /// Relationship to browse into, repeatable
        #[arg(long = "path")]
        path: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_tracing() {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();
    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    // Load .env file if exists
    dotenvy::dotenv().ok();

    let config = match &cli.config {
        Some(path) => BuilderConfig::from_file(path).map_err(CliError::from)?,
        None => BuilderConfig::load().map_err(CliError::from)?,
    };

    let output = match cli.command {
        Command::Parse { query, lock } => {
            let parsed = commands::parse(&query, lock.as_deref())?;
            serde_json::to_string_pretty(&parsed)?
        }
        Command::Build {
            object_type,
            fields,
            parent_where,
            full_where,
            child_where,
            order_by,
            direction,
            limit,
        } => {
            let args = BuildArgs {
                object_type,
                fields,
                parent_where,
                full_where,
                child_where,
                order_by,
                direction,
                limit,
            };
            commands::build(config, &args)?
        }
        Command::Roundtrip { query } => commands::roundtrip(config, &query)?,
        Command::Fields {
            schema,
            object_type,
            path,
        } => {
            let schema = SchemaFile::from_path(&schema)?.into_schema();
            let options = commands::fields(&schema, &object_type, &path).await?;
            info!("{} field option(s)", options.len());
            serde_json::to_string_pretty(&options)?
        }
    };

    Ok(output)
}

/// Initialize tracing subscriber
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clientverse_cli=info,clientverse_sdk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
