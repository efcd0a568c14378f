//! mlcatalog CLI - build and query the ML & autonomy technology catalog

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use mlcatalog::secrets::SecretProfile;
use mlcatalog::ReferenceCheck;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "mlcatalog")]
#[command(version)]
#[command(about = "Catalog of organizations and the ML / autonomy technologies they ship")]
#[command(long_about = r#"
mlcatalog keeps a small SQLite catalog of organizations, their machine-learning
and autonomy technologies, and related equipment, flight control systems and
sensors.

Example usage:
  mlcatalog setup
  mlcatalog technologies --company DATAGOD
  mlcatalog search anomaly --format json
  mlcatalog report
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the database file (overrides mlcatalog.toml)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format (json prints one document to stdout)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Write mlcatalog.toml and create the database with its schema
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,

        /// Settings file for generated secrets
        #[arg(long)]
        env_file: Option<PathBuf>,
    },

    /// Create any missing catalog tables
    Schema,

    /// Load seed data (all built-in sets when neither --set nor --file is given)
    Seed {
        /// Built-in seed set name (core, autonomy, expansion)
        #[arg(short, long, conflicts_with = "file")]
        set: Option<String>,

        /// Seed file in TOML format
        #[arg(long)]
        file: Option<PathBuf>,

        /// Check technologies against known organizations (off, warn, deny)
        #[arg(long, default_value = "off")]
        check_references: ReferenceCheck,
    },

    /// Create the schema, load every built-in set and provision secrets
    Setup {
        /// Settings file for generated secrets (overrides mlcatalog.toml)
        #[arg(long)]
        env_file: Option<PathBuf>,

        /// Skip secret provisioning
        #[arg(long)]
        no_secrets: bool,
    },

    /// Generate secrets and write them to the settings file
    Secrets {
        /// Profile to generate (base, autonomy, expansion)
        #[arg(short, long, default_value = "base")]
        profile: SecretProfile,

        /// Settings file (overrides mlcatalog.toml)
        #[arg(long)]
        env_file: Option<PathBuf>,
    },

    /// List organizations
    Organizations,

    /// List technologies, optionally for one organization
    Technologies {
        /// Exact organization name
        #[arg(short, long)]
        company: Option<String>,
    },

    /// List technology categories
    Categories,

    /// Technologies per organization and type distribution
    Stats,

    /// Search technologies by keyword
    Search {
        /// Substring matched against name, description and application area
        keyword: String,
    },

    /// List equipment
    Equipment {
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List flight control systems
    FlightControl {
        /// Only open-source systems
        #[arg(long)]
        open_source: bool,
    },

    /// List sensors
    Sensors {
        #[arg(short = 't', long = "type")]
        sensor_type: Option<String>,
    },

    /// Technologies whose organization is not in the catalog
    Dangling,

    /// Row counts for every table
    Summary,

    /// Full catalog report
    Report {
        /// Organization whose technologies are shown in detail
        #[arg(long, default_value = "DATAGOD")]
        company: String,

        /// Keyword for the search section
        #[arg(long, default_value = "anomaly")]
        keyword: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = mlcatalog::config::load_config(cli.config.as_deref())?.unwrap_or_default();
    let ctx = commands::Context {
        database: config.database_path(cli.database.as_deref()),
        config,
        format: cli.format,
    };

    let result = match cli.command {
        Commands::Init { force, env_file } => {
            commands::run_init(&ctx, cli.config.as_deref(), env_file, force)
        }
        Commands::Schema => commands::run_schema(&ctx),
        Commands::Seed { set, file, check_references } => {
            commands::run_seed(&ctx, set.as_deref(), file.as_deref(), check_references)
        }
        Commands::Setup { env_file, no_secrets } => {
            let env_file = (!no_secrets).then(|| ctx.config.env_file_path(env_file.as_deref()));
            commands::run_setup(&ctx, env_file.as_deref())
        }
        Commands::Secrets { profile, env_file } => {
            commands::run_secrets(&ctx, profile, &ctx.config.env_file_path(env_file.as_deref()))
        }
        Commands::Organizations => commands::run_organizations(&ctx),
        Commands::Technologies { company } => commands::run_technologies(&ctx, company.as_deref()),
        Commands::Categories => commands::run_categories(&ctx),
        Commands::Stats => commands::run_stats(&ctx),
        Commands::Search { keyword } => commands::run_search(&ctx, &keyword),
        Commands::Equipment { category } => commands::run_equipment(&ctx, category.as_deref()),
        Commands::FlightControl { open_source } => commands::run_flight_control(&ctx, open_source),
        Commands::Sensors { sensor_type } => commands::run_sensors(&ctx, sensor_type.as_deref()),
        Commands::Dangling => commands::run_dangling(&ctx),
        Commands::Summary => commands::run_summary(&ctx),
        Commands::Report { company, keyword } => commands::run_report(&ctx, &company, &keyword),
    };

    if let Err(err) = result {
        mlcatalog::ui::error(&format!("{:#}", err));
        std::process::exit(1);
    }
    Ok(())
}
