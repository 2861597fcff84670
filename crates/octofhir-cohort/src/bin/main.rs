//! Cohort query command-line interface

use clap::{Parser, Subcommand};
use octofhir_cohort::cli::{build, check, join, output, unbuild};
use std::path::PathBuf;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Cohort query command-line tool
#[derive(Parser)]
#[command(name = "cohort")]
#[command(author, version, about = "Build, unbuild and join cohort query documents", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    /// Catalog of populations, units and vocabularies (JSON)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serialize an editable request into a query document
    Build {
        /// Request file (JSON)
        file: PathBuf,

        /// Schema version written in the document
        #[arg(long = "schema-version")]
        schema_version: Option<String>,

        /// Pretty-print output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Decode a query document into an editable request
    Unbuild {
        /// Query document (JSON)
        file: PathBuf,

        /// Pretty-print output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Join the tree of a sub-query into a group of a base query
    Join {
        /// Base query document
        base: PathBuf,

        /// Sub-query document
        sub: PathBuf,

        /// Group of the base query receiving the sub-query
        #[arg(long = "parent", default_value_t = 0, allow_negative_numbers = true)]
        parent_id: i64,

        /// Fixed id offset instead of one computed from the base query
        #[arg(long)]
        offset: Option<i64>,

        /// Pretty-print output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Unbuild query documents and report what could not be decoded
    Check {
        /// Query documents to check
        files: Vec<PathBuf>,

        /// Strict mode (warnings as errors)
        #[arg(short, long)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);

    let default_level = if cli.verbose { "octofhir_cohort=debug" } else { "octofhir_cohort=warn" };
    match default_level.parse::<Directive>() {
        Ok(directive) => tracing_subscriber::registry()
            .with(EnvFilter::from_default_env().add_directive(directive))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        Err(e) => eprintln!("{}", output::format_warning(&format!("logging disabled: {}", e))),
    }

    let result = match cli.command {
        Commands::Build {
            file,
            schema_version,
            pretty,
        } => {
            let config = build::BuildConfig {
                file,
                version: schema_version,
                pretty,
                output_file: cli.output.clone(),
            };
            build::build(config).await
        }

        Commands::Unbuild { file, pretty } => {
            let config = unbuild::UnbuildConfig {
                file,
                catalog: cli.catalog.clone(),
                pretty,
                verbose: cli.verbose,
                output_file: cli.output.clone(),
            };
            unbuild::unbuild(config).await
        }

        Commands::Join {
            base,
            sub,
            parent_id,
            offset,
            pretty,
        } => {
            let config = join::JoinConfig {
                base,
                sub,
                parent_id,
                offset,
                catalog: cli.catalog.clone(),
                pretty,
                verbose: cli.verbose,
                output_file: cli.output.clone(),
            };
            join::join(config).await
        }

        Commands::Check { files, strict } => {
            let config = check::CheckConfig {
                files,
                catalog: cli.catalog.clone(),
                strict,
                verbose: cli.verbose,
            };
            check::check(config).await
        }
    };

    if let Err(e) = result {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
