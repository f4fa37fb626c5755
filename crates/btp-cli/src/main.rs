use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "btp")]
#[command(about = "BTP student/faculty allocation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Allocate students to faculty and write the result tables + manifest
    Allocate {
        /// Student preference sheet (CSV: id, 1st choice, 2nd choice, ...)
        #[arg(long)]
        students: String,

        /// Faculty preference sheet (CSV: id, 1st choice, 2nd choice, ...)
        #[arg(long)]
        faculty: String,

        /// Layered config paths in merge order (optional; defaults apply)
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Output directory (created if missing)
        #[arg(long, default_value = "exports")]
        out: String,

        /// Override /allocation/max_capacity
        #[arg(long)]
        capacity: Option<usize>,

        /// Override /allocation/max_rounds
        #[arg(long)]
        rounds: Option<usize>,

        /// Fail when the config carries keys nothing reads
        #[arg(long, default_value_t = false)]
        strict_config: bool,
    },

    /// Parse both sheets and print ingest + cross-reference diagnostics
    Inspect {
        #[arg(long)]
        students: String,

        #[arg(long)]
        faculty: String,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> overrides)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Allocate {
            students,
            faculty,
            config_paths,
            out,
            capacity,
            rounds,
            strict_config,
        } => commands::allocate::run_allocate(commands::allocate::AllocateArgs {
            students,
            faculty,
            config_paths,
            out,
            capacity,
            rounds,
            strict_config,
        })?,

        Commands::Inspect { students, faculty } => {
            commands::inspect::run_inspect(&students, &faculty)?
        }

        Commands::ConfigHash { paths } => {
            let loaded = commands::load_config(&paths)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }
    }

    Ok(())
}

/// stdout carries `key=value` results; logs go to stderr.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
