//! exgrade CLI — headless driver for the exercise grading engine.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "exgrade", version, about = "Interactive exercise grading engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate exercise TOML files
    Validate {
        /// Path to an exercise file or directory
        #[arg(long)]
        exercise: PathBuf,
    },

    /// Replay a JSON event script against an exercise
    Replay {
        /// Path to an exercise file
        #[arg(long)]
        exercise: PathBuf,

        /// Path to a JSON event script (array of events)
        #[arg(long)]
        events: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("exgrade_core=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { exercise } => commands::validate::execute(exercise),
        Commands::Replay {
            exercise,
            events,
            format,
        } => commands::replay::execute(exercise, events, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
