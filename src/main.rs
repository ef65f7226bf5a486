mod commands;
mod content;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "calfeed")]
#[command(about = "Build event listings and an iCalendar feed from site content")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect events from content and write the feed and template views
    Build {
        /// Site configuration file
        #[arg(short, long, default_value = "calfeed.toml")]
        config: PathBuf,

        /// Directory of markdown sources
        #[arg(long, default_value = "content")]
        content: PathBuf,

        /// Override the configured output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show whether metadata fields may become calendar properties
    Check {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Show the next occurrence of a recurring rule (e.g. "every monday at 6pm")
    Next {
        rule: String,

        /// Event length, e.g. "2h 30m"
        #[arg(short, long)]
        duration: Option<String>,

        /// IANA time zone (defaults to the system zone)
        #[arg(short, long)]
        timezone: Option<String>,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            config,
            content,
            output,
        } => commands::build::run(&config, &content, output),
        Commands::Check { names } => commands::check::run(&names),
        Commands::Next {
            rule,
            duration,
            timezone,
        } => commands::next::run(&rule, duration.as_deref(), timezone.as_deref()),
    }
}
