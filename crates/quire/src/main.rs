//! Quire CLI - render markdown blog posts to HTML.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;
mod templates;

use commands::render::OutputFormat;

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Render markdown blog posts to HTML")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to quire.toml config file
    #[arg(short, long, default_value = "quire.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render markdown files
    Render {
        /// Markdown files to render
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Output directory (stdout for a single file when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print the table of contents of a markdown file
    Toc {
        /// Markdown file
        file: PathBuf,
    },

    /// Print the code highlighting stylesheet
    Css {
        /// Theme name (defaults to config)
        #[arg(short, long)]
        theme: Option<String>,

        /// List bundled themes instead
        #[arg(long)]
        list: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so rendered output can be piped
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Render { files, format, out } => {
            commands::render::run(&config, &files, format, out)?;
        }
        Commands::Toc { file } => {
            commands::toc::run(&config, &file)?;
        }
        Commands::Css { theme, list } => {
            commands::css::run(&config, theme, list)?;
        }
    }

    Ok(())
}
