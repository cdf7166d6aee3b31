//! Sheen CLI - build-time asset pipeline for documentation sites.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "sheen")]
#[command(about = "Critical CSS, route and locale post-processing for documentation sites")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to sheen.toml config file
    #[arg(short, long, default_value = config::CONFIG_FILE)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default sheen.toml
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        yes: bool,
    },

    /// Publish critical CSS for exported pages and link it in
    Export {
        /// Exported site directory (defaults to config or "dist")
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Style caches file (defaults to config or "style-caches.json")
        #[arg(short, long)]
        styles: Option<PathBuf>,

        /// Prefix for stylesheet hrefs
        #[arg(long)]
        public_path: Option<String>,

        /// Minify published stylesheets
        #[arg(long)]
        minify: bool,
    },

    /// Add the configured extra routes to a route table
    Routes {
        /// Route table JSON to augment (an empty table when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Where to write the augmented table (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the preview props of a demo as JSON
    Preview {
        /// Demo source file
        #[arg(long, conflicts_with = "code")]
        demo: Option<PathBuf>,

        /// Document embedding the demo, e.g. index.en-US.md
        #[arg(long, requires = "demo")]
        doc: Option<PathBuf>,

        /// Inline demo code
        #[arg(long)]
        code: Option<String>,
    },

    /// Resolve paths to their canonical locale form
    Locale {
        /// Paths or URLs to resolve
        #[arg(required = true)]
        paths: Vec<String>,

        /// Resolve to the default locale instead of the suffixed one
        #[arg(long)]
        default: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    // Init writes the config, everything else reads it
    let load_config = || Config::load(&cli.config);

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes)?;
        }
        Commands::Export {
            dir,
            styles,
            public_path,
            minify,
        } => {
            let options = commands::export::ExportOptions {
                dir,
                styles,
                public_path,
                minify,
            };
            commands::export::run(&load_config()?, options)?;
        }
        Commands::Routes { input, output } => {
            commands::routes::run(&load_config()?, input, output)?;
        }
        Commands::Preview { demo, doc, code } => {
            commands::preview::run(demo, doc, code)?;
        }
        Commands::Locale { paths, default } => {
            commands::locale::run(&load_config()?, &paths, !default);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_post_processing_commands_only() {
        assert!(Cli::try_parse_from(["sheen", "export", "--minify"]).is_ok());
        assert!(Cli::try_parse_from(["sheen", "locale", "/components/button"]).is_ok());
        assert!(Cli::try_parse_from(["sheen", "serve"]).is_err());
    }
}
