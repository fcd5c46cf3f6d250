//! peonreg - registry and site-data generator for PeonPing sound packs

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use peonreg_core::config::GeneratorConfig;
use peonreg_core::franchise::FranchiseDb;
use peonreg_core::pipeline::{self, SourceMode};
use peonreg_core::registry::TrustTier;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Source selection for pack-data generation
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Local when the packs directory exists, remote otherwise
    Auto,
    Local,
    Remote,
}

impl From<Mode> for SourceMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Auto => SourceMode::Auto,
            Mode::Local => SourceMode::Local,
            Mode::Remote => SourceMode::Remote,
        }
    }
}

/// Trust tier assigned to generated entries
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Tier {
    Official,
    Community,
}

impl From<Tier> for TrustTier {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Official => TrustTier::Official,
            Tier::Community => TrustTier::Community,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "peonreg",
    about = "Registry and website-data generator for the PeonPing sound-pack catalog",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level
    #[clap(long, default_value = "info", global = true)]
    log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate per-pack registry entries and the aggregate index from a
    /// local pack source tree
    Registry {
        /// Pack source directory (one subdirectory per pack)
        #[clap(long)]
        packs_dir: Option<PathBuf>,

        /// Registry output directory
        #[clap(long)]
        output_dir: Option<PathBuf>,

        /// Provenance repository stamped into entries
        #[clap(long)]
        source_repo: Option<String>,

        /// Provenance ref stamped into entries
        #[clap(long)]
        source_ref: Option<String>,

        /// Trust tier assigned to every entry
        #[clap(long, value_enum)]
        trust_tier: Option<Tier>,
    },

    /// Generate the flattened pack-data JSON consumed by the website
    Packdata {
        /// Source selection
        #[clap(long, value_enum, default_value = "auto")]
        mode: Mode,

        /// Pack source directory (local mode)
        #[clap(long)]
        packs_dir: Option<PathBuf>,

        /// Output file path
        #[clap(long)]
        output: Option<PathBuf>,

        /// Raw-content host base for remote fetches
        #[clap(long)]
        raw_base: Option<String>,

        /// Published registry index URL (remote mode)
        #[clap(long)]
        index_url: Option<String>,
    },
}

fn initialize_tracing(log_level: &LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // logs to stderr, stdout stays clean
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level);

    match cli.command {
        Command::Registry {
            packs_dir,
            output_dir,
            source_repo,
            source_ref,
            trust_tier,
        } => {
            let mut config = GeneratorConfig::from_env();
            if let Some(dir) = packs_dir {
                config.packs_dir = dir;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(repo) = source_repo {
                config.source_repo = repo;
            }
            if let Some(git_ref) = source_ref {
                config.source_ref = git_ref;
            }
            if let Some(tier) = trust_tier {
                config.trust_tier = tier.into();
            }

            let summary = pipeline::generate_registry(&config, &FranchiseDb::default())?;
            println!(
                "Done: {} registry entries, index.json generated",
                summary.processed
            );
        }

        Command::Packdata {
            mode,
            packs_dir,
            output,
            raw_base,
            index_url,
        } => {
            let mut config = GeneratorConfig::from_env();
            if let Some(dir) = packs_dir {
                config.packs_dir = dir;
            }
            if let Some(path) = output {
                config.packdata_path = path;
            }
            if let Some(base) = raw_base {
                config.raw_base = base;
            }
            if let Some(url) = index_url {
                config.index_url = url;
            }

            let summary =
                pipeline::generate_packdata(&config, &FranchiseDb::default(), mode.into()).await?;
            println!("Done: {} packs", summary.processed);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_command_parses_overrides() {
        let cli = Cli::parse_from([
            "peonreg",
            "registry",
            "--packs-dir",
            "my-packs",
            "--trust-tier",
            "community",
        ]);

        match cli.command {
            Command::Registry {
                packs_dir,
                trust_tier,
                ..
            } => {
                assert_eq!(packs_dir, Some(PathBuf::from("my-packs")));
                assert!(matches!(trust_tier, Some(Tier::Community)));
            }
            _ => panic!("wrong command parsed"),
        }
    }

    #[test]
    fn packdata_command_defaults_to_auto_mode() {
        let cli = Cli::parse_from(["peonreg", "packdata"]);

        match cli.command {
            Command::Packdata { mode, output, .. } => {
                assert!(matches!(mode, Mode::Auto));
                assert_eq!(output, None);
            }
            _ => panic!("wrong command parsed"),
        }
    }

    #[test]
    fn packdata_command_accepts_remote_mode() {
        let cli = Cli::parse_from([
            "peonreg",
            "packdata",
            "--mode",
            "remote",
            "--index-url",
            "https://example.com/index.json",
        ]);

        match cli.command {
            Command::Packdata { mode, index_url, .. } => {
                assert!(matches!(mode, Mode::Remote));
                assert_eq!(
                    index_url.as_deref(),
                    Some("https://example.com/index.json")
                );
            }
            _ => panic!("wrong command parsed"),
        }
    }
}
