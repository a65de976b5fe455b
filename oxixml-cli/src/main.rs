//! OxiXml CLI - The Oxidized XML Packer
//!
//! Structure-aware XML compression: names, values and tree shape are split
//! into separate streams and each one is LZ + range coded.

mod commands;
mod utils;

use clap::{Parser, Subcommand};
use commands::{cmd_compress, cmd_decompress, cmd_dump, cmd_info};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oxixml")]
#[command(
    author,
    version,
    about = "The Oxidized XML Packer - structure-aware XML compressor"
)]
#[command(long_about = "
OxiXml compresses XML by splitting it into name dictionaries, value streams
and a structural token stream, each compressed with LZ77 + range coding.
Decompression produces canonical, tab-indented markup.

Examples:
  oxixml compress feed.xml
  oxixml compress feed.xml -o feed.oxx -l 9
  oxixml decompress feed.xml.oxx
  oxixml decompress feed.oxx -o -
  oxixml dump feed.xml.oxx
  oxixml dump --xml feed.xml
  oxixml info feed.xml.oxx --json
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show diagnostic logs on stderr (RUST_LOG is honoured)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all logs, including warnings
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress an XML document
    #[command(alias = "c")]
    Compress {
        /// XML file to compress (`-` for stdin)
        input: PathBuf,

        /// Output file (default: <input>.oxx, `-` for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compression level (0 = literals only, 9 = exhaustive match search)
        #[arg(short, long, default_value_t = 6, value_parser = clap::value_parser!(u8).range(0..=9))]
        level: u8,

        /// Show progress bar
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Decompress to canonical XML
    #[command(alias = "d")]
    Decompress {
        /// Compressed file (`-` for stdin)
        input: PathBuf,

        /// Output file (default: <input> without .oxx, `-` for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the structural token stream in readable form
    Dump {
        /// Compressed file, or XML file with --xml (`-` for stdin)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Read an XML document instead of a compressed file
        #[arg(long)]
        xml: bool,
    },

    /// Show header and section sizes of a compressed file
    #[command(alias = "i")]
    Info {
        /// Compressed file to inspect
        input: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },
}

fn init_tracing(cli: &Cli) {
    // --quiet: nothing; --verbose: RUST_LOG or info; default: warnings only
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.verbose)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let result = match cli.command {
        Commands::Compress {
            input,
            output,
            level,
            progress,
        } => cmd_compress(&input, output.as_deref(), level, progress),
        Commands::Decompress { input, output } => cmd_decompress(&input, output.as_deref()),
        Commands::Dump { input, output, xml } => cmd_dump(&input, output.as_deref(), xml),
        Commands::Info { input, json } => cmd_info(&input, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compress() {
        let cli = Cli::try_parse_from(["oxixml", "-q", "compress", "a.xml", "-l", "9"]).unwrap();
        assert!(cli.quiet);
        match cli.command {
            Commands::Compress { input, level, output, .. } => {
                assert_eq!(input, PathBuf::from("a.xml"));
                assert_eq!(level, 9);
                assert!(output.is_none());
            }
            _ => panic!("expected compress"),
        }
    }

    #[test]
    fn test_level_out_of_range() {
        assert!(Cli::try_parse_from(["oxixml", "compress", "a.xml", "-l", "10"]).is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["oxixml", "-v", "-q", "info", "a.oxx"]).is_err());
    }
}
