//! mppctl - MPP motor drive command-line tool
//!
//! Reads parameters, the statusword and the actual position from a drive on a
//! serial port, and encodes or decodes frames offline.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod completion;
mod error;
mod output;

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mpp_protocol::ObjectAddress;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::LinkArgs;

#[derive(Parser)]
#[command(name = "mppctl")]
#[command(about = "MPP motor drive CLI - read parameters and status over a serial port")]
#[command(version)]
#[command(long_about = "
mppctl talks to a single MPP drive over RS-232/USB serial. Each command sends
one request frame and validates the reply (delimiters, length, node, CRC-8).

Object addresses are hex index[.subindex], e.g. 6064.0 or 0x6041.
Use --json for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    link: LinkArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List serial ports on this machine
    Ports,

    /// Show the effective link configuration
    Config,

    /// Soft-reset the drive and print its boot message
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Read an object from the drive
    Read {
        /// Object address, e.g. 6064.0
        object: ObjectAddress,
        /// Interpret the value as unsigned
        #[arg(short, long)]
        unsigned: bool,
    },

    /// Read and interpret the statusword (6041.0)
    Status,

    /// Read the position actual value (6064.0)
    Position {
        /// Keep polling
        #[arg(short, long)]
        watch: bool,
        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 500, requires = "watch")]
        interval_ms: u64,
        /// Stop after this many reads
        #[arg(short = 'n', long, requires = "watch")]
        count: Option<u64>,
    },

    /// Print the request frame for an object (or a reset) without sending it
    Encode {
        /// Object address, e.g. 6064.0
        #[arg(required_unless_present = "reset")]
        object: Option<ObjectAddress>,
        /// Encode a soft-reset request instead
        #[arg(long, conflicts_with = "object")]
        reset: bool,
    },

    /// Validate and take apart a captured frame
    Decode {
        /// Frame bytes in hex, e.g. 53 07 01 01 64 60 00 56 45
        #[arg(required = true, num_args = 1..)]
        bytes: Vec<String>,
        /// Interpret a read value as unsigned
        #[arg(short, long)]
        unsigned: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("mppctl={log_level},mpp_link={log_level},mpp_protocol={log_level}")
                    .into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli) {
        Ok(()) => Ok(()),
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }
            std::process::exit(error::exit_code(&e));
        }
    }
}

fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Ports => commands::ports::list(cli.json),
        Commands::Config => {
            commands::ports::show_config(&cli.link.resolve()?, cli.json);
            Ok(())
        }
        Commands::Reset { yes } => {
            let mut drive = commands::drive::connect(&cli.link.resolve()?)?;
            commands::drive::reset(&mut drive, *yes, cli.json)
        }
        Commands::Read { object, unsigned } => {
            let mut drive = commands::drive::connect(&cli.link.resolve()?)?;
            commands::drive::read(&mut drive, *object, *unsigned, cli.json)
        }
        Commands::Status => {
            let mut drive = commands::drive::connect(&cli.link.resolve()?)?;
            commands::drive::status(&mut drive, cli.json)
        }
        Commands::Position {
            watch,
            interval_ms,
            count,
        } => {
            let mut drive = commands::drive::connect(&cli.link.resolve()?)?;
            if *watch {
                commands::drive::watch_position(
                    &mut drive,
                    Duration::from_millis(*interval_ms),
                    *count,
                    cli.json,
                )
            } else {
                commands::drive::position(&mut drive, cli.json)
            }
        }
        Commands::Encode { object, .. } => {
            commands::frame::encode(&cli.link.resolve()?, *object, cli.json)
        }
        Commands::Decode { bytes, unsigned } => {
            commands::frame::decode(&cli.link.resolve()?, bytes, *unsigned, cli.json)
        }
        Commands::Completion { shell } => {
            completion::generate_completion(*shell);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    // --- Global flag parsing ---

    #[test]
    fn parse_status_defaults() -> TestResult {
        let cli = Cli::try_parse_from(["mppctl", "status"])?;
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
        assert!(matches!(cli.command, Commands::Status));
        Ok(())
    }

    #[test]
    fn parse_global_flags_after_subcommand() -> TestResult {
        let cli = Cli::try_parse_from([
            "mppctl", "status", "--json", "-p", "COM3", "--baud", "57600", "--node", "2",
        ])?;
        assert!(cli.json);
        assert_eq!(cli.link.port.as_deref(), Some("COM3"));
        assert_eq!(cli.link.baud, Some(57_600));
        assert_eq!(cli.link.node, Some(2));
        Ok(())
    }

    #[test]
    fn parse_verbose_levels() -> TestResult {
        for (args, level) in [
            (vec!["mppctl", "ports"], 0),
            (vec!["mppctl", "-v", "ports"], 1),
            (vec!["mppctl", "-vvv", "ports"], 3),
        ] {
            assert_eq!(Cli::try_parse_from(args)?.verbose, level);
        }
        Ok(())
    }

    // --- Drive commands ---

    #[test]
    fn parse_read_object() -> TestResult {
        let cli = Cli::try_parse_from(["mppctl", "read", "6064.0", "--unsigned"])?;
        match cli.command {
            Commands::Read { object, unsigned } => {
                assert_eq!(object, ObjectAddress::new(0x6064, 0));
                assert!(unsigned);
            }
            _ => return Err("expected Read command".into()),
        }
        Ok(())
    }

    #[test]
    fn parse_read_rejects_bad_object() {
        assert!(Cli::try_parse_from(["mppctl", "read", "xyz"]).is_err());
    }

    #[test]
    fn parse_position_watch() -> TestResult {
        let cli = Cli::try_parse_from([
            "mppctl",
            "position",
            "--watch",
            "--interval-ms",
            "100",
            "-n",
            "5",
        ])?;
        match cli.command {
            Commands::Position {
                watch,
                interval_ms,
                count,
            } => {
                assert!(watch);
                assert_eq!(interval_ms, 100);
                assert_eq!(count, Some(5));
            }
            _ => return Err("expected Position command".into()),
        }
        Ok(())
    }

    #[test]
    fn parse_position_count_requires_watch() {
        assert!(Cli::try_parse_from(["mppctl", "position", "-n", "5"]).is_err());
    }

    #[test]
    fn parse_reset_yes() -> TestResult {
        let cli = Cli::try_parse_from(["mppctl", "reset", "-y"])?;
        assert!(matches!(cli.command, Commands::Reset { yes: true }));
        Ok(())
    }

    // --- Offline commands ---

    #[test]
    fn parse_encode_variants() -> TestResult {
        let cli = Cli::try_parse_from(["mppctl", "encode", "0x6041"])?;
        assert!(matches!(
            cli.command,
            Commands::Encode {
                object: Some(_),
                reset: false
            }
        ));

        let cli = Cli::try_parse_from(["mppctl", "encode", "--reset"])?;
        assert!(matches!(
            cli.command,
            Commands::Encode {
                object: None,
                reset: true
            }
        ));

        assert!(Cli::try_parse_from(["mppctl", "encode"]).is_err());
        assert!(Cli::try_parse_from(["mppctl", "encode", "6064", "--reset"]).is_err());
        Ok(())
    }

    #[test]
    fn parse_decode_bytes() -> TestResult {
        let cli = Cli::try_parse_from(["mppctl", "decode", "53", "04", "01", "00", "50", "45"])?;
        match cli.command {
            Commands::Decode { bytes, unsigned } => {
                assert_eq!(bytes.len(), 6);
                assert!(!unsigned);
            }
            _ => return Err("expected Decode command".into()),
        }
        assert!(Cli::try_parse_from(["mppctl", "decode"]).is_err());
        Ok(())
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
