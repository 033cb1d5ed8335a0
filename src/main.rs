mod config;
mod fs;
mod link;
mod sonarr;
mod subcommands;
mod util;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

use config::{ConfigError, LinkConfig};
use subcommands::{SonarrArgs, Workflow};

/// Exit status for usage errors and missing configuration.
const EXIT_USAGE: u8 = 2;

const USAGE: &str = "starrlink: usage: starrlink sonarr [flags]";

/// Hard-links the episode files of a series into `Title.Sxx` season directories.
#[derive(Parser)]
#[command(name = "starrlink", version)]
struct Cli {
    #[command(flatten)]
    globals: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct GlobalArgs {
    /// Map from this path prefix as stored by the library service, e.g. when the data is
    /// mounted in a different location.
    #[arg(long, global = true, value_name = "PATH")]
    map_from: Option<String>,

    /// Replace the -map-from prefix with this path.
    #[arg(long, global = true, value_name = "PATH")]
    map_to: Option<String>,

    /// The destination to write the links to [default: current directory].
    #[arg(long, global = true, value_name = "PATH")]
    dest: Option<PathBuf>,

    /// Log requests and planned links to stderr.
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Link the episode files of a Sonarr series.
    Sonarr(SonarrArgs),
}

impl Command {
    fn exec(self, link_config: &LinkConfig) -> anyhow::Result<()> {
        match self {
            Self::Sonarr(args) => args.exec(link_config),
        }
    }
}

fn long_flags(command: &clap::Command, flags: &mut HashSet<String>) {
    flags.extend(
        command
            .get_arguments()
            .filter_map(|arg| arg.get_long())
            .map(str::to_owned),
    );
    for subcommand in command.get_subcommands() {
        long_flags(subcommand, flags);
    }
}

/// Rewrites single-dash long flags (`-dest out`, `-dest=out`) to `--dest` so both spellings are
/// accepted. Only names of known long flags are rewritten, and nothing after `--`.
fn normalize_flags(
    args: impl IntoIterator<Item = OsString>,
    command: &clap::Command,
) -> Vec<OsString> {
    let mut flags = HashSet::new();
    long_flags(command, &mut flags);

    let mut normalized = vec![];
    let mut args = args.into_iter();
    // The program name.
    normalized.extend(args.next());
    for arg in args.by_ref() {
        if arg == "--" {
            normalized.push(arg);
            break;
        }
        let rewritten = arg
            .to_str()
            .and_then(|arg| arg.strip_prefix('-'))
            .filter(|name| !name.starts_with('-'))
            .filter(|name| flags.contains(name.split_once('=').map_or(*name, |(name, _)| name)))
            .map(|name| OsString::from(format!("--{name}")));
        normalized.push(rewritten.unwrap_or(arg));
    }
    normalized.extend(args);
    normalized
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() -> ExitCode {
    let mut command = Cli::command();
    command.build();

    let cli = match Cli::try_parse_from(normalize_flags(std::env::args_os(), &command)) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::MissingSubcommand
            | ErrorKind::InvalidSubcommand
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                println!("{USAGE}");
                return ExitCode::from(EXIT_USAGE);
            }
            _ => err.exit(),
        },
    };

    init_tracing(cli.globals.verbose);

    let result = LinkConfig::resolve(cli.globals.map_from, cli.globals.map_to, cli.globals.dest)
        .context("starrlink: unable to get working directory")
        .and_then(|link_config| cli.command.exec(&link_config));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ConfigError>() {
            Some(err) => {
                println!("starrlink: {err}");
                ExitCode::from(EXIT_USAGE)
            }
            None => {
                println!("{err:#}");
                ExitCode::FAILURE
            }
        },
    }
}
