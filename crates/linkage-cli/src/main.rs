use clap::Parser;

mod cli;
mod cmd;
mod error;
mod io;
mod sink;

use crate::cli::{Cli, Command, Verbosity};

use crate::cmd::cluster::ClusterArgs;
use crate::error::CliError;

fn dispatch(cli: Cli) -> Result<(), CliError> {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);

    match cli.command {
        Command::Cluster {
            matrix,
            out_dir,
            policy,
            threshold,
            strict,
            pretty,
            history,
        } => {
            let args = ClusterArgs {
                matrix,
                out_dir,
                policy,
                threshold,
                strict,
                pretty,
                history,
            };
            cmd::cluster::run(&args, cli.max_file_size, verbosity)
        }
        Command::Inspect { matrix, format } => {
            cmd::inspect::run(&matrix, &format, cli.max_file_size)
        }
        Command::Version => {
            println!("{}", linkage_core::version());
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli) {
        eprintln!("{}", e.message());
        std::process::exit(e.exit_code());
    }
}
