use clap::{Parser, Subcommand};
use logtop_core::cli::args::RunArgs;
use logtop_core::cli::{check, run};
use logtop_core::logging::init_logging;

#[derive(Parser, Debug)]
#[command(
    name = "logtop",
    version,
    about = "logtop: live top sections of a growing access log"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Follow the log and report the top sections every period (default)
    Run(RunArgs),

    /// Load and validate the configuration, then exit
    Check(RunArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Check(args)) => {
            if let Err(e) = check::check(&args) {
                eprintln!("check error: {e}");
                std::process::exit(1);
            }
        }

        Some(Command::Run(args)) => {
            init_logging();
            if let Err(e) = run::run_from_args(&args) {
                tracing::error!(error = %format!("{e:#}"), "logtop failed");
                std::process::exit(1);
            }
        }

        None => {
            init_logging();
            if let Err(e) = run::run_from_args(&cli.run) {
                tracing::error!(error = %format!("{e:#}"), "logtop failed");
                std::process::exit(1);
            }
        }
    }
}
