use std::process::ExitCode;

use clap::Parser;
use weekend_planner::cli::Cli;
use weekend_planner::{Outcome, Planner, Progress, Stage};

/// Prints `Scraping ...OK` as each stage finishes.
struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn stage_done(&mut self, stage: Stage) {
        println!("{stage}...OK");
    }
}

fn setup_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| default.to_string());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let outcome = match Planner::new(cli.config()) {
        Ok(planner) => planner.run(&mut ConsoleProgress).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(Outcome::NoCommonDay) => {
            println!();
            println!("No Dates Available");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Suggestions(suggestions)) => {
            println!();
            for suggestion in suggestions {
                println!("{suggestion}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::debug!("Run aborted: {e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
