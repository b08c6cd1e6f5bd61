//! pscore CLI binary.
//!
//! Entry point for the `pscore` command-line tool.

use std::process::ExitCode;

use clap::Parser;
use pscore_host::exit::{codes, exit_code};
use pscore_host::{
    execute_classify, execute_replay, ClassifyArgs, Cli, Command, CommandError, RealFilesystem,
    ReplayArgs, StderrLogger, Verbosity,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let logger = StderrLogger::new(Verbosity::from_count(cli.verbose));

    let result = match cli.command {
        Command::Classify(args) => run_classify(&args, &logger),
        Command::Replay(args) => run_replay(&args, &logger),
    };

    match result {
        Ok(()) => ExitCode::from(codes::SUCCESS as u8),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(exit_code(&e) as u8)
        }
    }
}

/// Run the classify command.
fn run_classify(args: &ClassifyArgs, logger: &StderrLogger) -> Result<(), CommandError> {
    let outcome = execute_classify(args, logger)?;

    println!(
        "verdict={} tier={} egress_spec=0x{:04x} score_quantified={}",
        outcome.verdict, outcome.tier, outcome.egress_spec, outcome.score_quantified
    );

    Ok(())
}

/// Run the replay command.
fn run_replay(args: &ReplayArgs, logger: &StderrLogger) -> Result<(), CommandError> {
    let result = execute_replay(args, &RealFilesystem, logger)?;

    println!("Replay complete:");
    println!("  Packets: {}", result.packets);
    println!("  Control cycles: {}", result.cycles);
    println!(
        "  Flows: white={} grey={} black={}",
        result.counters.white_flows, result.counters.grey_flows, result.counters.black_flows
    );
    println!("  Filter engaged: {}", result.filter_engaged);
    println!();
    println!("Output files:");
    println!("  Verdicts: {}", result.verdicts_path.display());
    println!("  Status: {}", result.status_path.display());
    println!("  Counters: {}", result.counters_path.display());

    Ok(())
}
