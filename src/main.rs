use clap::Parser;
use falign::cli::Cli;
use falign::model::RunReport;
use falign::orchestrator::AlignmentRun;
use falign::AlignResult;

fn main() {
    falign::logging::init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(report) => {
            if !report.all_ok() {
                std::process::exit(1);
            }
        }
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(error.exit_code());
        }
    }
}

fn run(cli: &Cli) -> AlignResult<RunReport> {
    let report = AlignmentRun::new(cli.to_config()).run()?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(report)
}

fn print_report(report: &RunReport) {
    let failures = report.failures();
    println!(
        "aligned {} batches ({} utterances) in {} cohorts: {} ok, {} failed",
        report.batches,
        report.utterances,
        report.cohorts,
        report.outcomes.iter().filter(|o| o.is_ok()).count(),
        failures.len()
    );
    for failure in failures {
        eprintln!(
            "batch {} failed in {} stage [{}]: {}",
            failure.batch, failure.stage, failure.error_code, failure.message
        );
    }
}
