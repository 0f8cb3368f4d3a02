use std::io;
use std::process::ExitCode;

use anyhow::Result;
use hamlet6to7::{command, exit_status, run, CliOptions};

fn main() -> Result<ExitCode> {
    // Parse command line arguments
    let matches = command().get_matches();
    let options = CliOptions::from_matches(&matches);

    // Initialize logging
    hamlet_migrate::init_tracing(options.log_level());

    let stdout = io::stdout();
    let summary = run(&options, &mut stdout.lock())?;

    Ok(ExitCode::from(exit_status(&summary)))
}
