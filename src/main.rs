// Copyright (c) 2024 Mudit Bhargava
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
//

// main.rs
//
// Command-line entry point: `tomasulo-sim <TRACE> <CONFIG> <OUTPUT>`.
// Parses a trace and a unit-class config, runs the scheduler to
// completion, and writes the resulting report as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use tomasulo_sim::scheduler::Scheduler;
use tomasulo_sim::utils::logger::RunLog;
use tomasulo_sim::{config, trace};

#[derive(Parser)]
#[command(name = "tomasulo-sim")]
#[command(about = "Cycle-accurate simulator of a Tomasulo-scheduled out-of-order pipeline")]
#[command(version)]
struct Cli {
    /// Program trace: one 4-hex-digit instruction word per line
    trace: PathBuf,

    /// Unit-class configuration (functional unit counts and latencies)
    config: PathBuf,

    /// Where to write the JSON simulation report
    output: PathBuf,

    /// Log level for diagnostics (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Shorthand for --log-level debug
    #[arg(short, long)]
    verbose: bool,

    /// Optional file to mirror a concise per-cycle trace to
    #[arg(long)]
    trace_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { cli.log_level.as_str() };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("tomasulo-sim: {}", err);
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<(), tomasulo_sim::SimError> {
    let mut run_log = RunLog::new(cli.trace_file.as_deref())?;
    run_log.summary("starting run");

    let unit_classes = config::load_unit_classes(&cli.config)?;
    let program = trace::decode_program(&cli.trace)?;
    info!("loaded {} unit classes and {} instructions", unit_classes.len(), program.len());

    let mut scheduler = Scheduler::new(&unit_classes, program);
    scheduler.attach_run_log(run_log);
    let report = scheduler.run()?;

    let mut run_log = scheduler.take_run_log().expect("run_log was attached above");
    run_log.summary(&format!("completed after {} cycles", report.cycles));
    report.write_to(&cli.output)?;

    Ok(())
}
