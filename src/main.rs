mod cli;
mod error;
mod event;
mod logging;
mod parser;
mod scheduler;
mod session;
mod sim;
mod snapshot;
mod task_queue;
mod types;

use std::fs::File;
use std::io::{self, BufReader, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Mode};
use crate::session::Session;
use crate::sim::Workload;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Some(Mode::Bench(args)) => {
            sim::run_benchmark(
                Workload {
                    queues: args.queues,
                    capacity: args.capacity,
                    tasks_per_queue: args.tasks_per_queue,
                    quantum: args.quantum,
                },
                args.validate,
            );
        }
        Some(Mode::Stress(args)) => {
            sim::run_stress(
                &args.queue_sets,
                &args.task_sets,
                &args.quantum_sets,
                args.capacity,
                args.validate,
            );
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let mut session = Session::new();
            let commands = match &cli.input {
                Some(path) => {
                    let file = File::open(path)
                        .with_context(|| format!("failed to open {}", path.display()))?;
                    session.run(BufReader::new(file), &mut out)
                }
                None => session.run(io::stdin().lock(), &mut out),
            }
            .context("failed to process command stream")?;
            info!(commands, "session complete");

            if cli.show_state {
                writeln!(out, "{}", session.scheduler().snapshot())
                    .context("failed to write state")?;
            }
            out.flush().context("failed to flush stdout")?;
        }
    }
    Ok(())
}
