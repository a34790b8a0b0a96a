use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Round-robin order scheduler for a small coffee bar.
///
/// Reads CREATE / ENQ / SKIP / RUN commands, one per line, and prints a
/// `time=<t> event=<name> ...` log for each. A blank line ends the session.
#[derive(Parser, Debug)]
#[command(name = "cafe_rr", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Mode>,

    /// Read commands from a file instead of stdin
    #[arg(long, env = "CAFE_RR_INPUT")]
    pub input: Option<PathBuf>,

    /// Print the scheduler state after the session ends
    #[arg(long)]
    pub show_state: bool,

    /// Default diagnostics to debug level (RUST_LOG still takes precedence)
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Replay one synthetic workload and print a CSV row
    Bench(BenchArgs),
    /// Sweep workload sizes and print one CSV row per combination
    Stress(StressArgs),
}

#[derive(Args, Debug)]
pub struct BenchArgs {
    #[arg(long, default_value_t = 4)]
    pub queues: usize,

    /// Capacity of every generated queue
    #[arg(long, default_value_t = 8)]
    pub capacity: usize,

    #[arg(long, default_value_t = 25)]
    pub tasks_per_queue: usize,

    #[arg(long, default_value_t = 2)]
    pub quantum: u64,

    /// Check capacity after every command and that every accepted task finished
    #[arg(long)]
    pub validate: bool,
}

#[derive(Args, Debug)]
pub struct StressArgs {
    #[arg(long, value_delimiter = ',', default_values_t = [1usize, 2, 4, 8, 12])]
    pub queue_sets: Vec<usize>,

    #[arg(long, value_delimiter = ',', default_values_t = [10usize, 25, 50])]
    pub task_sets: Vec<usize>,

    #[arg(long, value_delimiter = ',', default_values_t = [1u64, 2, 4])]
    pub quantum_sets: Vec<u64>,

    #[arg(long, default_value_t = 8)]
    pub capacity: usize,

    #[arg(long)]
    pub validate: bool,
}
