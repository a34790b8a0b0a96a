//! Benchmark and stress-test runners that replay synthetic command streams.

use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, warn};

use crate::event::{Event, LogEntry};
use crate::session::{LineOutcome, Session};
use crate::types::Menu;

// Every Nth round the first queue is told to skip its next turn.
const SKIP_EVERY_ROUNDS: usize = 7;
// Safety valve for the drain loop; a correct scheduler never gets close.
const MAX_ROUNDS_PER_TASK: usize = 64;

const CSV_HEADER: &str = "queues,capacity,tasks_per_queue,quantum,commands,accepted,rejected,final_clock,elapsed_ms,throughput_cmds_per_s,cpu_user_s,cpu_sys_s,capacity_violation,duplicate_tasks,unfinished";

/// Best-effort CPU user/system time snapshot (seconds) on Unix platforms.
#[cfg(unix)]
fn cpu_times_seconds() -> Option<(f64, f64)> {
    // SAFETY: rusage is plain old data; all-zero is a valid value.
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) };
    if rc != 0 {
        return None;
    }
    let user = usage.ru_utime.tv_sec as f64 + (usage.ru_utime.tv_usec as f64 / 1_000_000.0);
    let sys = usage.ru_stime.tv_sec as f64 + (usage.ru_stime.tv_usec as f64 / 1_000_000.0);
    Some((user, sys))
}

/// Stub on non-Unix platforms.
#[cfg(not(unix))]
fn cpu_times_seconds() -> Option<(f64, f64)> {
    None
}

/// Shape of one synthetic workload.
#[derive(Clone, Copy, Debug)]
pub struct Workload {
    pub queues: usize,
    pub capacity: usize,
    pub tasks_per_queue: usize,
    pub quantum: u64,
}

/// Aggregated metrics from a single benchmark run.
#[derive(Debug)]
pub struct BenchResult {
    pub workload: Workload,
    pub commands: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub final_clock: u64,
    pub elapsed_ms: f64,
    pub throughput: f64,
    pub cpu_user_s: Option<f64>,
    pub cpu_sys_s: Option<f64>,
    pub capacity_violation: bool,
    pub duplicate_tasks: bool,
    pub unfinished: usize,
}

/// Counters folded from the log entries of every command.
#[derive(Default)]
struct Tally {
    commands: usize,
    accepted: usize,
    rejected: usize,
    finished: HashSet<String>,
    duplicate_finish: bool,
    capacity_violation: bool,
}

impl Tally {
    fn feed(&mut self, session: &mut Session, line: &str, validate: bool) -> Vec<LogEntry> {
        let logs = match session.handle_line(line) {
            LineOutcome::Logs(logs) => logs,
            LineOutcome::End | LineOutcome::Ignored => Vec::new(),
        };
        self.commands += 1;
        for entry in &logs {
            match &entry.event {
                Event::Enqueue { .. } => self.accepted += 1,
                Event::Reject { .. } => self.rejected += 1,
                Event::Finish { task, .. } => {
                    if !self.finished.insert(task.clone()) {
                        self.duplicate_finish = true;
                    }
                }
                Event::Error { reason } => warn!(line, reason, "unexpected error in workload"),
                _ => {}
            }
        }
        if validate && !session.scheduler().within_capacity() {
            self.capacity_violation = true;
        }
        logs
    }
}

fn benchmark_once(workload: Workload, validate: bool) -> BenchResult {
    debug_assert!(workload.queues > 0, "queues must be > 0");
    debug_assert!(workload.capacity > 0, "capacity must be > 0");
    debug_assert!(workload.quantum > 0, "quantum must be > 0");

    let items: Vec<&'static str> = Menu::standard().iter().map(|(name, _)| name).collect();
    let names: Vec<String> = (0..workload.queues).map(|i| format!("q{i}")).collect();
    let mut session = Session::new();
    let mut tally = Tally::default();
    // Orders each queue has had accepted so far.
    let mut placed = vec![0usize; workload.queues];

    let cpu_start = cpu_times_seconds();
    let start = Instant::now();

    for name in &names {
        tally.feed(&mut session, &format!("CREATE {name} {}", workload.capacity), validate);
    }

    let run_line = format!("RUN {}", workload.quantum);
    let max_rounds = workload.tasks_per_queue.max(1) * MAX_ROUNDS_PER_TASK;
    let mut round = 0usize;
    loop {
        let all_placed = placed.iter().all(|&n| n >= workload.tasks_per_queue);
        if all_placed && session.scheduler().pending_tasks() == 0 {
            break;
        }
        if round >= max_rounds {
            warn!(round, "workload did not drain; giving up");
            break;
        }
        for (index, name) in names.iter().enumerate() {
            if placed[index] >= workload.tasks_per_queue {
                continue;
            }
            // A rejected order is retried with the same item next round.
            let item = items[(placed[index] + index) % items.len()];
            let logs = tally.feed(&mut session, &format!("ENQ {name} {item}"), validate);
            if logs
                .iter()
                .any(|entry| matches!(entry.event, Event::Enqueue { .. }))
            {
                placed[index] += 1;
            }
        }
        if round % SKIP_EVERY_ROUNDS == SKIP_EVERY_ROUNDS - 1 {
            tally.feed(&mut session, &format!("SKIP {}", names[0]), validate);
        }
        tally.feed(&mut session, &run_line, validate);
        round += 1;
    }

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    let throughput = if elapsed_ms > 0.0 {
        (tally.commands as f64) / (elapsed_ms / 1000.0)
    } else {
        0.0
    };
    let (cpu_user_s, cpu_sys_s) = match (cpu_start, cpu_times_seconds()) {
        (Some((user_start, sys_start)), Some((user_end, sys_end))) => {
            (Some(user_end - user_start), Some(sys_end - sys_start))
        }
        _ => (None, None),
    };
    debug!(rounds = round, commands = tally.commands, "workload drained");

    BenchResult {
        workload,
        commands: tally.commands,
        accepted: tally.accepted,
        rejected: tally.rejected,
        final_clock: session.scheduler().time(),
        elapsed_ms,
        throughput,
        cpu_user_s,
        cpu_sys_s,
        capacity_violation: tally.capacity_violation,
        duplicate_tasks: tally.duplicate_finish,
        unfinished: tally.accepted.saturating_sub(tally.finished.len()),
    }
}

fn print_row(result: &BenchResult, validate: bool) {
    let cpu_user = result
        .cpu_user_s
        .map(|v| format!("{v:.4}"))
        .unwrap_or_else(|| "NA".to_string());
    let cpu_sys = result
        .cpu_sys_s
        .map(|v| format!("{v:.4}"))
        .unwrap_or_else(|| "NA".to_string());
    let w = &result.workload;
    println!(
        "{},{},{},{},{},{},{},{},{:.2},{:.2},{},{},{},{},{}",
        w.queues,
        w.capacity,
        w.tasks_per_queue,
        w.quantum,
        result.commands,
        result.accepted,
        result.rejected,
        result.final_clock,
        result.elapsed_ms,
        result.throughput,
        cpu_user,
        cpu_sys,
        result.capacity_violation,
        result.duplicate_tasks,
        result.unfinished
    );
    if validate {
        if result.capacity_violation {
            eprintln!("# violation,capacity");
        }
        if result.duplicate_tasks {
            eprintln!("# violation,duplicate_tasks");
        }
        if result.unfinished > 0 {
            eprintln!("# violation,unfinished_tasks,{}", result.unfinished);
        }
    }
}

fn invalid_workload(workload: &Workload) -> Option<&'static str> {
    if workload.queues == 0 {
        Some("queues must be > 0")
    } else if workload.capacity == 0 {
        Some("capacity must be > 0")
    } else if workload.tasks_per_queue == 0 {
        Some("tasks_per_queue must be > 0")
    } else if workload.quantum == 0 {
        Some("quantum must be > 0")
    } else {
        None
    }
}

/// Run a single benchmark and print a CSV header plus one row.
pub fn run_benchmark(workload: Workload, validate: bool) {
    if let Some(problem) = invalid_workload(&workload) {
        eprintln!("benchmark error: {problem}");
        return;
    }
    let result = benchmark_once(workload, validate);
    println!("{CSV_HEADER}");
    print_row(&result, validate);
}

/// Sweep every combination of the given sets and print CSV output.
pub fn run_stress(
    queue_sets: &[usize],
    task_sets: &[usize],
    quantum_sets: &[u64],
    capacity: usize,
    validate: bool,
) {
    if capacity == 0 {
        eprintln!("stress error: capacity must be > 0");
        return;
    }
    if queue_sets.contains(&0) {
        eprintln!("stress error: queue_sets must be > 0");
        return;
    }
    if task_sets.contains(&0) {
        eprintln!("stress error: task_sets must be > 0");
        return;
    }
    let quanta: Vec<u64> = quantum_sets.iter().copied().filter(|&q| q > 0).collect();
    let dropped = quantum_sets.len() - quanta.len();
    if dropped > 0 {
        eprintln!("stress warning: ignored {dropped} quantum set(s) <= 0");
    }
    if quanta.is_empty() {
        eprintln!("stress error: quantum must be > 0");
        return;
    }

    println!("{CSV_HEADER}");
    for &queues in queue_sets {
        for &tasks_per_queue in task_sets {
            for &quantum in &quanta {
                let workload = Workload {
                    queues,
                    capacity,
                    tasks_per_queue,
                    quantum,
                };
                let result = benchmark_once(workload, validate);
                print_row(&result, validate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workload(queues: usize, capacity: usize, tasks: usize, quantum: u64) -> Workload {
        Workload {
            queues,
            capacity,
            tasks_per_queue: tasks,
            quantum,
        }
    }

    #[test]
    fn workload_drains_completely() {
        let result = benchmark_once(workload(3, 2, 10, 2), true);
        assert_eq!(result.accepted, 30);
        assert_eq!(result.unfinished, 0);
        assert!(!result.capacity_violation);
        assert!(!result.duplicate_tasks);
    }

    #[test]
    fn clock_equals_total_work() {
        // One queue, one task per item name: the clock ends at the menu total.
        let menu_total: u64 = Menu::standard().iter().map(|(_, work)| work).sum();
        let result = benchmark_once(workload(1, 1, 7, 1), true);
        assert_eq!(result.accepted, 7);
        assert_eq!(result.final_clock, menu_total);
    }

    #[test]
    fn tight_capacity_causes_rejections() {
        let result = benchmark_once(workload(2, 1, 5, 1), true);
        assert!(result.rejected > 0);
        assert_eq!(result.unfinished, 0);
        assert!(!result.capacity_violation);
    }

    #[test]
    fn zero_sizes_are_invalid() {
        assert_eq!(
            invalid_workload(&workload(0, 1, 1, 1)),
            Some("queues must be > 0")
        );
        assert_eq!(
            invalid_workload(&workload(1, 1, 1, 0)),
            Some("quantum must be > 0")
        );
        assert_eq!(invalid_workload(&workload(1, 1, 1, 1)), None);
    }
}
