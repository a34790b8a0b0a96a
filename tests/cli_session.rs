//! CLI integration tests for streamed command sessions.

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn run_with_stdin(args: &[&str], input: &str) -> Output {
    let bin = env!("CARGO_BIN_EXE_cafe_rr");
    let mut child = Command::new(bin)
        .args(args)
        .env_remove("CAFE_RR_INPUT")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn binary");
    child
        .stdin
        .take()
        .expect("stdin piped")
        .write_all(input.as_bytes())
        .expect("failed to write stdin");
    let output = child.wait_with_output().expect("failed to wait on binary");
    assert!(
        output.status.success(),
        "binary exited with non-zero status: {:?}",
        output.status
    );
    output
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn single_tea_is_served() {
    let output = run_with_stdin(&[], "CREATE q1 2\nENQ q1 tea\nRUN 1\n\n");
    assert_eq!(
        stdout_lines(&output),
        [
            "time=0 event=create queue=q1",
            "time=0 event=enqueue queue=q1 task=q1-001 remaining=1",
            "time=0 event=run queue=q1",
            "time=1 event=work queue=q1 task=q1-001 done=1",
            "time=1 event=finish queue=q1 task=q1-001",
            "Break time!",
        ]
    );
}

#[test]
fn rejections_print_notices_and_leave_id_gap() {
    let script = "\
# capacity one
CREATE q1 1
CREATE q1 1
ENQ q1 tea
ENQ q1 tea
ENQ q1 frappe
RUN 3 1
ENQ q1 latte
";
    let output = run_with_stdin(&[], script);
    assert_eq!(
        stdout_lines(&output),
        [
            "time=0 event=create queue=q1",
            "time=0 event=error reason=queue_exists",
            "time=0 event=enqueue queue=q1 task=q1-001 remaining=1",
            "Sorry, we're at capacity.",
            "time=0 event=reject queue=q1 reason=full",
            "Sorry, we don't serve that.",
            "time=0 event=reject queue=q1 reason=unknown_item",
            "time=0 event=run queue=q1",
            "time=1 event=work queue=q1 task=q1-001 done=1",
            "time=1 event=finish queue=q1 task=q1-001",
            "time=1 event=enqueue queue=q1 task=q1-003 remaining=3",
        ]
    );
}

#[test]
fn huge_capacity_and_step_counts_keep_session_alive() {
    let script = "CREATE q 18446744073709551615\nCREATE r 1000000000000\nRUN 1 99999999999999999999\nENQ q tea\n";
    let output = run_with_stdin(&[], script);
    assert_eq!(
        stdout_lines(&output),
        [
            "time=0 event=create queue=q",
            "time=0 event=create queue=r",
            "time=0 event=error reason=invalid_steps",
            "time=0 event=enqueue queue=q task=q-001 remaining=1",
        ]
    );
}

#[test]
fn boundary_errors_use_placeholder_time() {
    let output = run_with_stdin(&[], "CREATE q1 big\nrun\nFLY q1\nRUN 1 9\n");
    assert_eq!(
        stdout_lines(&output),
        [
            "time=? event=error reason=bad_args",
            "time=? event=error reason=bad_args",
            "time=? event=error reason=unknown_command",
            "time=0 event=error reason=invalid_steps",
        ]
    );
}

#[test]
fn show_state_prints_display_after_session() {
    let script = "CREATE a 2\nCREATE b 1\nENQ a mocha\nSKIP b\nRUN 2 1\n\nENQ b tea\n";
    let output = run_with_stdin(&["--show-state"], script);
    let lines = stdout_lines(&output);
    let farewell = lines
        .iter()
        .position(|line| line == "Break time!")
        .expect("farewell line missing");
    assert_eq!(
        &lines[farewell + 1..],
        [
            "display time=2 next=b",
            "display menu=[americano:2,cappuccino:3,hot_chocolate:4,latte:3,macchiato:2,mocha:4,tea:1]",
            "display a [1/2] -> [a-001:2]",
            "display b [0/1] skip -> []",
        ]
    );
}

#[test]
fn bench_reports_clean_validation() {
    let bin = env!("CARGO_BIN_EXE_cafe_rr");
    let output = Command::new(bin)
        .args(["bench", "--queues", "3", "--tasks-per-queue", "5", "--validate"])
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run bench");
    assert!(output.status.success(), "bench failed: {:?}", output.status);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    let header: Vec<_> = lines.next().expect("csv header").split(',').collect();
    let row: Vec<_> = lines.next().expect("csv row").split(',').collect();
    assert_eq!(header.len(), row.len());
    let field = |name: &str| {
        let index = header
            .iter()
            .position(|h| *h == name)
            .unwrap_or_else(|| panic!("missing column {name}"));
        row[index]
    };
    assert_eq!(field("accepted"), "15");
    assert_eq!(field("capacity_violation"), "false");
    assert_eq!(field("duplicate_tasks"), "false");
    assert_eq!(field("unfinished"), "0");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("# violation"), "unexpected violation: {stderr}");
}
