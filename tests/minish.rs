//! End-to-end tests for the minish binary.
//!
//! These run the real executable so stream plumbing and signal dispositions
//! are observed from outside the process.

#![cfg(unix)]

use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::Pid;
use std::io::Write;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn minish() -> Command {
    Command::new(env!("CARGO_BIN_EXE_minish"))
}

fn run_c(line: &str) -> Output {
    minish()
        .arg("-c")
        .arg(line)
        .stdin(Stdio::null())
        .output()
        .expect("failed to run minish")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn pipeline_output_matches_first_stage() {
    let out = run_c("printf hello | cat");
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout_of(&out), "hello");
}

#[test]
fn three_stage_pipeline() {
    let out = run_c("printf b\\na\\nc\\n | sort | head -n 2");
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout_of(&out), "a\nb\n");
}

#[test]
fn builtin_echo_keeps_spacing() {
    let out = run_c("echo a   b");
    assert_eq!(stdout_of(&out), "a   b\n");
}

#[test]
fn and_or_chains() {
    assert_eq!(stdout_of(&run_c("true && echo A")), "A\n");
    assert_eq!(stdout_of(&run_c("false || echo A")), "A\n");

    let out = run_c("false && echo A");
    assert_eq!(stdout_of(&out), "");

    // The failed first group ends the chain: no output, and success.
    let out = run_c("false && echo A || echo B");
    assert_eq!(stdout_of(&out), "");
    assert!(out.status.success());
}

#[test]
fn failures_are_reported_on_stderr() {
    let out = run_c("minish-no-such-program");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.starts_with("minish: "), "stderr was {stderr:?}");
    assert!(stderr.contains("minish-no-such-program"));
}

#[test]
fn exit_status_of_failed_command_is_forwarded() {
    use std::os::unix::fs::PermissionsExt;

    let dir = std::env::temp_dir().join(format!("minish_it_status_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let script = dir.join("exit3.sh");
    std::fs::write(&script, "#!/bin/sh\nexit 3\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let out = run_c(&script.display().to_string());
    assert_eq!(out.status.code(), Some(3));

    let out = run_c("false");
    assert_eq!(out.status.code(), Some(1));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn reads_only_the_first_line_from_a_pipe() {
    let mut child = minish()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to start minish");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"echo first\necho second\n")
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    assert_eq!(stdout_of(&out), "first\n");
}

#[test]
fn leading_blank_lines_from_a_pipe_are_skipped() {
    let mut child = minish()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to start minish");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"\n\necho hi\necho later\n")
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    assert_eq!(stdout_of(&out), "hi\n");
}

#[test]
fn interrupt_while_idle_is_ignored() {
    let mut child = minish()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to start minish");

    // Let it install its dispositions and block on input.
    thread::sleep(Duration::from_millis(500));
    kill(Pid::from_raw(child.id() as i32), Signal::SIGINT).unwrap();
    thread::sleep(Duration::from_millis(100));

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"echo alive\n")
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert_eq!(out.status.signal(), None, "minish died: {out:?}");
    assert!(out.status.success());
    assert_eq!(stdout_of(&out), "alive\n");
}

#[test]
fn interrupt_kills_foreground_command_but_not_interpreter() {
    let started = Instant::now();
    let child = minish()
        .arg("-c")
        .arg("sleep 30")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        // Own process group, so the interrupt reaches minish and sleep
        // together, the way a terminal delivers Ctrl-C.
        .process_group(0)
        .spawn()
        .expect("failed to start minish");

    thread::sleep(Duration::from_millis(500));
    killpg(Pid::from_raw(child.id() as i32), Signal::SIGINT).unwrap();

    let out = child.wait_with_output().unwrap();
    assert!(started.elapsed() < Duration::from_secs(20));
    assert_eq!(out.status.signal(), None, "minish died: {out:?}");
    assert_eq!(out.status.code(), Some(128 + Signal::SIGINT as i32));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("minish: sleep"), "stderr was {stderr:?}");
}
