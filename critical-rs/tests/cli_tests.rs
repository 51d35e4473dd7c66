//! Runs the `critical` binary the way a user would.

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn critical(args: &[&str], stdin: Option<&str>) -> Output {
    let home = tempfile::tempdir().unwrap();
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_critical"));
    cmd.args(args)
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("CRITICAL_STDLIB")
        .env_remove("CRITICAL_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd.spawn().unwrap();
    {
        let mut pipe = child.stdin.take().unwrap();
        if let Some(text) = stdin {
            pipe.write_all(text.as_bytes()).unwrap();
        }
    }
    child.wait_with_output().unwrap()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn command_flag_prints_final_value() {
    let out = critical(&["-c", "expr 6 * 7"], None);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), "42\n");
}

#[test]
fn puts_output_precedes_final_value() {
    let out = critical(&["-c", "puts hello; set a done"], None);
    assert_eq!(stdout(&out), "hello\ndone\n");
}

#[test]
fn script_file_argument() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.tcl");
    std::fs::write(&path, "set total 0\nfor {set i 0} {expr $i < 4} {incr i} { incr total $i }\nset total\n")
        .unwrap();
    let out = critical(&[path.to_str().unwrap()], None);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), "6\n");
}

#[test]
fn script_from_stdin() {
    let out = critical(&[], Some("set a 1\nincr a 4\n"));
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), "5\n");
}

#[test]
fn stdlib_is_loaded_by_default() {
    let out = critical(&["-c", "square 12"], None);
    assert_eq!(stdout(&out), "144\n");
}

#[test]
fn no_stdlib_flag() {
    let out = critical(&["-n", "-c", "square 12"], None);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("unknown command"), "stderr: {}", stderr(&out));
}

#[test]
fn stdlib_override_file() {
    let dir = tempfile::tempdir().unwrap();
    let lib = dir.path().join("lib.tcl");
    std::fs::write(&lib, "proc twice {x} { expr $x * 2 }\n").unwrap();
    let out = critical(&[&format!("-L{}", lib.display()), "-c", "twice 21"], None);
    assert_eq!(stdout(&out), "42\n");

    let out = critical(&[&format!("-L{}", lib.display()), "-c", "square 2"], None);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn exit_value_becomes_exit_code() {
    let out = critical(&["-c", "puts before; exit 3; puts after"], None);
    assert_eq!(out.status.code(), Some(3));
    assert_eq!(stdout(&out), "before\n");
}

#[test]
fn runtime_error_exits_one() {
    let out = critical(&["-c", "expr 1 / 0"], None);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stderr(&out).trim_end(), "critical: error invoking expr: division by zero");
}

#[test]
fn parse_error_exits_one() {
    let out = critical(&["-n", "-c", "puts \"open"], None);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).starts_with("critical: "));
}

#[test]
fn parse_error_line_is_relative_to_the_script() {
    let out = critical(&["-c", "puts \"open"], None);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(
        stderr(&out).trim_end(),
        "critical: line 1: illegal token: unterminated string"
    );

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.tcl");
    std::fs::write(&path, "set a 1\nset b 2\nputs [expr 1 + 1\n").unwrap();
    let out = critical(&[path.to_str().unwrap()], None);
    assert!(stderr(&out).starts_with("critical: line 3: "), "stderr: {}", stderr(&out));
}

#[test]
fn out_of_range_exit_value_is_255() {
    let out = critical(&["-c", "exit 300"], None);
    assert_eq!(out.status.code(), Some(255));
}

#[test]
fn missing_script_file() {
    let out = critical(&["/definitely/not/here.tcl"], None);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("can't read"));
}

#[test]
fn bad_flag_prints_usage() {
    let out = critical(&["-z"], None);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("Usage: critical"));
}

#[test]
fn explicit_init_file_runs_before_script() {
    let dir = tempfile::tempdir().unwrap();
    let init = dir.path().join("init.tcl");
    std::fs::write(&init, "set greeting hi\n").unwrap();
    let out = critical(&[&format!("-f{}", init.display()), "-c", "set greeting"], None);
    assert_eq!(stdout(&out), "hi\n");
}

#[test]
fn rc_file_in_home_is_found() {
    let home = tempfile::tempdir().unwrap();
    std::fs::write(home.path().join(".criticalrc"), "set from_rc yes\n").unwrap();
    let out = Command::new(env!("CARGO_BIN_EXE_critical"))
        .args(["-c", "set from_rc"])
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("xdg"))
        .env_remove("CRITICAL_STDLIB")
        .output()
        .unwrap();
    assert_eq!(stdout(&out), "yes\n");
}
