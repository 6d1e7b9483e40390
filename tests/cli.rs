use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::NamedTempFile;

const INPUT: &str = r#"core.module @m {
  func.func @f() -> core.tensor(core.i8) {shape = [3]} {
    %0 = xla_hlo.iota {iota_dimension = 0} : core.tensor(core.i8) {shape = [3]}
    func.return %0
  }
}
"#;

const LOWERED: &str = r#"core.module @m {
  func.func @f() -> core.tensor(core.i8) {shape = [3]} {
    %0 = std.constant {value = [0, 1, 2]} : core.tensor(core.i8) {shape = [3]}
    func.return %0
  }
}
"#;

fn hlo_opt() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hlo-opt"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run_with_stdin(mut cmd: Command, stdin: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn hlo-opt");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("failed to write stdin");
    child.wait_with_output().expect("failed to wait for hlo-opt")
}

#[test]
fn test_file_to_file() {
    let mut input = NamedTempFile::with_suffix(".hlo").expect("failed to create temp file");
    input.write_all(INPUT.as_bytes()).expect("failed to write input");
    let output = NamedTempFile::with_suffix(".hlo").expect("failed to create temp file");

    let status = hlo_opt()
        .arg(input.path())
        .arg("-o")
        .arg(output.path())
        .status()
        .expect("failed to run hlo-opt");
    assert!(status.success());

    let written = std::fs::read_to_string(output.path()).expect("failed to read output");
    assert_eq!(written, LOWERED);
}

#[test]
fn test_stdin_to_stdout() {
    let mut cmd = hlo_opt();
    cmd.args(["-", "--verify-legal"]);
    let output = run_with_stdin(cmd, INPUT);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout), LOWERED);
}

#[test]
fn test_list_passes() {
    let output = hlo_opt().arg("--list-passes").output().expect("failed to run hlo-opt");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("xla-legalize-to-std"));
    assert!(stdout.contains("Legalize from XLA dialect to standard dialect"));
}

#[test]
fn test_unknown_pass_exits_with_error() {
    let mut cmd = hlo_opt();
    cmd.args(["-p", "no-such-pass"]);
    let output = run_with_stdin(cmd, INPUT);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown pass `no-such-pass`"), "{stderr}");
}

#[test]
fn test_parse_error_exits_with_error() {
    let output = run_with_stdin(hlo_opt(), "core.module @m {\n  func.return %missing\n}\n");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("undefined value '%missing'"), "{stderr}");
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let missing = dir.path().join("missing.hlo");
    let output = hlo_opt().arg(&missing).output().expect("failed to run hlo-opt");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot access"), "{stderr}");
}
