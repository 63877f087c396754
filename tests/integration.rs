/// Integration test suite — runs the compiled `sbom-rdeps` binary against DOT fixtures.
///
/// All tests invoke the binary via subprocess. The `CARGO_BIN_EXE_sbom-rdeps` environment
/// variable is set by Cargo during `cargo test` to point to the compiled binary.
///
/// Every command runs with its working directory set to a fresh temp directory so that a
/// `sbom-rdeps.toml` lying around the repository can never leak into a test.
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_sbom-rdeps"))
}

/// A small RPM-style SBOM: every package hangs off the `RPM-Packages` root.
const SBOM_DOT: &str = r#"
digraph "sbom" {
    node [shape=box];
    "RPM-Packages" -> "bash";
    "RPM-Packages" -> "coreutils";
    "RPM-Packages" -> "glibc";
    "RPM-Packages" -> "openssl-libs";
    "RPM-Packages" -> "curl";
    "bash" -> "glibc";
    "coreutils" -> "glibc";
    "coreutils" -> "openssl-libs";
    "openssl-libs" -> "glibc";
    "curl" -> "openssl-libs" [label="requires"];
    "curl" -> "glibc";
}
"#;

/// Fixture directory holding a single DOT file.
fn fixture(dot: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("sbom.dot");
    std::fs::write(&path, dot).expect("failed to write DOT fixture");
    (dir, path)
}

fn run(dir: &Path, args: &[&str], stdin: Option<&str>) -> Output {
    let mut cmd = Command::new(binary());
    cmd.args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if stdin.is_some() {
        cmd.stdin(Stdio::piped());
    }
    let mut child = cmd.spawn().expect("failed to invoke sbom-rdeps binary");
    if let Some(input) = stdin {
        child
            .stdin
            .take()
            .expect("stdin should be piped")
            .write_all(input.as_bytes())
            .expect("failed to write stdin");
    }
    child.wait_with_output().expect("failed to wait for sbom-rdeps")
}

/// Run sbom-rdeps in `dir` and assert it exits successfully.
/// Returns stdout as a String.
fn run_success(dir: &Path, args: &[&str]) -> String {
    let out = run(dir, args, None);
    let stdout = String::from_utf8_lossy(&out.stdout).to_string();
    let stderr = String::from_utf8_lossy(&out.stderr).to_string();
    assert!(
        out.status.success(),
        "command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
        args,
        out.status,
        stdout,
        stderr
    );
    stdout
}

/// Run sbom-rdeps in `dir` and assert it exits with a non-zero status.
/// Returns (stdout, stderr) as Strings.
fn run_failure(dir: &Path, args: &[&str]) -> (String, String) {
    let out = run(dir, args, None);
    let stdout = String::from_utf8_lossy(&out.stdout).to_string();
    let stderr = String::from_utf8_lossy(&out.stderr).to_string();
    assert!(
        !out.status.success(),
        "command {:?} expected to fail but exited successfully\nstdout: {}\nstderr: {}",
        args,
        stdout,
        stderr
    );
    (stdout, stderr)
}

// ---------------------------------------------------------------------------
// Dependents reports
// ---------------------------------------------------------------------------

/// test_layered_report — A and C depend on B, D on A, E on C.
#[test]
fn test_layered_report() {
    let (dir, path) = fixture("digraph { A -> B; C -> B; D -> A; E -> C; }");
    let stdout = run_success(dir.path(), &["-i", path.to_str().unwrap(), "-p", "B"]);
    assert_eq!(
        stdout,
        "depth 1 (num 2):\n\t1. A\n\t2. C\ndepth 2 (num 2):\n\t1. D\n\t2. E\n"
    );
}

/// test_depth_bound — `-d 1` stops after direct dependents.
#[test]
fn test_depth_bound() {
    let (dir, path) = fixture("digraph { A -> B; C -> B; D -> A; E -> C; }");
    let stdout = run_success(
        dir.path(),
        &["-i", path.to_str().unwrap(), "-p", "B", "-d", "1"],
    );
    assert_eq!(stdout, "depth 1 (num 2):\n\t1. A\n\t2. C\n");
}

/// test_negative_depth_is_unbounded — `-d -1` and `--depth=0` behave like no bound.
#[test]
fn test_negative_depth_is_unbounded() {
    let (dir, path) = fixture("digraph { A -> B; C -> B; D -> A; E -> C; }");
    let input = path.to_str().unwrap();
    let unbounded = run_success(dir.path(), &["-i", input, "-p", "B"]);
    let negative = run_success(dir.path(), &["-i", input, "-p", "B", "-d", "-1"]);
    let zero = run_success(dir.path(), &["-i", input, "-p", "B", "--depth=0"]);
    let large = run_success(dir.path(), &["-i", input, "-p", "B", "-d", "1000"]);
    assert_eq!(negative, unbounded);
    assert_eq!(zero, unbounded);
    assert_eq!(large, unbounded);
}

/// test_root_sentinel_excluded — the RPM-Packages root depends on everything but is never listed.
#[test]
fn test_root_sentinel_excluded() {
    let (dir, path) = fixture(SBOM_DOT);
    let stdout = run_success(dir.path(), &["-i", path.to_str().unwrap(), "-p", "glibc"]);
    assert_eq!(
        stdout,
        "depth 1 (num 4):\n\t1. bash\n\t2. coreutils\n\t3. openssl-libs\n\t4. curl\n"
    );
    assert!(!stdout.contains("RPM-Packages"));
}

/// test_shortest_depth_reported — curl depends on glibc directly and via openssl-libs.
#[test]
fn test_shortest_depth_reported() {
    let (dir, path) = fixture(SBOM_DOT);
    let stdout = run_success(
        dir.path(),
        &["-i", path.to_str().unwrap(), "-p", "glibc", "--format", "json"],
    );
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("--format json output is not valid JSON");
    let depths = parsed["depths"].as_array().expect("JSON missing 'depths'");
    assert_eq!(depths.len(), 1, "every dependent of glibc is direct\nstdout: {}", stdout);
    assert_eq!(parsed["total"], 4);
    assert!(parsed["max_depth"].is_null());
}

/// test_no_sentinel_flag — `--no-sentinel` lists the root like any other package.
#[test]
fn test_no_sentinel_flag() {
    let (dir, path) = fixture(SBOM_DOT);
    let stdout = run_success(
        dir.path(),
        &["-i", path.to_str().unwrap(), "-p", "openssl-libs", "--no-sentinel"],
    );
    assert!(
        stdout.contains("RPM-Packages"),
        "root should be reported without a sentinel\nstdout: {}",
        stdout
    );
}

/// test_custom_sentinel_flag — `--sentinel` excludes a differently named root.
#[test]
fn test_custom_sentinel_flag() {
    let (dir, path) = fixture("digraph { \"SBOM-Root\" -> zlib; rpm -> zlib; }");
    let stdout = run_success(
        dir.path(),
        &["-i", path.to_str().unwrap(), "-p", "zlib", "--sentinel", "SBOM-Root"],
    );
    assert_eq!(stdout, "depth 1 (num 1):\n\t1. rpm\n");
}

/// test_no_dependents — a package nothing depends on prints nothing and succeeds.
#[test]
fn test_no_dependents() {
    let (dir, path) = fixture(SBOM_DOT);
    let stdout = run_success(dir.path(), &["-i", path.to_str().unwrap(), "-p", "curl"]);
    assert!(stdout.is_empty(), "expected no tiers\nstdout: {}", stdout);
}

/// test_table_output — table format has a header, rows and a footer.
#[test]
fn test_table_output() {
    let (dir, path) = fixture(SBOM_DOT);
    let stdout = run_success(
        dir.path(),
        &["-i", path.to_str().unwrap(), "-p", "openssl-libs", "--format", "table"],
    );
    assert!(stdout.contains("DEPTH"), "stdout: {}", stdout);
    assert!(stdout.contains("coreutils"), "stdout: {}", stdout);
    assert!(stdout.contains("2 dependents of openssl-libs"), "stdout: {}", stdout);
    assert!(!stdout.contains('\x1b'), "piped stdout must not be colored");
}

/// test_stdin_input — `-i -` reads the graph from standard input.
#[test]
fn test_stdin_input() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(
        dir.path(),
        &["-i", "-", "-p", "B"],
        Some("digraph { A -> B; C -> A }"),
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "depth 1 (num 1):\n\t1. A\ndepth 2 (num 1):\n\t1. C\n"
    );
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// test_config_file_in_working_directory — sbom-rdeps.toml supplies defaults.
#[test]
fn test_config_file_in_working_directory() {
    let (dir, path) = fixture("digraph { A -> B; C -> B; D -> A; E -> C; }");
    std::fs::write(
        dir.path().join("sbom-rdeps.toml"),
        "max_depth = 1\nformat = \"json\"\n",
    )
    .unwrap();
    let stdout = run_success(dir.path(), &["-i", path.to_str().unwrap(), "-p", "B"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["max_depth"], 1);
    assert_eq!(parsed["total"], 2);

    // Flags win over the config file.
    let stdout = run_success(
        dir.path(),
        &["-i", path.to_str().unwrap(), "-p", "B", "-d", "-1", "--format", "compact"],
    );
    assert!(stdout.contains("depth 2 (num 2):"), "stdout: {}", stdout);
}

/// test_explicit_config_must_exist — a missing `--config` file is an error.
#[test]
fn test_explicit_config_must_exist() {
    let (dir, path) = fixture(SBOM_DOT);
    let (stdout, stderr) = run_failure(
        dir.path(),
        &["-i", path.to_str().unwrap(), "-p", "glibc", "-c", "missing.toml"],
    );
    assert!(stdout.is_empty());
    assert!(
        stderr.contains("failed to read config file"),
        "stderr: {}",
        stderr
    );
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// test_unknown_package — exact match only; no partial output on failure.
#[test]
fn test_unknown_package() {
    let (dir, path) = fixture(SBOM_DOT);
    for name in ["zlib", "Glibc", "glib"] {
        let (stdout, stderr) = run_failure(dir.path(), &["-i", path.to_str().unwrap(), "-p", name]);
        assert!(stdout.is_empty(), "no partial output expected\nstdout: {}", stdout);
        assert!(
            stderr.contains(&format!("{name} package is Not Found in your SBOM DOT File.")),
            "stderr: {}",
            stderr
        );
    }
}

/// test_missing_input_file — I/O errors name the file.
#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr) = run_failure(dir.path(), &["-i", "nope.dot", "-p", "glibc"]);
    assert!(stderr.contains("nope.dot"), "stderr: {}", stderr);
}

/// test_malformed_dot — syntax errors carry a line and column.
#[test]
fn test_malformed_dot() {
    let (dir, path) = fixture("digraph {\n  a -> b\n  c -> \n}");
    let (stdout, stderr) = run_failure(dir.path(), &["-i", path.to_str().unwrap(), "-p", "b"]);
    assert!(stdout.is_empty());
    assert!(stderr.contains("line 4"), "stderr: {}", stderr);
}

/// test_required_arguments — both --input-file and --package are required.
#[test]
fn test_required_arguments() {
    let (dir, path) = fixture(SBOM_DOT);
    let (_, stderr) = run_failure(dir.path(), &["-p", "glibc"]);
    assert!(stderr.contains("--input-file"), "stderr: {}", stderr);
    let (_, stderr) = run_failure(dir.path(), &["-i", path.to_str().unwrap()]);
    assert!(stderr.contains("--package"), "stderr: {}", stderr);
}

/// test_closed_stdout_is_not_an_error — a reader that hangs up early (`| head`) does not
/// turn a finished search into a crash.
#[test]
fn test_closed_stdout_is_not_an_error() {
    let mut dot = String::from("digraph {\n");
    for i in 0..20_000 {
        dot.push_str(&format!("  \"pkg-{i}\" -> \"glibc\";\n"));
    }
    dot.push('}');
    let (dir, path) = fixture(&dot);

    let mut child = Command::new(binary())
        .args(["-i", path.to_str().unwrap(), "-p", "glibc"])
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to invoke sbom-rdeps binary");
    drop(child.stdout.take());
    let out = child.wait_with_output().expect("failed to wait for sbom-rdeps");

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(out.status.success(), "status {:?}, stderr: {}", out.status, stderr);
    assert!(!stderr.contains("panicked"), "stderr: {}", stderr);
}

/// test_quoted_name_line_continuation — a backslash-newline inside a quoted name is
/// removed, so the package is found under its joined name.
#[test]
fn test_quoted_name_line_continuation() {
    let (dir, path) = fixture("digraph {\n  \"app\" -> \"lib\\\nfoo\";\n}\n");
    let stdout = run_success(dir.path(), &["-i", path.to_str().unwrap(), "-p", "libfoo"]);
    assert_eq!(stdout, "depth 1 (num 1):\n\t1. app\n");
}
