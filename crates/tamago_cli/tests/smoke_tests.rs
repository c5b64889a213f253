//! CLI smoke tests: verify basic binary behavior.

use std::io::Write;
use std::process::{Command, Stdio};

fn cli_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tamago"));
    cmd.env_remove("TAMAGO_NAME").env_remove("TAMAGO_CONFIG");
    cmd
}

fn run_with_input(args: &[&str], input: &str) -> std::process::Output {
    let mut child = cli_bin()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run");
    // The binary may exit before reading everything, e.g. on a bad config.
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .ok();
    child.wait_with_output().expect("failed to wait")
}

#[test]
fn test_help_flag() {
    let output = cli_bin().arg("--help").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"), "Expected usage info in --help output");
    assert!(stdout.contains("--death-policy"));
}

#[test]
fn test_version_flag() {
    let output = cli_bin().arg("--version").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tamago"), "Expected binary name in --version output");
}

#[test]
fn test_bad_death_policy_is_rejected() {
    let output = cli_bin()
        .args(["--death-policy", "sometimes"])
        .output()
        .expect("failed to run");
    assert!(!output.status.success());
}

#[test]
fn test_status_then_quit() {
    let output = run_with_input(
        &["--config", "/tmp/nonexistent_tamago_config_12345.toml", "--name", "Jack"],
        "status\nquit\n",
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Name: Jack"), "stdout was: {stdout}");
    assert!(stdout.contains("Life Stage: Child"));
    assert!(stdout.contains("Goodbye!"));
}

#[test]
fn test_name_prompt_and_json_status() {
    let output = run_with_input(
        &["--config", "/tmp/nonexistent_tamago_config_12345.toml", "--json"],
        "Mochi\nstatus\n",
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("What would you like to name your pet?"));
    assert!(stdout.contains("\"name\": \"Mochi\""), "stdout was: {stdout}");
}

#[test]
fn test_feeding_a_full_pet() {
    let output = run_with_input(&["--name", "Jack"], "feed\ndance\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Jack doesn't need that right now (Hunger is full)."));
    assert!(stdout.contains("unknown command \"dance\""));
}

#[test]
fn test_malformed_config_is_fatal() {
    let path = std::env::temp_dir().join(format!(
        "tamago_smoke_bad_config_{}.toml",
        std::process::id()
    ));
    std::fs::write(
        &path,
        "[[stages]]\nstage = \"child\"\nincrease = [5, 5, \"x\", 5]\n",
    )
    .expect("failed to write config");

    let output = run_with_input(&["--config", path.to_str().unwrap(), "--name", "Jack"], "quit\n");
    std::fs::remove_file(&path).ok();

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Say hello"), "stdout was: {stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid config file"), "stderr was: {stderr}");
}

#[test]
fn test_name_from_environment_skips_prompt() {
    let output = cli_bin()
        .env("TAMAGO_NAME", "Pip")
        .stdin(Stdio::null())
        .output()
        .expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("What would you like to name your pet?"));
    assert!(stdout.contains("Say hello to Pip!"), "stdout was: {stdout}");
}
