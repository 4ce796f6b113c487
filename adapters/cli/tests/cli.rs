use std::{
    path::PathBuf,
    process::{Command, Output},
};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hungry-worm"))
        .current_dir(workspace_root())
        .args(args)
        .output()
        .expect("failed to invoke hungry-worm binary")
}

#[test]
fn paused_run_reports_json_summary() {
    let output = run_cli(&[
        "--level",
        "levels/meadow.toml",
        "--seed",
        "3",
        "--duration",
        "1",
        "--input",
        "0:pause",
        "--json",
    ]);
    assert!(output.status.success(), "cli failed: {output:?}");

    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("summary is valid json");
    assert_eq!(summary["level"], "meadow");
    assert_eq!(summary["state"], "paused");
    assert_eq!(summary["score"], 0);
    assert_eq!(summary["deaths"], 0);
    assert_eq!(summary["simulation_seconds"], 0.0);
    assert_eq!(summary["creature"]["length"], 1);
    assert_eq!(summary["entities"], 2);
}

#[test]
fn identical_scripts_produce_identical_summaries() {
    let args = [
        "--level",
        "levels/meadow.toml",
        "--seed",
        "11",
        "--duration",
        "12",
        "--frame",
        "0.05",
        "--input",
        "0:right",
        "--input",
        "2.5:down",
        "--input",
        "5:left",
        "--input",
        "7.5:up",
        "--input",
        "9:restart",
        "--json",
    ];

    let first = run_cli(&args);
    let second = run_cli(&args);

    assert!(first.status.success(), "cli failed: {first:?}");
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn missing_level_fails_with_context() {
    let output = run_cli(&["--level", "levels/does-not-exist.toml"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to load level"),
        "unexpected stderr: {stderr}"
    );
}
