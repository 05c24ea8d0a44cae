use std::process::{Command, Output};

use serde_json::Value;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dark-snake"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch dark-snake")
}

fn report(args: &[&str]) -> Value {
    let output = run(args);
    assert!(
        output.status.success(),
        "dark-snake failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should hold one JSON report")
}

#[test]
fn fixed_clock_run_reports_its_summary_as_json() {
    let report = report(&["--frames", "120", "--seed", "7", "--snapshot"]);

    assert_eq!(report["seed"], 7);
    let frames = report["summary"]["frames"].as_u64().expect("frame count");
    assert!(frames > 0 && frames <= 120, "unexpected frame count {frames}");
    for counter in ["kills", "bosses_defeated", "items_collected", "lives_lost", "portals_entered"] {
        assert!(report["summary"][counter].is_u64(), "missing counter {counter}");
    }

    let snapshot = &report["snapshot"];
    assert_eq!(snapshot["players"].as_array().map(Vec::len), Some(1));
    assert!(snapshot["hud"]["level"].as_u64() >= Some(1));
    assert!(snapshot["hud"]["lives"].as_u64() <= Some(3));
    assert!(report["leaderboard"].is_array());
}

#[test]
fn same_seed_replays_the_same_game() {
    let args = ["--frames", "300", "--seed", "42", "--snapshot"];
    let first = run(&args);
    let second = run(&args);
    assert!(first.status.success() && second.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn two_player_run_fields_both_snakes() {
    let report = report(&["--players", "2", "--frames", "30", "--seed", "3", "--snapshot"]);
    assert_eq!(report["snapshot"]["players"].as_array().map(Vec::len), Some(2));
}

#[test]
fn plain_run_prints_the_text_summary() {
    let output = run(&["--frames", "60", "--seed", "5"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Score:"), "unexpected output: {stdout}");
    assert!(stdout.contains("Frames:    "));
}

#[test]
fn unsupported_player_count_is_rejected() {
    let output = run(&["--players", "3"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
