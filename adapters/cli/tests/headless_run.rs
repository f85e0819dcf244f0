use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_biscuit-battle"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch biscuit-battle binary")
}

fn summary(output: &Output) -> String {
    assert!(
        output.status.success(),
        "run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).expect("summary is utf-8")
}

#[test]
fn mash_scenario_wins_the_only_biscuit() {
    let stdout = summary(&run(&[
        "--scenario",
        "mash",
        "--biscuits",
        "1",
        "--frames",
        "600",
    ]));

    assert!(stdout.contains("wins: 1"), "unexpected summary:\n{stdout}");
    assert!(stdout.contains("score: 1"), "unexpected summary:\n{stdout}");
    assert!(stdout.contains("consumed: 0"), "unexpected summary:\n{stdout}");
}

#[test]
fn bundled_config_matches_defaults() {
    let config = concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml");
    let with_file = summary(&run(&[
        "--config", config, "--scenario", "idle", "--frames", "300", "--seed", "3",
    ]));
    let without = summary(&run(&["--scenario", "idle", "--frames", "300", "--seed", "3"]));

    assert_eq!(with_file, without);
    assert!(with_file.contains("consumed: 1"), "unexpected summary:\n{with_file}");
}

#[test]
fn invalid_config_is_reported() {
    let dir = std::env::temp_dir().join(format!("biscuit-battle-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("negative.toml");
    std::fs::write(&path, "[arbitration]\nclaim_duration = -3.0\n").expect("write config");

    let output = run(&["--config", path.to_str().expect("utf-8 path"), "--frames", "1"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("arbitration.claim_duration"),
        "unexpected stderr:\n{stderr}"
    );
}
