use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

fn get_cli_binary() -> PathBuf {
    // Cargo builds the binary before integration tests and exports its path
    PathBuf::from(env!("CARGO_BIN_EXE_flight-cli"))
}

fn run(args: &[&str]) -> std::process::Output {
    Command::new(get_cli_binary())
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute command")
}

fn parse_json(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}"))
}

#[test]
fn test_cli_simulate_table() {
    let output = run(&[
        "simulate", "--speed", "150", "--vla", "12", "--hla", "-6", "--spin", "2700", "--axis", "12",
    ]);
    assert!(output.status.success(), "Command should succeed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("FLIGHT SIMULATION"));
    assert!(stdout.contains("Carry"));
}

#[test]
fn test_cli_simulate_json() {
    let output = run(&[
        "simulate", "-s", "60.3", "-v", "31", "--hla", "0.6", "-r", "4487", "-a", "2.5", "-o", "json",
    ]);
    assert!(output.status.success());
    let json = parse_json(&output);
    let carry = json[0]["calibrated_carry_yd"].as_f64().unwrap();
    assert!((carry - 63.8).abs() < 63.8 * 0.15, "carry {carry}");
}

#[test]
fn test_cli_simulate_csv_input() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "ball_speed,vla,hla,total_spin,spin_axis").unwrap();
    writeln!(file, "150.0,12.0,-6.0,2700,12.0").unwrap();
    writeln!(file, "0.0,12.0,0.0,2700,0.0").unwrap();
    file.flush().unwrap();

    let output = run(&["simulate", "--input", file.path().to_str().unwrap(), "-o", "csv"]);
    assert!(output.status.success(), "{:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("ball_speed_mph,"));
    assert!(lines[2].contains(",0.0,"));
}

#[test]
fn test_cli_predict_json() {
    let output = run(&["predict", "--speed", "156.09", "--vla", "10.175", "--spin", "2784.2", "-o", "json"]);
    assert!(output.status.success());
    let json = parse_json(&output);
    assert_eq!(json["regime"], "DRIVER_LOW_VLA");
    let total = json["predicted_total_yd"].as_f64().unwrap();
    assert!((total - 256.84).abs() < 1e-6);
}

#[test]
fn test_cli_predict_rejects_zero_speed() {
    let output = run(&["predict", "--speed", "0", "--vla", "12", "--spin", "2500"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid measurement"), "{stderr}");
    assert!(stderr.contains("ball_speed"), "{stderr}");
    assert!(!stderr.contains("InvalidMeasurement {"), "{stderr}");
}

#[test]
fn test_cli_fit_writes_config() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("shots.csv");
    let out = dir.path().join("model.json");
    std::fs::write(
        &data,
        "Date,Club,Carry,Total,Side,Ball Speed,Spin,Spin Axis,VLA,HLA\n\
         d,PW,58,62.0,0,55.0,8000,1,30.0,0\n\
         d,PW,62,66.0,0,58.0,7600,1,28.0,0\n\
         d,7i,150,160.0,0,95.0,6200,1,18.0,0\n",
    )
    .unwrap();

    let output = run(&[
        "fit",
        "--data",
        data.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
        "-o",
        "json",
    ]);
    assert!(output.status.success(), "{:?}", output);
    let json = parse_json(&output);
    assert_eq!(json["regimes"].as_array().unwrap().len(), 5);
    assert_eq!(json["config"]["version"], 2);

    let saved = golf_flight_engine::ModelConfig::load_json(&out).unwrap();
    assert_eq!(saved.version, 2);
    assert!((saved.regimes.iron.avg_total - 160.0).abs() < 1e-9);
}

#[test]
fn test_cli_validate_physics_reference() {
    let output = run(&["validate", "--mode", "physics", "-o", "json"]);
    assert!(output.status.success(), "{:?}", output);
    let json = parse_json(&output);
    assert_eq!(json["overall"]["shots"], 2);
    assert_eq!(json["overall"]["passed"], 2);
}

#[test]
fn test_cli_validate_empirical_requires_data() {
    let output = run(&["validate"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_config_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(&path, r#"{"version": 42}"#).unwrap();

    let output = run(&["info", "--config", path.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("42"));
    assert!(stdout.contains("DRIVER_LOW_VLA"));

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, r#"{"calibration": []}"#).unwrap();
    let output = run(&["info", "--config", bad.to_str().unwrap()]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_help() {
    let output = run(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["simulate", "predict", "fit", "validate", "info"] {
        assert!(stdout.contains(command), "Should list {command} command");
    }
}

#[test]
fn test_cli_invalid_command() {
    let output = run(&["invalid-command"]);
    assert!(!output.status.success(), "Invalid command should fail");
}

#[test]
fn test_cli_missing_required_args() {
    let output = run(&["simulate", "--speed", "150"]);
    assert!(!output.status.success(), "Should fail without vla and spin");
}
