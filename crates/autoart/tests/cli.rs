use std::fs;
use std::process::{Command, Output};

use tempfile::TempDir;

fn autoart(config_dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_autoart"))
        .env("AUTOART_CONFIG_DIR", config_dir.path())
        .env_remove("AUTOART_SEED")
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run autoart")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "autoart failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).expect("utf-8 output")
}

#[test]
fn print_is_deterministic_for_a_seed() {
    let config_dir = TempDir::new().unwrap();
    let first = stdout(&autoart(&config_dir, &["print", "--seed", "42"]));
    let second = stdout(&autoart(&config_dir, &["print", "--seed", "42"]));

    assert_eq!(first, second);
    assert!(first.starts_with("SEED: 42\n"));
    assert!(first.contains("// vertex shader"));
    assert!(first.contains("// fragment shader"));
    assert!(first.contains("#version 110"));
    assert!(first.contains("gl_FragColor = vec4(o, 1.0);"));
}

#[test]
fn print_reads_the_settings_file() {
    let config_dir = TempDir::new().unwrap();
    fs::write(
        config_dir.path().join("autoart.toml"),
        "seed = 5\ncolor_model = \"hsv\"\ndimensions = \"4d\"\n",
    )
    .unwrap();

    let output = stdout(&autoart(&config_dir, &["print", "--dialect", "450"]));
    assert!(output.starts_with("SEED: 5\n"));
    assert!(output.contains("#version 450"));
    assert!(output.contains("float H = o.x * 6.0;"));
    assert!(output.contains("#define w params.autoart_w"));
}

#[test]
fn excessive_complexity_is_rejected() {
    let config_dir = TempDir::new().unwrap();
    let output = autoart(&config_dir, &["print", "--seed", "1", "--complexity", "64"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("too high"));
}

#[test]
fn broken_settings_file_is_fatal() {
    let config_dir = TempDir::new().unwrap();
    fs::write(config_dir.path().join("autoart.toml"), "complexity = \"deep\"\n").unwrap();

    let output = autoart(&config_dir, &["print", "--seed", "1"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to parse settings file"));
}
