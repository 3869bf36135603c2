use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn run_command(args: &[&str], test_dir: &str) -> (Option<i32>, String, String) {
    // Use cargo run which will build if needed
    // Set FAB_DIR in the environment for the subprocess
    let output = Command::new("cargo")
        .args(["run", "--quiet", "--bin", "fab-updater", "--"])
        .args(args)
        .env("FAB_DIR", test_dir)
        .env_remove("RUST_LOG")
        .current_dir(env::current_dir().unwrap())
        .output()
        .expect("Failed to execute command");

    let code = output.status.code();
    let stdout = String::from_utf8(output.stdout).unwrap_or_default();
    let stderr = String::from_utf8(output.stderr).unwrap_or_default();

    // Filter out cargo compilation messages from stderr
    let filtered_stderr: String = stderr
        .lines()
        .filter(|line| {
            !line.contains("Compiling")
                && !line.contains("Finished")
                && !line.contains("warning:")
                && !line.contains("note:")
        })
        .collect::<Vec<_>>()
        .join("\n");

    (code, stdout, filtered_stderr)
}

fn setup_test_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Point the settings at an address nothing listens on
fn use_unreachable_api(test_dir: &str) {
    let path = format!("{}/fab-updater.toml", test_dir);
    let content = fs::read_to_string(&path).unwrap();
    let content = content.replace(
        "[repository]",
        "[repository]\napi_base = \"http://127.0.0.1:1\"",
    );
    fs::write(&path, content).unwrap();
}

#[test]
fn test_init_creates_settings() {
    let temp_dir = setup_test_dir();
    let test_dir = temp_dir.path().to_str().unwrap();

    let (code, stdout, stderr) = run_command(&["init"], test_dir);

    assert_eq!(code, Some(0), "Init should succeed. stderr: {}", stderr);
    assert!(
        stdout.contains("Initialized"),
        "Expected 'Initialized' in output: {}",
        stdout
    );

    let settings_path = format!("{}/fab-updater.toml", test_dir);
    assert!(Path::new(&settings_path).exists());

    let content = fs::read_to_string(&settings_path).unwrap();
    assert!(content.contains("[repository]"));
    assert!(content.contains("amitjha329"));
    assert!(content.contains("floating-action-button"));
}

#[test]
fn test_init_skips_if_exists() {
    let temp_dir = setup_test_dir();
    let test_dir = temp_dir.path().to_str().unwrap();

    run_command(&["init"], test_dir);
    let (code, stdout, _) = run_command(&["init"], test_dir);

    assert_eq!(code, Some(0));
    assert!(
        stdout.contains("Skipping"),
        "Expected 'Skipping' in output: {}",
        stdout
    );
}

#[test]
fn test_check_without_settings_fails() {
    let temp_dir = setup_test_dir();
    let test_dir = temp_dir.path().to_str().unwrap();

    let (code, _, stderr) = run_command(&["check"], test_dir);

    assert_eq!(code, Some(2));
    assert!(
        stderr.contains("Run 'fab-updater init' first"),
        "Expected init hint in stderr: {}",
        stderr
    );
}

#[test]
fn test_check_with_unreachable_api_reports_no_update() {
    let temp_dir = setup_test_dir();
    let test_dir = temp_dir.path().to_str().unwrap();

    run_command(&["init"], test_dir);
    use_unreachable_api(test_dir);

    let (code, _, stderr) = run_command(&["check"], test_dir);
    assert_eq!(code, Some(0), "A failed lookup is not fatal. stderr: {}", stderr);
    assert!(
        stderr.contains("Release lookup failed"),
        "Expected lookup failure notice: {}",
        stderr
    );

    // The failure is cached under the namespaced key
    let cache_files: Vec<_> = fs::read_dir(temp_dir.path().join(".fab-cache"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(cache_files.len(), 1);
    assert!(cache_files[0].starts_with("fab_github_update_"));

    let (code, stdout, _) = run_command(&["clear-cache"], test_dir);
    assert_eq!(code, Some(0));
    assert!(stdout.contains("Update cache cleared"));
    assert_eq!(
        fs::read_dir(temp_dir.path().join(".fab-cache")).unwrap().count(),
        0
    );
}

#[test]
fn test_debug_prints_snapshot_json() {
    let temp_dir = setup_test_dir();
    let test_dir = temp_dir.path().to_str().unwrap();

    run_command(&["init"], test_dir);
    use_unreachable_api(test_dir);

    let (code, stdout, stderr) = run_command(&["debug"], test_dir);
    assert_eq!(code, Some(0), "stderr: {}", stderr);

    let snapshot: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(snapshot["config"]["current_version"], "0.0.0");
    assert_eq!(snapshot["config"]["cache_ttl"], 7200);
    assert_eq!(snapshot["live"]["status"], "fetch_failed");
    assert_eq!(snapshot["update_available"], false);
}
