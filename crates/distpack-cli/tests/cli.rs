//! End-to-end tests of the `distpack` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn distpack() -> Command {
    let mut cmd = Command::cargo_bin("distpack").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

fn put(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    for file in [
        "package.json",
        "src/typescript.js",
        "src/loaders/uncacheable.js",
        "src/loaders/empty-loader.js",
        "src/loaders/notfound-loader.js",
        "src/@@notfound.js",
    ] {
        put(temp.path(), file, "{}");
    }
    temp
}

#[test]
fn test_help_lists_commands() {
    distpack()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("plan"));
}

#[test]
fn test_build_help_lists_switches() {
    distpack()
        .args(["build", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-minify"))
        .stdout(predicate::str::contains("--no-v8cache"))
        .stdout(predicate::str::contains("--no-cache"))
        .stdout(predicate::str::contains("--no-babel"));
}

#[test]
fn test_plan_prints_expected_outputs() {
    let temp = project();

    distpack()
        .arg("plan")
        .arg("--cwd")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("dist/ncc/cli.js"))
        .stdout(predicate::str::contains("dist/ncc/loaders/ts-loader.js"))
        .stdout(predicate::str::contains("src/sourcemap-register.js.cache.js"));
}

#[test]
fn test_plan_json() {
    let temp = project();

    let output = distpack()
        .args(["plan", "--json", "--cwd"])
        .arg(temp.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan[0]["path"], "dist/ncc/cli.js");
    assert_eq!(plan[0]["optional"], false);
}

#[test]
fn test_unknown_config_key_fails() {
    let temp = project();
    put(temp.path(), "distpack.config.json", r#"{ "outdir": "x" }"#);

    distpack()
        .arg("plan")
        .arg("--cwd")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[cfg(unix)]
mod bridge {
    use super::*;

    /// A bundler bridge that echoes the target file name as its code.
    const BRIDGE: &str = r#"req=$(cat)
name=$(printf '%s' "$req" | sed -n 's/.*"filename":"\([^"]*\)".*/\1/p')
if [ "$name" = "$FAIL_ON" ]; then
  echo "Module not found: $name" >&2
  exit 1
fi
printf '{"code":"// %s","assets":{}}' "$name"
"#;

    fn bridged_project() -> TempDir {
        let temp = project();
        put(temp.path(), "bridge.sh", BRIDGE);
        put(
            temp.path(),
            "distpack.config.json",
            r#"{ "bundler": { "command": ["sh", "bridge.sh"] } }"#,
        );
        temp
    }

    #[test]
    fn test_build_lists_written_files() {
        let temp = bridged_project();

        distpack()
            .arg("build")
            .arg("--cwd")
            .arg(temp.path())
            .env("FAIL_ON", "none")
            .assert()
            .success()
            .stdout(predicate::str::contains("✓ dist/ncc/cli.js ("))
            .stdout(predicate::str::contains("✓ dist/ncc/loaders/stringify-loader.js ("))
            .stderr(predicate::str::contains("Build completed"));

        assert_eq!(
            fs::read_to_string(temp.path().join("dist/ncc/index.js")).unwrap(),
            "// index.js"
        );
    }

    #[test]
    fn test_build_failure_exits_non_zero() {
        let temp = bridged_project();

        distpack()
            .arg("build")
            .arg("--cwd")
            .arg(temp.path())
            .env("FAIL_ON", "relocate-loader.js")
            .assert()
            .failure()
            .stderr(predicate::str::contains("relocate-loader"))
            .stderr(predicate::str::contains("Module not found"));

        assert!(temp.path().join("dist/ncc/index.js").exists());
        assert!(!temp.path().join("dist/ncc/loaders/shebang-loader.js").exists());
    }
}
