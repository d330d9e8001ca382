use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const CLEAN_JS: &str = "var total = 1;\nconsole.log(total);\n";
const DIRTY_JS: &str = "if (a == b) {\n    run();\n}\n";

fn cmd() -> assert_cmd::Command {
    let mut c = cargo_bin_cmd!("treelint");
    c.env_remove("TREELINT_OPTIONS").arg("--no-color");
    c
}

#[test]
fn test_clean_tree_succeeds() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("lib")).unwrap();
    fs::write(dir.path().join("lib/a.js"), CLEAN_JS).unwrap();
    fs::write(dir.path().join("config.json"), "{\"debug\": false}\n").unwrap();

    cmd()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Lint OK:"))
        .stdout(predicate::str::contains("2/2 passed"))
        .stdout(predicate::str::contains(
            "Date, Total LOC, Scanned LOC, L1 Violations, L2 Violations",
        ));
}

#[test]
fn test_violations_fail_the_run() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("dirty.js");
    fs::write(&file, DIRTY_JS).unwrap();

    cmd()
        .arg(&file)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Found errors in:"))
        .stdout(predicate::str::contains("==Error(s)=="))
        .stdout(predicate::str::contains("(line 1 character 7)"));
}

#[test]
fn test_missing_path_is_reported() {
    let dir = TempDir::new().unwrap();

    cmd()
        .arg(dir.path().join("nowhere"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("cannot find path"))
        .stdout(predicate::str::contains("0/1 passed"));
}

#[test]
fn test_blocking_mode_matches() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.js"), CLEAN_JS).unwrap();
    fs::write(dir.path().join("b.js"), DIRTY_JS).unwrap();
    fs::write(dir.path().join("notes.txt"), "plain text\n").unwrap();

    cmd()
        .arg("--blocking")
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("1/3 passed"))
        .stdout(predicate::str::contains("ignored unsupported file type"));
}

#[test]
fn test_options_relax_rules() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("dirty.js");
    fs::write(&file, DIRTY_JS).unwrap();
    let options = dir.path().join("lint.toml");
    fs::write(&options, "eqeq = true\n").unwrap();

    cmd()
        .arg("--options")
        .arg(&options)
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("eqeq = true"));

    cmd()
        .args(["--enable", "eqeq"])
        .arg(&file)
        .assert()
        .success();
}

#[test]
fn test_summary_file_is_written() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.js"), CLEAN_JS).unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["--summary", "a.js"])
        .assert()
        .success();

    let summary = fs::read_to_string(dir.path().join("lint_reports/all_summary.csv")).unwrap();
    assert!(summary.ends_with(", 2, 2, 0, 0"), "unexpected summary: {}", summary);
}

#[test]
fn test_quiet_prints_only_summary() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.js"), DIRTY_JS).unwrap();

    cmd()
        .arg("--quiet")
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Found errors").not())
        .stdout(predicate::str::contains("L2 Violations"));
}

#[test]
fn test_watch_rejects_directories() {
    let dir = TempDir::new().unwrap();

    cmd()
        .arg("--watch")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not supported for directories"));
}

#[test]
fn test_nothing_to_check() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to check"));
}

#[test]
fn test_browser_switch_keeps_json_validation() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("data.json"), "{\n\t\"name\": \"demo\"\n}\n").unwrap();
    fs::write(dir.path().join("broken.json"), "{\"name\": }\n").unwrap();

    cmd()
        .args(["--enable", "browser"])
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("1/2 passed"))
        .stdout(predicate::str::contains("JSON: bad."));
}
