//! Integration tests for the `qt` CLI.
//!
//! Each test creates a temp data directory, runs `qt` as a subprocess, and
//! verifies stdout and/or file contents.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Get the path to the built `qt` binary.
fn qt_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("qt");
    path
}

fn qt(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(qt_bin())
        .current_dir(dir)
        .args(args)
        .output()
        .expect("failed to run qt")
}

fn qt_ok(dir: &Path, args: &[&str]) -> String {
    let output = qt(dir, args);
    assert!(
        output.status.success(),
        "qt {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn qt_err(dir: &Path, args: &[&str]) -> String {
    let output = qt(dir, args);
    assert!(!output.status.success(), "qt {:?} unexpectedly succeeded", args);
    String::from_utf8_lossy(&output.stderr).to_string()
}

const TAXONOMY_CSV: &str = "\
Subject,Topic,Subtopic
Math,Algebra,Linear Eqs
Math,Algebra,Quadratics
Math,Geometry,Triangles
Science,Physics,Motion
";

const QUESTIONS_CSV: &str = "\
question,ANSWER
What is 2x = 4?,x = 2
Name a three-sided shape.,Triangle
What is velocity?,Speed with direction
";

/// Initialize a data dir and load the standard fixtures
fn setup(dir: &Path) {
    fs::write(dir.join("taxonomy.csv"), TAXONOMY_CSV).unwrap();
    fs::write(dir.join("questions.csv"), QUESTIONS_CSV).unwrap();
    qt_ok(dir, &["init"]);
    qt_ok(dir, &["taxonomy", "taxonomy.csv"]);
    qt_ok(dir, &["import", "questions.csv"]);
}

#[test]
fn init_creates_data_dir_and_default_workspace() {
    let tmp = TempDir::new().unwrap();
    let out = qt_ok(tmp.path(), &["init"]);
    assert!(out.contains("Active workspace: default"));
    assert!(tmp.path().join("qtag/registry.toml").exists());
    assert!(tmp.path().join("qtag/snapshots/default.json").exists());

    // Second init without --force refuses
    let err = qt_err(tmp.path(), &["init"]);
    assert!(err.contains("already initialized"));
    qt_ok(tmp.path(), &["init", "--force"]);
}

#[test]
fn taxonomy_load_reports_counts_and_rejects_bad_schema() {
    let tmp = TempDir::new().unwrap();
    qt_ok(tmp.path(), &["init"]);

    fs::write(tmp.path().join("tax.csv"), TAXONOMY_CSV).unwrap();
    let out = qt_ok(tmp.path(), &["taxonomy", "tax.csv"]);
    assert!(out.contains("4 subject-topic-subtopic combinations"));
    assert!(out.contains("2 subjects"));

    fs::write(tmp.path().join("bad.csv"), "Subject,Topic\nMath,Algebra\n").unwrap();
    let err = qt_err(tmp.path(), &["taxonomy", "bad.csv"]);
    assert!(err.contains("Subtopic"));
}

#[test]
fn import_rejects_missing_columns_listing_found() {
    let tmp = TempDir::new().unwrap();
    qt_ok(tmp.path(), &["init"]);

    fs::write(tmp.path().join("q.csv"), "Prompt,Answer\np,a\n").unwrap();
    let err = qt_err(tmp.path(), &["import", "q.csv"]);
    assert!(err.contains("Missing: Question"));
    assert!(err.contains("Prompt, Answer"));
}

#[test]
fn tag_set_cascades_and_persists() {
    let tmp = TempDir::new().unwrap();
    setup(tmp.path());

    qt_ok(tmp.path(), &["tag", "set", "0", "0", "subject", "Math"]);
    qt_ok(tmp.path(), &["tag", "set", "0", "0", "topic", "Algebra"]);
    qt_ok(
        tmp.path(),
        &["tag", "set", "0", "0", "subtopic", "Linear Eqs"],
    );

    // Changing the subject clears topic and subtopic
    let out = qt_ok(tmp.path(), &["tag", "set", "0", "0", "subject", "Science"]);
    assert!(out.contains("Science > (unset) > (unset)"));

    // Persisted across invocations
    let out = qt_ok(tmp.path(), &["show", "0"]);
    assert!(out.contains("Science > (unset) > (unset)"));
}

#[test]
fn tag_set_rejects_values_outside_taxonomy() {
    let tmp = TempDir::new().unwrap();
    setup(tmp.path());

    let err = qt_err(tmp.path(), &["tag", "set", "0", "0", "subject", "History"]);
    assert!(err.contains("not a subject option"));

    qt_ok(tmp.path(), &["tag", "set", "0", "0", "subject", "Math"]);
    // Physics is a Science topic, not a Math one
    let err = qt_err(tmp.path(), &["tag", "set", "0", "0", "topic", "Physics"]);
    assert!(err.contains("not a topic option"));
}

#[test]
fn tag_rm_keeps_last_mapping() {
    let tmp = TempDir::new().unwrap();
    setup(tmp.path());

    let err = qt_err(tmp.path(), &["tag", "rm", "1", "0"]);
    assert!(err.contains("only mapping"));

    qt_ok(tmp.path(), &["tag", "add", "1"]);
    let out = qt_ok(tmp.path(), &["tag", "rm", "1", "0"]);
    assert!(out.contains("1 mappings"));
}

#[test]
fn stats_counts_complete_mappings() {
    let tmp = TempDir::new().unwrap();
    setup(tmp.path());

    qt_ok(tmp.path(), &["tag", "set", "0", "0", "subject", "Math"]);
    qt_ok(tmp.path(), &["tag", "set", "0", "0", "topic", "Geometry"]);
    qt_ok(
        tmp.path(),
        &["tag", "set", "0", "0", "subtopic", "Triangles"],
    );
    qt_ok(tmp.path(), &["tag", "set", "1", "0", "subject", "Math"]);

    let out = qt_ok(tmp.path(), &["stats", "--json"]);
    let stats: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(stats["questions"], 3);
    assert_eq!(stats["tagged_mappings"], 1);
    assert_eq!(stats["total_mappings"], 3);
}

#[test]
fn export_emits_one_row_per_mapping_and_placeholders() {
    let tmp = TempDir::new().unwrap();
    setup(tmp.path());

    // Question 0 gets two mappings, question 1 a partial one plus an empty
    // one, question 2 is left untouched
    qt_ok(tmp.path(), &["tag", "set", "0", "0", "subject", "Math"]);
    qt_ok(tmp.path(), &["tag", "set", "0", "0", "topic", "Algebra"]);
    qt_ok(
        tmp.path(),
        &["tag", "set", "0", "0", "subtopic", "Linear Eqs"],
    );
    qt_ok(tmp.path(), &["tag", "add", "0"]);
    qt_ok(tmp.path(), &["tag", "set", "0", "1", "subject", "Science"]);
    qt_ok(tmp.path(), &["tag", "set", "1", "0", "subject", "Math"]);
    qt_ok(tmp.path(), &["tag", "add", "1"]);

    qt_ok(tmp.path(), &["export", "out.csv"]);
    let content = fs::read_to_string(tmp.path().join("out.csv")).unwrap();
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(lines[0], "Question,Answer,Subject,Topic,Subtopic");
    // 2 rows for q0, 2 for q1 (its untouched mapping still emits a row),
    // 1 placeholder for the fully untagged q2
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[1], "What is 2x = 4?,x = 2,Math,Algebra,Linear Eqs");
    assert_eq!(lines[2], "What is 2x = 4?,x = 2,Science,,");
    assert_eq!(lines[3], "Name a three-sided shape.,Triangle,Math,,");
    assert_eq!(lines[4], "Name a three-sided shape.,Triangle,,,");
    assert_eq!(lines[5], "What is velocity?,Speed with direction,,,");
}

#[test]
fn workspace_switching_is_a_saved_transaction() {
    let tmp = TempDir::new().unwrap();
    setup(tmp.path());

    qt_ok(tmp.path(), &["tag", "set", "0", "0", "subject", "Math"]);
    qt_ok(tmp.path(), &["ws", "new", "second"]);
    qt_ok(tmp.path(), &["ws", "use", "second"]);

    // The new workspace is empty and independent
    let out = qt_ok(tmp.path(), &["stats", "--json"]);
    let stats: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(stats["workspace"], "second");
    assert_eq!(stats["questions"], 0);

    // Switching back restores the tagged state
    qt_ok(tmp.path(), &["ws", "use", "default"]);
    let out = qt_ok(tmp.path(), &["show", "0"]);
    assert!(out.contains("Math > (unset) > (unset)"));
}

#[test]
fn ws_new_rejects_duplicates_and_lists_active() {
    let tmp = TempDir::new().unwrap();
    setup(tmp.path());

    let err = qt_err(tmp.path(), &["ws", "new", "default"]);
    assert!(err.contains("already exists"));

    qt_ok(tmp.path(), &["ws", "new", "extra"]);
    let out = qt_ok(tmp.path(), &["ws", "list", "--json"]);
    let list: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(list["active"], "default");
    assert_eq!(list["workspaces"][0], "default");
    assert_eq!(list["workspaces"][1], "extra");
}

#[test]
fn ws_clear_removes_snapshot_and_registry_entry() {
    let tmp = TempDir::new().unwrap();
    setup(tmp.path());
    qt_ok(tmp.path(), &["ws", "new", "doomed"]);
    assert!(tmp.path().join("qtag/snapshots/doomed.json").exists());

    qt_ok(tmp.path(), &["ws", "clear", "doomed"]);
    assert!(!tmp.path().join("qtag/snapshots/doomed.json").exists());
    let err = qt_err(tmp.path(), &["ws", "use", "doomed"]);
    assert!(err.contains("no workspace named"));
}

#[test]
fn clearing_the_last_workspace_recreates_default() {
    let tmp = TempDir::new().unwrap();
    qt_ok(tmp.path(), &["init"]);

    let out = qt_ok(tmp.path(), &["ws", "clear", "default"]);
    assert!(out.contains("now on 'default'"));

    // The active workspace is registered again, with a snapshot to match
    let out = qt_ok(tmp.path(), &["ws", "list", "--json"]);
    let list: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(list["active"], "default");
    assert_eq!(list["workspaces"][0], "default");
    assert!(tmp.path().join("qtag/snapshots/default.json").exists());
}

#[test]
fn clearing_the_active_workspace_moves_to_the_next() {
    let tmp = TempDir::new().unwrap();
    qt_ok(tmp.path(), &["init"]);
    qt_ok(tmp.path(), &["ws", "new", "second"]);
    qt_ok(tmp.path(), &["ws", "use", "second"]);

    let out = qt_ok(tmp.path(), &["ws", "clear", "second"]);
    assert!(out.contains("now on 'default'"));
    let out = qt_ok(tmp.path(), &["ws", "list", "--json"]);
    let list: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(list["active"], "default");
}

#[test]
fn check_reports_stale_mappings_after_taxonomy_change() {
    let tmp = TempDir::new().unwrap();
    setup(tmp.path());

    qt_ok(tmp.path(), &["tag", "set", "0", "0", "subject", "Science"]);
    qt_ok(tmp.path(), &["tag", "set", "0", "0", "topic", "Physics"]);

    // Shrink the taxonomy so the Science mapping goes stale
    fs::write(
        tmp.path().join("tax2.csv"),
        "Subject,Topic,Subtopic\nMath,Algebra,Linear Eqs\n",
    )
    .unwrap();
    qt_ok(tmp.path(), &["taxonomy", "tax2.csv"]);

    let out = qt_ok(tmp.path(), &["check"]);
    assert!(out.contains("subject 'Science' is not in the taxonomy"));
    assert!(out.contains("1 stale mapping(s)"));

    // Stale mappings are flagged in listings, not hidden
    let out = qt_ok(tmp.path(), &["show", "0"]);
    assert!(out.contains("Science > Physics > (unset)  ?"));
}

#[test]
fn backup_and_restore_round_trip() {
    let tmp = TempDir::new().unwrap();
    setup(tmp.path());
    qt_ok(tmp.path(), &["tag", "set", "2", "0", "subject", "Science"]);

    qt_ok(tmp.path(), &["backup", "backup.json"]);

    // Wipe the workspace by re-importing, then restore
    qt_ok(tmp.path(), &["import", "questions.csv"]);
    let out = qt_ok(tmp.path(), &["show", "2"]);
    assert!(out.contains("(unset) > (unset) > (unset)"));

    qt_ok(tmp.path(), &["restore", "backup.json"]);
    let out = qt_ok(tmp.path(), &["show", "2"]);
    assert!(out.contains("Science > (unset) > (unset)"));
}

#[test]
fn restore_rejects_corrupt_backup() {
    let tmp = TempDir::new().unwrap();
    setup(tmp.path());
    fs::write(tmp.path().join("junk.json"), "not a snapshot").unwrap();
    let err = qt_err(tmp.path(), &["restore", "junk.json"]);
    assert!(err.contains("not a valid snapshot"));
}

#[test]
fn corrupt_snapshot_is_treated_as_absent() {
    let tmp = TempDir::new().unwrap();
    setup(tmp.path());
    fs::write(tmp.path().join("qtag/snapshots/default.json"), "{{{").unwrap();

    // The session still works; the workspace just starts fresh
    let out = qt_ok(tmp.path(), &["stats", "--json"]);
    let stats: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(stats["questions"], 0);
}

#[test]
fn data_dir_override_flag() {
    let tmp = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    fs::write(elsewhere.path().join("q.csv"), QUESTIONS_CSV).unwrap();

    let dir_arg = elsewhere.path().to_str().unwrap().to_string();
    qt_ok(tmp.path(), &["init", "-C", &dir_arg]);
    assert!(elsewhere.path().join("qtag/registry.toml").exists());

    qt_ok(elsewhere.path(), &["import", "q.csv"]);
    let out = qt_ok(tmp.path(), &["stats", "--json", "-C", &dir_arg]);
    let stats: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(stats["questions"], 3);
}
