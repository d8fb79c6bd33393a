//! CLI integration tests for all subcommands.
//!
//! Uses `assert_cmd` to spawn the `willsuite` binary and verify
//! exit codes, stdout content, and stderr content.
//!
//! Tests set `current_dir` to the workspace root so that relative
//! paths to `fixtures/` resolve correctly.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Locate the workspace root by walking up from CARGO_MANIFEST_DIR.
fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    // crates/cli -> workspace root is two levels up
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

fn fixture(name: &str) -> String {
    workspace_root()
        .join("fixtures")
        .join(name)
        .display()
        .to_string()
}

/// Helper: create a Command for the `willsuite` binary, rooted at workspace.
fn willsuite() -> Command {
    let mut cmd = cargo_bin_cmd!("willsuite");
    cmd.current_dir(workspace_root());
    cmd.env_remove("WILLSUITE_LOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("bad JSON ({}): {}", e, stdout))
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    willsuite()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Will questionnaire toolchain"));
}

#[test]
fn version_exits_0() {
    willsuite()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("willsuite"));
}

#[test]
fn no_subcommand_is_a_usage_error() {
    willsuite().assert().failure().code(2);
}

// ──────────────────────────────────────────────
// 2. Render
// ──────────────────────────────────────────────

#[test]
fn render_formats_amounts() {
    willsuite()
        .args([
            "render",
            "I give {{field:giftAmount:formattedAmount}} to {{field:giftRecipient}}.",
            "--answers",
            "fixtures/answers.json",
        ])
        .assert()
        .success()
        .stdout("I give £2,500.00 to Oxfam.\n");
}

#[test]
fn render_unresolved_placeholder_uses_fallback_and_notes_it() {
    willsuite()
        .args([
            "render",
            "Pets go to {{field:petCarer|my family}}.",
            "--answers",
            "fixtures/answers.json",
        ])
        .assert()
        .success()
        .stdout("Pets go to my family.\n")
        .stderr(predicate::str::contains("unresolved placeholder 'petCarer'"));
}

#[test]
fn render_template_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("clause.txt");
    fs::write(&path, "My trustees may apply it for {{field:trustPurposes:selectedPurposes}}.").unwrap();

    willsuite()
        .args(["render", "--template-file"])
        .arg(&path)
        .args(["--answers", "fixtures/answers.json"])
        .assert()
        .success()
        .stdout("My trustees may apply it for education and maintenance.\n");
}

#[test]
fn render_json_output_includes_diagnostics() {
    let output = willsuite()
        .args([
            "--output",
            "json",
            "render",
            "{{field:nobody}}",
            "--answers",
            "fixtures/answers.json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["text"], "");
    assert_eq!(json["diagnostics"]["unresolvedPaths"][0], "nobody");
}

#[test]
fn render_without_template_exits_1() {
    willsuite()
        .args(["render", "--answers", "fixtures/answers.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("provide a template"));
}

#[test]
fn render_answers_not_an_object_exits_1() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("answers.json");
    fs::write(&path, "[1, 2]").unwrap();

    willsuite()
        .args(["render", "x", "--answers"])
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("array"));
}

// ──────────────────────────────────────────────
// 3. Eval
// ──────────────────────────────────────────────

#[test]
fn eval_complete_answers() {
    willsuite()
        .args(["eval", "fixtures/will-form.json", "--answers", "fixtures/answers.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[1] Personal Information (complete)"))
        .stdout(predicate::str::contains("form complete"));
}

#[test]
fn eval_partial_answers_reports_next_step() {
    willsuite()
        .args([
            "eval",
            "fixtures/will-form.json",
            "--answers",
            "fixtures/answers-partial.json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("[3] Executors (incomplete)"))
        .stdout(predicate::str::contains("missing: executorsSection"))
        .stdout(predicate::str::contains("next step: 3"));
}

#[test]
fn eval_json_output() {
    let output = willsuite()
        .args([
            "--output",
            "json",
            "eval",
            "fixtures/will-form.json",
            "--answers",
            "fixtures/answers-partial.json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["progress"]["complete"], false);
    assert_eq!(json["progress"]["firstIncomplete"], 2);
    assert_eq!(json["visibility"]["partnerName"], false);
    assert_eq!(json["visibility"]["noChildrenNote"], true);
}

#[test]
fn eval_nonexistent_form_exits_1() {
    willsuite()
        .args(["eval", "fixtures/nope.json", "--answers", "fixtures/answers.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error reading form file"));
}

#[test]
fn eval_missing_answers_flag_exits_with_clap_error() {
    willsuite()
        .args(["eval", "fixtures/will-form.json"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn eval_form_without_sections_exits_1() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("form.json");
    fs::write(&path, r#"{"formTitle": "Empty"}"#).unwrap();

    willsuite()
        .arg("eval")
        .arg(&path)
        .args(["--answers", "fixtures/answers.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("formSections"));
}

// ──────────────────────────────────────────────
// 4. Clauses
// ──────────────────────────────────────────────

#[test]
fn clauses_are_numbered_in_form_order() {
    willsuite()
        .args([
            "clauses",
            "fixtures/will-form.json",
            "--answers",
            "fixtures/answers.json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "1. I, Jane Doe of 1 High Street, Bath, revoke all former wills",
        ))
        .stdout(predicate::str::contains("5. I give £2,500.00 to Oxfam free of tax."))
        .stdout(predicate::str::contains(
            "7. I give the residue of my estate to my husband John Doe.",
        ));
}

#[test]
fn clauses_json_output() {
    let output = willsuite()
        .args([
            "--output",
            "json",
            "clauses",
            "fixtures/will-form.json",
            "--answers",
            "fixtures/answers.json",
            "--drop-unresolved",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    let clauses = json["clauses"].as_array().unwrap();
    assert_eq!(clauses.len(), 7);
    assert_eq!(clauses[1]["fieldId"], "maritalStatus");
    assert_eq!(clauses[1]["text"], "I am married to John Doe.");
    assert_eq!(clauses[2]["section"], "Children");
}

#[test]
fn clauses_drop_unresolved_flag_and_config_agree() {
    let tmp = TempDir::new().unwrap();
    let form = tmp.path().join("form.json");
    fs::write(
        &form,
        r#"{"formSections": [{"formSection": "S", "fields": [
            {"id": "a", "willClauseText": "Kept {{field:fullName}}."},
            {"id": "b", "willClauseText": "Broken {{field:}}."}
        ]}]}"#,
    )
    .unwrap();

    willsuite()
        .arg("clauses")
        .arg(&form)
        .args(["--answers", "fixtures/answers.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2. Broken {{field:}}."));

    willsuite()
        .arg("clauses")
        .arg(&form)
        .args(["--answers", "fixtures/answers.json", "--drop-unresolved"])
        .assert()
        .success()
        .stdout("1. Kept Jane Doe.\n");

    let config = tmp.path().join("willsuite.toml");
    fs::write(&config, "[clauses]\ndrop_unresolved = true\n").unwrap();
    willsuite()
        .arg("--config")
        .arg(&config)
        .arg("clauses")
        .arg(&form)
        .args(["--answers", "fixtures/answers.json"])
        .assert()
        .success()
        .stdout("1. Kept Jane Doe.\n");
}

// ──────────────────────────────────────────────
// 5. Check
// ──────────────────────────────────────────────

#[test]
fn check_sample_form_is_clean() {
    willsuite()
        .args(["check", "fixtures/will-form.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 error(s), 0 warning(s)"));
}

#[test]
fn check_broken_form_exits_1() {
    willsuite()
        .args(["check", "fixtures/broken-form.json"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("error [a]"))
        .stdout(predicate::str::contains("2 error(s), 3 warning(s)"));
}

#[test]
fn check_json_output() {
    let output = willsuite()
        .args(["--output", "json", "check", "fixtures/broken-form.json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert_eq!(json["errors"], 2);
    assert_eq!(json["warnings"], 3);
    assert_eq!(json["findings"][0]["severity"], "error");
}

// ──────────────────────────────────────────────
// 6. Validate
// ──────────────────────────────────────────────

#[test]
fn validate_valid_form_exits_0() {
    willsuite()
        .args(["validate", "fixtures/will-form.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn validate_missing_sections_exits_1() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("form.json");
    fs::write(&path, r#"{"formTitle": "No sections"}"#).unwrap();

    willsuite()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid form document"))
        .stderr(predicate::str::contains("formSections"));
}

#[test]
fn validate_invalid_json_exits_1() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("form.json");
    fs::write(&path, "{ not json").unwrap();

    willsuite()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid JSON"));
}

#[test]
fn validate_quiet_suppresses_output() {
    willsuite()
        .args(["--quiet", "validate", "fixtures/will-form.json"])
        .assert()
        .success()
        .stdout("");
}

// ──────────────────────────────────────────────
// 7. Merge
// ──────────────────────────────────────────────

#[test]
fn merge_to_stdout_appends_sections() {
    let output = willsuite()
        .args(["merge", "fixtures/will-form.json", "fixtures/form-extra.json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    let sections = json["formSections"].as_array().unwrap();
    assert_eq!(sections.len(), 6);
    assert_eq!(sections[5]["formSection"], "Funeral Wishes");
    // the duplicate funeralWishes field is dropped
    assert_eq!(sections[5]["fields"].as_array().unwrap().len(), 1);
    assert_eq!(sections[5]["fields"][0]["type"], "radio");
}

#[test]
fn merge_writes_out_file() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("merged.json");

    willsuite()
        .args(["merge", "fixtures/will-form.json", "fixtures/form-extra.json", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("merged 2 documents"));

    let merged: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(merged["formTitle"], "Will Questionnaire");

    // the merged document passes validation
    willsuite().arg("validate").arg(&out).assert().success();
}

#[test]
fn merge_requires_inputs() {
    willsuite().arg("merge").assert().failure().code(2);
}

// ──────────────────────────────────────────────
// 8. Init and people
// ──────────────────────────────────────────────

#[test]
fn init_prints_initial_answers() {
    let output = willsuite()
        .args(["init", "fixtures/will-form.json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["trustPurposes"], serde_json::json!([]));
    assert_eq!(json["childrenData"], serde_json::json!([]));
    assert!(json.get("fullName").is_none());
}

#[test]
fn people_lists_person_records() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("answers.json");
    fs::write(
        &path,
        r#"{
            "childrenData": [{"id": "c1", "addChild_firstName": "Amy", "addChild_lastName": "Doe"}],
            "executorData": [{"firstName": "Sarah", "lastName": "Smith", "email": "s@example.com"}]
        }"#,
    )
    .unwrap();

    willsuite()
        .args(["people", "--answers"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Amy Doe  (childrenData, id c1)"))
        .stdout(predicate::str::contains("Sarah Smith  (executorData)"))
        .stdout(predicate::str::contains("autofill: Amy, Doe, Sarah, Smith"));
}

#[test]
fn people_json_output() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("answers.json");
    fs::write(
        &path,
        r#"{"partnerData": [{"firstName": "John", "lastName": "Doe"}]}"#,
    )
    .unwrap();

    let output = willsuite()
        .args(["--output", "json", "people", "--answers"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["people"][0]["source"], "partnerData");
    assert_eq!(json["people"][0]["label"], "John Doe");
    assert_eq!(json["autofill"], serde_json::json!(["Doe", "John"]));
}

// ──────────────────────────────────────────────
// 9. Drafts
// ──────────────────────────────────────────────

#[test]
fn draft_save_load_list_delete() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("drafts");

    willsuite()
        .args(["draft", "save", "jane-1", "--answers", "fixtures/answers.json", "--dir"])
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("saved jane-1 (etag "));

    willsuite()
        .args(["draft", "load", "jane-1", "--dir"])
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"fullName\": \"Jane Doe\""));

    willsuite()
        .args(["draft", "list", "--dir"])
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("jane-1  "));

    willsuite()
        .args(["draft", "delete", "jane-1", "--dir"])
        .arg(&dir)
        .assert()
        .success()
        .stdout("deleted jane-1\n");

    willsuite()
        .args(["draft", "load", "jane-1", "--dir"])
        .arg(&dir)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("draft not found: jane-1"));
}

#[test]
fn draft_save_with_stale_etag_exits_1() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("drafts");

    let output = willsuite()
        .args(["--output", "json", "draft", "save", "d1", "--answers", "fixtures/answers-partial.json", "--dir"])
        .arg(&dir)
        .output()
        .unwrap();
    assert!(output.status.success());
    let etag = stdout_json(&output)["etag"].as_str().unwrap().to_string();
    assert_eq!(etag.len(), 64);

    willsuite()
        .args(["draft", "save", "d1", "--answers", "fixtures/answers.json", "--etag", "0000", "--dir"])
        .arg(&dir)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("stale draft d1"));

    willsuite()
        .args(["draft", "save", "d1", "--answers", "fixtures/answers.json", "--etag"])
        .arg(&etag)
        .arg("--dir")
        .arg(&dir)
        .assert()
        .success();
}

#[test]
fn draft_invalid_id_exits_1() {
    let tmp = TempDir::new().unwrap();
    willsuite()
        .args(["draft", "save", "../escape", "--answers", "fixtures/answers.json", "--dir"])
        .arg(tmp.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid draft id"));
}

#[test]
fn draft_dir_from_config_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("from-config");
    fs::write(
        tmp.path().join("willsuite.toml"),
        format!("[drafts]\ndir = {:?}\n", dir.display().to_string()),
    )
    .unwrap();

    // willsuite.toml in the working directory is picked up without --config
    let mut cmd = cargo_bin_cmd!("willsuite");
    cmd.current_dir(tmp.path())
        .args(["draft", "save", "cfg", "--answers"])
        .arg(fixture("answers.json"))
        .assert()
        .success();
    assert!(dir.join("cfg.json").is_file());
}

// ──────────────────────────────────────────────
// 10. Configuration and errors
// ──────────────────────────────────────────────

#[test]
fn unknown_config_section_exits_1() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("willsuite.toml");
    fs::write(&config, "[server]\nport = 8080\n").unwrap();

    willsuite()
        .arg("--config")
        .arg(&config)
        .args(["check", "fixtures/will-form.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("could not parse"));
}

#[test]
fn json_errors_go_to_stderr_as_objects() {
    let output = willsuite()
        .args(["--output", "json", "check", "fixtures/missing.json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    let json: serde_json::Value = serde_json::from_str(stderr.trim()).unwrap();
    assert!(json["error"].as_str().unwrap().contains("missing.json"));
}

#[test]
fn quiet_suppresses_error_text() {
    willsuite()
        .args(["--quiet", "check", "fixtures/missing.json"])
        .assert()
        .failure()
        .code(1)
        .stderr("");
}
