use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const PEOPLE: &str = r#"[
  {"name": "Ann", "age": 30, "address": {"city": "Oslo"}},
  {"name": "Bo", "age": 41, "address": {"city": "Lund"}}
]"#;

fn tabex(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tabex").unwrap();
    cmd.current_dir(dir.path()).arg("--no-color");
    cmd
}

fn with_data() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("people.json"), PEOPLE).unwrap();
    dir
}

#[test]
fn export_csv_to_stdout() {
    let dir = with_data();
    tabex(&dir)
        .args(["export", "--data", "people.json"])
        .args(["--field", "name", "--field", "address.city"])
        .assert()
        .success()
        .stdout("Name,Address city\nAnn,Oslo\nBo,Lund\n");
}

#[test]
fn export_with_descriptor_file() {
    let dir = with_data();
    fs::write(
        dir.path().join("fields.json"),
        r#"["name", {"address": ["city"]}, "age"]"#,
    )
    .unwrap();

    tabex(&dir)
        .args(["export", "--data", "people.json", "--fields", "fields.json"])
        .assert()
        .success()
        .stdout("Name,Address city,Age\nAnn,Oslo,30\nBo,Lund,41\n");
}

#[test]
fn export_reads_stdin() {
    let dir = tempfile::tempdir().unwrap();
    tabex(&dir)
        .args(["export", "--data", "-", "--field", "name"])
        .write_stdin(r#"{"name": "Solo"}"#)
        .assert()
        .success()
        .stdout("Name\nSolo\n");
}

#[test]
fn export_xls_to_file() {
    let dir = with_data();
    tabex(&dir)
        .args(["export", "--data", "people.json", "--field", "name"])
        .args(["--format", "xls", "--output", "out/people"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Exported to"));

    let xml = fs::read_to_string(dir.path().join("out/people.xls")).unwrap();
    assert!(xml.contains("<Workbook"));
    assert!(xml.contains("<Data ss:Type=\"String\">Ann</Data>"));
}

#[test]
fn unknown_format_fails() {
    let dir = with_data();
    tabex(&dir)
        .args(["export", "--data", "people.json", "--field", "name"])
        .args(["--format", "pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown export format: pdf"));
}

#[test]
fn missing_field_fails_without_output() {
    let dir = with_data();
    tabex(&dir)
        .args(["export", "--data", "people.json", "--field", "email"])
        .args(["--output", "people.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("email"));

    assert!(!dir.path().join("people.csv").exists());
}

#[test]
fn config_presenters_apply() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("data.json"),
        r#"[{"note": "<b>hi</b>", "score": 2.5, "extra": null}]"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("tabex.toml"),
        "[presenters]\nfloat_places = 2\nstrip_tags = true\nnull_text = \"n/a\"\n",
    )
    .unwrap();

    tabex(&dir)
        .args(["--config", "tabex.toml", "export", "--data", "data.json"])
        .args(["--field", "note", "--field", "score", "--field", "extra"])
        .assert()
        .success()
        .stdout("Note,Score,Extra\nhi,2.50,n/a\n");
}

#[test]
fn chains_prints_resolved_paths() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("fields.json"),
        r#"["split", {"to_s": ["split"]}]"#,
    )
    .unwrap();

    tabex(&dir)
        .args(["chains", "--fields", "fields.json"])
        .assert()
        .success()
        .stdout("split\nto_s.split\n");
}

#[test]
fn chains_rejects_multi_key_group() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("fields.json"), r#"[{"a": ["x"], "b": ["y"]}]"#).unwrap();

    tabex(&dir)
        .args(["chains", "--fields", "fields.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid descriptor"));
}

#[test]
fn formats_lists_builtins() {
    let dir = tempfile::tempdir().unwrap();
    tabex(&dir)
        .arg("formats")
        .assert()
        .success()
        .stdout(predicate::str::contains("csv").and(predicate::str::contains("xls")));
}

#[test]
fn config_init_then_path() {
    let dir = tempfile::tempdir().unwrap();
    tabex(&dir).args(["config", "init"]).assert().success();
    assert!(dir.path().join(".tabex/config.toml").exists());

    tabex(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    tabex(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".tabex/config.toml"));
}

#[test]
fn verbose_export_logs_progress() {
    let dir = with_data();
    tabex(&dir)
        .args(["-v", "export", "--data", "people.json", "--field", "name"])
        .assert()
        .success()
        .stdout("Name\nAnn\nBo\n")
        .stderr(predicate::str::contains("Loaded 2 records from people.json"));
}

#[test]
fn strict_registration_still_exports() {
    let dir = with_data();
    fs::write(
        dir.path().join("tabex.toml"),
        "[formats]\nstrict_registration = true\n",
    )
    .unwrap();

    tabex(&dir)
        .args(["--config", "tabex.toml", "export", "--data", "people.json"])
        .args(["--field", "name"])
        .assert()
        .success()
        .stdout("Name\nAnn\nBo\n");
}
