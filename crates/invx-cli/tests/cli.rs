use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use invx_core::fixtures::{empty_pdf, single_column_invoice_pdf, two_column_invoice_pdf};

fn write(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, data).unwrap();
    path
}

/// `invx` with the user config directory pointed into `home`.
fn invx(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("invx").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.path())
        .env("HOME", home.path());
    cmd
}

fn pdf_text() -> Command {
    Command::cargo_bin("pdf-text").unwrap()
}

#[test]
fn pdf_text_without_file_prints_usage() {
    pdf_text()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn pdf_text_empty_document_prints_empty_line() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "empty.pdf", &empty_pdf());

    pdf_text().arg(&path).assert().success().stdout("\n");
}

#[test]
fn pdf_text_columns_mode() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "invoice.pdf", &two_column_invoice_pdf());

    pdf_text()
        .arg(&path)
        .arg("--mode=columns")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Sold By :\nAcme Traders Pvt Ltd\n12 Market Road, Bengaluru\n\nBilling Address :\n",
        ));
}

#[test]
fn pdf_text_simple_mode_reads_last_page() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "invoice.pdf", &single_column_invoice_pdf());

    pdf_text()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Invoice Number : IN-8812"))
        .stdout(predicate::str::contains("DECOY").not());
}

#[test]
fn pdf_text_rejects_unknown_mode() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "invoice.pdf", &single_column_invoice_pdf());

    pdf_text().arg(&path).arg("--mode=grid").assert().failure();
}

#[test]
fn text_subcommand_matches_pdf_text() {
    let home = TempDir::new().unwrap();
    let path = write(home.path(), "invoice.pdf", &two_column_invoice_pdf());

    let expected = pdf_text()
        .arg(&path)
        .arg("--mode=columns")
        .output()
        .unwrap()
        .stdout;

    invx(&home)
        .args(["text", "--mode", "columns"])
        .arg(&path)
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn extract_json() {
    let home = TempDir::new().unwrap();
    let path = write(home.path(), "invoice.pdf", &two_column_invoice_pdf());

    let output = invx(&home)
        .args(["extract", "--mode", "columns"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "gst_no": "29ABCDE1234F1Z5",
            "order_number": "405-1234567-8901234",
            "invoice_number": "IN-8812",
            "sold_by": "Acme Traders Pvt Ltd 12 Market Road, Bengaluru",
            "shipping_address": "Jane Doe 7 Lake View, Pune",
            "billing_address": "John Doe 221B Baker Street, Mumbai",
        })
    );
}

#[test]
fn extract_csv_to_file() {
    let home = TempDir::new().unwrap();
    let path = write(home.path(), "invoice.pdf", &single_column_invoice_pdf());
    let out = home.path().join("out.csv");

    invx(&home)
        .args(["extract", "--format", "csv", "--output"])
        .arg(&out)
        .arg(&path)
        .assert()
        .success();

    let csv = fs::read_to_string(&out).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("gst_no,order_number,invoice_number,sold_by,shipping_address,billing_address")
    );
    assert!(lines.next().unwrap().starts_with("29ABCDE1234F1Z5,405-1234567-8901234,IN-8812,"));
}

#[test]
fn extract_empty_document_fails() {
    let home = TempDir::new().unwrap();
    let path = write(home.path(), "empty.pdf", &empty_pdf());

    invx(&home)
        .arg("extract")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("the PDF document is empty"));
}

#[test]
fn extract_missing_file_fails() {
    let home = TempDir::new().unwrap();

    invx(&home)
        .args(["extract", "does-not-exist.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn extract_uses_layout_from_config() {
    let home = TempDir::new().unwrap();
    let path = write(home.path(), "invoice.pdf", &two_column_invoice_pdf());
    let config = home.path().join("config.json");
    fs::write(&config, r#"{"pdf": {"layout": "columns"}}"#).unwrap();

    invx(&home)
        .arg("--config")
        .arg(&config)
        .arg("extract")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#""sold_by": "Acme Traders Pvt Ltd 12 Market Road, Bengaluru""#,
        ));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let home = TempDir::new().unwrap();
    let inputs = home.path().join("in");
    fs::create_dir(&inputs).unwrap();
    write(&inputs, "a.pdf", &single_column_invoice_pdf());
    write(&inputs, "b.pdf", &single_column_invoice_pdf());
    let out = home.path().join("out");

    invx(&home)
        .arg("batch")
        .arg(format!("{}/*.pdf", inputs.display()))
        .arg("--output-dir")
        .arg(&out)
        .arg("--summary")
        .assert()
        .success();

    for name in ["a.json", "b.json"] {
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join(name)).unwrap()).unwrap();
        assert_eq!(json["invoice_number"], "IN-8812");
    }

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert_eq!(summary.lines().count(), 3);
    assert!(summary.starts_with("filename,status,gst_no,"));
    assert!(summary.contains("a.pdf,success,29ABCDE1234F1Z5"));
}

#[test]
fn batch_continue_on_error() {
    let home = TempDir::new().unwrap();
    let inputs = home.path().join("in");
    fs::create_dir(&inputs).unwrap();
    write(&inputs, "good.pdf", &single_column_invoice_pdf());
    write(&inputs, "broken.pdf", b"not a pdf at all");
    let pattern = format!("{}/*.pdf", inputs.display());

    invx(&home).arg("batch").arg(&pattern).assert().failure();

    let output = invx(&home)
        .arg("batch")
        .arg(&pattern)
        .arg("--continue-on-error")
        .output()
        .unwrap();
    assert!(output.status.success());

    let lines: Vec<serde_json::Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0]["file"].as_str().unwrap().ends_with("broken.pdf"));
    assert!(lines[0]["error"].is_string());
    assert_eq!(lines[1]["details"]["invoice_number"], "IN-8812");
}

#[test]
fn config_init_get_set() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("invx.json");

    invx(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    invx(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "pdf.layout"])
        .assert()
        .success()
        .stdout("\"simple\"\n");

    invx(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "pdf.layout", "columns"])
        .assert()
        .success();

    invx(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "pdf.layout"])
        .assert()
        .success()
        .stdout("\"columns\"\n");

    invx(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "pdf.layout", "grid"])
        .assert()
        .failure();

    invx(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "pdf.colour", "red"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'pdf.colour'"));

    invx(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "server.max_concurrent_extractions", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than zero"));
}

#[test]
fn config_path_uses_user_config_dir() {
    let home = TempDir::new().unwrap();

    invx(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("invx"))
        .stdout(predicate::str::contains("not created"));
}
