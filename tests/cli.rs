//! CLI test cases.
//!
//! Everything here runs offline, replaying saved Textract responses and
//! writing artifacts to a temporary directory instead of S3.

use std::{fs, path::Path, process::Command};

use assert_cmd::prelude::*;
use predicates::str::contains;
use serde_json::Value;

/// A saved Textract response for a short deed page.
static DEED_RESPONSE: &str = "tests/fixtures/ocr/deed_response.json";

/// Create a new `Command` with our binary.
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("ocr-page").unwrap();
    // Keep the environment from changing our defaults.
    cmd.env_remove("OCR_PAGE_SEQUENTIAL_WRITES")
        .env_remove("OCR_PAGE_THROTTLE_MS_PER_PAGE")
        .env_remove("OCR_PAGE_STORAGE_CLASS");
    cmd
}

/// Read a JSON file.
fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_help() {
    cmd().arg("--help").assert().success();
}

#[test]
fn test_version() {
    cmd().arg("--version").assert().success();
}

#[test]
fn test_keys() {
    cmd()
        .arg("keys")
        .arg("raw/wi-milwaukee-county/Deeds/0001.tif")
        .assert()
        .success()
        .stdout(contains(r#""workflow": "wi-milwaukee-county""#))
        .stdout(contains("ocr/json/wi-milwaukee-county/Deeds/0001.json"))
        .stdout(contains("ocr/txt/wi-milwaukee-county/Deeds/0001.txt"))
        .stdout(contains("ocr/stats/wi-milwaukee-county/Deeds/0001__"));
}

#[test]
fn test_keys_split_page_throttle() {
    cmd()
        .arg("keys")
        .arg("raw/mn-ramsey-county/abs/0001_SPLITPAGE_4.jpg")
        .arg("--throttle-ms-per-page=250")
        .assert()
        .success()
        .stdout(contains(r#""split_page": 4"#))
        .stdout(contains(r#""throttle_delay_ms": 1000"#));
}

#[test]
fn test_keys_rejects_short_key() {
    cmd()
        .arg("keys")
        .arg("raw/0001.tif")
        .assert()
        .failure()
        .stderr(contains("three path segments"));
}

#[test]
fn test_schema() {
    for schema_type in ["IncomingEvent", "PageResponse", "StatsArtifact"] {
        cmd().arg("schema").arg(schema_type).assert().success();
    }
}

#[test]
fn test_process_map_step_event() {
    let out_dir = tempfile::tempdir().unwrap();
    let response_path = out_dir.path().join("response.json");

    cmd()
        .arg("process")
        .arg("tests/fixtures/events/map_step.json")
        .arg("--ocr-response")
        .arg(DEED_RESPONSE)
        .arg("--out-dir")
        .arg(out_dir.path())
        .arg("-o")
        .arg(&response_path)
        .assert()
        .success();

    let response = read_json(&response_path);
    assert_eq!(response["statusCode"], 200);
    let body = &response["body"];
    assert_eq!(body["bucket"], "covenants-deed-images");
    assert_eq!(body["orig"], "raw/wi-milwaukee-county/Deeds/0001.tif");
    assert_eq!(body["json"], "ocr/json/wi-milwaukee-county/Deeds/0001.json");
    assert_eq!(body["txt"], "ocr/txt/wi-milwaukee-county/Deeds/0001.txt");
    assert_eq!(body["handwriting_pct"], 0.25);
    let uuid = body["uuid"].as_str().unwrap();

    // Artifacts land in the output bucket named by the event.
    let bucket_dir = out_dir.path().join("covenants-ocr");
    let text =
        fs::read_to_string(bucket_dir.join("ocr/txt/wi-milwaukee-county/Deeds/0001.txt"))
            .unwrap();
    assert_eq!(text, "WARRANTY DEED\nGrantor John Smith");

    let stored = read_json(&bucket_dir.join("ocr/json/wi-milwaukee-county/Deeds/0001.json"));
    assert_eq!(stored["Blocks"].as_array().unwrap().len(), 7);
    assert_eq!(stored["DocumentMetadata"]["Pages"], 1);

    let stats_key = format!("ocr/stats/wi-milwaukee-county/Deeds/0001__{uuid}.json");
    assert_eq!(body["stats"], stats_key.as_str());
    let stats = read_json(&bucket_dir.join(&stats_key));
    assert_eq!(stats["workflow"], "wi-milwaukee-county");
    assert_eq!(stats["remainder"], "Deeds/0001");
    assert_eq!(stats["public_uuid"], uuid);
    assert_eq!(stats["num_lines"], 2);
    assert_eq!(stats["num_chars"], 31);
    assert_eq!(stats["handwriting_pct"], 0.25);
}

#[test]
fn test_process_s3_put_event_decodes_key() {
    let out_dir = tempfile::tempdir().unwrap();

    cmd()
        .arg("process")
        .arg("tests/fixtures/events/s3_put.json")
        .arg("--ocr-response")
        .arg(DEED_RESPONSE)
        .arg("--out-dir")
        .arg(out_dir.path())
        .arg("--sequential-writes")
        .assert()
        .success()
        .stdout(contains(r#""orig": "raw/wi-milwaukee-county/Deeds/Book 12/0001.tif""#));

    let text_path = out_dir
        .path()
        .join("covenants-deed-images/ocr/txt/wi-milwaukee-county/Deeds/Book 12/0001.txt");
    assert!(text_path.exists());
}

#[test]
fn test_process_rejects_bad_event() {
    let out_dir = tempfile::tempdir().unwrap();

    cmd()
        .arg("process")
        .arg("tests/fixtures/events/bad_event.json")
        .arg("--ocr-response")
        .arg(DEED_RESPONSE)
        .arg("--out-dir")
        .arg(out_dir.path())
        .assert()
        .failure()
        .stderr(contains("unrecognized trigger event"));

    assert!(fs::read_dir(out_dir.path()).unwrap().next().is_none());
}

#[test]
fn test_process_rejects_unknown_storage_class() {
    let out_dir = tempfile::tempdir().unwrap();

    cmd()
        .arg("process")
        .arg("tests/fixtures/events/map_step.json")
        .arg("--ocr-response")
        .arg(DEED_RESPONSE)
        .arg("--out-dir")
        .arg(out_dir.path())
        .arg("--storage-class=GLACIER-IR")
        .assert()
        .failure()
        .stderr(contains("unknown S3 storage class"));

    assert!(fs::read_dir(out_dir.path()).unwrap().next().is_none());
}
