mod common;

use std::path::Path;

use assert_cmd::Command;
use common::{NPS_JAN, PLAY_STORE, SELLER_JAN, SELLER_QTR, TestWorkspace};
use predicates::str::contains;
use serde_json::Value;

fn feedback_lens() -> Command {
    let mut cmd = Command::cargo_bin("feedback-lens").expect("binary exists");
    cmd.env_remove("FEEDBACK_LENS_ACCESS_TOKEN")
        .env_remove("FEEDBACK_LENS_API_KEY");
    cmd
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

fn seller_workspace() -> TestWorkspace {
    let workspace = TestWorkspace::new();
    workspace.write("Seller_Relevance_Jan.csv", SELLER_JAN);
    workspace.write("Seller_Relevance_QTR.csv", SELLER_QTR);
    workspace.write("NPS_Jan.csv", NPS_JAN);
    workspace
}

/// Seven distinct reasons with strictly decreasing frequency.
fn many_reasons() -> String {
    let mut csv = String::from("source,buyer,reason,comment\n");
    for (rank, reason) in ["R1", "R2", "R3", "R4", "R5", "R6", "R7"].iter().enumerate() {
        for n in 0..(7 - rank) {
            csv.push_str(&format!("app,B{rank}{n},{reason},note {reason}\n"));
        }
    }
    csv
}

fn report_json(args: &[&str]) -> Value {
    let output = feedback_lens()
        .arg("report")
        .args(args)
        .args(["--format", "json"])
        .output()
        .expect("run report");
    assert!(
        output.status.success(),
        "report failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("report json")
}

#[test]
fn detect_reports_schema_per_file() {
    let workspace = TestWorkspace::new();
    let play = workspace.write("Play_Store_Jan.csv", PLAY_STORE);
    let nps = workspace.write("NPS_Jan.csv", NPS_JAN);
    feedback_lens()
        .args(["detect", "-i", path_arg(&play), "-i", path_arg(&nps)])
        .assert()
        .success()
        .stdout(contains("play_store"))
        .stdout(contains("nps_app_internal"))
        .stdout(contains("reason2"));
}

#[test]
fn detect_fails_for_malformed_input() {
    let workspace = TestWorkspace::new();
    let bad = workspace.write("broken.csv", "reason\nPrice,extra\n");
    feedback_lens()
        .args(["detect", "-i", path_arg(&bad)])
        .assert()
        .failure()
        .stderr(contains("could not be decoded"));
}

#[test]
fn files_lists_collection_and_source_mapping() {
    let workspace = seller_workspace();
    feedback_lens()
        .args(["files", "--folder", path_arg(workspace.path())])
        .assert()
        .success()
        .stdout(contains("Seller_Relevance_Jan.csv"))
        .stdout(contains("Seller_Relevance_QTR.csv"))
        .stdout(contains("Seller Relevance"));
}

#[test]
fn seller_relevance_report_uses_sub_reason_and_quarterly_summary() {
    let workspace = seller_workspace();
    let report = report_json(&[
        "--folder",
        path_arg(workspace.path()),
        "--source",
        "seller-relevance",
    ]);
    assert_eq!(report["source"], "Seller Relevance");
    assert_eq!(report["schema"], "seller_relevance");
    assert_eq!(report["reason_column"], "reason2");
    assert_eq!(report["total_records"], 2);
    assert_eq!(
        report["categories"],
        serde_json::json!(["All", "Wrong category", "Out of area"])
    );
    assert_eq!(report["included_files"], serde_json::json!(["Seller_Relevance_Jan.csv"]));
    assert_eq!(report["quarterly"]["status"], "found");
    assert_eq!(report["quarterly"]["file"], "Seller_Relevance_QTR.csv");
    assert_eq!(report["sample"]["rows"][0][0], "000981");
}

#[test]
fn table_report_warns_when_quarterly_file_is_missing() {
    let workspace = seller_workspace();
    feedback_lens()
        .args([
            "report",
            "--folder",
            path_arg(workspace.path()),
            "--source",
            "nps",
        ])
        .assert()
        .success()
        .stdout(contains("NPS Quarterly Data"))
        .stdout(contains("quarterly file matching 'nps_qtr' not found"))
        .stdout(contains("Buyer Verbatims (comment)"))
        .stdout(contains("Too expensive"));
}

#[test]
fn unmatched_source_fails_with_message() {
    let workspace = seller_workspace();
    feedback_lens()
        .args([
            "report",
            "--folder",
            path_arg(workspace.path()),
            "--source",
            "play-store",
        ])
        .assert()
        .failure()
        .stderr(contains(
            "no CSV files match the selected feedback source: Play Store",
        ));
}

#[test]
fn category_limit_and_all_categories() {
    let workspace = TestWorkspace::new();
    workspace.write("NPS_Mar.csv", &many_reasons());
    let folder = path_arg(workspace.path());

    let limited = report_json(&["--folder", folder, "--source", "nps"]);
    assert_eq!(
        limited["categories"],
        serde_json::json!(["All", "R1", "R2", "R3", "R4", "R5"])
    );

    let everything = report_json(&["--folder", folder, "--source", "nps", "--all-categories"]);
    assert_eq!(everything["categories"].as_array().map(Vec::len), Some(8));

    let custom = report_json(&["--folder", folder, "--source", "nps", "--category-limit", "2"]);
    assert_eq!(custom["categories"], serde_json::json!(["All", "R1", "R2"]));
}

#[test]
fn category_selection_filters_entries_and_verbatims() {
    let workspace = seller_workspace();
    let report = report_json(&[
        "--folder",
        path_arg(workspace.path()),
        "--source",
        "nps",
        "--category",
        "Price",
    ]);
    assert_eq!(report["selection"], "Price");
    assert_eq!(report["total_records"], 3);
    assert_eq!(report["matching_records"], 2);
    assert_eq!(report["verbatims"], serde_json::json!(["Too expensive"]));
    assert_eq!(report["negative_rows"], serde_json::json!([0]));
}

#[test]
fn config_file_supplies_folder_and_limits() {
    let workspace = TestWorkspace::new();
    workspace.write("data/NPS_Mar.csv", &many_reasons());
    let config = workspace.write(
        "feedback-lens.yaml",
        &format!(
            "folder: {}\ncollection: data\ncategory_limit: 1\nsample_rows: 3\n",
            path_arg(workspace.path())
        ),
    );

    let report = report_json(&["--config", path_arg(&config), "--source", "nps"]);
    assert_eq!(report["categories"], serde_json::json!(["All", "R1"]));
    assert_eq!(report["sample"]["rows"].as_array().map(Vec::len), Some(3));
    assert_eq!(report["total_records"], 28);

    let overridden = report_json(&[
        "--config",
        path_arg(&config),
        "--source",
        "nps",
        "--category-limit",
        "3",
    ]);
    assert_eq!(
        overridden["categories"],
        serde_json::json!(["All", "R1", "R2", "R3"])
    );
}

#[test]
fn missing_backend_is_an_error() {
    feedback_lens()
        .args(["report", "--source", "nps"])
        .assert()
        .failure()
        .stderr(contains("No file source configured"));
}

#[test]
fn collection_cannot_be_combined_with_drive_folder() {
    feedback_lens()
        .args([
            "files",
            "--drive-folder",
            "1iskRT5FQjaFiRWu",
            "--collection",
            "feedback",
        ])
        .assert()
        .failure()
        .stderr(contains("cannot be used with"));
}

#[test]
fn service_account_login_failure_is_reported() {
    let workspace = TestWorkspace::new();
    let private_key = std::fs::read_to_string(
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/service_account_key.pem"),
    )
    .expect("fixture key");
    let key = workspace.write(
        "service-account.json",
        &serde_json::json!({
            "type": "service_account",
            "client_email": "reader@feedback-lens.iam.gserviceaccount.com",
            "private_key": private_key,
            "token_uri": "http://127.0.0.1:9/token",
        })
        .to_string(),
    );

    feedback_lens()
        .args([
            "files",
            "--drive-folder",
            "1iskRT5FQjaFiRWu",
            "--service-account",
            path_arg(&key),
        ])
        .assert()
        .failure()
        .stderr(contains(
            "Requesting access token for service account reader@feedback-lens.iam.gserviceaccount.com",
        ));
}

#[test]
fn missing_service_account_key_is_an_error() {
    let workspace = TestWorkspace::new();
    let missing = workspace.path().join("absent.json");
    feedback_lens()
        .args([
            "files",
            "--drive-folder",
            "1iskRT5FQjaFiRWu",
            "--service-account",
            path_arg(&missing),
        ])
        .assert()
        .failure()
        .stderr(contains("Reading service account key"));
}
