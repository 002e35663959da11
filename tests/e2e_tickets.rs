mod common;

use assert_cmd::prelude::*;
use common::cli::Workspace;
use predicates::prelude::*;
use std::fs;

#[test]
fn init_is_idempotent() {
    let ws = Workspace::init();
    assert!(ws.tickets_dir().join("metadata.json").is_file());
    assert!(ws.tickets_dir().join("tickets.db").is_file());
    assert!(ws.tickets_dir().join("uploads").is_dir());

    let again = ws.json(&["init"]);
    assert_eq!(again["created"], false);
}

#[test]
fn commands_outside_a_workspace_fail() {
    let temp = tempfile::tempdir().unwrap();
    let bin = assert_cmd::cargo::cargo_bin!("tkt");
    std::process::Command::new(bin.as_os_str())
        .current_dir(temp.path())
        .env("HOME", temp.path())
        .env_remove("TICKETS_DIR")
        .env_remove("TICKET_DB_PATH")
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("tkt init"));
}

#[test]
fn create_show_update_round_trip() {
    let ws = Workspace::init();
    let created = ws.json(&[
        "create",
        "Printer jam",
        "-d",
        "Tray 2 is stuck",
        "-a",
        "alice",
        "-p",
        "low",
    ]);
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["category"], "other");
    assert_eq!(created["status"], "open");
    assert!(created["resolved_at"].is_null());
    assert_eq!(created["created_at"], created["updated_at"]);

    let shown = ws.json(&["show", &id.to_string()]);
    assert_eq!(shown["title"], "Printer jam");

    let updated = ws.json(&["update", &id.to_string(), "--status", "resolved"]);
    assert_eq!(updated["status"], "resolved");
    assert!(updated["resolved_at"].is_string());

    let reopened = ws.json(&["update", &id.to_string(), "--status", "open"]);
    assert_eq!(reopened["resolved_at"], updated["resolved_at"]);
}

#[test]
fn missing_ticket_exits_with_three() {
    let ws = Workspace::init();
    ws.cmd()
        .args(["show", "999"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Ticket not found: 999"));

    let output = ws.run(&["update", "999", "--title", "x", "--json"]);
    assert_eq!(output.status.code(), Some(3));
    let err: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(err["error"]["code"], "TICKET_NOT_FOUND");
    assert_eq!(err["error"]["retryable"], false);
}

#[test]
fn validation_errors_exit_with_two() {
    let ws = Workspace::init();
    ws.cmd()
        .args(["create", "  ", "-d", "desc", "-a", "alice"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid title"));
    ws.cmd()
        .args(["create", "t", "-d", "desc", "-a", "alice", "-p", "urgent"])
        .assert()
        .code(2);
    ws.cmd()
        .args(["list", "--from", "yesterday"])
        .assert()
        .code(2);
}

#[test]
fn list_filters_and_sort_fallback() {
    let ws = Workspace::init();
    let a = ws.create("VPN drops", "bob", "high");
    let b = ws.create("Printer jam", "alice", "low");
    let c = ws.create("Mail bounce", "bob", "medium");

    let bob = ws.json(&["list", "--assignee", "bob", "--sort", "priority", "--order", "asc"]);
    let ids: Vec<i64> = bob
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![c, a]);

    let bogus = ws.json(&["list", "--sort", "bogus", "--order", "asc"]);
    let created = ws.json(&["list", "--sort", "created_at", "--order", "asc"]);
    assert_eq!(bogus, created);
    assert_eq!(created[0]["id"], b.min(a).min(c));
}

#[test]
fn comments_add_and_list() {
    let ws = Workspace::init();
    let id = ws.create("Printer jam", "alice", "low").to_string();

    let comment = ws.json(&["comments", "add", &id, "looking", "into", "it", "--author", "bob"]);
    assert_eq!(comment["author"], "bob");
    assert_eq!(comment["content"], "looking into it");

    let default_author = ws.json(&["comments", "add", &id, "second"]);
    assert_eq!(default_author["author"], "User");

    let listed = ws.json(&["comments", &id]);
    assert_eq!(listed.as_array().unwrap().len(), 2);
    assert_eq!(listed[0]["content"], "looking into it");

    ws.cmd()
        .args(["comments", "list", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("[bob] at"));

    let ticket = ws.json(&["show", &id]);
    assert_eq!(ticket["comments"].as_array().unwrap().len(), 2);
}

#[test]
fn attach_copies_file_and_records_size() {
    let ws = Workspace::init();
    let id = ws.create("Printer jam", "alice", "low");
    let source = ws.root().join("error log.txt");
    fs::write(&source, "paper jam at tray 2\n").unwrap();

    let ticket = ws.json(&["attach", &id.to_string(), source.to_str().unwrap()]);
    let attachment = &ticket["attachments"][0];
    assert_eq!(attachment["filename"], "error log.txt");
    assert_eq!(attachment["size_bytes"], 20);
    assert_eq!(attachment["content_type"], "text/plain");

    let path = attachment["path"].as_str().unwrap();
    assert!(path.starts_with(&format!("/uploads/{id}_")));
    assert!(path.ends_with("_error_log.txt"));
    let stored = ws
        .tickets_dir()
        .join("uploads")
        .join(path.trim_start_matches("/uploads/"));
    assert_eq!(fs::read_to_string(stored).unwrap(), "paper jam at tray 2\n");
}

#[test]
fn attach_missing_source_or_ticket_fails() {
    let ws = Workspace::init();
    let id = ws.create("Printer jam", "alice", "low").to_string();
    ws.cmd()
        .args(["attach", &id, "does-not-exist.txt"])
        .assert()
        .code(2);

    let source = ws.root().join("note.txt");
    fs::write(&source, "x").unwrap();
    ws.cmd()
        .args(["attach", "999", source.to_str().unwrap()])
        .assert()
        .code(3);
    let uploads = fs::read_dir(ws.tickets_dir().join("uploads")).unwrap().count();
    assert_eq!(uploads, 0);
}

#[test]
fn create_with_file_attaches_it() {
    let ws = Workspace::init();
    let source = ws.root().join("screenshot.png");
    fs::write(&source, [0u8; 64]).unwrap();

    let ticket = ws.json(&[
        "create",
        "Screen flicker",
        "-d",
        "See screenshot",
        "-a",
        "carol",
        "--file",
        source.to_str().unwrap(),
    ]);
    assert_eq!(ticket["attachments"][0]["content_type"], "image/png");
    assert_eq!(ticket["attachments"][0]["size_bytes"], 64);
}

#[test]
fn delete_removes_ticket() {
    let ws = Workspace::init();
    let id = ws.create("Printer jam", "alice", "low").to_string();
    ws.json(&["comments", "add", &id, "hello"]);

    let deleted = ws.json(&["delete", &id]);
    assert_eq!(deleted["deleted"].as_i64().unwrap().to_string(), id);
    ws.cmd().args(["show", &id]).assert().code(3);
    ws.cmd().args(["delete", &id]).assert().code(3);
}

#[test]
fn report_reflects_tickets() {
    let ws = Workspace::init();
    let id = ws.create("Printer jam", "alice", "low").to_string();
    ws.create("VPN drops", "bob", "high");
    ws.json(&["update", &id, "--status", "closed", "--category", "hardware"]);

    let report = ws.json(&["report"]);
    assert_eq!(report["total_tickets"], 2);
    assert_eq!(report["recent_30d"], 2);
    assert_eq!(report["avg_resolution_days"], 0);
    assert_eq!(report["priority_counts"]["low"], 1);
    assert_eq!(report["priority_counts"]["medium"], 0);
    assert_eq!(report["category_counts"]["hardware"], 1);
    assert_eq!(report["category_counts"]["other"], 1);
    assert_eq!(report["assignee_workload"]["alice"]["closed"], 1);
    assert_eq!(report["assignee_workload"]["bob"]["in-progress"], 0);

    ws.cmd()
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total tickets: 2"));
}

#[test]
fn project_config_sets_list_defaults() {
    let ws = Workspace::init();
    fs::write(
        ws.tickets_dir().join("config.yaml"),
        "list:\n  sort-by: priority\n  order: desc\n",
    )
    .unwrap();
    ws.create("low one", "alice", "low");
    let high = ws.create("high one", "alice", "high");

    let listed = ws.json(&["list"]);
    assert_eq!(listed[0]["id"], high);
}

#[test]
fn db_flag_overrides_workspace_database() {
    let ws = Workspace::init();
    let other = ws.root().join("elsewhere.db");
    let other = other.to_str().unwrap();

    ws.json(&["create", "Elsewhere", "-d", "d", "-a", "alice", "--db", other]);
    assert_eq!(ws.json(&["list", "--db", other]).as_array().unwrap().len(), 1);
    assert!(ws.json(&["list"]).as_array().unwrap().is_empty());
}

#[test]
fn schema_and_completions() {
    let ws = Workspace::init();
    let schema = ws.json(&["schema", "report"]);
    assert_eq!(schema["tool"], "tkt");
    assert!(schema["schemas"]["KpiReport"].is_object());

    ws.cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tkt"));
}
