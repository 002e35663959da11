use assert_cmd::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A temporary project directory with its own `.tickets` workspace.
pub struct Workspace {
    pub temp: TempDir,
}

impl Workspace {
    /// Create a temp dir and run `tkt init` in it.
    pub fn init() -> Self {
        let workspace = Self {
            temp: TempDir::new().expect("tempdir"),
        };
        workspace.cmd().arg("init").assert().success();
        workspace
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn tickets_dir(&self) -> PathBuf {
        self.root().join(".tickets")
    }

    /// `tkt` with a clean environment rooted in this workspace.
    pub fn cmd(&self) -> Command {
        let bin = assert_cmd::cargo::cargo_bin!("tkt");
        let mut cmd = Command::new(bin.as_os_str());
        cmd.current_dir(self.root())
            .env("HOME", self.root())
            .env("NO_COLOR", "1")
            .env_remove("TICKETS_DIR")
            .env_remove("TICKET_DB_PATH")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd().args(args).output().expect("run tkt")
    }

    /// Run with `--json`, assert success, and parse stdout.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self.cmd().args(args).arg("--json").output().expect("run tkt");
        assert!(
            output.status.success(),
            "tkt {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is JSON")
    }

    /// Create a ticket and return its id.
    pub fn create(&self, title: &str, assignee: &str, priority: &str) -> i64 {
        let ticket = self.json(&[
            "create",
            title,
            "-d",
            "details",
            "-a",
            assignee,
            "-p",
            priority,
        ]);
        ticket["id"].as_i64().expect("ticket id")
    }
}
