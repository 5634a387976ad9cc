use assert_cmd::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::{tempdir, TempDir};

fn has_git() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

fn init_git_repo(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    // init and basic identity
    assert!(Command::new("git")
        .args(["init"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
    assert!(Command::new("git")
        .args(["config", "user.email", "you@example.com"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
    assert!(Command::new("git")
        .args(["config", "user.name", "Your Name"])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

fn commit_file_at(dir: &Path, name: &str, content: &str, date: &str) {
    let mut f = File::create(dir.join(name)).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f.sync_all().unwrap();
    assert!(Command::new("git")
        .args(["add", "."])
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
    assert!(Command::new("git")
        .args(["commit", "-m", &format!("add {name}")])
        .env("GIT_AUTHOR_DATE", date)
        .env("GIT_COMMITTER_DATE", date)
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

/// A scratch base directory and data directory for one test.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("repos")).unwrap();
        Self { dir }
    }

    fn base(&self) -> std::path::PathBuf {
        self.dir.path().join("repos")
    }

    /// A directory that passes the liveness check without running git.
    fn fake_repo(&self, path: &str) {
        fs::create_dir_all(self.base().join(path).join(".git")).unwrap();
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("codeglyph").unwrap();
        cmd.env_remove("OPENAI_API_KEY")
            .env_remove("CODEGLYPH_BOOTSTRAP")
            .env_remove("CODEGLYPH_GIT")
            .arg("--base")
            .arg(self.base())
            .arg("--data-dir")
            .arg(self.dir.path().join("data"));
        cmd
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self.cmd().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "{args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

#[test]
fn heat_json_outputs_buckets_and_stats() {
    if !has_git() {
        eprintln!("git not available; skipping");
        return;
    }
    let ws = Workspace::new();
    let repo = ws.base().join("team/app");
    init_git_repo(&repo);
    commit_file_at(&repo, "a.txt", "a", "2024-01-01T09:05:00");
    commit_file_at(&repo, "b.txt", "b", "2024-01-01T09:40:00");
    commit_file_at(&repo, "c.txt", "c", "2024-01-02T14:00:00");

    let entry = ws.json(&["repos", "add", "team/app", "--json"]);
    assert_eq!(entry["id"], "team_app");
    assert_eq!(entry["name"], "app");

    let heat = ws.json(&["heat", "team_app", "--json"]);
    assert_eq!(heat["repo"], "team/app");
    assert_eq!(heat["repoName"], "app");
    assert_eq!(heat["sinceDate"], "2024-01-01");
    assert_eq!(
        heat["commits"],
        serde_json::json!({ "2024-01-01-09": 2, "2024-01-02-14": 1 })
    );
    let stats = &heat["stats"];
    assert_eq!(stats["totalCommits"], 3);
    assert_eq!(stats["uniqueDays"], 2);
    assert_eq!(stats["peakHour"], 9);
    assert_eq!(stats["busiestDay"], "Lundi");
    assert_eq!(stats["avgCommitsPerDay"], 1.5);

    let heat = ws.json(&["heat", "team_app", "--lang", "en", "--json"]);
    assert_eq!(heat["stats"]["busiestDay"], "Monday");
}

#[test]
fn heat_since_limits_the_window() {
    if !has_git() {
        eprintln!("git not available; skipping");
        return;
    }
    let ws = Workspace::new();
    let repo = ws.base().join("app");
    init_git_repo(&repo);
    commit_file_at(&repo, "a.txt", "a", "2024-01-01T09:05:00");
    commit_file_at(&repo, "b.txt", "b", "2024-01-03T17:30:00");
    ws.json(&["repos", "add", "app", "--json"]);

    let heat = ws.json(&["heat", "app", "--since", "2024-01-02", "--json"]);
    assert_eq!(heat["sinceDate"], "2024-01-02");
    assert_eq!(heat["commits"], serde_json::json!({ "2024-01-03-17": 1 }));
    assert_eq!(heat["stats"]["busiestDay"], "Mercredi");

    ws.cmd()
        .args(["heat", "app", "--since", "last week"])
        .assert()
        .failure();
}

#[test]
fn heat_text_output_renders_grid() {
    if !has_git() {
        eprintln!("git not available; skipping");
        return;
    }
    let ws = Workspace::new();
    let repo = ws.base().join("app");
    init_git_repo(&repo);
    commit_file_at(&repo, "a.txt", "a", "2024-01-01T09:05:00");
    ws.json(&["repos", "add", "app", "--json"]);

    let output = ws.cmd().args(["heat", "app"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2024-01-01"));
    assert!(stdout.contains("Total commits"));
}

#[test]
fn heat_unknown_repository_fails() {
    let ws = Workspace::new();
    ws.cmd().args(["heat", "nope", "--json"]).assert().failure();
}

#[test]
fn registry_lifecycle() {
    let ws = Workspace::new();
    for path in ["alpha", "tools/beta", "gamma"] {
        ws.fake_repo(path);
    }

    for path in ["alpha", "tools/beta", "gamma"] {
        ws.json(&["repos", "add", path, "--json"]);
    }
    ws.cmd().args(["repos", "add", "alpha"]).assert().failure();
    ws.cmd().args(["repos", "add", "missing"]).assert().failure();

    let outcome = ws.json(&["repos", "default", "gamma", "--json"]);
    assert_eq!(outcome["defaultRepo"], "gamma");

    let listing = ws.json(&["repos", "list", "--json"]);
    let ids: Vec<&str> = listing["repos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["gamma", "alpha", "tools_beta"]);
    assert_eq!(listing["defaultRepo"], "gamma");
    assert_eq!(listing["repos"][0]["isDefault"], true);

    let outcome = ws.json(&["repos", "remove", "gamma", "--json"]);
    assert_eq!(outcome["success"], true);
    assert_eq!(outcome["newDefaultRepo"], "alpha");

    ws.json(&["repos", "remove", "tools_beta", "--json"]);
    ws.cmd()
        .args(["repos", "remove", "alpha"])
        .assert()
        .failure();
}

#[test]
fn update_sets_and_clears_metadata() {
    let ws = Workspace::new();
    ws.fake_repo("app");
    ws.json(&["repos", "add", "app", "--json"]);

    let entry = ws.json(&[
        "repos",
        "update",
        "app",
        "--display-name",
        "My App",
        "--description",
        "Un outil",
        "--url",
        "https://example.com",
        "--json",
    ]);
    assert_eq!(entry["displayName"], "My App");
    assert_eq!(entry["url"], "https://example.com");
    // without a translation backend both languages carry the source text
    assert_eq!(entry["description"]["fr"], "Un outil");
    assert_eq!(entry["description"]["en"], "Un outil");

    let entry = ws.json(&["repos", "update", "app", "--url", "", "--json"]);
    assert!(entry.get("url").is_none());
    assert_eq!(entry["displayName"], "My App");
}

#[test]
fn discover_lists_unregistered_repositories() {
    let ws = Workspace::new();
    ws.fake_repo("one");
    ws.fake_repo("group/two");
    fs::create_dir_all(ws.base().join("plain")).unwrap();
    ws.json(&["repos", "add", "one", "--json"]);

    let output = ws.json(&["repos", "discover", "--json"]);
    assert_eq!(
        output,
        serde_json::json!({
            "discovered": [{
                "id": "group_two",
                "path": "group/two",
                "name": "two",
                "fullPath": ws.base().join("group/two").to_string_lossy(),
            }]
        })
    );
}

#[test]
fn bootstrap_seeds_first_run_only() {
    let ws = Workspace::new();
    ws.fake_repo("seeded");
    let listing = ws.json(&["--bootstrap", "seeded,absent", "repos", "list", "--json"]);
    assert_eq!(listing["repos"].as_array().unwrap().len(), 1);
    assert_eq!(listing["repos"][0]["id"], "seeded");

    ws.fake_repo("later");
    let listing = ws.json(&["--bootstrap", "later", "repos", "list", "--json"]);
    assert_eq!(listing["repos"].as_array().unwrap().len(), 1);
}
