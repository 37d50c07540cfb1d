// Drives the non-interactive subcommands of the compiled binary against a
// throwaway HOME so the real state directory is never touched.

use assert_cmd::Command;
use tempfile::TempDir;

fn reticle(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("reticle").unwrap();
    cmd.env("HOME", home.path()).env_remove("RETICLE_LOG");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "command failed: {output:?}");
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn sens_reports_conversions() {
    let home = tempfile::tempdir().unwrap();
    let out = stdout_of(reticle(&home).args(["sens", "--dpi", "800", "--sens", "0.35"]));
    assert!(out.contains("eDPI:         280.0"), "{out}");
    assert!(out.contains("46.65 cm"), "{out}");
    assert!(out.contains("Low (Pro Level)"), "{out}");
    assert!(out.contains("recommended:  0.25 - 0.5"), "{out}");
    let cs2 = out.lines().find(|l| l.starts_with("CS2:")).unwrap();
    assert!(cs2.ends_with("1.114"), "{out}");
    let fortnite = out.lines().find(|l| l.starts_with("Fortnite:")).unwrap();
    assert!(fortnite.ends_with("0.044"), "{out}");
}

#[test]
fn settings_persist_between_runs() {
    let home = tempfile::tempdir().unwrap();
    stdout_of(reticle(&home).args(["settings", "--dpi", "1600", "--sens", "abc"]));

    let out = stdout_of(reticle(&home).arg("settings"));
    let settings: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(settings["dpi"], 1600);
    assert_eq!(settings["valorantSens"], 0.35);

    let out = stdout_of(reticle(&home).args(["sens"]));
    assert!(out.contains("eDPI:         560.0"), "{out}");
}

#[test]
fn export_import_and_clear() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("backup.json");
    std::fs::write(
        &file,
        r#"{
          "settings": {"dpi": 400},
          "history": {"sessions": [{
            "id": "abc1234",
            "mode": "tracking",
            "startTime": 1700000000000,
            "endTime": 1700000030000,
            "duration": 30000,
            "stats": {"hits": 9, "misses": 1, "totalShots": 10, "accuracy": 90.0,
                      "averageReactionTime": 310, "reactionTimes": [310,310,310,310,310,310,310,310,310],
                      "score": 800},
            "settings": {}
          }]}
        }"#,
    )
    .unwrap();

    let out = stdout_of(reticle(&home).arg("import").arg(&file));
    assert!(out.contains("imported 1 sessions and settings"), "{out}");

    let out = stdout_of(reticle(&home).arg("history"));
    assert!(out.contains("1 sessions, 30s total"), "{out}");
    assert!(out.contains("Tracking"), "{out}");

    let csv = stdout_of(reticle(&home).args(["history", "--csv"]));
    assert!(csv.lines().nth(1).unwrap().starts_with("abc1234,tracking,"));

    let exported = home.path().join("out.json");
    stdout_of(reticle(&home).arg("export").arg("-o").arg(&exported));
    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&exported).unwrap()).unwrap();
    assert_eq!(doc["settings"]["dpi"], 400);
    assert_eq!(doc["history"]["totalSessions"], 1);
    assert!(doc["exportDate"].is_string());

    stdout_of(reticle(&home).arg("clear-history"));
    let out = stdout_of(reticle(&home).arg("history"));
    assert!(out.contains("no sessions yet"), "{out}");
}

#[test]
fn malformed_import_fails_without_changes() {
    let home = tempfile::tempdir().unwrap();
    stdout_of(reticle(&home).args(["settings", "--dpi", "1200"]));
    let file = home.path().join("broken.json");
    std::fs::write(&file, "{\"settings\": ").unwrap();

    let output = reticle(&home).arg("import").arg(&file).output().unwrap();
    assert!(!output.status.success());

    let out = stdout_of(reticle(&home).arg("settings"));
    let settings: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(settings["dpi"], 1200);
}
