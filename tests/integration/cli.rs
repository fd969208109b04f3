mod common;

use common::{exprmap, write_manifest, MANIFEST};

#[test]
fn demo_prints_before_and_after() {
    let output = exprmap().arg("demo").output().unwrap();
    assert!(output.status.success(), "demo failed: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("before: (x: Query<ItemFrom>, y: Query<GroupFrom>)"));
    assert!(stdout.contains("after:  (x: Query<ItemTo>, y: Query<GroupTo>)"));
}

#[test]
fn staged_demo_matches_single_pass() {
    let single = exprmap().arg("demo").output().unwrap();
    let staged = exprmap().args(["demo", "--staged"]).output().unwrap();
    assert!(staged.status.success());
    assert_eq!(single.stdout, staged.stdout);
}

#[test]
fn demo_json_is_tagged_by_node() {
    let output = exprmap().args(["demo", "--json"]).output().unwrap();
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["after"]["node"], "Lambda");
    assert_eq!(doc["after"]["params"][0]["ty"], "Query<ItemTo>");
    assert_eq!(doc["before"]["params"][0]["ty"], "Query<ItemFrom>");
}

#[test]
fn check_lists_resolved_members() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, MANIFEST);
    let output = exprmap().arg("check").arg(&path).output().unwrap();
    assert!(output.status.success(), "check failed: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Models.ItemFrom.Id -> Models.ItemTo.Id (property)"));
    assert!(stdout.contains("Models.ItemFrom.code -> Models.ItemTo.code (field)"));
}

#[test]
fn check_fails_on_unresolved_member() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(
        &dir,
        r#"
[[type]]
name = "A"
properties = [{ name = "Gone", type = "long" }]

[[type]]
name = "B"

[[substitute]]
from = "A"
to = "B"
"#,
    );
    let output = exprmap().arg("check").arg(&path).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot resolve member 'Gone' of 'A'"));
}

#[test]
fn check_reports_manifest_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, "[[substitute]]\nfrom = \"Query<\"\nto = \"string\"\n");
    let output = exprmap().arg("check").arg(&path).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("type syntax error"));
}
