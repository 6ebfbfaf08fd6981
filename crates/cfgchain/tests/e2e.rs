// End-to-end tests for the cfgchain binary.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn cfgchain(project: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cfgchain"))
        .arg("--cd")
        .arg(project)
        .args(args)
        // Keep the user's own config out of the picture.
        .env("HOME", project)
        .env("XDG_CONFIG_HOME", project.join("xdg"))
        .output()
        .expect("failed to run cfgchain")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn init_nested(project: &Path) {
    std::fs::create_dir_all(project.join(".cfgchain")).unwrap();
    std::fs::write(
        project.join(".cfgchain/config.toml"),
        r#"
        [[strategies]]
        kind = "nested-content"
        path_prefix = "/conf/nested"

        [[strategies]]
        kind = "direct"
    "#,
    )
    .unwrap();
}

#[test]
fn cli_help_displays_correctly() {
    let output = Command::new(env!("CARGO_BIN_EXE_cfgchain"))
        .arg("--help")
        .output()
        .expect("failed to run cfgchain --help");

    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["get", "list", "set", "set-collection", "delete", "resolve", "detect", "config"] {
        assert!(text.contains(command), "help should mention {command}");
    }
}

#[test]
fn set_then_get_through_nested_strategy() {
    let dir = tempdir().unwrap();
    init_nested(dir.path());

    let out = cfgchain(dir.path(), &["set", "/conf/nested/site", "title=Home", "max=5"]);
    assert!(out.status.success(), "{}", stderr(&out));

    let out = cfgchain(dir.path(), &["--format", "json", "get", "/conf/nested/site"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let value: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(value["path"], "/conf/nested/site/content");
    assert_eq!(value["properties"]["title"], "Home");
    assert_eq!(value["properties"]["max"], 5);

    let out = cfgchain(dir.path(), &["resolve", "/conf/flat"]);
    assert_eq!(stdout(&out).trim(), "/conf/flat");
}

#[test]
fn set_collection_rejects_duplicates_without_writing() {
    let dir = tempdir().unwrap();
    let items = dir.path().join("items.toml");
    std::fs::write(
        &items,
        r#"
        [[items]]
        name = "item1"
        [[items]]
        name = "item2"
        [[items]]
        name = "item1"
    "#,
    )
    .unwrap();

    let out = cfgchain(
        dir.path(),
        &["set-collection", "/conf/list", "--file", items.to_str().unwrap()],
    );
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Duplicate collection item name 'item1'"));
    assert!(!dir.path().join(".cfgchain/store.toml").exists());
}

#[test]
fn set_collection_then_list_in_order() {
    let dir = tempdir().unwrap();
    let items = dir.path().join("items.toml");
    std::fs::write(
        &items,
        r#"
        [[items]]
        name = "item1"
        [items.properties]
        n = 1

        [[items]]
        name = "item2"

        [[items]]
        name = "item3"
    "#,
    )
    .unwrap();

    let out = cfgchain(
        dir.path(),
        &["set-collection", "/conf/list", "--file", items.to_str().unwrap()],
    );
    assert!(out.status.success(), "{}", stderr(&out));

    let out = cfgchain(dir.path(), &["--format", "json", "list", "/conf/list"]);
    let value: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    let names: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["item1", "item2", "item3"]);
    assert_eq!(value[0]["properties"]["n"], 1);

    let out = cfgchain(dir.path(), &["delete", "/conf/list"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let out = cfgchain(dir.path(), &["get", "/conf/list"]);
    assert!(!out.status.success());
}

#[test]
fn config_init_validate_and_show() {
    let dir = tempdir().unwrap();

    let out = cfgchain(dir.path(), &["config", "init", "--nested"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let out = cfgchain(dir.path(), &["config", "init"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("already exists"));

    let out = cfgchain(dir.path(), &["config", "validate"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stderr(&out).contains("nested-content -> direct"));

    let out = cfgchain(dir.path(), &["config", "show"]);
    assert!(stdout(&out).contains("kind = \"nested-content\""));
}

#[test]
fn detect_finds_config_ref_ancestor() {
    let dir = tempdir().unwrap();
    let out = cfgchain(dir.path(), &["set", "/content/site", "configRef=/conf/site"]);
    assert!(out.status.success(), "{}", stderr(&out));

    let out = cfgchain(dir.path(), &["detect", "/content/site/en/page"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "/content/site");

    let out = cfgchain(dir.path(), &["detect", "/other/page"]);
    assert!(!out.status.success());
}
