//! End-to-end tests that spawn the `tsoutline` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Path to the built binary, next to the test executable's parent dir.
fn tsoutline_bin() -> PathBuf {
    let mut path = std::env::current_exe()
        .unwrap()
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf();
    path.push("tsoutline");
    path
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Run the binary with an empty home and project dir so no real config
/// leaks into the test.
fn run(env: &TempDir, args: &[&str]) -> Output {
    Command::new(tsoutline_bin())
        .args(args)
        .arg("--project")
        .arg(env.path())
        .env("HOME", env.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run tsoutline")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn fixture_arg(name: &str) -> String {
    fixture(name).to_string_lossy().into_owned()
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

#[test]
fn show_prints_indented_tree() {
    let env = TempDir::new().unwrap();
    let out = run(&env, &["show", &fixture_arg("payment_service.ts"), "--no-icons"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let text = stdout(&out);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "3:  interface Payment");
    assert_eq!(lines[1], "4:    property paymentSystem");
    assert!(lines.contains(&"8:  class PaymentService"));
    assert!(lines.contains(&"21:    getter get total"));
    assert!(lines.contains(&"16:    method addPayment"));
    assert_eq!(lines.last(), Some(&"40:  function createService"));
    assert!(!text.contains('\x1b'));
}

#[test]
fn show_with_icons_and_visibility() {
    let env = TempDir::new().unwrap();
    let out = run(
        &env,
        &["show", &fixture_arg("payment_service.ts"), "--icons", "--visibility"],
    );
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("9:    📝🔒📖 property payments [private]\n"));
    assert!(text.contains("40:  🔧🌐🌟 function createService [public]\n"));
}

#[test]
fn show_json_emits_one_object_per_root() {
    let env = TempDir::new().unwrap();
    let out = run(&env, &["--json", "show", &fixture_arg("shapes.ts")]);
    assert!(out.status.success());

    let roots: Vec<serde_json::Value> = stdout(&out)
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(roots.len(), 4);
    assert_eq!(roots[0]["name"], "Shape");
    assert_eq!(roots[0]["kind"], "class");
    assert_eq!(roots[0]["children"][1]["modifiers"][0], "abstract");
    assert_eq!(roots[3]["name"], "loadShapes");
    assert!(roots[3].get("children").is_none());
}

#[test]
fn show_sorted_by_category() {
    let env = TempDir::new().unwrap();
    let out = run(
        &env,
        &[
            "show",
            &fixture_arg("payment_service.ts"),
            "--no-icons",
            "--sort",
            "category",
        ],
    );
    assert!(out.status.success());
    let text = stdout(&out);
    let first = text.lines().next().unwrap();
    assert_eq!(first, "8:  class PaymentService");
    assert_eq!(text.lines().nth(1), Some("12:    constructor constructor"));
}

#[test]
fn project_config_sets_defaults() {
    let env = TempDir::new().unwrap();
    let config_dir = env.path().join(".tsoutline");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "[outline]\nsort = \"name\"\n\n[display]\nshow_icons = false\n",
    )
    .unwrap();

    let out = run(&env, &["show", &fixture_arg("shapes.ts")]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    let roots: Vec<&str> = text
        .lines()
        .filter(|l| !l.contains(":    "))
        .map(|l| l.split_whitespace().last().unwrap())
        .collect();
    assert_eq!(roots, ["Circle", "Shape", "loadShapes", "unitCircle"]);
}

#[test]
fn malformed_config_is_reported() {
    let env = TempDir::new().unwrap();
    let config_dir = env.path().join(".tsoutline");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "[outline\n").unwrap();

    let out = run(&env, &["show", &fixture_arg("shapes.ts")]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("failed to parse config file"));
}

// ---------------------------------------------------------------------------
// locate / symbols
// ---------------------------------------------------------------------------

#[test]
fn locate_describes_enclosing_declaration() {
    let env = TempDir::new().unwrap();
    let out = run(
        &env,
        &["locate", &fixture_arg("payment_service.ts"), "--line", "23"],
    );
    assert!(out.status.success());
    assert_eq!(
        stdout(&out),
        "getter: get total\n• Visibility: public\n• Line: 21\n"
    );
}

#[test]
fn locate_before_first_declaration_prints_hint() {
    let env = TempDir::new().unwrap();
    let out = run(
        &env,
        &["locate", &fixture_arg("payment_service.ts"), "--line", "1"],
    );
    assert!(out.status.success());
    assert!(stdout(&out).is_empty());
    assert!(stderr(&out).contains("hint: no declaration at or before line 1"));
}

#[test]
fn locate_line_zero_is_a_usage_error() {
    let env = TempDir::new().unwrap();
    let out = run(
        &env,
        &["locate", &fixture_arg("payment_service.ts"), "--line", "0"],
    );
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("error: --line is 1-based"));
    assert!(stderr(&out).contains("hint: run `tsoutline --help`"));
}

#[test]
fn symbols_dump_feeds_back_into_show() {
    let env = TempDir::new().unwrap();
    let out = run(&env, &["symbols", &fixture_arg("panel.tsx")]);
    assert!(out.status.success());
    let dump = env.path().join("panel.json");
    std::fs::write(&dump, &out.stdout).unwrap();

    let from_dump = run(
        &env,
        &[
            "show",
            &fixture_arg("panel.tsx"),
            "--no-icons",
            "--strategy",
            "structured",
            "--symbols",
            &dump.to_string_lossy(),
        ],
    );
    let direct = run(&env, &["show", &fixture_arg("panel.tsx"), "--no-icons"]);
    assert!(from_dump.status.success(), "stderr: {}", stderr(&from_dump));
    assert_eq!(stdout(&from_dump), stdout(&direct));
    assert!(stdout(&direct).starts_with("3:  interface ButtonProps\n"));
}

#[test]
fn malformed_symbols_file_is_an_error() {
    let env = TempDir::new().unwrap();
    let dump = env.path().join("bad.json");
    std::fs::write(&dump, "{\"kind\": 5}").unwrap();
    let out = run(
        &env,
        &[
            "show",
            &fixture_arg("shapes.ts"),
            "--symbols",
            &dump.to_string_lossy(),
        ],
    );
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("malformed symbol descriptors"));
    assert!(stderr(&out).contains("hint: symbol files must be a JSON array"));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn missing_file_exits_with_error_and_hint() {
    let env = TempDir::new().unwrap();
    let missing = env.path().join("nope.ts");
    let out = run(&env, &["show", &missing.to_string_lossy()]);
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("error: failed to read"));
    assert!(err.contains("hint: verify the file exists"));
}

#[test]
fn unsupported_language_is_rejected() {
    let env = TempDir::new().unwrap();
    let file = env.path().join("notes.py");
    std::fs::write(&file, "class Foo:\n    pass\n").unwrap();
    let out = run(&env, &["show", &file.to_string_lossy()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains(".tsx"));
}

#[test]
fn json_mode_suppresses_hints() {
    let env = TempDir::new().unwrap();
    let missing = env.path().join("nope.ts");
    let out = run(&env, &["--json", "show", &missing.to_string_lossy()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("error:"));
    assert!(!stderr(&out).contains("hint:"));
}

#[test]
fn unknown_subcommand_is_a_usage_error() {
    let env = TempDir::new().unwrap();
    let out = run(&env, &["frobnicate"]);
    assert_eq!(out.status.code(), Some(2));
}
