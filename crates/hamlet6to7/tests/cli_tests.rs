use std::fs;
use std::path::PathBuf;

use hamlet6to7::{command, run, CliOptions, OutputFormat};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn options(paths: Vec<PathBuf>) -> CliOptions {
    CliOptions {
        paths,
        dry_run: false,
        format: OutputFormat::Text,
        verbosity: 0,
    }
}

fn report(options: &CliOptions) -> (String, bool) {
    let mut out = Vec::new();
    let summary = run(options, &mut out).unwrap();
    (String::from_utf8(out).unwrap(), summary.success())
}

#[test]
fn test_text_report() {
    let dir = TempDir::new().unwrap();
    let home = dir.path().join("home.hamlet");
    let plain = dir.path().join("Plain.hs");
    let notes = dir.path().join("notes.md");
    fs::write(&home, "<h1>$title$\n^footer^\n").unwrap();
    fs::write(&plain, "main = pure ()\n").unwrap();
    fs::write(&notes, "$x$").unwrap();

    let (text, success) = report(&options(vec![home.clone(), plain.clone(), notes.clone()]));
    assert!(!success);

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], format!("migrated       {} (2 rewrites)", home.display()));
    assert_eq!(lines[1], format!("unchanged      {}", plain.display()));
    assert_eq!(lines[2], format!("error          unrecognized file kind: {}", notes.display()));
    assert_eq!(lines[3], "3 files: 1 migrated, 1 unchanged, 1 failed");

    assert_eq!(fs::read_to_string(&home).unwrap(), "<h1>#{title}\n^{footer}\n");
}

#[test]
fn test_dry_run_report() {
    let dir = TempDir::new().unwrap();
    let style = dir.path().join("site.cassius");
    fs::write(&style, "a\n    color: $linkColor$\n").unwrap();

    let mut options = options(vec![style.clone()]);
    options.dry_run = true;
    let (text, success) = report(&options);

    assert!(success);
    assert_eq!(
        text,
        format!("would migrate  {} (1 rewrite)\n1 file: 1 would migrate, 0 unchanged, 0 failed\n", style.display())
    );
    assert_eq!(fs::read_to_string(&style).unwrap(), "a\n    color: $linkColor$\n");
}

#[test]
fn test_json_report() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("app.julius");
    fs::write(&script, "var url = \"@HomeR@\";\n").unwrap();

    let mut options = options(vec![script.clone(), dir.path().join("missing.hs")]);
    options.format = OutputFormat::Json;
    let (text, success) = report(&options);
    assert!(!success);

    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["files_processed"], 2);
    assert_eq!(json["files"][0]["kind"], "julius");
    assert_eq!(json["files"][0]["outcome"]["status"], "migrated");
    assert_eq!(json["files"][0]["outcome"]["rewrites"], 1);
    assert_eq!(json["files"][1]["outcome"]["error"], "unreadable");
    assert!(json["rules"].as_array().unwrap().len() >= 4);
}

#[test]
fn test_directory_argument() {
    let dir = TempDir::new().unwrap();
    let templates = dir.path().join("templates");
    fs::create_dir(&templates).unwrap();
    fs::write(templates.join("default-layout.hamlet"), "$forall items item\n    <li>$item$\n").unwrap();
    fs::write(templates.join("notes.txt"), "$ignored$").unwrap();

    let matches = command()
        .try_get_matches_from(["hamlet6to7".into(), templates.clone().into_os_string()])
        .unwrap();
    let (text, success) = report(&CliOptions::from_matches(&matches));

    assert!(success);
    assert!(text.ends_with("1 file: 1 migrated, 0 unchanged, 0 failed\n"));
    assert_eq!(
        fs::read_to_string(templates.join("default-layout.hamlet")).unwrap(),
        "$forall item <- items\n    <li>#{item}\n"
    );
    assert_eq!(fs::read_to_string(templates.join("notes.txt")).unwrap(), "$ignored$");
}
