//! Hygiene: source-scan budgets for the photo-canvas library.
//!
//! The library runs inside input handlers, so a panic drops the whole editing
//! session. Each pattern below has a budget (zero everywhere today). The
//! budget only ever goes down.
#![allow(clippy::absurd_extreme_comparisons)]

use std::fs;
use std::path::{Path, PathBuf};

struct Budget {
    pattern: &'static str,
    max: usize,
    why: &'static str,
}

const PANICS: &[Budget] = &[
    Budget { pattern: ".unwrap()", max: 0, why: "propagate with ? or handle the None/Err" },
    Budget { pattern: ".expect(", max: 0, why: "propagate with ? or handle the None/Err" },
    Budget { pattern: "panic!(", max: 0, why: "input handlers must not crash the session" },
    Budget { pattern: "unreachable!(", max: 0, why: "encode the invariant in the type instead" },
    Budget { pattern: "todo!(", max: 0, why: "stubs do not ship" },
    Budget { pattern: "unimplemented!(", max: 0, why: "stubs do not ship" },
];

const SILENT_LOSS: &[Budget] = &[
    Budget { pattern: "let _ =", max: 0, why: "log the error or return it" },
    Budget { pattern: ".ok()", max: 0, why: "log the error or return it" },
];

const STYLE: &[Budget] = &[
    Budget { pattern: "#[allow(dead_code)]", max: 0, why: "delete unused code" },
    Budget { pattern: "println!(", max: 0, why: "use tracing" },
    Budget { pattern: "eprintln!(", max: 0, why: "use tracing" },
];

// Modules without behavior of their own.
const UNTESTED_MODULES: &[&str] = &["lib.rs", "consts.rs", "error.rs"];

struct SourceFile {
    path: PathBuf,
    content: String,
}

/// Production `.rs` files under `canvas/src/`, excluding `*_test.rs`.
fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") && !is_test_file(&path) {
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path, content });
            }
        }
    }
}

fn is_test_file(path: &Path) -> bool {
    path.to_string_lossy().ends_with("_test.rs")
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (file.path.display().to_string(), count))
        })
        .collect()
}

fn check(budgets: &[Budget]) {
    let files = source_files();
    assert!(!files.is_empty(), "no sources found; run from the canvas crate root");
    let mut failures = Vec::new();
    for budget in budgets {
        let found = hits(&files, budget.pattern);
        let count: usize = found.iter().map(|(_, c)| c).sum();
        if count > budget.max {
            let detail: Vec<String> = found.iter().map(|(path, c)| format!("    {path}: {c}")).collect();
            failures.push(format!(
                "{} budget exceeded: found {count}, max {} ({})\n{}",
                budget.pattern,
                budget.max,
                budget.why,
                detail.join("\n")
            ));
        }
    }
    assert!(failures.is_empty(), "\n{}", failures.join("\n"));
}

#[test]
fn panic_budget() {
    check(PANICS);
}

#[test]
fn silent_loss_budget() {
    check(SILENT_LOSS);
}

#[test]
fn style_budget() {
    check(STYLE);
}

#[test]
fn every_module_has_a_test_file() {
    let missing: Vec<String> = source_files()
        .iter()
        .filter_map(|file| {
            let name = file.path.file_name()?.to_string_lossy().to_string();
            if UNTESTED_MODULES.contains(&name.as_str()) {
                return None;
            }
            let sibling = file.path.with_file_name(name.replace(".rs", "_test.rs"));
            (!sibling.exists()).then_some(name)
        })
        .collect();
    assert!(missing.is_empty(), "modules without a sibling _test.rs: {missing:?}");
}
