//! Hygiene — enforces coding standards at test time.
//!
//! Scans the board crate's production sources for antipatterns. Every
//! pattern has a budget of zero: panicking macros and silently discarded
//! errors have no place in a state core that promises all-or-nothing
//! mutations. Test files are exempt.

use std::fs;
use std::path::Path;

/// (pattern, what it means) — all budgets are zero.
const FORBIDDEN: &[(&str, &str)] = &[
    (".unwrap()", "panics on error"),
    (".expect(", "panics on error"),
    ("panic!(", "crashes the process"),
    ("unreachable!(", "crashes the process"),
    ("todo!(", "unfinished stub"),
    ("unimplemented!(", "unfinished stub"),
    ("let _ =", "discards a result without inspecting it"),
    (".ok()", "discards an error without inspecting it"),
    ("#[allow(dead_code)]", "hides unused code instead of removing it"),
];

struct SourceFile {
    path: String,
    content: String,
}

/// Collect production `.rs` files from `src/`, excluding `*_test.rs`.
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
        } else if path.extension().is_some_and(|e| e == "rs") {
            let path_str = path.to_string_lossy().to_string();
            if path_str.ends_with("_test.rs") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path: path_str, content });
            }
        }
    }
}

#[test]
fn forbidden_pattern_budgets() {
    let files = source_files();
    assert!(!files.is_empty(), "hygiene scan found no source files — run from the crate root");

    let mut violations = Vec::new();
    for (pattern, why) in FORBIDDEN {
        for file in &files {
            for (lineno, line) in file.content.lines().enumerate() {
                if line.contains(pattern) {
                    violations.push(format!(
                        "  {}:{}: `{}` ({})",
                        file.path,
                        lineno + 1,
                        pattern,
                        why
                    ));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "hygiene violations found (budget is zero):\n{}",
        violations.join("\n")
    );
}
