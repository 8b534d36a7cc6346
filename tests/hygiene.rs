//! Hygiene: enforces coding standards at test time
//!
//! Scans `src/` (excluding `*_test.rs`) for antipatterns. Each has a budget,
//! currently zero everywhere. The budget never grows: fix an existing hit
//! before adding a new one.
#![allow(clippy::absurd_extreme_comparisons)]

use std::fs;
use std::path::Path;

// Panics: these crash the host.
const MAX_UNWRAP: usize = 0;
const MAX_EXPECT: usize = 0;
const MAX_PANIC: usize = 0;
const MAX_UNREACHABLE: usize = 0;
const MAX_TODO: usize = 0;
const MAX_UNIMPLEMENTED: usize = 0;

// Silent loss: discards errors without inspecting.
const MAX_SILENT_DISCARD: usize = 0;
const MAX_DOT_OK: usize = 0;

// Style / structure.
const MAX_ALLOW_DEAD_CODE: usize = 0;
const MAX_LIBRARY_PRINTLN: usize = 0;

struct SourceFile {
    path: String,
    content: String,
}

impl SourceFile {
    fn is_binary(&self) -> bool {
        self.path.ends_with("main.rs")
    }
}

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new(env!("CARGO_MANIFEST_DIR")).join("src").as_path(), &mut files);
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
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        if !path_str.ends_with(".rs") || path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

fn hits<'a>(files: impl IntoIterator<Item = &'a SourceFile>, pattern: &str) -> Vec<(String, usize)> {
    files
        .into_iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

fn assert_budget(found: &[(String, usize)], max: usize, label: &str) {
    let count: usize = found.iter().map(|(_, c)| c).sum();
    let listing = found.iter().map(|(path, c)| format!("  {path}: {c}")).collect::<Vec<_>>().join("\n");
    assert!(count <= max, "{label} budget exceeded: found {count}, max {max}.\n{listing}");
}

fn check(pattern: &str, max: usize, label: &str) {
    let files = source_files();
    assert!(!files.is_empty(), "no sources found under src/");
    assert_budget(&hits(&files, pattern), max, label);
}

#[test]
fn unwrap_budget() {
    check(".unwrap()", MAX_UNWRAP, ".unwrap()");
}

#[test]
fn expect_budget() {
    check(".expect(", MAX_EXPECT, ".expect()");
}

#[test]
fn panic_budget() {
    check("panic!(", MAX_PANIC, "panic!()");
}

#[test]
fn unreachable_budget() {
    check("unreachable!(", MAX_UNREACHABLE, "unreachable!()");
}

#[test]
fn todo_budget() {
    check("todo!(", MAX_TODO, "todo!()");
}

#[test]
fn unimplemented_budget() {
    check("unimplemented!(", MAX_UNIMPLEMENTED, "unimplemented!()");
}

#[test]
fn silent_discard_budget() {
    check("let _ =", MAX_SILENT_DISCARD, "let _ =");
}

#[test]
fn dot_ok_budget() {
    check(".ok()", MAX_DOT_OK, ".ok()");
}

#[test]
fn allow_dead_code_budget() {
    check("#[allow(dead_code)]", MAX_ALLOW_DEAD_CODE, "#[allow(dead_code)]");
}

/// The library reports through `tracing`; only the binary prints.
#[test]
fn library_println_budget() {
    let files = source_files();
    let library = files.iter().filter(|f| !f.is_binary());
    assert_budget(&hits(library, "println!("), MAX_LIBRARY_PRINTLN, "println!() in library");
}
