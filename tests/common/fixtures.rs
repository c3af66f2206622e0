//! Test fixture generators for integration tests.
#![allow(dead_code)]

use std::path::Path;

use tempfile::TempDir;

/// Small package: a module defining `x`, a subpackage using it, a class with
/// two methods and a module-level function.
pub const SHAPES_PY: &str = "\
class Shape:
    def area(self):
        return 0

    def scale(self, factor):
        return factor

def make(kind, size=1):
    return Shape()
";

pub const CONFIG_PY: &str = "x = 1\nlimit: int = 10\n";

pub const USES_PY: &str = "print(x)\nprint(limit)\n";

/// Write `files` (relative path, content) under a fresh temp directory.
pub fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    for (path, content) in files {
        write(dir.path(), path, content);
    }
    dir
}

pub fn write(root: &Path, relative: &str, content: &str) {
    let full = root.join(relative);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::fs::write(full, content).expect("write fixture file");
}

/// The standard three-file project.
pub fn shapes_project() -> TempDir {
    project(&[
        ("config.py", CONFIG_PY),
        ("shapes.py", SHAPES_PY),
        ("app/uses.py", USES_PY),
    ])
}

/// Identity prefix for nodes under `dir` (its final path component).
pub fn root_name(dir: &TempDir) -> String {
    dir.path()
        .canonicalize()
        .expect("canonicalize temp dir")
        .file_name()
        .expect("temp dir has a name")
        .to_string_lossy()
        .into_owned()
}
