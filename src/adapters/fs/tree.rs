use crate::domain::ports::SourceTree;
use anyhow::{Context, Result, bail};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// File system source tree
///
/// Traversal is depth-first; inside each directory, files come before
/// subdirectories and both are ordered lexicographically by name.
#[derive(Debug, Clone)]
pub struct FsSourceTree {
    root: PathBuf,
    root_name: String,
    extensions: Vec<String>,
    include_hidden: bool,
    follow_links: bool,
}

impl FsSourceTree {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            bail!("Source root does not exist or is not a directory: {}", root.display());
        }
        let root_name = root
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| root.display().to_string());
        Ok(Self {
            root: root.to_path_buf(),
            root_name,
            extensions: vec!["py".to_string()],
            include_hidden: false,
            follow_links: false,
        })
    }

    pub fn with_extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_string())
            .collect();
        self
    }

    pub fn with_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_source(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|wanted| wanted == ext))
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    (a.file_type().is_dir(), a.file_name()).cmp(&(b.file_type().is_dir(), b.file_name()))
}

impl SourceTree for FsSourceTree {
    fn root_name(&self) -> &str {
        &self.root_name
    }

    fn source_files(&self) -> Result<Vec<PathBuf>> {
        let include_hidden = self.include_hidden;
        let walker = WalkDir::new(&self.root)
            .follow_links(self.follow_links)
            .sort_by(files_first)
            .into_iter()
            .filter_entry(move |e| e.depth() == 0 || include_hidden || !is_hidden(e));

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", self.root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.is_source(entry.path()) {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .with_context(|| format!("Entry outside root: {}", entry.path().display()))?;
            files.push(relative.to_path_buf());
        }
        Ok(files)
    }

    fn read(&self, path: &Path) -> Result<String> {
        let full_path = self.root.join(path);
        std::fs::read_to_string(&full_path)
            .with_context(|| format!("Failed to read source file: {}", full_path.display()))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(&full_path, content)
            .with_context(|| format!("Failed to write source file: {}", full_path.display()))
    }

    fn exists(&self, path: &Path) -> bool {
        self.root.join(path).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn test_files_before_subdirectories_in_name_order() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.py");
        touch(dir.path(), "a.py");
        touch(dir.path(), "aa/z.py");
        touch(dir.path(), "c/d.py");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), ".venv/lib.py");

        let tree = FsSourceTree::open(dir.path()).unwrap();
        let files: Vec<String> = tree
            .source_files()
            .unwrap()
            .iter()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(files, vec!["a.py", "b.py", "aa/z.py", "c/d.py"]);
    }

    #[test]
    fn test_hidden_directories_can_be_included() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), ".venv/lib.py");
        let tree = FsSourceTree::open(dir.path()).unwrap().with_hidden(true);
        assert_eq!(tree.source_files().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = FsSourceTree::open(dir.path().join("absent")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let tree = FsSourceTree::open(dir.path()).unwrap();
        tree.write(Path::new("pkg/new.py"), "x = 1\n").unwrap();
        assert!(tree.exists(Path::new("pkg/new.py")));
        assert_eq!(tree.read(Path::new("pkg/new.py")).unwrap(), "x = 1\n");
    }
}
