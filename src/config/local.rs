use crate::core::SourceTree;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Source tree backed by the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct LocalTree;

impl LocalTree {
    pub fn new() -> Self {
        Self
    }
}

impl SourceTree for LocalTree {
    async fn is_dir(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    async fn list_files(&self, root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
        let root = root.to_path_buf();
        let suffixes: Vec<String> = extensions.iter().map(|ext| format!(".{}", ext)).collect();

        tokio::task::spawn_blocking(move || walk_files(&root, &suffixes)).await?
    }

    async fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        tokio::fs::read_to_string(path).await
    }
}

fn walk_files(root: &Path, suffixes: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        // symlinked files count, symlinked directories are not descended
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if suffixes.iter().any(|suffix| name.ends_with(suffix.as_str())) {
            files.push(entry.into_path());
        }
    }

    tracing::debug!("Found {} matching files under {}", files.len(), root.display());
    Ok(files)
}
