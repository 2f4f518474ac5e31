use crate::domain::ports::Storage;
use crate::utils::error::Result;
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.base_path.join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

/// Recursively lists files under `dir` whose extension is one of
/// `extensions` (case-insensitive), sorted by path.
///
/// Symlinked files are listed, symlinked directories are not entered, so a
/// link back up the tree cannot loop. Hidden files and ignore files are not
/// treated specially.
pub fn collect_documents(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .follow_links(false)
        .build();

    let mut found = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", dir.display(), err);
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && has_extension(path, extensions) {
            found.push(path.to_path_buf());
        }
    }

    found.sort();
    Ok(found)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
