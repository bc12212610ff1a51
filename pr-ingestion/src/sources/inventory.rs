use std::{
    fs,
    path::{Path, PathBuf},
};

use super::metric_csv_dir::collect_files;

const SAMPLE: usize = 5;

/// What a metric root looks like on disk. Used to tell a misconfigured path
/// from an empty dataset before running a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderInventory {
    pub root: PathBuf,
    pub exists: bool,
    /// Immediate subdirectory names, sorted.
    pub subdirectories: Vec<String>,
    /// Regular files found recursively.
    pub files: usize,
    /// Of those, files with a `.csv` extension.
    pub csv_files: usize,
    /// First few files, relative to the root.
    pub sample: Vec<PathBuf>,
}

impl FolderInventory {
    pub fn collect(root: &Path) -> std::io::Result<Self> {
        let mut inv = Self {
            root: root.to_path_buf(),
            ..Self::default()
        };
        if !root.is_dir() {
            return Ok(inv);
        }
        inv.exists = true;

        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                inv.subdirectories
                    .push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        inv.subdirectories.sort();

        let files = collect_files(root)?;
        inv.files = files.len();
        inv.csv_files = files
            .iter()
            .filter(|p| {
                p.extension()
                    .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
            })
            .count();
        inv.sample = files
            .iter()
            .take(SAMPLE)
            .map(|p| p.strip_prefix(root).unwrap_or(p).to_path_buf())
            .collect();

        Ok(inv)
    }

    pub fn log(&self, label: &str) {
        if !self.exists {
            tracing::warn!(folder = label, root = %self.root.display(), "folder not found");
            return;
        }

        tracing::info!(
            folder = label,
            root = %self.root.display(),
            subdirectories = self.subdirectories.len(),
            files = self.files,
            csv_files = self.csv_files,
            "folder found"
        );
        for name in self.subdirectories.iter().take(SAMPLE) {
            tracing::info!(folder = label, subdirectory = %name);
        }
        for path in &self.sample {
            tracing::info!(folder = label, file = %path.display());
        }
        if self.files == 0 {
            tracing::warn!(folder = label, "folder contains no files");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn counts_nested_files_and_subdirectories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("2024-01")).unwrap();
        fs::create_dir_all(dir.path().join("2024-02")).unwrap();
        fs::write(dir.path().join("2024-01/2024-01-01.csv"), "Date,PR\n").unwrap();
        fs::write(dir.path().join("2024-02/readme.txt"), "x").unwrap();

        let inv = FolderInventory::collect(dir.path()).unwrap();
        assert!(inv.exists);
        assert_eq!(inv.subdirectories, vec!["2024-01", "2024-02"]);
        assert_eq!(inv.files, 2);
        assert_eq!(inv.csv_files, 1);
        assert_eq!(inv.sample[0], PathBuf::from("2024-01/2024-01-01.csv"));
    }

    #[test]
    fn missing_root_is_reported_not_raised() {
        let dir = TempDir::new().unwrap();
        let inv = FolderInventory::collect(&dir.path().join("GHI")).unwrap();
        assert!(!inv.exists);
        assert_eq!(inv.files, 0);
    }
}
