use anyhow::Result;
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions recognised as router definition files
const DEFINITION_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// File scanner for traversing a directory of router definitions.
///
/// The `FileScanner` recursively walks through a directory to find all YAML and JSON
/// router definition files. It skips `target` and hidden directories (those starting
/// with `.`).
///
/// # Example
///
/// ```no_run
/// use openapi_from_routes::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./routes"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} definition files", result.definition_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Result of directory scanning operation.
pub struct ScanResult {
    /// Paths of all discovered definition files, in directory-walk order
    pub definition_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Scans the directory tree and collects all definition files.
    ///
    /// Inaccessible entries are logged and recorded as warnings; scanning continues.
    /// Files are visited in name order so repeated runs see the same sequence.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut definition_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_target = file_name == "target";

                !is_hidden && !is_target
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && is_definition_file(path) {
                        definition_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult {
            definition_files,
            warnings,
        })
    }
}

fn is_definition_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| DEFINITION_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}
