use crate::router::RouterDefinition;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Loader for router definition files.
///
/// Files ending in `.json` are read with `serde_json`; everything else is read as YAML.
///
/// # Example
///
/// ```no_run
/// use openapi_from_routes::parser::DefinitionParser;
/// use std::path::Path;
///
/// let parsed = DefinitionParser::parse_file(Path::new("routes/users.yaml")).unwrap();
/// println!("Loaded {} top-level routes", parsed.definition.routes.len());
/// ```
pub struct DefinitionParser;

/// A successfully loaded router definition.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    pub definition: RouterDefinition,
}

impl ParsedFile {
    /// Name used in logs: the definition name, else the file path
    pub fn display_name(&self) -> String {
        self.definition
            .name
            .clone()
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

impl DefinitionParser {
    /// Loads a single definition file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not describe a router.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let is_json = path.extension().and_then(|s| s.to_str()) == Some("json");
        let definition: RouterDefinition = if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse router definition: {}", path.display()))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse router definition: {}", path.display()))?
        };

        debug!(
            "Successfully parsed {} ({} top-level routes)",
            path.display(),
            definition.routes.len()
        );

        Ok(ParsedFile {
            path: path.to_path_buf(),
            definition,
        })
    }

    /// Loads several files, continuing past failures.
    ///
    /// Returns one result per input path, in input order. Failures are logged as warnings
    /// so that documentation can still be generated from the remaining files.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| {
                Self::parse_file(path).map_err(|e| {
                    warn!("Failed to parse {}: {:#}", path.display(), e);
                    e
                })
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}
