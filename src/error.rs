//! Error types for placeholder substitution and parameter loading
//!
//! The command layer works with `anyhow`; everything below it returns
//! [`Error`] so callers can tell a missing environment variable apart from a
//! malformed document or a filesystem failure.

use std::fmt;
use std::path::PathBuf;

/// A single required environment variable that was unset or empty
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{key} is required, please set the environment variable")]
pub struct RequiredEnvKeyMissing {
    /// Name of the variable, without the `${}` decoration
    pub key: String,
}

/// Every missing variable found while substituting one piece of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingEnvKeys {
    pub missing: Vec<RequiredEnvKeyMissing>,
}

impl MissingEnvKeys {
    /// Names of the missing variables in first-appearance order
    pub fn keys(&self) -> Vec<&str> {
        self.missing.iter().map(|m| m.key.as_str()).collect()
    }
}

impl fmt::Display for MissingEnvKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} environment variable(s) missing:", self.missing.len())?;
        for m in &self.missing {
            write!(f, "\n\t* {m}")?;
        }
        Ok(())
    }
}

impl std::error::Error for MissingEnvKeys {}

/// A file the folder walker could not substitute
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: Error,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    MissingEnv(#[from] MissingEnvKeys),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
    #[error("substitution failed for {} file(s):{}", .failures.len(), render_failures(.failures))]
    Folder { failures: Vec<FileFailure> },
}

impl Error {
    /// Missing variable names when this is (or aggregates) a substitution failure
    pub fn missing_keys(&self) -> Vec<&str> {
        match self {
            Error::MissingEnv(m) => m.keys(),
            Error::Folder { failures } => failures
                .iter()
                .flat_map(|f| f.error.missing_keys())
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn render_failures(failures: &[FileFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("\n{}: {}", f.path.display(), f.error))
        .collect()
}

pub type Result<T> = std::result::Result<T, Error>;
