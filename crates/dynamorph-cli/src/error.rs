//! CLI-level error taxonomy. Wraps every library error the commands can
//! surface plus the handful of failure modes that only exist at the
//! process boundary (bad file paths, malformed config, malformed JSON).

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("IO error reading/writing {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("JSON error in {path}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },

    #[error("config error in {path}: {source}")]
    Config { path: PathBuf, source: toml::de::Error },

    #[error("path parse error: {0}")]
    PathParse(#[from] dynamorph_optic::ParseError),

    #[error(transparent)]
    Patch(#[from] dynamorph_patch::PatchError),

    #[error(transparent)]
    Migration(#[from] dynamorph_migration::SchemaError),

    #[error("unknown patch mode '{0}' (expected strict, lenient, or clobber)")]
    UnknownMode(String),

    #[error("no migration path found from '{from}' to '{to}'")]
    NoPlan { from: String, to: String },
}

pub fn read_json_file<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<T, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json { path: path.to_path_buf(), source })
}

pub fn write_json_file<T: serde::Serialize>(path: &std::path::Path, value: &T) -> Result<(), CliError> {
    let text =
        serde_json::to_string_pretty(value).map_err(|source| CliError::Json { path: path.to_path_buf(), source })?;
    std::fs::write(path, text).map_err(|source| CliError::Io { path: path.to_path_buf(), source })
}
