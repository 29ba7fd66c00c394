//! Small TOML-backed config (spec SPEC_FULL §3: "reads a small TOML config
//! (patch mode default, input/output paths)"), matching the teacher's use of
//! `toml` for mapping definitions.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::CliError;
use crate::mode::parse_mode;
use dynamorph_patch::PatchMode;

/// `dynamorph.toml`. Every field is optional; CLI flags override it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    /// Default patch mode when `--mode` is not given on the `patch` subcommand.
    pub default_mode: Option<String>,
    /// Directory results are written into when `--output` is a bare filename.
    pub output_dir: Option<PathBuf>,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Io { path: path.to_path_buf(), source })?;
        toml::from_str(&text).map_err(|source| CliError::Config { path: path.to_path_buf(), source })
    }

    pub fn resolve_mode(&self, flag: Option<&str>) -> Result<PatchMode, CliError> {
        match flag.or(self.default_mode.as_deref()) {
            Some(name) => parse_mode(name),
            None => Ok(PatchMode::default()),
        }
    }

    pub fn resolve_output(&self, output: PathBuf) -> PathBuf {
        if output.is_relative() && output.parent().map(|p| p.as_os_str().is_empty()).unwrap_or(true) {
            if let Some(dir) = &self.output_dir {
                return dir.join(output);
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_none() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert!(config.default_mode.is_none());
        assert!(config.output_dir.is_none());
    }

    #[test]
    fn flag_overrides_config_default() {
        let config = CliConfig { default_mode: Some("lenient".to_string()), output_dir: None };
        assert_eq!(config.resolve_mode(Some("clobber")).unwrap(), PatchMode::Clobber);
        assert_eq!(config.resolve_mode(None).unwrap(), PatchMode::Lenient);
    }

    #[test]
    fn output_dir_prefixes_bare_filenames() {
        let config = CliConfig { default_mode: None, output_dir: Some(PathBuf::from("/tmp/out")) };
        assert_eq!(config.resolve_output(PathBuf::from("result.json")), PathBuf::from("/tmp/out/result.json"));
        assert_eq!(config.resolve_output(PathBuf::from("/abs/result.json")), PathBuf::from("/abs/result.json"));
    }
}
