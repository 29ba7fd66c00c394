//! Patch mode name parsing, shared between the config file and the
//! `--mode` CLI flag.

use dynamorph_patch::PatchMode;

use crate::error::CliError;

pub fn parse_mode(name: &str) -> Result<PatchMode, CliError> {
    match name.to_ascii_lowercase().as_str() {
        "strict" => Ok(PatchMode::Strict),
        "lenient" => Ok(PatchMode::Lenient),
        "clobber" => Ok(PatchMode::Clobber),
        other => Err(CliError::UnknownMode(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_every_mode_case_insensitively() {
        assert_eq!(parse_mode("Strict").unwrap(), PatchMode::Strict);
        assert_eq!(parse_mode("LENIENT").unwrap(), PatchMode::Lenient);
        assert_eq!(parse_mode("clobber").unwrap(), PatchMode::Clobber);
    }

    #[test]
    fn rejects_unknown_names() {
        assert!(parse_mode("yolo").is_err());
    }
}
