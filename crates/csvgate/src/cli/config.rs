//! Config loading and the `config` command

use crate::cli::error::HelpfulError;
use anyhow::Result;
use csvgate_detect::{Classifier, DetectError, DetectorConfig};
use std::path::Path;
use tracing::debug;

/// Load the detector config, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<DetectorConfig> {
    let Some(path) = path else {
        debug!("No config file given, using defaults");
        return Ok(DetectorConfig::default());
    };

    if !path.exists() {
        return Err(HelpfulError::file_not_found(path)
            .with_context("The config file passed via --config or CSVGATE_CONFIG does not exist")
            .into());
    }

    let config = DetectorConfig::load(path)
        .map_err(|e| HelpfulError::invalid_config(path, &e.to_string()))?;
    debug!(path = %path.display(), signatures = config.signatures.len(), "Loaded config");
    Ok(config)
}

/// Build the classifier for `config`. Bad user signatures are reported
/// against the config file they came from.
pub fn build_classifier(config: &DetectorConfig, path: Option<&Path>) -> Result<Classifier> {
    Classifier::new(config).map_err(|e| {
        let user_error = matches!(e, DetectError::InvalidSignature { .. } | DetectError::Config(_));
        match path {
            Some(path) if user_error => {
                anyhow::Error::from(HelpfulError::invalid_config(path, &e.to_string()))
            }
            _ => anyhow::Error::new(e).context("Failed to build classifier"),
        }
    })
}

/// Print the effective configuration as TOML
pub fn run(config: &DetectorConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_path_gives_defaults() {
        assert_eq!(load_config(None).unwrap(), DetectorConfig::default());
    }

    #[test]
    fn test_missing_file_is_helpful() {
        let err = load_config(Some(Path::new("/nonexistent/csvgate.toml"))).unwrap_err();
        let helpful = err.downcast_ref::<HelpfulError>().unwrap();
        assert!(helpful.message.contains("File not found"));
    }

    #[test]
    fn test_bad_signature_reported_against_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("csvgate.toml");
        std::fs::write(&path, "[[signatures]]\nlabel = \"broken\"\npattern = \"ZZ\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        let err = build_classifier(&config, Some(&path)).unwrap_err();
        let helpful = err.downcast_ref::<HelpfulError>().unwrap();
        assert!(helpful.context.as_deref().unwrap().contains("broken"));
    }
}
