//! `migrate.toml` loading and its merge order: CLI flags override the config file,
//! which overrides the built-in defaults.

use std::path::{Path, PathBuf};

use orchestrator::{CpmStrategy, RunConfiguration};
use serde::Deserialize;

use crate::args::CommonArgs;
use crate::error::CliError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FileConfig {
    pub dry_run: Option<bool>,
    pub parallel: Option<usize>,
    pub offline: Option<bool>,
    pub target_framework: Option<String>,
    pub output_directory: Option<PathBuf>,
    pub central_package_management: Option<bool>,
    pub cpm_strategy: Option<String>,
}

const CONFIG_FILE_NAME: &str = "migrate.toml";

/// `None` when no `migrate.toml` exists at `root`; an unreadable-but-present file or a
/// parse failure is an invalid-argument error, not a silent fallback to defaults.
pub fn load_file_config(root: &Path) -> Result<Option<FileConfig>, CliError> {
    let path = root.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(&path)?;
    let parsed: FileConfig = toml::from_str(&raw).map_err(|e| CliError::ConfigParse(e.to_string()))?;
    Ok(Some(parsed))
}

pub(crate) fn parse_cpm_strategy(raw: &str) -> Result<CpmStrategy, CliError> {
    match raw {
        "highest-wins" => Ok(CpmStrategy::HighestWins),
        "manifest-wins" => Ok(CpmStrategy::ManifestWins),
        "user-prompt" => Ok(CpmStrategy::UserPrompt),
        other => Err(CliError::InvalidArgument(format!(
            "unknown cpm-strategy \"{other}\" (expected highest-wins, manifest-wins or user-prompt)"
        ))),
    }
}

/// Builds the immutable run configuration the orchestrator runs against, applying the
/// CLI-over-file-over-default precedence field by field.
pub fn build_run_configuration(args: &CommonArgs, file: Option<&FileConfig>) -> Result<RunConfiguration, CliError> {
    let defaults = RunConfiguration::default();

    if let Some(parallel) = args.parallel {
        if parallel == 0 {
            return Err(CliError::InvalidArgument("--parallel must be at least 1".to_string()));
        }
    }

    let parallelism = args
        .parallel
        .or_else(|| file.and_then(|f| f.parallel))
        .unwrap_or(defaults.parallelism);
    if parallelism == 0 {
        return Err(CliError::InvalidArgument("parallel must be at least 1".to_string()));
    }

    let cpm_strategy = match file.and_then(|f| f.cpm_strategy.as_deref()) {
        Some(raw) => parse_cpm_strategy(raw)?,
        None => defaults.cpm_strategy,
    };

    Ok(RunConfiguration {
        root: args.root.clone(),
        dry_run: args.dry_run || file.and_then(|f| f.dry_run).unwrap_or(false),
        parallelism,
        offline: args.offline || file.and_then(|f| f.offline).unwrap_or(defaults.offline),
        target_framework_override: args
            .target_framework
            .clone()
            .or_else(|| file.and_then(|f| f.target_framework.clone())),
        output_directory: args
            .output_directory
            .clone()
            .or_else(|| file.and_then(|f| f.output_directory.clone())),
        central_package_management: args.central_package_management
            || file.and_then(|f| f.central_package_management).unwrap_or(false),
        cpm_strategy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flag_overrides_file_config() {
        let dir = tempfile::tempdir().unwrap();
        let file = FileConfig { parallel: Some(2), ..Default::default() };
        let args = CommonArgs {
            root: dir.path().to_path_buf(),
            dry_run: false,
            parallel: Some(8),
            offline: false,
            target_framework: None,
            output_directory: None,
            central_package_management: false,
            log_level: None,
        };
        let config = build_run_configuration(&args, Some(&file)).unwrap();
        assert_eq!(config.parallelism, 8);
    }

    #[test]
    fn file_config_used_when_flag_absent() {
        let dir = tempfile::tempdir().unwrap();
        let file = FileConfig { parallel: Some(2), ..Default::default() };
        let args = CommonArgs {
            root: dir.path().to_path_buf(),
            dry_run: false,
            parallel: None,
            offline: false,
            target_framework: None,
            output_directory: None,
            central_package_management: false,
            log_level: None,
        };
        let config = build_run_configuration(&args, Some(&file)).unwrap();
        assert_eq!(config.parallelism, 2);
    }

    #[test]
    fn zero_parallel_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let args = CommonArgs {
            root: dir.path().to_path_buf(),
            dry_run: false,
            parallel: Some(0),
            offline: false,
            target_framework: None,
            output_directory: None,
            central_package_management: false,
            log_level: None,
        };
        assert!(build_run_configuration(&args, None).is_err());
    }

    #[test]
    fn missing_config_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_file_config(dir.path()).unwrap().is_none());
    }
}
