use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Overrides;
use crate::hardware::{Category, CollectOptions, ProbeOptions};

const CONFIG_FILE: &str = "config.yaml";
const APP_DIR: &str = "hwsnap";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub categories: Vec<Category>,
    pub format: OutputFormat,
    pub parallel: bool,
    pub disable_warnings: bool,
    pub root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            categories: Category::ALL.to_vec(),
            format: OutputFormat::Json,
            parallel: false,
            disable_warnings: true,
            root: PathBuf::from("/"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse YAML in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let path_display = path_ref.display().to_string();
        let text = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_display.clone(),
            source,
        })?;

        let cfg: Config = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path_display,
            source,
        })?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// An explicit path must exist. Without one, the per-user config file is
    /// read when present and defaults apply otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        match default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::load_from_file(path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::Validation(
                "categories must name at least one category".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if !seen.insert(category) {
                let name = category
                    .to_possible_value()
                    .map(|v| v.get_name().to_string())
                    .unwrap_or_default();
                return Err(ConfigError::Validation(format!(
                    "category '{name}' is listed more than once"
                )));
            }
        }

        if !self.root.is_absolute() {
            return Err(ConfigError::Validation(format!(
                "root must be an absolute path, got '{}'",
                self.root.display()
            )));
        }

        Ok(())
    }

    pub fn example_yaml() -> &'static str {
        include_str!("../config.yaml.example")
    }
}

/// Effective settings after command-line overrides.
#[derive(Debug, Clone)]
pub struct Settings {
    pub collect: CollectOptions,
    pub probe: ProbeOptions,
    pub format: OutputFormat,
}

impl Settings {
    pub fn resolve(mut config: Config, overrides: &Overrides) -> Result<Self, ConfigError> {
        if let Some(categories) = &overrides.categories {
            config.categories = categories.clone();
        }
        if let Some(format) = overrides.format {
            config.format = format;
        }
        if let Some(root) = &overrides.root {
            config.root = root.clone();
        }
        config.parallel |= overrides.parallel;
        if overrides.warnings {
            config.disable_warnings = false;
        }

        config.validate()?;

        Ok(Self {
            collect: CollectOptions {
                categories: config.categories,
                parallel: config.parallel,
            },
            probe: ProbeOptions {
                root: config.root,
                disable_warnings: config.disable_warnings,
            },
            format: config.format,
        })
    }
}

/// `<config_dir>/hwsnap/config.yaml`, e.g. `~/.config/hwsnap/config.yaml`.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_means_defaults() {
        let cfg: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg, Config::default());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn reduced_sweep() {
        let yaml = "categories: [memory, cpu, gpu]\nparallel: true\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            cfg.categories,
            vec![Category::Memory, Category::Cpu, Category::Gpu]
        );
        assert!(cfg.parallel);
        assert!(cfg.disable_warnings);
    }

    #[test]
    fn rejects_empty_categories() {
        let cfg = Config {
            categories: vec![],
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_duplicate_categories() {
        let cfg = Config {
            categories: vec![Category::Cpu, Category::Memory, Category::Cpu],
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("'cpu'"));
    }

    #[test]
    fn rejects_relative_root() {
        let cfg = Config {
            root: PathBuf::from("relative/root"),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn unknown_category_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "categories: [memory, floppy]\n").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn misspelled_key_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "categores: [cpu]\n").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("categores"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn overrides_take_precedence() {
        let config = Config {
            categories: vec![Category::Memory],
            ..Default::default()
        };
        let overrides = Overrides {
            categories: Some(vec![Category::Cpu, Category::Gpu]),
            format: Some(OutputFormat::Yaml),
            parallel: true,
            warnings: true,
            ..Default::default()
        };

        let settings = Settings::resolve(config, &overrides).unwrap();

        assert_eq!(settings.collect.categories, vec![Category::Cpu, Category::Gpu]);
        assert!(settings.collect.parallel);
        assert!(!settings.probe.disable_warnings);
        assert_eq!(settings.probe.root, PathBuf::from("/"));
        assert_eq!(settings.format, OutputFormat::Yaml);
    }

    #[test]
    fn overrides_are_validated() {
        let overrides = Overrides {
            root: Some(PathBuf::from("image")),
            ..Default::default()
        };
        assert!(Settings::resolve(Config::default(), &overrides).is_err());
    }

    #[test]
    fn example_config_is_valid() {
        let cfg: Config = serde_yaml::from_str(Config::example_yaml()).unwrap();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg, Config::default());
    }
}
