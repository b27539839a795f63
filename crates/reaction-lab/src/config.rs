//! Session configuration.
//!
//! Read from a RON, TOML or JSON file (format by extension). Every field has
//! a default, so an empty file is a valid configuration.

use reaction_lab_core::workbench::WorkbenchBounds;
use reaction_lab_data::loader::{DataLoadError, detect_format, parse_str};
use reaction_lab_objectives::OBJECTIVES_PER_TIER;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors raised while loading or validating a [`LabConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] DataLoadError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("objectives_per_tier must be at least 1")]
    ZeroPerTier,

    #[error("workbench size and margin must be finite, got {size} and {margin}")]
    NonFiniteWorkbench { size: f32, margin: f32 },

    #[error("workbench size {size} leaves no room inside a margin of {margin}")]
    WorkbenchTooSmall { size: f32, margin: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// Directory holding the persisted unlock and progress records.
    pub storage_dir: PathBuf,
    /// Directory with `elements`, `reactions` and optionally `objectives`
    /// data files. `None` uses the built-in content.
    pub content_dir: Option<PathBuf>,
    /// Completions needed to clear a tier.
    pub objectives_per_tier: u32,
    pub workbench_size: f32,
    pub workbench_margin: f32,
}

impl Default for LabConfig {
    fn default() -> Self {
        let bounds = WorkbenchBounds::default();
        Self {
            storage_dir: PathBuf::from(".reaction-lab"),
            content_dir: None,
            objectives_per_tier: OBJECTIVES_PER_TIER,
            workbench_size: bounds.size,
            workbench_margin: bounds.margin,
        }
    }
}

impl LabConfig {
    /// Read and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = detect_format(path)?;
        let text = std::fs::read_to_string(path)?;
        let config: LabConfig = parse_str(&text, format, path)?;
        config.validate()?;
        tracing::debug!(target: "lab.session", path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.objectives_per_tier == 0 {
            return Err(ConfigError::ZeroPerTier);
        }
        if !self.workbench_size.is_finite() || !self.workbench_margin.is_finite() {
            return Err(ConfigError::NonFiniteWorkbench {
                size: self.workbench_size,
                margin: self.workbench_margin,
            });
        }
        if self.workbench_margin < 0.0 || self.workbench_size <= 2.0 * self.workbench_margin {
            return Err(ConfigError::WorkbenchTooSmall {
                size: self.workbench_size,
                margin: self.workbench_margin,
            });
        }
        Ok(())
    }

    pub fn bounds(&self) -> WorkbenchBounds {
        WorkbenchBounds {
            size: self.workbench_size,
            margin: self.workbench_margin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "reaction_lab_config_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn defaults_are_valid() {
        let config = LabConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.objectives_per_tier, 50);
        assert_eq!(config.bounds(), WorkbenchBounds::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let dir = make_test_dir("toml");
        let path = dir.join("lab.toml");
        fs::write(
            &path,
            r#"
storage_dir = "/tmp/lab-saves"
objectives_per_tier = 10
"#,
        )
        .unwrap();

        let config = LabConfig::load(&path).unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/lab-saves"));
        assert_eq!(config.objectives_per_tier, 10);
        assert_eq!(config.content_dir, None);
        assert_eq!(config.workbench_size, 400.0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn ron_and_json_are_accepted() {
        let dir = make_test_dir("ron_json");
        let ron_path = dir.join("lab.ron");
        fs::write(&ron_path, r#"(content_dir: Some("content"), workbench_margin: 20.0)"#).unwrap();
        let config = LabConfig::load(&ron_path).unwrap();
        assert_eq!(config.content_dir, Some(PathBuf::from("content")));
        assert_eq!(config.workbench_margin, 20.0);

        let json_path = dir.join("lab.json");
        fs::write(&json_path, "{}").unwrap();
        assert_eq!(LabConfig::load(&json_path).unwrap(), LabConfig::default());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn invalid_values_rejected() {
        let dir = make_test_dir("invalid");
        let path = dir.join("lab.toml");
        fs::write(&path, "objectives_per_tier = 0").unwrap();
        assert!(matches!(LabConfig::load(&path), Err(ConfigError::ZeroPerTier)));

        let cramped = LabConfig {
            workbench_size: 80.0,
            workbench_margin: 40.0,
            ..LabConfig::default()
        };
        assert!(matches!(
            cramped.validate(),
            Err(ConfigError::WorkbenchTooSmall { .. })
        ));

        fs::write(&path, "workbench_margin = nan").unwrap();
        assert!(matches!(
            LabConfig::load(&path),
            Err(ConfigError::NonFiniteWorkbench { .. })
        ));
        fs::write(&path, "workbench_size = inf").unwrap();
        assert!(matches!(
            LabConfig::load(&path),
            Err(ConfigError::NonFiniteWorkbench { .. })
        ));

        let yaml = dir.join("lab.yaml");
        fs::write(&yaml, "").unwrap();
        assert!(matches!(LabConfig::load(&yaml), Err(ConfigError::Load(_))));

        let _ = fs::remove_dir_all(&dir);
    }
}
