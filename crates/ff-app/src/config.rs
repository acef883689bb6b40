//! Pipeline configuration loaded from YAML.

use std::path::Path;

use ff_core::Deadline;
use ff_slices::ExtractorConfig;
use ff_steady::SteadyConfig;
use ff_survival::SurvivalConfig;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{AppError, AppResult};

/// One sub-config per component; every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub extractor: ExtractorConfig,
    pub steady: SteadyConfig,
    pub survival: SurvivalConfig,
    /// Time budget per folder in seconds; unset means unbounded.
    pub folder_timeout_s: Option<f64>,
}

impl PipelineConfig {
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::from_yaml_str(&content)?;
        tracing::info!(path = %path.display(), "loaded pipeline config");
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| AppError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.extractor.min_points < 3 {
            return Err(AppError::Config(
                "extractor.min_points must be at least 3".to_string(),
            ));
        }
        self.steady.validate()?;
        self.survival.validate()?;
        if let Some(t) = self.folder_timeout_s
            && !(t.is_finite() && t > 0.0)
        {
            return Err(AppError::Config(format!(
                "folder_timeout_s must be positive, got {t}"
            )));
        }
        Ok(())
    }

    /// Content hash of the config, stored in folder reports.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        let json = serde_json::to_string(self).unwrap_or_default();
        hasher.update(json.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// A fresh deadline for one folder.
    pub fn deadline(&self) -> Deadline {
        Deadline::after_secs(self.folder_timeout_s)
    }
}
