//! Generator configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::labels::{LabelDType, Stage};
use crate::error::{Error, Result};

/// Configuration for a [`ListGenerator`](crate::data::generator::ListGenerator).
///
/// `batch_size` is carried for interface compatibility but each request
/// serves exactly one candidate list; values above 1 are accepted and
/// currently behave identically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub stage: Stage,
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,
    #[serde(default)]
    pub label_dtype: LabelDType,
}

fn default_batch_size() -> usize {
    1
}

fn default_shuffle() -> bool {
    true
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            stage: Stage::default(),
            shuffle: default_shuffle(),
            label_dtype: LabelDType::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_label_dtype(mut self, dtype: LabelDType) -> Self {
        self.label_dtype = dtype;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidArgument {
                arg: "batch_size",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    /// Load a configuration from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::ConfigError {
            reason: format!("IO error: {e}"),
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| Error::ConfigError {
            reason: format!("JSON parse error: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }
}
