use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CSV path used when neither the config nor the command line names one.
pub const DEFAULT_OUTPUT: &str = "clicks.csv";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub output: PathBuf,
    /// Group selected when the session opens.
    pub group: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            group: None,
        }
    }
}

impl SessionConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading session config {}", path_ref.display()))?;
        let config: SessionConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing session config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Command-line values win over whatever the config file set.
    pub fn with_overrides(mut self, file: Option<PathBuf>, group: Option<String>) -> Self {
        if let Some(file) = file {
            self.output = file;
        }
        if group.is_some() {
            self.group = group;
        }
        self
    }
}
