use std::path::{Path, PathBuf};

/// Environment variable that relocates the data directory.
pub const HOME_ENV: &str = "DECODER_HOME";

const RULES_FILE: &str = "rules.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    pub data_dir: PathBuf,
}

impl DecoderConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Resolve from `DECODER_HOME`, falling back to `~/.decoder/`.
    pub fn from_env() -> Self {
        match std::env::var_os(HOME_ENV) {
            Some(dir) if !dir.is_empty() => {
                tracing::debug!(dir = ?dir, "data dir from {HOME_ENV}");
                Self::new(dir)
            }
            _ => Self::new(default_data_dir()),
        }
    }

    /// Location of the persisted rulebook.
    pub fn rules_path(&self) -> PathBuf {
        self.data_dir.join(RULES_FILE)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::new(default_data_dir())
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".decoder")
}
