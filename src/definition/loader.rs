//! Pipeline definition loader
//!
//! Load pipeline definitions from YAML files or strings.

use std::path::Path;

use super::PipelineDefinition;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error in {file}: {error}")]
    Yaml {
        file: String,
        error: serde_yaml::Error,
    },
}

pub struct PipelineLoader;

impl PipelineLoader {
    pub fn load_file(path: &Path) -> Result<PipelineDefinition, LoadError> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| LoadError::Yaml {
            file: path.display().to_string(),
            error: e,
        })
    }

    pub fn load_str(yaml: &str) -> Result<PipelineDefinition, LoadError> {
        serde_yaml::from_str(yaml).map_err(|e| LoadError::Yaml {
            file: "<string>".to_string(),
            error: e,
        })
    }
}
