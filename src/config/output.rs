use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct OutputConfig {
    /// File receiving the cluster record; nothing is written when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl OutputConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.path {
            if path.as_os_str().is_empty() || path.file_name().is_none() {
                return Err(Error::InvalidConfig(format!(
                    "output path {} must name a file",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}
