use std::path::Path;

use glob::glob;
use serde::de::DeserializeOwned;

use crate::error::DatasetError;
use crate::markers::ResourceData;

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
    let f = std::fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = std::io::BufReader::new(f);
    serde_json::from_reader(reader).map_err(|source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Merges every resource file matching `pattern`; later files win on
/// duplicate keys.
pub fn load_resource_data(pattern: &str) -> Result<ResourceData, DatasetError> {
    tracing::debug!("Loading resource data from {}", pattern);
    let entries = glob(pattern).map_err(|e| DatasetError::Pattern(e.to_string()))?;
    let mut data = ResourceData::new();
    for entry in entries {
        let path = entry.map_err(|e| DatasetError::Io {
            path: e.path().to_path_buf(),
            source: std::io::Error::new(e.error().kind(), e.error().to_string()),
        })?;
        let part: ResourceData = load_json(&path)?;
        tracing::debug!("Loaded {} resources from {}", part.len(), path.display());
        data.extend(part);
    }
    Ok(data)
}
