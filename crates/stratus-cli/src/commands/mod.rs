pub mod sync;
pub mod wait;

use std::path::{Path, PathBuf};

use stratus_provider::{Manifest, ProviderError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to read manifest {}: {source}", path.display())]
    ReadManifest {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid manifest {}: {source}", path.display())]
    ParseManifest {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub fn read_manifest(path: &Path) -> Result<Manifest, CommandError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CommandError::ReadManifest {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| CommandError::ParseManifest {
        path: path.to_path_buf(),
        source,
    })
}
