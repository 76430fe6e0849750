use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use crate::input::MotionSample;

/// Proof of a completed export.
#[derive(Debug, Clone)]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub samples: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to serialize samples: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Serializes the samples as a pretty-printed JSON array, append order
/// preserved, and writes them to `<output_dir>/motion-<epoch-millis>.json`.
pub async fn write_samples(
    samples: &[MotionSample],
    output_dir: &Path,
) -> Result<ExportReceipt, ExportError> {
    let content = serde_json::to_string_pretty(samples)?;

    if !output_dir.as_os_str().is_empty() {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|source| ExportError::Write {
                path: output_dir.to_path_buf(),
                source,
            })?;
    }

    let path = output_dir.join(format!("motion-{}.json", Utc::now().timestamp_millis()));
    debug!("Writing {} samples to {}", samples.len(), path.display());

    tokio::fs::write(&path, content)
        .await
        .map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;

    Ok(ExportReceipt {
        path,
        samples: samples.len(),
    })
}
