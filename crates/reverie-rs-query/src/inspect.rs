//! Artifact inspection seam used to enrich query results.

use std::fs;
use std::path::Path;

/// What the inspector learned about an artifact path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArtifactInfo {
    /// Whether something exists at the path.
    pub exists: bool,
    /// Size in bytes, zero when absent.
    pub size: u64,
    /// File extension without the leading dot, empty when absent.
    pub extension: String,
}

/// Looks up artifact facts without the query layer knowing the storage
/// format.
pub trait ArtifactInspector: Send + Sync {
    /// Inspect the artifact at the given path.
    fn inspect(&self, path: &str) -> ArtifactInfo;
}

/// Inspector backed by the local filesystem.
#[derive(Debug, Default)]
pub struct FsArtifactInspector;

impl ArtifactInspector for FsArtifactInspector {
    fn inspect(&self, path: &str) -> ArtifactInfo {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(_) => return ArtifactInfo::default(),
        };
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_string();
        ArtifactInfo {
            exists: true,
            size: metadata.len(),
            extension,
        }
    }
}
