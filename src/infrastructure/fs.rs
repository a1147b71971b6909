use crate::domain::ports::EvidenceStore;
use crate::error::Result;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Default directory for evidence files, relative to the working directory.
pub const DEFAULT_EVIDENCE_DIR: &str = "evidence";

/// Evidence store backed by a directory on the local filesystem.
///
/// Blobs are written as `<root>/<key>`; the returned location is that path.
/// Concurrent uploads to the same key are not serialized.
#[derive(Debug, Clone)]
pub struct FsEvidenceStore {
    root: PathBuf,
}

impl FsEvidenceStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for FsEvidenceStore {
    fn default() -> Self {
        Self::new(DEFAULT_EVIDENCE_DIR)
    }
}

#[async_trait]
impl EvidenceStore for FsEvidenceStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<String> {
        fs::create_dir_all(&self.root).await?;
        let path = self.root.join(key);

        let mut file = fs::File::create(&path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;

        Ok(path.to_string_lossy().into_owned())
    }

    async fn get(&self, location: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(location).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
