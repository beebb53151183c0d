use crate::models::ContentConfig;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::io;
use std::path::{Path, PathBuf};

/// A file written to the content store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: PathBuf,
    pub url: String,
}

/// Flat directory of generated artifacts, addressed by URL
///
/// Every artifact gets a unique name `{kind}_{timestamp_ms}_{token}.{ext}`;
/// raw captures go to a separate temp directory and never get a URL.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
    temp_dir: PathBuf,
    base_url: String,
}

impl ContentStore {
    pub fn new(config: &ContentConfig) -> Self {
        Self {
            root: config.dir.clone(),
            temp_dir: config.temp_dir(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Fresh path for a raw capture; nothing is created yet
    pub fn temp_path(&self, kind: &str, ext: &str) -> PathBuf {
        self.temp_dir.join(unique_name(kind, ext))
    }

    /// Write `bytes` under a fresh name and return its path and URL
    pub async fn write(&self, kind: &str, ext: &str, bytes: &[u8]) -> io::Result<StoredFile> {
        let name = unique_name(kind, ext);
        let path = self.root.join(&name);
        write_file(&path, bytes).await?;
        Ok(StoredFile {
            url: self.url_for(&name),
            path,
        })
    }

    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.base_url, file_name)
    }

    /// Map a content URL back to its file
    ///
    /// Only bare file names directly under the base URL resolve; anything
    /// that could walk out of the store returns `None`.
    pub fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let name = url.strip_prefix(&self.base_url)?.strip_prefix('/')?;
        let is_bare = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\'])
            && Path::new(name).file_name().is_some_and(|f| f == name);
        is_bare.then(|| self.root.join(name))
    }

    /// Delete a file, ignoring "not found" and logging anything else
    pub async fn remove_quietly(path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove file"),
        }
    }
}

/// Write a file, creating missing parent directories first
pub async fn write_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await
}

fn unique_name(kind: &str, ext: &str) -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!(
        "{kind}_{}_{token}.{ext}",
        chrono::Utc::now().timestamp_millis()
    )
}
