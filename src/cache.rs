use crate::config::VersionSelector;
use crate::download::{download_file, sha256_digest};
use crate::error::{Error, Result};
use crate::repo_id::RepoId;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

/// The directory all cache entries live under. An ephemeral root owns a
/// `TempDir` and disappears with it when the invocation ends; a
/// persistent root is left alone.
pub struct CacheRoot {
    path: PathBuf,
    ephemeral: Option<TempDir>,
}

impl CacheRoot {
    pub fn persistent(path: PathBuf) -> Self {
        CacheRoot {
            path,
            ephemeral: None,
        }
    }

    pub fn ephemeral() -> Result<Self> {
        let dir = TempDir::new().map_err(|e| Error::filesystem(&std::env::temp_dir(), e))?;
        tracing::debug!("Ephemeral cache root: {}", dir.path().display());
        Ok(CacheRoot {
            path: dir.path().to_path_buf(),
            ephemeral: Some(dir),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The directory to remove on interruption, if this root is
    /// ephemeral. A persistent root is never cleanup-eligible.
    pub fn cleanup_path(&self) -> Option<PathBuf> {
        self.ephemeral.as_ref().map(|d| d.path().to_path_buf())
    }
}

/// On-disk cache entry keyed by `(repository, asset name)`: a payload
/// file plus a sidecar recording the release tag that produced it.
pub struct CacheEntry {
    pub asset_name: String,
    payload: PathBuf,
    sidecar: PathBuf,
}

impl CacheEntry {
    pub fn new(root: &Path, repo: &RepoId, asset_name: &str) -> Self {
        let stem = format!("{}__{}", repo.cache_stem(), asset_name);
        CacheEntry {
            asset_name: asset_name.to_string(),
            payload: root.join(&stem),
            sidecar: root.join(format!("{}.tag", stem)),
        }
    }

    pub fn payload(&self) -> &Path {
        &self.payload
    }

    pub fn payload_exists(&self) -> bool {
        self.payload.is_file()
    }

    /// The tag recorded when the payload was last successfully written.
    /// Unreadable or absent sidecars read as `None` (stale for latest).
    pub fn recorded_tag(&self) -> Option<String> {
        fs::read_to_string(&self.sidecar)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    Reuse,
    Download,
}

/// The reuse-or-redownload decision table, evaluated in order with the
/// first matching row winning: force redownloads unconditionally; a
/// missing payload downloads; an explicit tag with a payload reuses
/// (explicit versions are assumed immutable); latest reuses only when
/// the sidecar tag matches the freshly resolved tag.
pub fn cache_decision(
    force: bool,
    payload_exists: bool,
    selector: &VersionSelector,
    recorded_tag: Option<&str>,
    resolved_tag: &str,
) -> CacheDecision {
    if force {
        return CacheDecision::Download;
    }
    if !payload_exists {
        return CacheDecision::Download;
    }
    if !selector.is_latest() {
        return CacheDecision::Reuse;
    }
    if recorded_tag != Some(resolved_tag) {
        return CacheDecision::Download;
    }
    CacheDecision::Reuse
}

/// Return a path to an executable copy of the asset, downloading only
/// when the decision table says the cached copy cannot be trusted.
pub async fn resolve_local_path(
    client: &reqwest::Client,
    entry: &CacheEntry,
    url: &str,
    resolved_tag: &str,
    expected_checksum: Option<&str>,
    force: bool,
    selector: &VersionSelector,
) -> Result<PathBuf> {
    let decision = cache_decision(
        force,
        entry.payload_exists(),
        selector,
        entry.recorded_tag().as_deref(),
        resolved_tag,
    );

    match decision {
        CacheDecision::Reuse => {
            tracing::info!(
                "Using cached {} ({})",
                entry.asset_name,
                entry.payload.display()
            );
        }
        CacheDecision::Download => {
            fetch_and_verify(client, url, entry, expected_checksum, resolved_tag).await?;
        }
    }

    Ok(entry.payload.clone())
}

/// Download to a temporary file beside the final destination, verify
/// the digest when one is expected, and atomically move into place.
/// A pre-existing cache entry survives every failure path untouched.
pub async fn fetch_and_verify(
    client: &reqwest::Client,
    url: &str,
    entry: &CacheEntry,
    expected_checksum: Option<&str>,
    resolved_tag: &str,
) -> Result<()> {
    let parent = entry
        .payload
        .parent()
        .ok_or_else(|| Error::InvalidInput("cache entry has no parent directory".to_string()))?;

    let temp =
        NamedTempFile::new_in(parent).map_err(|e| Error::filesystem(parent, e))?;

    download_file(client, url, temp.path()).await?;

    promote(temp, entry, expected_checksum, resolved_tag)
}

/// Verify (when possible) and atomically install a fully-written
/// temporary file as the cache payload, then stamp the sidecar tag.
/// On checksum mismatch the temporary file is dropped and the real
/// entry is never touched.
fn promote(
    temp: NamedTempFile,
    entry: &CacheEntry,
    expected_checksum: Option<&str>,
    resolved_tag: &str,
) -> Result<()> {
    match expected_checksum {
        Some(expected) => {
            let actual = sha256_digest(temp.path())?;
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(Error::Integrity {
                    asset: entry.asset_name.clone(),
                    expected: expected.to_lowercase(),
                    actual,
                });
            }
            tracing::debug!("Checksum verified for {}", entry.asset_name);
        }
        None => {
            tracing::debug!(
                "No checksum available for {}; skipping verification",
                entry.asset_name
            );
        }
    }

    temp.persist(&entry.payload)
        .map_err(|e| Error::filesystem(&entry.payload, e.error))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&entry.payload)
            .map_err(|e| Error::filesystem(&entry.payload, e))?
            .permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&entry.payload, perms)
            .map_err(|e| Error::filesystem(&entry.payload, e))?;
    }

    fs::write(&entry.sidecar, resolved_tag).map_err(|e| Error::filesystem(&entry.sidecar, e))?;

    tracing::info!(
        "Cached {} at {} (tag {})",
        entry.asset_name,
        entry.payload.display(),
        resolved_tag
    );

    Ok(())
}
