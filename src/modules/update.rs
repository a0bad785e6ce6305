use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::modules::error::UpdateError;

pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseManifest {
    pub version: String,
    pub url: String,
    pub sha256: String,
}

impl ReleaseManifest {
    pub fn is_newer_than(&self, current: &str) -> bool {
        compare_versions(&self.version, current) == Ordering::Greater
    }
}

#[derive(Debug, Clone)]
pub enum UpdateStatus {
    UpToDate { version: String },
    Available(ReleaseManifest),
}

#[derive(Debug, Clone)]
pub struct Updater {
    manifest_url: String,
    http: Client,
}

impl Updater {
    pub fn new(manifest_url: impl Into<String>, timeout: Duration) -> Result<Self, UpdateError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            manifest_url: manifest_url.into(),
            http,
        })
    }

    pub fn fetch_manifest(&self) -> Result<ReleaseManifest, UpdateError> {
        debug!(url = %self.manifest_url, "fetching release manifest");
        let resp = self.http.get(&self.manifest_url).send()?;
        if !resp.status().is_success() {
            return Err(UpdateError::Status(resp.status().as_u16()));
        }
        let manifest: ReleaseManifest = resp.json()?;
        if manifest.version.trim().is_empty() || manifest.url.trim().is_empty() {
            return Err(UpdateError::Manifest("missing version or url".into()));
        }
        Ok(manifest)
    }

    pub fn check(&self) -> Result<UpdateStatus, UpdateError> {
        let manifest = self.fetch_manifest()?;
        if manifest.is_newer_than(CURRENT_VERSION) {
            Ok(UpdateStatus::Available(manifest))
        } else {
            Ok(UpdateStatus::UpToDate {
                version: manifest.version,
            })
        }
    }

    /// Downloads the release binary, verifies its checksum and writes it to
    /// `<releases_dir>/blocklog-<version>`.
    pub fn install(
        &self,
        manifest: &ReleaseManifest,
        releases_dir: &Path,
    ) -> Result<PathBuf, UpdateError> {
        let resp = self.http.get(&manifest.url).send()?;
        if !resp.status().is_success() {
            return Err(UpdateError::Status(resp.status().as_u16()));
        }
        let bytes = resp.bytes()?;
        verify_checksum(&bytes, &manifest.sha256)?;
        let path = write_release(releases_dir, &manifest.version, &bytes)?;
        info!(version = %manifest.version, path = %path.display(), "installed release");
        Ok(path)
    }
}

pub fn releases_dir(state_dir: &Path) -> PathBuf {
    state_dir.join("releases")
}

pub fn verify_checksum(bytes: &[u8], expected_hex: &str) -> Result<(), UpdateError> {
    let actual = hex::encode(Sha256::digest(bytes));
    let expected = expected_hex.trim().to_ascii_lowercase();
    if actual != expected {
        return Err(UpdateError::Checksum { expected, actual });
    }
    Ok(())
}

fn write_release(dir: &Path, version: &str, bytes: &[u8]) -> Result<PathBuf, UpdateError> {
    if version.contains(['/', '\\']) || version.contains("..") {
        return Err(UpdateError::Manifest(format!("unsafe version string {:?}", version)));
    }
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("blocklog-{}", version));
    fs::write(&path, bytes)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    }

    Ok(path)
}

/// Compares dotted numeric versions. Missing components count as 0 and any
/// `-suffix` is ignored.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> {
        v.trim()
            .trim_start_matches('v')
            .split('-')
            .next()
            .unwrap_or("")
            .split('.')
            .map(|part| part.parse::<u64>().unwrap_or(0))
            .collect()
    };
    let (a, b) = (parse(a), parse(b));
    let len = a.len().max(b.len());
    for idx in 0..len {
        let left = a.get(idx).copied().unwrap_or(0);
        let right = b.get(idx).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}
