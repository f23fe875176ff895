// Download cache for the raw storm export.
//
// A cached file is reused while it is younger than the TTL (when one is
// set) and its content still matches the SHA-256 recorded next to it.
// Anything else triggers a fresh download.
use crate::error::{Result, StormError};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

pub struct SourceCache {
    dir: PathBuf,
    ttl: Option<Duration>,
}

impl SourceCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Option<Duration>) -> Self {
        SourceCache {
            dir: dir.into(),
            ttl,
        }
    }

    /// Local path a URL is cached under: the last path segment of the URL.
    pub fn path_for(&self, url: &str) -> Result<PathBuf> {
        let name = url
            .split(['?', '#'])
            .next()
            .and_then(|u| u.rsplit('/').next())
            .filter(|n| !n.is_empty() && *n != "." && *n != "..")
            .ok_or_else(|| StormError::Config(format!("cannot derive a file name from '{}'", url)))?;
        Ok(self.dir.join(name))
    }

    /// Return a local copy of `url`, downloading only when the cache is stale.
    pub fn fetch(&self, url: &str) -> Result<PathBuf> {
        let path = self.path_for(url)?;
        if self.is_fresh(&path)? {
            info!("Using cached {}", path.display());
            return Ok(path);
        }
        info!("Downloading {}", url);
        fs::create_dir_all(&self.dir)?;
        let mut resp = reqwest::blocking::get(url)?.error_for_status()?;
        let mut body = Vec::new();
        resp.read_to_end(&mut body)?;
        self.store(&path, &body)?;
        info!("Cached {} bytes at {}", body.len(), path.display());
        Ok(path)
    }

    /// Write `body` to `path` through a temporary file and record its digest.
    pub fn store(&self, path: &Path, body: &[u8]) -> Result<()> {
        let tmp = path.with_extension("part");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, path)?;
        fs::write(checksum_path(path), sha256_hex(body))?;
        Ok(())
    }

    /// A cached file is fresh when it exists, is within the TTL, and matches
    /// its recorded checksum.
    pub fn is_fresh(&self, path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        if let Some(ttl) = self.ttl {
            let modified = fs::metadata(path)?.modified()?;
            let age = SystemTime::now()
                .duration_since(modified)
                .unwrap_or(Duration::ZERO);
            if age > ttl {
                debug!("{} is older than the cache TTL", path.display());
                return Ok(false);
            }
        }
        let Ok(expected) = fs::read_to_string(checksum_path(path)) else {
            debug!("{} has no recorded checksum", path.display());
            return Ok(false);
        };
        let actual = sha256_hex(&fs::read(path)?);
        Ok(expected.trim() == actual)
    }
}

fn checksum_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".sha256");
    PathBuf::from(name)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_comes_from_url() {
        let cache = SourceCache::new("/tmp/storm", None);
        assert_eq!(
            cache.path_for("https://example.org/data/StormData.csv.bz2?x=1").unwrap(),
            PathBuf::from("/tmp/storm/StormData.csv.bz2")
        );
        assert!(cache.path_for("https://example.org/").is_err());
        assert!(cache.path_for("https://example.org/data/..").is_err());
        assert!(cache.path_for("https://example.org/data/.").is_err());
        assert!(cache.path_for("https://example.org/..?x=1").is_err());
    }

    #[test]
    fn stored_file_is_fresh_until_tampered() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SourceCache::new(dir.path(), None);
        let path = dir.path().join("StormData.csv");
        assert!(!cache.is_fresh(&path).unwrap());

        cache.store(&path, b"EVTYPE\nHAIL\n").unwrap();
        assert!(cache.is_fresh(&path).unwrap());

        fs::write(&path, b"EVTYPE\nTORNADO\n").unwrap();
        assert!(!cache.is_fresh(&path).unwrap());
    }

    #[test]
    fn missing_checksum_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SourceCache::new(dir.path(), None);
        let path = dir.path().join("StormData.csv");
        fs::write(&path, b"EVTYPE\n").unwrap();
        assert!(!cache.is_fresh(&path).unwrap());
    }

    #[test]
    fn ttl_expires_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("StormData.csv");
        SourceCache::new(dir.path(), None).store(&path, b"x").unwrap();

        assert!(SourceCache::new(dir.path(), Some(Duration::from_secs(3600)))
            .is_fresh(&path)
            .unwrap());
        std::thread::sleep(Duration::from_millis(20));
        assert!(!SourceCache::new(dir.path(), Some(Duration::from_millis(1)))
            .is_fresh(&path)
            .unwrap());
    }

    #[test]
    fn digest_is_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
