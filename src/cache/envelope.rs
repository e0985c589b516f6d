use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::graph::Graph;

/// Current cache format version. Bump when the bincode layout of `Graph` changes.
pub const CACHE_VERSION: u32 = 1;

/// Cache directory name, created beside the snapshot.
pub const CACHE_DIR: &str = ".dagger";

/// Size and mtime (seconds since epoch) of the snapshot a cache was built from.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileMeta {
    pub mtime_secs: u64,
    pub size: u64,
}

/// Envelope wrapping the serialized graph with version and staleness metadata.
#[derive(serde::Serialize, serde::Deserialize)]
pub struct CacheEnvelope {
    pub version: u32,
    pub snapshot_path: PathBuf,
    pub snapshot_meta: FileMeta,
    pub graph: Graph,
}

/// `<snapshot dir>/.dagger/<snapshot file name>.bin`
pub fn cache_path(snapshot: &Path) -> PathBuf {
    let dir = snapshot.parent().unwrap_or_else(|| Path::new("."));
    let mut name = snapshot
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "graph".into());
    name.push(".bin");
    dir.join(CACHE_DIR).join(name)
}

/// Current size and mtime of the snapshot, or `None` if it cannot be stat'ed.
pub fn snapshot_meta(snapshot: &Path) -> Option<FileMeta> {
    let metadata = std::fs::metadata(snapshot).ok()?;
    let mtime_secs = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0);
    Some(FileMeta {
        mtime_secs,
        size: metadata.len(),
    })
}

/// Save the graph atomically: temp file in the cache directory, then rename.
pub fn save_cache(snapshot: &Path, meta: FileMeta, graph: &Graph) -> Result<()> {
    let target = cache_path(snapshot);
    let cache_dir = target
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(CACHE_DIR));
    let fail = |e: std::io::Error| Error::write_failed(&target, e);
    std::fs::create_dir_all(&cache_dir).map_err(fail)?;

    let envelope = CacheEnvelope {
        version: CACHE_VERSION,
        snapshot_path: snapshot.to_path_buf(),
        snapshot_meta: meta,
        graph: graph.clone(),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(&cache_dir).map_err(fail)?;
    bincode::serde::encode_into_std_write(&envelope, &mut tmp, bincode::config::standard())
        .map_err(|e| fail(std::io::Error::other(e)))?;
    tmp.as_file().flush().map_err(fail)?;
    tmp.persist(&target).map_err(|e| fail(e.error))?;
    tracing::debug!(path = %target.display(), "wrote graph cache");
    Ok(())
}

/// Load the cached envelope. `None` if the file is missing, corrupt, or from another
/// cache version.
pub fn load_cache(snapshot: &Path) -> Option<CacheEnvelope> {
    let bytes = std::fs::read(cache_path(snapshot)).ok()?;
    let result =
        bincode::serde::decode_from_slice::<CacheEnvelope, _>(&bytes, bincode::config::standard());
    match result {
        Ok((envelope, _)) if envelope.version == CACHE_VERSION => Some(envelope),
        Ok((envelope, _)) => {
            tracing::debug!(found = envelope.version, "ignoring cache from another version");
            None
        }
        Err(err) => {
            tracing::debug!("ignoring unreadable cache: {err}");
            None
        }
    }
}
