//! Artifact cache (C7): versioned, atomically-written derived-state
//! persistence.
//!
//! Grounded on `original_source/role_normalization/api/models/role_norm.py`'s
//! artifact bootstrap (gzip+pickle files reloaded across process restarts).
//! This crate replaces gzip+pickle with `serde`+`bincode`, and replaces
//! "write then hope" with write-tmp-then-rename via `tempfile`, matching how
//! production Rust services avoid serving a half-written artifact file.

use crate::error::{EngineError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Bumped whenever the on-disk artifact layout changes. A mismatch forces a
/// rebuild rather than attempting to deserialize an incompatible shape.
pub const ARTIFACT_VERSION: u32 = 1;

#[derive(serde::Serialize, serde::Deserialize)]
struct Envelope<T> {
    version: u32,
    payload: T,
}

/// Load the artifact named `name` under `dir` if present and at the current
/// version; otherwise compute it with `build` and persist it. Equivalent to
/// `load_or_build_with(dir, name, false, build)`.
pub fn load_or_build<T, F>(dir: &Path, name: &str, build: F) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    load_or_build_with(dir, name, false, build)
}

/// Like [`load_or_build`], but when `strict` is set a version mismatch is a
/// fatal [`EngineError::ArtifactVersionMismatch`] instead of a silent
/// rebuild. Use `strict` for deployments where an artifact directory is
/// shared across releases and a stale-schema read should be surfaced rather
/// than papered over.
pub fn load_or_build_with<T, F>(dir: &Path, name: &str, strict: bool, build: F) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    let path = artifact_path(dir, name);

    match std::fs::read(&path) {
        Ok(bytes) => match bincode::deserialize::<Envelope<T>>(&bytes) {
            Ok(envelope) if envelope.version == ARTIFACT_VERSION => {
                tracing::info!(artifact = name, "artifact loaded from cache");
                Ok(envelope.payload)
            }
            Ok(envelope) if strict => Err(EngineError::ArtifactVersionMismatch {
                path,
                expected: ARTIFACT_VERSION,
                found: envelope.version,
            }),
            Ok(envelope) => {
                tracing::warn!(
                    artifact = name,
                    found = envelope.version,
                    expected = ARTIFACT_VERSION,
                    "artifact version mismatch, rebuilding"
                );
                rebuild_and_store(&path, build)
            }
            Err(e) => Err(EngineError::CorruptArtifact {
                path,
                reason: e.to_string(),
            }),
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(artifact = name, "artifact missing, building");
            rebuild_and_store(&path, build)
        }
        Err(e) => Err(EngineError::GazetteerIo { path, source: e }),
    }
}

fn rebuild_and_store<T, F>(path: &Path, build: F) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    let payload = build();
    store(path, &payload)?;
    Ok(payload)
}

fn store<T: Serialize>(path: &Path, payload: &T) -> Result<()> {
    let envelope = Envelope {
        version: ARTIFACT_VERSION,
        payload,
    };
    let bytes = bincode::serialize(&envelope)?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| EngineError::Io(e.error))?;

    tracing::info!(path = %path.display(), "artifact persisted");
    Ok(())
}

fn artifact_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.bin"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_and_reloads_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let first: Vec<String> = load_or_build(dir.path(), "words", || {
            vec!["advogado".to_string(), "medico".to_string()]
        })
        .unwrap();
        assert_eq!(first, vec!["advogado".to_string(), "medico".to_string()]);

        let second: Vec<String> =
            load_or_build(dir.path(), "words", || panic!("should not rebuild")).unwrap();
        assert_eq!(second, first);
    }

    #[test]
    fn version_mismatch_triggers_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let path = artifact_path(dir.path(), "words");
        let stale = Envelope {
            version: ARTIFACT_VERSION + 1,
            payload: vec!["stale".to_string()],
        };
        std::fs::create_dir_all(dir.path()).unwrap();
        std::fs::write(&path, bincode::serialize(&stale).unwrap()).unwrap();

        let rebuilt: Vec<String> =
            load_or_build(dir.path(), "words", || vec!["fresh".to_string()]).unwrap();
        assert_eq!(rebuilt, vec!["fresh".to_string()]);
    }

    #[test]
    fn strict_mode_rejects_version_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = artifact_path(dir.path(), "words");
        let stale = Envelope {
            version: ARTIFACT_VERSION + 1,
            payload: vec!["stale".to_string()],
        };
        std::fs::create_dir_all(dir.path()).unwrap();
        std::fs::write(&path, bincode::serialize(&stale).unwrap()).unwrap();

        let result: Result<Vec<String>> =
            load_or_build_with(dir.path(), "words", true, || panic!("should not rebuild"));
        assert!(matches!(
            result,
            Err(EngineError::ArtifactVersionMismatch { .. })
        ));
    }

    #[test]
    fn corrupt_artifact_is_a_fatal_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = artifact_path(dir.path(), "words");
        std::fs::write(&path, b"not a valid envelope").unwrap();

        let result: Result<Vec<String>> = load_or_build(dir.path(), "words", Vec::new);
        assert!(matches!(result, Err(EngineError::CorruptArtifact { .. })));
    }
}
