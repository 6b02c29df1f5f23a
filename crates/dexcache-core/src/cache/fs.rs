use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use super::CacheIoError;

/// Replace `path` with `data` all-or-nothing: write a uniquely named sibling
/// temp file, then rename it over `path`. Concurrent writers to the same path
/// never share a temp file; the last rename wins.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<(), CacheIoError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| CacheIoError::io(dir, e))?;
    tmp.write_all(data).map_err(|e| CacheIoError::io(tmp.path(), e))?;
    // A failed persist drops the temp file, which removes it
    tmp.persist(path).map_err(|e| CacheIoError::io(path, e.error))?;
    Ok(())
}

pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CacheIoError> {
    let contents = serde_json::to_vec_pretty(value).map_err(|source| CacheIoError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, &contents)
}

/// Read and decode `path`. `Ok(None)` when the file does not exist.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CacheIoError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read(path).map_err(|e| CacheIoError::io(path, e))?;
    let value = serde_json::from_slice(&contents).map_err(|source| CacheIoError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_replaces_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_concurrent_writers_to_same_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("7.json");

        let writers: Vec<_> = (0..8u8)
            .map(|n| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let payload = vec![n; 64 * 1024];
                    for _ in 0..10 {
                        write_atomic(&path, &payload).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        // Whole payload from exactly one writer, no temp files left behind
        let contents = fs::read(&path).unwrap();
        assert_eq!(contents.len(), 64 * 1024);
        assert!(contents.iter().all(|b| *b == contents[0]));
        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_write_atomic_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("data.json");
        assert!(matches!(write_atomic(&path, b"x"), Err(CacheIoError::Io { .. })));
    }

    #[test]
    fn test_read_json_missing_and_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");

        assert!(read_json::<Vec<u32>>(&path).unwrap().is_none());

        fs::write(&path, b"{not json").unwrap();
        assert!(matches!(read_json::<Vec<u32>>(&path), Err(CacheIoError::Decode { .. })));

        write_json(&path, &vec![1u32, 2, 3]).unwrap();
        assert_eq!(read_json::<Vec<u32>>(&path).unwrap(), Some(vec![1, 2, 3]));
    }
}
