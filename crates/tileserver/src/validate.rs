//! Tile filename validation and resolution against the tiles directory

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::TileError;

/// Extension every served archive must carry
pub const TILE_EXTENSION: &str = ".pmtiles";

/// A tile archive that exists under the tiles directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// Full path inside the tiles directory
    pub path: PathBuf,
    /// Sanitized filename, safe to log and echo back
    pub name: String,
    /// File size at resolution time
    pub size_bytes: u64,
}

/// Reduce a client supplied name to its final path component
///
/// Both `/` and `\` count as separators so that neither relative segments nor
/// absolute prefixes survive. Returns `None` when no usable component is left.
pub fn sanitize(name: &str) -> Option<&str> {
    let last = name
        .split(|c| c == '/' || c == '\\')
        .filter(|segment| !segment.is_empty())
        .last()?;

    match last {
        "." | ".." => None,
        _ if last.contains('\0') => None,
        _ => Some(last),
    }
}

/// Resolve a requested filename to an archive under `base_dir`
///
/// # Errors
/// * `TileError::InvalidRequest` - wrong extension or nothing left after sanitizing
/// * `TileError::NotFound` - no such file under `base_dir`
/// * `TileError::StorageIo` - the file could not be inspected
pub async fn resolve(base_dir: &Path, requested_name: &str) -> Result<ResolvedAsset, TileError> {
    if !requested_name.ends_with(TILE_EXTENSION) {
        return Err(TileError::InvalidRequest);
    }

    let name = sanitize(requested_name).ok_or(TileError::InvalidRequest)?;
    let path = base_dir.join(name);

    let not_found = || TileError::NotFound {
        name: name.to_string(),
        base_dir: base_dir.to_path_buf(),
    };

    match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => Ok(ResolvedAsset {
            path,
            name: name.to_string(),
            size_bytes: metadata.len(),
        }),
        Ok(_) => Err(not_found()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found()),
        Err(e) => Err(TileError::StorageIo(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_plain_name() {
        assert_eq!(sanitize("world.pmtiles"), Some("world.pmtiles"));
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize("../../etc/passwd.pmtiles"), Some("passwd.pmtiles"));
        assert_eq!(sanitize("/etc/passwd.pmtiles"), Some("passwd.pmtiles"));
        assert_eq!(sanitize("..\\..\\boot.pmtiles"), Some("boot.pmtiles"));
        assert_eq!(sanitize("nested/dir/"), Some("dir"));
    }

    #[test]
    fn test_sanitize_rejects_empty_and_dot_segments() {
        assert_eq!(sanitize(""), None);
        assert_eq!(sanitize("/"), None);
        assert_eq!(sanitize(".."), None);
        assert_eq!(sanitize("a/.."), None);
        assert_eq!(sanitize("."), None);
        assert_eq!(sanitize("bad\0.pmtiles"), None);
    }

    #[tokio::test]
    async fn test_resolve_existing_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("city.pmtiles"), vec![7u8; 321]).unwrap();

        let asset = resolve(dir.path(), "city.pmtiles").await.unwrap();
        assert_eq!(asset.name, "city.pmtiles");
        assert_eq!(asset.size_bytes, 321);
        assert_eq!(asset.path, dir.path().join("city.pmtiles"));
    }

    #[tokio::test]
    async fn test_resolve_wrong_extension() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

        let err = resolve(dir.path(), "notes.txt").await.unwrap_err();
        assert!(matches!(err, TileError::InvalidRequest));

        let err = resolve(dir.path(), "city.pmtiles.gz").await.unwrap_err();
        assert!(matches!(err, TileError::InvalidRequest));
    }

    #[tokio::test]
    async fn test_resolve_traversal_stays_in_base_dir() {
        let root = TempDir::new().unwrap();
        let base = root.path().join("tiles");
        std::fs::create_dir(&base).unwrap();
        std::fs::write(root.path().join("secret.pmtiles"), b"outside").unwrap();

        let err = resolve(&base, "../secret.pmtiles").await.unwrap_err();
        match err {
            TileError::NotFound { name, base_dir } => {
                assert_eq!(name, "secret.pmtiles");
                assert_eq!(base_dir, base);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        std::fs::write(base.join("passwd.pmtiles"), b"inside").unwrap();
        let asset = resolve(&base, "../../etc/passwd.pmtiles").await.unwrap();
        assert_eq!(asset.path, base.join("passwd.pmtiles"));
        assert_eq!(asset.size_bytes, 6);
    }

    #[tokio::test]
    async fn test_resolve_missing_file_message() {
        let dir = TempDir::new().unwrap();

        let err = resolve(dir.path(), "../../missing.pmtiles").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("missing.pmtiles"));
        assert!(message.contains(&dir.path().display().to_string()));
        assert!(!message.contains(".."));
    }

    #[tokio::test]
    async fn test_resolve_directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("folder.pmtiles")).unwrap();

        let err = resolve(dir.path(), "folder.pmtiles").await.unwrap_err();
        assert!(matches!(err, TileError::NotFound { .. }));
    }
}
