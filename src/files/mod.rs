//! File directory service
//!
//! Lists the regular files directly inside one configured root directory and
//! hands out their contents by name. Every name coming from a request is
//! treated as untrusted: it must be a single path component, and its
//! canonical path must stay inside the canonical root.

mod size;

pub use size::format_size;

use crate::http::mime;
use crate::logger;
use hyper::body::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Characters escaped when a file name is placed in a URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Errors returned by directory operations.
#[derive(Debug, Error)]
pub enum FileError {
    /// The requested name resolves outside the root directory.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The requested name does not exist or is not a regular file.
    #[error("file not found: {0}")]
    NotFound(String),

    /// Unexpected filesystem failure.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Metadata for one listed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub size_bytes: u64,
    pub formatted_size: String,
    pub download_url: String,
}

impl FileEntry {
    pub fn new(name: String, size_bytes: u64) -> Self {
        let download_url = format!("/download/{}", utf8_percent_encode(&name, PATH_SEGMENT));
        Self {
            formatted_size: format_size(size_bytes),
            download_url,
            name,
            size_bytes,
        }
    }
}

/// A file read in full, ready to be sent as an attachment
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub name: String,
    pub content_type: &'static str,
    pub bytes: Bytes,
}

/// Read-only view over the configured root directory
#[derive(Debug, Clone)]
pub struct FileDirectory {
    root: PathBuf,
}

impl FileDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// List regular files directly under the root, sorted by name.
    ///
    /// A missing root yields an empty listing. Symlinks are followed but only
    /// listed when their target is a regular file inside the root, so every
    /// listed name is downloadable.
    pub async fn list(&self) -> Result<Vec<FileEntry>, FileError> {
        let canonical_root = match fs::canonicalize(&self.root).await {
            Ok(p) => p,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.root_error(&e)),
        };

        let mut dir = fs::read_dir(&canonical_root)
            .await
            .map_err(|e| self.root_error(&e))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(|e| self.root_error(&e))? {
            let Ok(name) = entry.file_name().into_string() else {
                logger::log_warning(&format!(
                    "Skipping non UTF-8 file name in '{}'",
                    self.root.display()
                ));
                continue;
            };
            // Names resolve() would refuse are not listed
            if !is_single_component(&name) {
                continue;
            }

            let path = entry.path();
            let file_type = match entry.file_type().await {
                Ok(t) => t,
                Err(e) => {
                    logger::log_warning(&format!("Skipping '{name}': {e}"));
                    continue;
                }
            };

            if file_type.is_symlink() {
                match fs::canonicalize(&path).await {
                    Ok(target) if target.starts_with(&canonical_root) => {}
                    _ => continue,
                }
            }

            let metadata = match fs::metadata(&path).await {
                Ok(m) => m,
                Err(e) => {
                    logger::log_warning(&format!("Skipping '{name}': {e}"));
                    continue;
                }
            };

            if metadata.is_file() {
                entries.push(FileEntry::new(name, metadata.len()));
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Validate an untrusted file name and return its canonical path.
    pub async fn resolve(&self, name: &str) -> Result<PathBuf, FileError> {
        if name.is_empty() {
            return Err(FileError::NotFound(String::new()));
        }
        if !is_single_component(name) {
            logger::log_warning(&format!("Path traversal attempt blocked: {name:?}"));
            return Err(FileError::AccessDenied(name.to_string()));
        }

        let canonical_root = match fs::canonicalize(&self.root).await {
            Ok(p) => p,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(FileError::NotFound(name.to_string()));
            }
            Err(e) => return Err(self.root_error(&e)),
        };

        let canonical = match fs::canonicalize(canonical_root.join(name)).await {
            Ok(p) => p,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(FileError::NotFound(name.to_string()));
            }
            Err(e) => {
                return Err(FileError::Internal(format!(
                    "failed to resolve '{name}': {e}"
                )));
            }
        };

        if canonical == canonical_root || !canonical.starts_with(&canonical_root) {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {name:?} -> {}",
                canonical.display()
            ));
            return Err(FileError::AccessDenied(name.to_string()));
        }

        let metadata = fs::metadata(&canonical)
            .await
            .map_err(|e| FileError::Internal(format!("failed to stat '{name}': {e}")))?;
        if !metadata.is_file() {
            return Err(FileError::NotFound(name.to_string()));
        }

        Ok(canonical)
    }

    /// Resolve `name` and read the whole file.
    pub async fn download(&self, name: &str) -> Result<DownloadedFile, FileError> {
        let path = self.resolve(name).await?;

        let bytes = fs::read(&path).await.map_err(|e| {
            logger::log_error(&format!("Failed to read file '{}': {e}", path.display()));
            FileError::Internal(format!("failed to read '{name}': {e}"))
        })?;

        Ok(DownloadedFile {
            name: name.to_string(),
            content_type: mime::content_type_for(Path::new(name)),
            bytes: Bytes::from(bytes),
        })
    }

    fn root_error(&self, e: &io::Error) -> FileError {
        logger::log_error(&format!(
            "Failed to read directory '{}': {e}",
            self.root.display()
        ));
        FileError::Internal(format!("failed to read directory: {e}"))
    }
}

/// True when `name` is exactly one normal path component
fn is_single_component(name: &str) -> bool {
    if name.contains('\0') || name.contains('/') || name.contains('\\') {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileDirectory) {
        let dir = tempfile::tempdir().unwrap();
        std_fs::write(dir.path().join("report.pdf"), vec![7u8; 2048]).unwrap();
        std_fs::write(dir.path().join("data.csv"), vec![b'x'; 500]).unwrap();
        std_fs::create_dir(dir.path().join("nested")).unwrap();
        std_fs::write(dir.path().join("nested").join("inner.txt"), b"inner").unwrap();
        let directory = FileDirectory::new(dir.path());
        (dir, directory)
    }

    #[tokio::test]
    async fn test_list_sorted_regular_files_only() {
        let (_dir, directory) = setup();
        let entries = directory.list().await.unwrap();

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["data.csv", "report.pdf"]);
        assert_eq!(entries[0].size_bytes, 500);
        assert_eq!(entries[0].formatted_size, "500.00 B");
        assert_eq!(entries[0].download_url, "/download/data.csv");
        assert_eq!(entries[1].formatted_size, "2.00 KB");
    }

    #[tokio::test]
    async fn test_list_order_independent_of_creation() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zeta", "alpha", "Mid", "beta.txt"] {
            std_fs::write(dir.path().join(name), name).unwrap();
        }
        let entries = FileDirectory::new(dir.path()).list().await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Mid", "alpha", "beta.txt", "zeta"]);
    }

    #[tokio::test]
    async fn test_list_empty_and_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileDirectory::new(dir.path()).list().await.unwrap().is_empty());

        let missing = FileDirectory::new(dir.path().join("does-not-exist"));
        assert!(missing.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_root_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        std_fs::write(&file, b"data").unwrap();
        let result = FileDirectory::new(&file).list().await;
        assert!(matches!(result, Err(FileError::Internal(_))));
    }

    #[test]
    fn test_download_url_is_encoded() {
        let entry = FileEntry::new("my report #1.pdf".to_string(), 10);
        assert_eq!(entry.download_url, "/download/my%20report%20%231.pdf");
    }

    #[tokio::test]
    async fn test_resolve_traversal_denied() {
        let (_dir, directory) = setup();
        for name in [
            "../secret",
            "..",
            ".",
            "/etc/passwd",
            "nested/../../x",
            "nested/inner.txt",
            "..\\secret",
            "a\0b",
        ] {
            let result = directory.resolve(name).await;
            assert!(
                matches!(result, Err(FileError::AccessDenied(_))),
                "expected AccessDenied for {name:?}, got {result:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_resolve_missing_and_non_regular() {
        let (_dir, directory) = setup();
        assert!(matches!(
            directory.resolve("nope.txt").await,
            Err(FileError::NotFound(_))
        ));
        assert!(matches!(
            directory.resolve("nested").await,
            Err(FileError::NotFound(_))
        ));
        assert!(matches!(
            directory.resolve("").await,
            Err(FileError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_stays_inside_root() {
        let (dir, directory) = setup();
        let path = directory.resolve("report.pdf").await.unwrap();
        assert!(path.starts_with(dir.path().canonicalize().unwrap()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_denied_and_unlisted() {
        let outside = tempfile::tempdir().unwrap();
        std_fs::write(outside.path().join("secret.txt"), b"secret").unwrap();

        let (dir, directory) = setup();
        std::os::unix::fs::symlink(
            outside.path().join("secret.txt"),
            dir.path().join("escape.txt"),
        )
        .unwrap();
        std::os::unix::fs::symlink(dir.path().join("data.csv"), dir.path().join("alias.csv"))
            .unwrap();

        assert!(matches!(
            directory.resolve("escape.txt").await,
            Err(FileError::AccessDenied(_))
        ));

        let names: Vec<_> = directory
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["alias.csv", "data.csv", "report.pdf"]);
    }

    #[tokio::test]
    async fn test_every_listed_file_downloads_intact() {
        let (dir, directory) = setup();
        for entry in directory.list().await.unwrap() {
            let file = directory.download(&entry.name).await.unwrap();
            let on_disk = std_fs::read(dir.path().join(&entry.name)).unwrap();
            assert_eq!(file.bytes.as_ref(), on_disk.as_slice());
            assert_eq!(file.bytes.len() as u64, entry.size_bytes);
            assert_eq!(file.name, entry.name);
        }
    }

    #[tokio::test]
    async fn test_download_content_type() {
        let (_dir, directory) = setup();
        let pdf = directory.download("report.pdf").await.unwrap();
        assert_eq!(pdf.content_type, "application/pdf");
        let csv = directory.download("data.csv").await.unwrap();
        assert_eq!(csv.content_type, "text/csv; charset=utf-8");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_file_is_internal_error() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, directory) = setup();
        let locked = dir.path().join("locked.bin");
        std_fs::write(&locked, b"locked").unwrap();
        std_fs::set_permissions(&locked, std_fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits
        if std_fs::read(&locked).is_ok() {
            return;
        }

        assert!(directory.resolve("locked.bin").await.is_ok());
        match directory.download("locked.bin").await {
            Err(FileError::Internal(detail)) => assert!(detail.contains("locked.bin")),
            other => panic!("expected Internal, got {other:?}"),
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_list_skips_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (dir, directory) = setup();
        std_fs::write(dir.path().join(OsStr::from_bytes(b"bad\xffname")), b"x").unwrap();

        let names: Vec<_> = directory
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["data.csv", "report.pdf"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_skips_dangling_symlink() {
        let (dir, directory) = setup();
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("dangling.txt"))
            .unwrap();

        let names: Vec<_> = directory
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["data.csv", "report.pdf"]);
        assert!(matches!(
            directory.resolve("dangling.txt").await,
            Err(FileError::NotFound(_))
        ));
    }
}
