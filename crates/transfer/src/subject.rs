//! The file being uploaded.
//!
//! An [`UploadSubject`] exposes immutable metadata plus random-access reads,
//! so chunks of one batch can be fetched independently of each other.

use std::future::Future;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::UNIX_EPOCH;

use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};

use crate::TransferError;

/// A file-like source of bytes to upload.
pub trait UploadSubject: Send + Sync {
    /// File name reported to the store.
    fn name(&self) -> &str;

    /// Total size in bytes.
    fn size(&self) -> u64;

    /// Last modification time in milliseconds since the Unix epoch.
    fn modified_ms(&self) -> i64;

    /// Reads exactly the bytes in `range`.
    fn read_range(
        &self,
        range: Range<u64>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, TransferError>> + Send + '_>>;
}

fn check_bounds(range: &Range<u64>, size: u64) -> Result<(), TransferError> {
    if range.start > range.end || range.end > size {
        return Err(TransferError::RangeOutOfBounds {
            start: range.start,
            end: range.end,
            size,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// FileSubject
// ---------------------------------------------------------------------------

/// A local file. Metadata is captured once when opened.
#[derive(Debug, Clone)]
pub struct FileSubject {
    path: PathBuf,
    name: String,
    size: u64,
    modified_ms: i64,
}

impl FileSubject {
    /// Stats `path` and captures name, size and modification time.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, TransferError> {
        let path = path.as_ref().to_path_buf();
        let metadata = tokio::fs::metadata(&path).await?;
        if !metadata.is_file() {
            return Err(TransferError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            )));
        }

        let modified_ms = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            path,
            name,
            size: metadata.len(),
            modified_ms,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UploadSubject for FileSubject {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn modified_ms(&self) -> i64 {
        self.modified_ms
    }

    fn read_range(
        &self,
        range: Range<u64>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, TransferError>> + Send + '_>> {
        Box::pin(async move {
            check_bounds(&range, self.size)?;
            let mut file = tokio::fs::File::open(&self.path).await?;
            file.seek(SeekFrom::Start(range.start)).await?;
            let mut buf = vec![0u8; (range.end - range.start) as usize];
            file.read_exact(&mut buf).await?;
            Ok(buf)
        })
    }
}

// ---------------------------------------------------------------------------
// MemorySubject
// ---------------------------------------------------------------------------

/// Content already held in memory.
#[derive(Debug, Clone)]
pub struct MemorySubject {
    name: String,
    data: Vec<u8>,
    modified_ms: i64,
}

impl MemorySubject {
    pub fn new(name: impl Into<String>, data: Vec<u8>, modified_ms: i64) -> Self {
        Self {
            name: name.into(),
            data,
            modified_ms,
        }
    }
}

impl UploadSubject for MemorySubject {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn modified_ms(&self) -> i64 {
        self.modified_ms
    }

    fn read_range(
        &self,
        range: Range<u64>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, TransferError>> + Send + '_>> {
        Box::pin(async move {
            check_bounds(&range, self.size())?;
            Ok(self.data[range.start as usize..range.end as usize].to_vec())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(data).unwrap();
        path
    }

    #[tokio::test]
    async fn file_subject_metadata() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "report.txt", b"0123456789");

        let subject = FileSubject::open(&path).await.unwrap();
        assert_eq!(subject.name(), "report.txt");
        assert_eq!(subject.size(), 10);
        assert!(subject.modified_ms() > 0);
    }

    #[tokio::test]
    async fn file_subject_reads_ranges() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "data.bin", b"AABBCCDDEE");
        let subject = FileSubject::open(&path).await.unwrap();

        assert_eq!(subject.read_range(0..4).await.unwrap(), b"AABB");
        assert_eq!(subject.read_range(8..10).await.unwrap(), b"EE");
        assert!(subject.read_range(4..4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_subject_rejects_out_of_bounds() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "data.bin", b"abc");
        let subject = FileSubject::open(&path).await.unwrap();

        let result = subject.read_range(2..5).await;
        assert!(matches!(
            result,
            Err(TransferError::RangeOutOfBounds { end: 5, size: 3, .. })
        ));
    }

    #[tokio::test]
    async fn file_subject_read_after_removal_fails() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "gone.bin", b"abc");
        let subject = FileSubject::open(&path).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            subject.read_range(0..3).await,
            Err(TransferError::Io(_))
        ));
    }

    #[tokio::test]
    async fn open_directory_fails() {
        let dir = TempDir::new().unwrap();
        assert!(FileSubject::open(dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn open_missing_file_fails() {
        let result = FileSubject::open("/nonexistent/path/upload.bin").await;
        assert!(matches!(result, Err(TransferError::Io(_))));
    }

    #[tokio::test]
    async fn memory_subject_reads() {
        let subject = MemorySubject::new("m.txt", b"hello world".to_vec(), 42);
        assert_eq!(subject.size(), 11);
        assert_eq!(subject.modified_ms(), 42);
        assert_eq!(subject.read_range(6..11).await.unwrap(), b"world");
        assert!(subject.read_range(6..12).await.is_err());
    }
}
