//! JSON-lines backed record store

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{Record, RecordKind};
use crate::error::StoreError;

/// File-backed store for all record kinds
///
/// Writes are serialized through a single in-process lock so a replace can
/// never interleave with an append on the same file.
pub struct JsonlStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlStore {
    /// Create a store rooted at `dir`. Nothing touches the disk until the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Directory holding the record files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the file backing `kind`
    pub fn path_for(&self, kind: RecordKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Load every well-formed record of type `R`
    ///
    /// A missing file is an empty set. Malformed lines are skipped with a
    /// warning and the rest of the file is still returned.
    pub async fn load_all<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        let path = self.path_for(R::KIND);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&path, e)),
        };

        Ok(decode_lines(&content, &path))
    }

    /// Replace the whole record file with `records`
    ///
    /// The new content goes to a sibling temp file which is then renamed
    /// over the target.
    pub async fn replace_all<R: Record>(&self, records: &[R]) -> Result<(), StoreError> {
        let path = self.path_for(R::KIND);
        let mut content = String::new();
        for record in records {
            content.push_str(&encode_line(record)?);
            content.push('\n');
        }

        let _guard = self.write_lock.lock().await;
        self.ensure_dir().await?;

        let tmp_path = path.with_extension("jsonl.tmp");
        fs::write(&tmp_path, content)
            .await
            .map_err(|e| io_error(&tmp_path, e))?;
        fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| io_error(&path, e))?;

        debug!(kind = R::KIND.as_str(), count = records.len(), "Replaced records");
        Ok(())
    }

    /// Append one record to the end of its file
    ///
    /// A file whose last line lacks a newline (hand-edited, for instance)
    /// gets one first, so the new record never merges into that line.
    pub async fn append<R: Record>(&self, record: &R) -> Result<(), StoreError> {
        let path = self.path_for(R::KIND);
        let mut line = encode_line(record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        self.ensure_dir().await?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| io_error(&path, e))?;

        let len = file
            .metadata()
            .await
            .map_err(|e| io_error(&path, e))?
            .len();
        if len > 0 {
            file.seek(SeekFrom::End(-1))
                .await
                .map_err(|e| io_error(&path, e))?;
            let mut last = [0u8; 1];
            file.read_exact(&mut last)
                .await
                .map_err(|e| io_error(&path, e))?;
            if last[0] != b'\n' {
                line.insert(0, '\n');
            }
        }
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| io_error(&path, e))?;
        file.flush().await.map_err(|e| io_error(&path, e))?;

        debug!(kind = R::KIND.as_str(), key = record.key(), "Appended record");
        Ok(())
    }

    async fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Encode a record as a single line, without the trailing newline
fn encode_line<R: Record>(record: &R) -> Result<String, StoreError> {
    let payload = serde_json::to_string(record).map_err(|source| StoreError::Encode {
        kind: R::KIND.as_str(),
        source,
    })?;

    if R::KIND.is_keyed() {
        Ok(format!("{} {}", record.key(), payload))
    } else {
        Ok(payload)
    }
}

fn decode_lines<R: Record>(content: &str, path: &Path) -> Vec<R> {
    let mut records = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let payload = if R::KIND.is_keyed() {
            match line.split_once(' ') {
                Some((_, payload)) => payload,
                None => {
                    warn!(
                        path = %path.display(),
                        line = idx + 1,
                        "Skipping malformed {} line: missing id token",
                        R::KIND.as_str()
                    );
                    continue;
                }
            }
        } else {
            line
        };

        match serde_json::from_str::<R>(payload) {
            Ok(record) => records.push(record),
            Err(e) => warn!(
                path = %path.display(),
                line = idx + 1,
                "Skipping malformed {} line: {}",
                R::KIND.as_str(),
                e
            ),
        }
    }

    records
}
