//! Staging files bridging HTTP streams and storage streams.
//!
//! Every upload and download stages its bytes in a file under the configured temp
//! directory. A [`StagingFile`] owns that path for the lifetime of the request and deletes
//! it on every exit path: explicitly through [`StagingFile::cleanup`] on success, and in
//! `Drop` on early returns, errors, and dropped response bodies. Deletion failures are
//! logged and never retried.

use bytes::Bytes;
use futures::Stream;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use stowage_storage::keys::base_name;
use tokio::fs;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

const MAX_BASE_NAME_BYTES: usize = 200;

/// Directory holding per-request staging files.
#[derive(Clone, Debug)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    /// Use `dir` as the staging directory, creating it if it doesn't exist.
    pub async fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(StagingArea { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create a fresh staging file named `{uuid}-{basename}` and open it for writing.
    ///
    /// The random prefix keeps concurrent requests for the same name apart; the file is
    /// created with `create_new` so an existing file is never reused.
    pub async fn create(&self, name: &str) -> io::Result<(StagingFile, fs::File)> {
        let path = self.dir.join(staging_file_name(name));
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        tracing::debug!(path = %path.display(), "Staging file created");

        Ok((
            StagingFile {
                path,
                removed: false,
            },
            file,
        ))
    }
}

fn staging_file_name(name: &str) -> String {
    let base = base_name(name).unwrap_or("object");
    let mut end = base.len().min(MAX_BASE_NAME_BYTES);
    while !base.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}-{}", Uuid::new_v4(), &base[..end])
}

/// A staged file that is deleted when the request is done with it.
#[derive(Debug)]
pub struct StagingFile {
    path: PathBuf,
    removed: bool,
}

impl StagingFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file asynchronously.
    pub async fn cleanup(mut self) {
        self.removed = true;
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Temporary file was deleted");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    "Error deleting temporary file"
                );
            }
        }
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Temporary file was deleted");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    "Error deleting temporary file"
                );
            }
        }
    }
}

/// Response body streaming a staged file and deleting it once the stream ends or fails.
///
/// Dropping the stream before the end (client went away) deletes the file as well.
pub struct StagedFileStream {
    // Declared before `staging` so the handle is closed before the file is removed.
    reader: Option<ReaderStream<fs::File>>,
    staging: Option<StagingFile>,
}

impl StagedFileStream {
    pub fn new(file: fs::File, staging: StagingFile) -> Self {
        StagedFileStream {
            reader: Some(ReaderStream::new(file)),
            staging: Some(staging),
        }
    }

    fn finish(&mut self) {
        self.reader = None;
        self.staging = None;
    }
}

impl Stream for StagedFileStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let Some(reader) = this.reader.as_mut() else {
            return Poll::Ready(None);
        };

        let item = ready!(Pin::new(reader).poll_next(cx));
        match &item {
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                // Headers are already out; failing the body aborts the connection.
                tracing::error!(
                    error = %e,
                    path = ?this.staging.as_ref().map(|s| s.path().display().to_string()),
                    "Error reading temporary file"
                );
                this.finish();
            }
            None => this.finish(),
        }
        Poll::Ready(item)
    }
}
