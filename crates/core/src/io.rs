//! Filesystem access with bounded retry for transient failures.
//!
//! Transient errors (interrupted, timed out, would block, connection reset,
//! resource busy) are retried with exponential backoff. Everything else is
//! returned on the first failure. Error messages name only the file or
//! directory name, never the full path.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::IoError;

/// Retry configuration for exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(25),
            max_delay: Duration::from_secs(1),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    fn next_delay(&self, delay: Duration) -> Duration {
        let next = Duration::from_millis((delay.as_millis() as f64 * self.multiplier) as u64);
        next.min(self.max_delay)
    }
}

/// Whether an I/O error is worth retrying.
pub fn is_transient(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::Interrupted
            | ErrorKind::TimedOut
            | ErrorKind::WouldBlock
            | ErrorKind::ConnectionReset
            | ErrorKind::ResourceBusy
    )
}

/// Last path component, for error messages.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Run an I/O operation, retrying transient failures.
pub async fn retry_io<F, Fut, T>(
    policy: &RetryPolicy,
    resource: &str,
    mut operation: F,
) -> Result<T, IoError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<T>>,
{
    let mut attempts = 0;
    let mut delay = policy.initial_delay;

    loop {
        attempts += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if is_transient(e.kind()) => {
                if attempts >= policy.max_attempts.max(1) {
                    return Err(IoError::Transient {
                        resource: resource.to_string(),
                        attempts,
                        reason: e.to_string(),
                    });
                }
                tracing::warn!(
                    resource,
                    attempt = attempts,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient I/O failure, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = policy.next_delay(delay);
            }
            Err(e) => {
                return Err(IoError::Failed {
                    resource: resource.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }
}

/// Read a UTF-8 file. `Ok(None)` when the file does not exist.
pub async fn read_optional(policy: &RetryPolicy, path: &Path) -> Result<Option<String>, IoError> {
    let name = display_name(path);
    let result = retry_io(policy, &name, || {
        let path = path.to_path_buf();
        async move {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => Ok(Some(content)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e),
            }
        }
    })
    .await?;
    Ok(result)
}

/// Read a UTF-8 file that must exist.
pub async fn read_to_string(policy: &RetryPolicy, path: &Path) -> Result<String, IoError> {
    let name = display_name(path);
    retry_io(policy, &name, || tokio::fs::read_to_string(path.to_path_buf())).await
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
}

/// List a directory, sorted by name. `Ok(None)` when it does not exist.
pub async fn list_dir(
    policy: &RetryPolicy,
    dir: &Path,
) -> Result<Option<Vec<DirEntryInfo>>, IoError> {
    let name = display_name(dir);
    retry_io(policy, &name, || {
        let dir = dir.to_path_buf();
        async move {
            let mut reader = match tokio::fs::read_dir(&dir).await {
                Ok(reader) => reader,
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(e),
            };
            let mut entries = Vec::new();
            while let Some(entry) = reader.next_entry().await? {
                let file_type = entry.file_type().await?;
                entries.push(DirEntryInfo {
                    path: entry.path(),
                    name: entry.file_name().to_string_lossy().into_owned(),
                    is_dir: file_type.is_dir(),
                });
            }
            entries.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(Some(entries))
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn transient_errors_are_retried_until_success() {
        let calls = AtomicU32::new(0);
        let result = retry_io(&RetryPolicy::default(), "flaky.md", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(std::io::Error::from(ErrorKind::Interrupted))
                } else {
                    Ok("content")
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "content");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_give_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_io(&RetryPolicy::default(), "busy.md", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(std::io::Error::from(ErrorKind::TimedOut)) }
        })
        .await;
        assert!(matches!(result, Err(IoError::Transient { attempts: 3, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_io(&RetryPolicy::default(), "secret.md", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(std::io::Error::from(ErrorKind::PermissionDenied)) }
        })
        .await;
        assert!(matches!(result, Err(IoError::Failed { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_paths_are_none() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        assert!(list_dir(&RetryPolicy::none(), &missing).await.unwrap().is_none());
        assert!(read_optional(&RetryPolicy::none(), &missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_dir_is_sorted() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("b.md"), "b").unwrap();
        std::fs::write(tmp.path().join("a.md"), "a").unwrap();
        std::fs::create_dir(tmp.path().join("c")).unwrap();
        let entries = list_dir(&RetryPolicy::none(), tmp.path()).await.unwrap().unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a.md", "b.md", "c"]);
        assert!(entries[2].is_dir);
    }
}
