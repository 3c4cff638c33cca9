//! Managed file store module
//!
//! Allow-list validation and raw disk access for the roster YAML files.
//! File contents are opaque byte sequences; nothing here parses YAML.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;

/// The only filenames the gateway will ever read or write.
pub const ALLOWED_FILES: [&str; 4] = [
    "persons.yaml",
    "dienste.yaml",
    "abwesenheiten.yaml",
    "anwesenheit.yaml",
];

// Distinguishes temp files of concurrent writes within one process
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Extract the final path segment of a request path.
///
/// Directory prefixes are discarded: `/some/prefix/persons.yaml` yields
/// `persons.yaml`, so two URIs with the same last segment address the
/// identical file.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Check a candidate filename against the allow-list (exact, case-sensitive)
pub fn is_allowed(name: &str) -> bool {
    ALLOWED_FILES.contains(&name)
}

/// Create the data directory if absent.
///
/// Called once at startup; repeat calls are harmless.
pub async fn init_data_dir(data_dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(data_dir).await
}

/// Read the full contents of a managed file.
///
/// A missing file is not an error: `Ok(None)` lets the caller answer with an
/// empty-body success.
pub async fn read_file(data_dir: &Path, name: &str) -> std::io::Result<Option<Vec<u8>>> {
    let path = data_dir.join(name);
    match fs::read(&path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Replace a managed file's entire contents with `body`.
///
/// The bytes go to a temporary file in the same directory which is then
/// renamed over the target, so a concurrent reader observes either the old
/// contents or the new ones in full, never a mix. Racing writers settle on
/// one complete body (last rename wins).
pub async fn write_file(data_dir: &Path, name: &str, body: &[u8]) -> std::io::Result<()> {
    let target = data_dir.join(name);
    let tmp = temp_path(data_dir, name);

    let result = write_and_rename(&tmp, &target, body).await;
    if result.is_err() {
        // A failed write or rename must not leave the temp file behind
        let _ = fs::remove_file(&tmp).await;
    }
    result
}

async fn write_and_rename(tmp: &Path, target: &Path, body: &[u8]) -> std::io::Result<()> {
    fs::write(tmp, body).await?;
    fs::rename(tmp, target).await
}

/// Temp file path in the target's directory (rename must not cross devices)
fn temp_path(data_dir: &Path, name: &str) -> PathBuf {
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    data_dir.join(format!(".{name}.{}.{seq}.tmp", process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("roster-store-{tag}-{}", process::id()));
        fs::create_dir_all(&dir).await.unwrap();
        dir
    }

    #[test]
    fn test_basename_strips_prefixes() {
        assert_eq!(basename("/persons.yaml"), "persons.yaml");
        assert_eq!(basename("/some/prefix/persons.yaml"), "persons.yaml");
        assert_eq!(basename("persons.yaml"), "persons.yaml");
        assert_eq!(basename("/"), "");
        assert_eq!(basename(""), "");
    }

    #[test]
    fn test_allow_list_exact_match() {
        for name in ALLOWED_FILES {
            assert!(is_allowed(name));
        }
        assert!(!is_allowed("secrets.yaml"));
        assert!(!is_allowed("persons.yml"));
        assert!(!is_allowed("persons.yaml.bak"));
        assert!(!is_allowed("Persons.yaml")); // case-sensitive
        assert!(!is_allowed(""));
    }

    #[tokio::test]
    async fn test_read_missing_file_is_none() {
        let dir = scratch_dir("read-missing").await;
        let contents = read_file(&dir, "persons.yaml").await.unwrap();
        assert!(contents.is_none());
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let dir = scratch_dir("round-trip").await;
        let body = b"- name: Alice\n- name: Bob\n";

        write_file(&dir, "dienste.yaml", body).await.unwrap();
        let contents = read_file(&dir, "dienste.yaml").await.unwrap();
        assert_eq!(contents.as_deref(), Some(body.as_slice()));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_contents_in_full() {
        let dir = scratch_dir("overwrite").await;

        write_file(&dir, "abwesenheiten.yaml", b"first version, quite long")
            .await
            .unwrap();
        write_file(&dir, "abwesenheiten.yaml", b"second").await.unwrap();

        let contents = read_file(&dir, "abwesenheiten.yaml").await.unwrap();
        assert_eq!(contents.as_deref(), Some(b"second".as_slice()));
    }

    #[tokio::test]
    async fn test_write_leaves_no_temp_files() {
        let dir = scratch_dir("no-temp").await;
        write_file(&dir, "anwesenheit.yaml", b"x: 1\n").await.unwrap();

        let mut entries = fs::read_dir(&dir).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            assert!(
                !file_name.ends_with(".tmp"),
                "temp file left behind: {file_name}"
            );
        }
    }

    #[tokio::test]
    async fn test_failed_write_cleans_up_temp_file() {
        // A directory blocking the target name makes the rename fail after
        // the temp file was fully written
        let dir = scratch_dir("failed-rename").await;
        let blocker = dir.join("persons.yaml");
        fs::create_dir_all(blocker.join("occupied")).await.unwrap();

        let result = write_file(&dir, "persons.yaml", b"x: 1\n").await;
        assert!(result.is_err());

        let mut entries = fs::read_dir(&dir).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            assert!(
                !file_name.ends_with(".tmp"),
                "temp file left behind after failed write: {file_name}"
            );
        }
    }

    #[tokio::test]
    async fn test_racing_writes_settle_on_one_full_body() {
        let dir = scratch_dir("race").await;
        let body_a = vec![b'a'; 64 * 1024];
        let body_b = vec![b'b'; 64 * 1024];

        let (ra, rb) = tokio::join!(
            write_file(&dir, "persons.yaml", &body_a),
            write_file(&dir, "persons.yaml", &body_b),
        );
        ra.unwrap();
        rb.unwrap();

        let contents = read_file(&dir, "persons.yaml").await.unwrap().unwrap();
        assert!(contents == body_a || contents == body_b);
    }
}
