//! File-based data source.
//!
//! Reads snapshots from a JSON file, for offline use or when another process
//! dumps the `/pull` payload to disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::{parse_snapshot, DataSource, Snapshot};

/// A data source that reads snapshots from a JSON file.
///
/// The source tracks the file's modification time and only returns
/// new data when the file has been updated.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    last_modified: Option<SystemTime>,
    failures: u64,
    force: bool,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            last_modified: None,
            failures: 0,
            force: false,
        }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    fn read_file(&mut self) -> Option<Snapshot> {
        let result = match fs::read(&self.path) {
            Ok(content) => parse_snapshot(&content).map_err(|e| format!("Parse error: {}", e)),
            Err(e) => Err(format!("Read error: {}", e)),
        };

        match result {
            Ok(snapshot) => {
                self.last_error = None;
                Some(snapshot)
            }
            Err(message) => {
                tracing::warn!(path = %self.path.display(), %message, "snapshot file unreadable");
                self.failures += 1;
                self.last_error = Some(message);
                None
            }
        }
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<Snapshot> {
        let current_modified = self.get_modified_time();

        let file_changed = std::mem::take(&mut self.force)
            || match (&self.last_modified, &current_modified) {
                (None, _) => true,        // First poll, always read
                (Some(_), None) => false, // File disappeared, don't update
                (Some(last), Some(current)) => current > last,
            };

        if file_changed {
            if let Some(snapshot) = self.read_file() {
                self.last_modified = current_modified;
                return Some(snapshot);
            }
        }

        None
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn failures(&self) -> u64 {
        self.failures
    }

    fn refresh(&mut self) {
        self.force = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"{
            "opendtu": { "0/power": 412 },
            "calculated": { "new_limit": 600 }
        }"#
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/pull.json");
        assert_eq!(source.path(), Path::new("/tmp/pull.json"));
        assert_eq!(source.description(), "file: /tmp/pull.json");
        assert!(source.error().is_none());
    }

    #[test]
    fn test_file_source_poll_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());

        let snapshot = source.poll().unwrap();
        assert!(snapshot.contains_key("calculated"));

        // Unchanged file
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_file_source_refresh_rereads() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());
        assert!(source.poll().is_some());
        assert!(source.poll().is_none());

        source.refresh();
        assert!(source.poll().is_some());
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new("/nonexistent/path/pull.json");

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Read error"));
        assert_eq!(source.failures(), 1);
    }

    #[test]
    fn test_file_source_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let mut source = FileSource::new(file.path());

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Parse error"));
    }

    #[test]
    fn test_file_source_rejects_array() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[1, 2]").unwrap();

        let mut source = FileSource::new(file.path());
        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Parse error"));
    }
}
