use crate::front_matter;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use watch_archive_models::{RecordKey, ResolvedRecord};

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to create content directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where finished records go. Callers check [`RecordSink::exists`] before
/// [`RecordSink::write`]; a sink never merges into an existing record.
pub trait RecordSink {
    fn exists(&self, key: &RecordKey) -> bool;

    fn write(&self, key: &RecordKey, record: &ResolvedRecord) -> Result<(), SinkError>;
}

/// One front-matter markdown file per record, named `{title}.{date}.md`.
pub struct MarkdownSink {
    content_dir: PathBuf,
}

impl MarkdownSink {
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
        }
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    pub fn path_for(&self, key: &RecordKey) -> PathBuf {
        self.content_dir.join(key.file_name())
    }
}

impl RecordSink for MarkdownSink {
    fn exists(&self, key: &RecordKey) -> bool {
        self.path_for(key).exists()
    }

    fn write(&self, key: &RecordKey, record: &ResolvedRecord) -> Result<(), SinkError> {
        std::fs::create_dir_all(&self.content_dir).map_err(|source| SinkError::CreateDir {
            path: self.content_dir.clone(),
            source,
        })?;

        let path = self.path_for(key);
        let write_err = |source| SinkError::Write {
            path: path.clone(),
            source,
        };

        // Write to a temp file, then rename, so readers never see half a record
        let temp_path = path.with_extension("md.tmp");
        std::fs::write(&temp_path, front_matter::render(record)).map_err(write_err)?;
        if let Err(source) = std::fs::rename(&temp_path, &path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(write_err(source));
        }

        debug!(path = %path.display(), "Record written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn record() -> ResolvedRecord {
        ResolvedRecord {
            title: "Apocalypse Now".to_string(),
            year: "1979".to_string(),
            watched_date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            theaters: vec!["Jellyfin".to_string()],
            local_rating: String::new(),
            remark: Vec::new(),
            external_id: String::new(),
            cover_url: String::new(),
            detail_url: "https://movie.douban.com/subject/1292260/".to_string(),
        }
    }

    #[test]
    fn test_write_creates_file() {
        let dir = TempDir::new().unwrap();
        let sink = MarkdownSink::new(dir.path().join("tickets"));
        let key = RecordKey::new("现代启示录", NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());

        assert!(!sink.exists(&key));
        sink.write(&key, &record()).unwrap();
        assert!(sink.exists(&key));

        let path = dir.path().join("tickets").join("现代启示录.2024-03-09.md");
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("---\ntitle: \"Apocalypse Now\"\n"));
        assert!(!dir.path().join("tickets").join("现代启示录.2024-03-09.md.tmp").exists());
    }

    #[test]
    fn test_same_title_different_dates_are_distinct() {
        let dir = TempDir::new().unwrap();
        let sink = MarkdownSink::new(dir.path());
        let first = RecordKey::new("无名之辈", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let second = RecordKey::new("无名之辈", NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());

        sink.write(&first, &record()).unwrap();
        assert!(sink.exists(&first));
        assert!(!sink.exists(&second));
    }
}
