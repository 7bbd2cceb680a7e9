//! Append-only run report, matching `report.py::Report`'s `log_report`
//! behavior but over `tokio::fs` for async-consistent I/O with the rest
//! of the CLI.

use std::path::{Path, PathBuf};

pub struct Report {
    path: PathBuf,
}

impl Report {
    /// Creates (truncating) the report file at `path`.
    pub async fn create(path: impl Into<PathBuf>) -> Result<Self, std::io::Error> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, b"").await?;
        Ok(Report { path })
    }

    /// Appends `message` followed by a newline, matching `log_report`.
    pub async fn log(&self, message: &str) -> Result<(), std::io::Error> {
        use tokio::io::AsyncWriteExt;
        let mut file = tokio::fs::OpenOptions::new().append(true).open(&self.path).await?;
        file.write_all(message.as_bytes()).await?;
        file.write_all(b"\n").await?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        let report = Report::create(&path).await.unwrap();
        report.log("first line").await.unwrap();
        report.log("second line").await.unwrap();
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "first line\nsecond line\n");
    }

    #[tokio::test]
    async fn create_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        tokio::fs::write(&path, b"stale content").await.unwrap();
        let report = Report::create(&path).await.unwrap();
        report.log("fresh").await.unwrap();
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "fresh\n");
    }
}
