use super::{Exchange, Interceptor};
use async_trait::async_trait;
use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Writes each exchange to `quiz_<timestamp>.md` under a base directory.
#[derive(Debug)]
pub struct FileInterceptor {
    base_path: PathBuf,
}

impl FileInterceptor {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[async_trait]
impl Interceptor for FileInterceptor {
    async fn save(&self, exchange: Exchange<'_>) -> std::io::Result<()> {
        let timestamp = Utc::now();
        let stem = format!("quiz_{}", timestamp.format("%Y%m%d_%H%M%S_%3f"));

        fs::create_dir_all(&self.base_path).await?;

        let content = format!(
            "# Topic\n\n{}\n\n# Prompt\n\n{}\n\n# Response\n\n{}\n",
            exchange.topic, exchange.prompt, exchange.response
        );

        let (_, mut file) = create_unique(&self.base_path, &stem).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}

/// Open `<stem>.md` for writing, or `<stem>_<n>.md` when taken. Existing
/// transcripts are never overwritten.
async fn create_unique(dir: &Path, stem: &str) -> io::Result<(PathBuf, File)> {
    let mut attempt = 0u32;
    loop {
        let name = match attempt {
            0 => format!("{stem}.md"),
            n => format!("{stem}_{n}.md"),
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}
