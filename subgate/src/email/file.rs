//! File transport: writes each message as a JSON file into a directory.
//! For development and testing.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::email::{EmailMessage, Notifier, Result};

pub struct FileNotifier {
    dir: PathBuf,
    from: String,
}

#[derive(Serialize)]
struct FileMessage<'a> {
    from: &'a str,
    #[serde(flatten)]
    message: &'a EmailMessage,
}

impl FileNotifier {
    pub fn new(path: impl AsRef<Path>, from: String) -> std::io::Result<Self> {
        let dir = path.as_ref().to_path_buf();
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(Self { dir, from })
    }
}

#[async_trait]
impl Notifier for FileNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let contents = serde_json::to_vec_pretty(&FileMessage {
            from: &self.from,
            message,
        })
        .expect("email message serializes");

        let filename = format!("{}-{}.json", chrono::Utc::now().format("%Y%m%dT%H%M%S%.3f"), Uuid::new_v4().simple());
        tokio::fs::write(self.dir.join(filename), contents).await?;
        Ok(())
    }
}
