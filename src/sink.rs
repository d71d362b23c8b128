//! Match record output.
//!
//! Each [`Category`] has one append-only text file under the output directory. Writes to
//! the same file are serialized by a per-category lock; different categories never wait
//! on each other.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::classify::{Category, MatchRecord};
use crate::error::{Error, Result};

/// Attempts per record before a write is reported as failed
pub const SINK_WRITE_ATTEMPTS: u32 = 3;

/// Pause between write attempts
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Destination for match records
#[async_trait::async_trait]
pub trait ResultSink: Send + Sync {
    /// Persist one record
    ///
    /// # Errors
    /// Returns [`Error::SinkWriteFailed`] when the record could not be stored.
    async fn record(&self, record: &MatchRecord) -> Result<()>;
}

/// Render one record as its output block
///
/// ```
/// use steam_sweep::classify::{Category, MatchRecord};
/// use steam_sweep::sink::format_record;
/// use steam_sweep::steam_id::SteamId64;
///
/// let record = MatchRecord {
///     category: Category::LegacyGames,
///     steam_id: "STEAM_0:1:5".to_string(),
///     steam_id64: SteamId64(76561197960265739),
///     player_name: "bob".to_string(),
///     profile_url: "https://steamcommunity.com/profiles/76561197960265739".to_string(),
///     extra_fields: vec![("LEVEL".to_string(), "5".to_string())],
/// };
/// assert_eq!(
///     format_record(&record),
///     "OLD GAMES ACCOUNT FOUND:\n\
///      STEAM_0:1:5 | bob | LEVEL: 5 | https://steamcommunity.com/profiles/76561197960265739\n\n"
/// );
/// ```
pub fn format_record(record: &MatchRecord) -> String {
    let mut line = format!("{} | {}", record.steam_id, record.player_name);
    for (label, value) in &record.extra_fields {
        line.push_str(&format!(" | {label}: {value}"));
    }
    format!(
        "{}:\n{line} | {}\n\n",
        record.category.header(),
        record.profile_url
    )
}

/// [`ResultSink`] appending to `<output_dir>/<category>.txt`
pub struct FileSink {
    files: HashMap<Category, Mutex<PathBuf>>,
    retry_delay: Duration,
}

impl FileSink {
    /// Create the output directory if needed and prepare one file slot per category
    ///
    /// Existing files are kept and appended to.
    pub async fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref();
        tokio::fs::create_dir_all(output_dir).await?;

        let files = Category::ALL
            .into_iter()
            .map(|c| {
                let path = output_dir.join(format!("{}.txt", c.file_stem()));
                (c, Mutex::new(path))
            })
            .collect();

        Ok(Self {
            files,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    /// Override the pause between write attempts
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Path records of `category` are appended to
    pub async fn path_for(&self, category: Category) -> Option<PathBuf> {
        Some(self.files.get(&category)?.lock().await.clone())
    }
}

async fn append(path: &Path, block: &str) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(block.as_bytes()).await?;
    file.flush().await
}

#[async_trait::async_trait]
impl ResultSink for FileSink {
    async fn record(&self, record: &MatchRecord) -> Result<()> {
        let category = record.category;
        let slot = self.files.get(&category).ok_or_else(|| Error::SinkWriteFailed {
            category,
            reason: "no output file for category".to_string(),
        })?;
        let block = format_record(record);

        // Held across retries so a retried block never interleaves with another
        let path = slot.lock().await;
        let mut attempt = 1;
        loop {
            match append(&path, &block).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < SINK_WRITE_ATTEMPTS => {
                    tracing::debug!(
                        %category,
                        attempt,
                        error = %e,
                        "Record write failed, retrying"
                    );
                    attempt += 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    return Err(Error::SinkWriteFailed {
                        category,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::steam_id::{AccountId, AuthServer};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn record(category: Category, sequence: u32, name: &str) -> MatchRecord {
        let account = AccountId {
            auth_server: AuthServer::One,
            sequence,
        };
        let steam_id64 = account.to_steam_id64();
        MatchRecord {
            category,
            steam_id: account.to_text_id(),
            steam_id64,
            player_name: name.to_string(),
            profile_url: steam_id64.profile_url(),
            extra_fields: Vec::new(),
        }
    }

    #[test]
    fn block_without_extras() {
        let block = format_record(&record(Category::Unverified, 0, "ghost"));
        assert_eq!(
            block,
            "UNVERIFIED ACCOUNT FOUND:\n\
             STEAM_0:1:0 | ghost | https://steamcommunity.com/profiles/76561197960265729\n\n"
        );
    }

    #[test]
    fn extras_keep_their_order() {
        let mut r = record(Category::RegionalVeteran, 1, "ana");
        r.extra_fields = vec![
            ("REAL NAME".to_string(), "Ana Souza".to_string()),
            ("LEVEL".to_string(), "3".to_string()),
        ];
        let block = format_record(&r);
        assert!(block.starts_with("CSGO ACCOUNT FOUND:\n"));
        assert!(block.contains("| ana | REAL NAME: Ana Souza | LEVEL: 3 | https://"));
    }

    #[tokio::test]
    async fn new_creates_the_output_directory() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("nested").join("out");

        let sink = FileSink::new(&dir).await.unwrap();

        assert!(dir.is_dir());
        assert_eq!(
            sink.path_for(Category::LowLevel).await.unwrap(),
            dir.join("level_0_accounts.txt")
        );
    }

    #[tokio::test]
    async fn records_append_to_their_category_file() {
        let temp = tempdir().unwrap();
        let sink = FileSink::new(temp.path()).await.unwrap();

        sink.record(&record(Category::LowLevel, 1, "a")).await.unwrap();
        sink.record(&record(Category::LowLevel, 2, "b")).await.unwrap();
        sink.record(&record(Category::LegacyGames, 3, "c")).await.unwrap();

        let low = std::fs::read_to_string(temp.path().join("level_0_accounts.txt")).unwrap();
        assert_eq!(low.matches("LEVEL 0 ACCOUNT FOUND:").count(), 2);
        assert!(low.find("| a |").unwrap() < low.find("| b |").unwrap());

        let old = std::fs::read_to_string(temp.path().join("old_games_accounts.txt")).unwrap();
        assert!(old.contains("STEAM_0:1:3 | c |"));
        assert!(!temp.path().join("csgo_accounts.txt").exists());
    }

    #[tokio::test]
    async fn existing_files_are_never_truncated() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("unverified_accounts.txt");
        std::fs::write(&path, "earlier run\n").unwrap();

        let sink = FileSink::new(temp.path()).await.unwrap();
        sink.record(&record(Category::Unverified, 9, "z")).await.unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.starts_with("earlier run\nUNVERIFIED ACCOUNT FOUND:\n"));
    }

    #[tokio::test]
    async fn concurrent_writes_never_interleave() {
        let temp = tempdir().unwrap();
        let sink = Arc::new(FileSink::new(temp.path()).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..32 {
            let sink = Arc::clone(&sink);
            handles.push(tokio::spawn(async move {
                sink.record(&record(Category::LegacyGames, i, &format!("p{i}")))
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let contents = std::fs::read_to_string(temp.path().join("old_games_accounts.txt")).unwrap();
        let blocks: Vec<&str> = contents.split("\n\n").filter(|b| !b.is_empty()).collect();
        assert_eq!(blocks.len(), 32);
        for block in blocks {
            let lines: Vec<&str> = block.lines().collect();
            assert_eq!(lines.len(), 2, "malformed block {block:?}");
            assert_eq!(lines[0], "OLD GAMES ACCOUNT FOUND:");
        }
    }

    #[tokio::test]
    async fn unwritable_file_fails_after_bounded_attempts() {
        let temp = tempdir().unwrap();
        let sink = FileSink::new(temp.path())
            .await
            .unwrap()
            .with_retry_delay(Duration::from_millis(1));
        // A directory where the file should be makes every open fail
        std::fs::create_dir(temp.path().join("csgo_accounts.txt")).unwrap();

        let err = sink
            .record(&record(Category::RegionalVeteran, 4, "x"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::SinkWriteFailed {
                category: Category::RegionalVeteran,
                ..
            }
        ));
        // Other categories are unaffected
        sink.record(&record(Category::Unverified, 4, "x")).await.unwrap();
    }
}
