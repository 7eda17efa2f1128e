use crate::error::{CliError, Result};
use futures_util::StreamExt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub enum FetchProgress {
    Started { total_size: Option<u64> },
    Downloading { downloaded: u64 },
    Unpacking,
}

/// The remote-fetch collaborator: retrieves a `.tar.zst` bundle of archives
/// byte-identically and unpacks it into the destination directory. No retry
/// or resume behavior.
#[derive(Debug)]
pub struct ArchiveFetcher {
    dest: PathBuf,
}

impl ArchiveFetcher {
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        Self { dest: dest.into() }
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }

    pub async fn fetch(
        &self,
        url: &str,
        force: bool,
        mut progress: impl FnMut(FetchProgress),
    ) -> Result<()> {
        info!("Preparing to fetch bundle into {:?}", &self.dest);
        if self.dest.exists() {
            if force {
                info!("--force specified, removing existing destination directory.");
                fs::remove_dir_all(&self.dest)?;
            } else {
                return Err(CliError::Fetch(
                    "Destination directory already exists. Use --force to overwrite.".to_string(),
                ));
            }
        }
        fs::create_dir_all(&self.dest)?;

        info!("Sending request to {}", url);
        let client = reqwest::Client::new();
        let response = client.get(url).send().await?.error_for_status()?;

        let total_size = response.content_length();
        progress(FetchProgress::Started { total_size });

        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::with_capacity(total_size.unwrap_or(0) as usize);

        while let Some(item) = stream.next().await {
            let chunk = item?;
            buffer.extend_from_slice(&chunk);
            downloaded += chunk.len() as u64;
            progress(FetchProgress::Downloading { downloaded });
        }

        progress(FetchProgress::Unpacking);
        info!("Download complete. Decompressing and unpacking bundle...");

        let cursor = std::io::Cursor::new(buffer);
        let decoder = zstd::stream::read::Decoder::new(cursor)?;
        let mut bundle = tar::Archive::new(decoder);
        bundle.unpack(&self.dest).map_err(CliError::Io)?;

        info!("Bundle successfully unpacked to {:?}", &self.dest);
        Ok(())
    }
}
