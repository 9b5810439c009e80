//! Model download.
//!
//! Fetches the LID model (GlotLID `model.bin` by default) to a local path.
//! The body is streamed to `<dst>.part`, which is checked against the expected sha256
//! (if any) and only then renamed. The `.part` file is removed on failure.
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, error, info};
use reqwest::Url;
use sha2::{Digest, Sha256};

use crate::error::Error;

pub const MODEL_URL: &str = "https://huggingface.co/cis-lmu/glotlid/resolve/main/model.bin";

/// Model files are large, the timeout covers the whole transfer.
const TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// holds the url to download from
/// and the http client that will make the request.
pub struct Downloader {
    url: Url,
    client: reqwest::blocking::Client,
}

impl Downloader {
    pub fn new(url: &str) -> Result<Self, Error> {
        let url = Url::parse(url).map_err(|e| Error::Custom(format!("invalid url {url}: {e}")))?;
        let client = reqwest::blocking::Client::builder()
            .timeout(TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { url, client })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Download to `dst`, unless it already exists and `force` is off.
    /// Returns whether a download happened.
    ///
    /// When `sha256` is set, a downloaded file is checked before being moved to `dst`,
    /// and an existing, kept `dst` is checked in place.
    pub fn download_blocking(&self, dst: &Path, force: bool, sha256: Option<&str>) -> Result<bool, Error> {
        if dst.exists() && !force {
            info!("{dst:?} already exists, skipping download");
            if let Some(expected) = sha256 {
                verify(dst, expected)?;
            }
            return Ok(false);
        }
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("downloading {} to {dst:?}", self.url);
        let response = self.client.get(self.url.clone()).send()?.error_for_status()?;
        save(response, dst, sha256)?;
        Ok(true)
    }
}

/// Stream `body` to `<dst>.part`, verify it, then rename it to `dst`.
fn save<R: Read>(body: R, dst: &Path, sha256: Option<&str>) -> Result<u64, Error> {
    let part = part_path(dst);
    let result = write_part(body, &part, sha256).and_then(|written| {
        std::fs::rename(&part, dst)?;
        Ok(written)
    });
    if result.is_err() && part.exists() {
        if let Err(e) = std::fs::remove_file(&part) {
            error!("could not remove {part:?}: {e}");
        }
    }
    result
}

fn write_part<R: Read>(body: R, part: &Path, sha256: Option<&str>) -> Result<u64, Error> {
    let mut out = File::create(part)?;
    let mut buf = BufReader::new(body);
    let written = std::io::copy(&mut buf, &mut out)?;
    out.sync_all()?;
    debug!("{written} bytes written to {part:?}");
    if let Some(expected) = sha256 {
        verify(part, expected)?;
        info!("checksum ok for {part:?}");
    }
    Ok(written)
}

fn part_path(dst: &Path) -> PathBuf {
    let mut name = dst.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Hex sha256 of a file.
pub fn file_sha256(path: &Path) -> Result<String, Error> {
    let mut f = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Fail if the sha256 of `path` is not `expected`.
pub fn verify(path: &Path, expected: &str) -> Result<(), Error> {
    let actual = file_sha256(path)?;
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(Error::Custom(format!(
            "checksum mismatch for {path:?}: expected {expected}, got {actual}"
        )))
    }
}
