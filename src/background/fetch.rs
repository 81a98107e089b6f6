//! Background image acquisition
//!
//! Downloads photos from the photo service, keeps the most recent one
//! on disk, and decodes images off the UI thread.

use iced::widget::image::Handle;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::task;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Fixed name of the cached background
pub const LAST_FILE_NAME: &str = "last.jpg";

/// Where a decoded image came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOrigin {
    Remote(String),
    Cache(PathBuf),
}

/// A decoded background, ready for the image widget
#[derive(Debug, Clone)]
pub struct BackgroundImage {
    pub handle: Handle,
    pub width: u32,
    pub height: u32,
    pub origin: ImageOrigin,
}

/// Get the path of the cached background.
/// Returns ~/.cache/unsplash-clock/last.jpg on Linux
pub fn cache_path() -> PathBuf {
    let mut path = dirs::cache_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir);

    path.push("unsplash-clock");
    path.push(LAST_FILE_NAME);
    path
}

/// Download a photo, decode it, and save the raw bytes to `cache_path`.
///
/// The file is only replaced once the bytes decode, so a broken
/// response never clobbers the last good image. A failed save is logged
/// and the decoded image is still returned.
pub async fn download_image(
    client: reqwest::Client,
    url: String,
    cache_path: PathBuf,
) -> Result<BackgroundImage> {
    debug!(%url, "requesting background");

    let response = client.get(&url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status(status));
    }

    let bytes = response.bytes().await?.to_vec();
    let size = bytes.len();

    let (image, bytes) = decode(bytes, ImageOrigin::Remote(url)).await?;
    if let Err(e) = persist(cache_path.clone(), bytes).await {
        warn!(path = %cache_path.display(), error = %e, "could not cache background");
    }

    info!(
        width = image.width,
        height = image.height,
        kb = size / 1024,
        "downloaded background"
    );
    Ok(image)
}

/// Load the background saved by the last successful download
pub async fn load_cached(cache_path: PathBuf) -> Result<BackgroundImage> {
    let bytes = match tokio::fs::read(&cache_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NoCachedImage(cache_path));
        }
        Err(source) => {
            return Err(Error::Io {
                path: cache_path,
                source,
            })
        }
    };

    let (image, _) = decode(bytes, ImageOrigin::Cache(cache_path)).await?;
    info!(width = image.width, height = image.height, "loaded cached background");
    Ok(image)
}

/// Decode on the blocking pool; hands the bytes back for persisting
async fn decode(bytes: Vec<u8>, origin: ImageOrigin) -> Result<(BackgroundImage, Vec<u8>)> {
    task::spawn_blocking(move || -> Result<(BackgroundImage, Vec<u8>)> {
        let image = decode_blocking(&bytes, origin)?;
        Ok((image, bytes))
    })
    .await?
}

fn decode_blocking(bytes: &[u8], origin: ImageOrigin) -> Result<BackgroundImage> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(BackgroundImage {
        handle: Handle::from_rgba(width, height, rgba.into_raw()),
        width,
        height,
        origin,
    })
}

/// Replace `path` atomically. Every call writes its own uniquely named
/// temporary file, so concurrent saves never share a partial file.
async fn persist(path: PathBuf, bytes: Vec<u8>) -> Result<()> {
    task::spawn_blocking(move || persist_blocking(&path, &bytes)).await?
}

fn persist_blocking(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_err = |source| Error::Io {
        path: parent.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(parent).map_err(io_err)?;

    let mut file = NamedTempFile::new_in(parent).map_err(io_err)?;
    file.write_all(bytes).map_err(io_err)?;
    file.persist(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}
