use std::path::PathBuf;

/// Errors raised while acquiring backgrounds or persisting settings
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request to photo service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("photo service returned {0}")]
    Status(reqwest::StatusCode),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("malformed settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("no cached background at {0}")]
    NoCachedImage(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
