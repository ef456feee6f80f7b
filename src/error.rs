use std::io;
use std::path::PathBuf;
use thiserror::Error;

// Deriving Debug is necessary to use .expect() method
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    IoError(#[from] io::Error),
    #[error("Could not open {}: {}", .path.display(), .source)]
    OpenFile { path: PathBuf, source: io::Error },
    #[error("Screen {0}x{1} is too small. At least 1x3 is necessary in width x height")]
    TooSmallWindow(usize, usize),
    #[error("Could not detect terminal window size")]
    UnknownWindowSize,
}

pub type Result<T> = std::result::Result<T, Error>;
